//! Spoken passphrase checks.
//!
//! Speech recognition happens elsewhere; this crate takes the recognized
//! text and decides whether it matches the passphrase the user was asked
//! to say.
//!
//! ```
//! use vocalid_passphrase::{PassphraseCatalog, PassphraseVerifier, VerifierState};
//!
//! let catalog = PassphraseCatalog::default();
//! let phrase = catalog.random().unwrap().to_string();
//!
//! let mut verifier = PassphraseVerifier::default();
//! verifier.start(phrase.clone());
//! let result = verifier.on_recognized(&phrase).unwrap();
//! assert!(result.is_valid);
//! assert_eq!(verifier.state(), VerifierState::Accepted);
//! ```

mod catalog;
mod error;
pub mod text;
mod verifier;

pub use catalog::{DEFAULT_PHRASES, PassphraseCatalog};
pub use error::{PassphraseError, RecognitionError};
pub use verifier::{
    NO_SPEECH_REASON, PassphraseConfig, PassphraseVerifier, VerificationResult, VerifierState,
    verify_passphrase,
};
