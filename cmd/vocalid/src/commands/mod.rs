//! CLI commands module.

mod compare;
mod config;
mod enroll;
mod features;
mod passphrase;
mod util;
mod vad;
mod verify;

pub use compare::CompareCommand;
pub use config::ConfigCommand;
pub use enroll::EnrollCommand;
pub use features::FeaturesCommand;
pub use passphrase::PassphraseCommand;
pub use vad::VadCommand;
pub use verify::VerifyCommand;

pub(crate) use util::*;
