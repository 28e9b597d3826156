//! Passphrase verification state machine.
//!
//! ```text
//! Idle --start--> Listening --on_recognized--> Scoring --> Accepted | Rejected
//!                     |
//!                     +--on_recognition_error--> Rejected
//! any --stop--> Idle
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PassphraseError, RecognitionError};
use crate::text::{normalize, text_similarity};

/// Reason given when the recognizer produced no text.
pub const NO_SPEECH_REASON: &str = "no speech recognized";

/// Configuration for passphrase checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassphraseConfig {
    /// Minimum combined text similarity to accept (default: 0.7).
    pub threshold: f64,
}

impl Default for PassphraseConfig {
    fn default() -> Self {
        Self { threshold: 0.7 }
    }
}

/// Outcome of one verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_valid: bool,
    pub recognized_text: String,
    pub expected_text: String,
    pub text_similarity: f64,
    pub overall_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl VerificationResult {
    fn rejected(recognized: &str, expected: &str, reason: String) -> Self {
        Self {
            is_valid: false,
            recognized_text: recognized.to_string(),
            expected_text: expected.to_string(),
            text_similarity: 0.0,
            overall_confidence: 0.0,
            failure_reason: Some(reason),
        }
    }
}

/// Compares recognized text with the expected passphrase.
pub fn verify_passphrase(recognized: &str, expected: &str, cfg: &PassphraseConfig) -> VerificationResult {
    if recognized.trim().is_empty() {
        return VerificationResult::rejected(recognized, expected, NO_SPEECH_REASON.to_string());
    }

    let clean_recognized = normalize(recognized);
    let clean_expected = normalize(expected);
    let similarity = text_similarity(&clean_recognized, &clean_expected);
    let is_valid = similarity >= cfg.threshold;
    tracing::debug!(
        recognized = %clean_recognized,
        expected = %clean_expected,
        similarity,
        is_valid,
        "passphrase scored"
    );

    VerificationResult {
        is_valid,
        recognized_text: recognized.to_string(),
        expected_text: expected.to_string(),
        text_similarity: similarity,
        overall_confidence: similarity,
        failure_reason: (!is_valid).then(|| {
            format!("passphrase mismatch: similarity {:.2}%", similarity * 100.0)
        }),
    }
}

/// Verifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifierState {
    Idle,
    Listening,
    Scoring,
    Accepted,
    Rejected,
}

impl fmt::Display for VerifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VerifierState::Idle => "idle",
            VerifierState::Listening => "listening",
            VerifierState::Scoring => "scoring",
            VerifierState::Accepted => "accepted",
            VerifierState::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Drives one passphrase check at a time from recognizer callbacks.
#[derive(Debug, Clone)]
pub struct PassphraseVerifier {
    cfg: PassphraseConfig,
    state: VerifierState,
    expected: String,
    result: Option<VerificationResult>,
}

impl PassphraseVerifier {
    pub fn new(cfg: PassphraseConfig) -> Self {
        Self {
            cfg,
            state: VerifierState::Idle,
            expected: String::new(),
            result: None,
        }
    }

    pub fn state(&self) -> VerifierState {
        self.state
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Result of the last finished attempt.
    pub fn result(&self) -> Option<&VerificationResult> {
        self.result.as_ref()
    }

    /// Begins an attempt for `expected`, discarding any previous result.
    pub fn start(&mut self, expected: impl Into<String>) {
        self.expected = expected.into();
        self.result = None;
        self.state = VerifierState::Listening;
        tracing::debug!(expected = %self.expected, "passphrase: listening");
    }

    /// Scores recognized text for the current attempt.
    pub fn on_recognized(&mut self, text: &str) -> Result<&VerificationResult, PassphraseError> {
        self.expect_state(VerifierState::Listening)?;
        self.state = VerifierState::Scoring;
        let result = verify_passphrase(text, &self.expected, &self.cfg);
        Ok(self.finish(result))
    }

    /// Rejects the current attempt because recognition failed.
    pub fn on_recognition_error(
        &mut self,
        err: RecognitionError,
    ) -> Result<&VerificationResult, PassphraseError> {
        self.expect_state(VerifierState::Listening)?;
        tracing::warn!(error = %err, "passphrase: recognition failed");
        let result = VerificationResult::rejected(
            "",
            &self.expected,
            format!("speech recognition error: {err}"),
        );
        Ok(self.finish(result))
    }

    /// Abandons any attempt and returns to idle.
    pub fn stop(&mut self) {
        self.state = VerifierState::Idle;
        self.expected.clear();
        self.result = None;
    }

    fn expect_state(&self, expected: VerifierState) -> Result<(), PassphraseError> {
        if self.state != expected {
            return Err(PassphraseError::InvalidState {
                state: self.state,
                expected,
            });
        }
        Ok(())
    }

    fn finish(&mut self, result: VerificationResult) -> &VerificationResult {
        self.state = if result.is_valid {
            VerifierState::Accepted
        } else {
            VerifierState::Rejected
        };
        tracing::info!(
            state = %self.state,
            similarity = result.text_similarity,
            "passphrase verification finished"
        );
        self.result.insert(result)
    }
}

impl Default for PassphraseVerifier {
    fn default() -> Self {
        Self::new(PassphraseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verify(recognized: &str, expected: &str) -> VerificationResult {
        verify_passphrase(recognized, expected, &PassphraseConfig::default())
    }

    #[test]
    fn test_exact_arabic_match() {
        let r = verify("أنا صاحب هذا الحساب", "أنا صاحب هذا الحساب");
        assert!(r.is_valid);
        assert_eq!(r.text_similarity, 1.0);
        assert_eq!(r.overall_confidence, 1.0);
        assert_eq!(r.failure_reason, None);
    }

    #[test]
    fn test_unrelated_arabic_rejected() {
        let r = verify("كلمة عشوائية", "أنا صاحب هذا الحساب");
        assert!(!r.is_valid);
        assert!(r.text_similarity < 0.7);
        assert!(r.failure_reason.unwrap().starts_with("passphrase mismatch"));
    }

    #[test]
    fn test_punctuation_and_case_ignored() {
        let r = verify("  Hello,  WORLD! ", "hello world");
        assert!(r.is_valid);
        assert_eq!(r.text_similarity, 1.0);
        assert_eq!(r.recognized_text, "  Hello,  WORLD! ");

        let r = verify("هذا صوتي الحقيقي؟", "هذا صوتي الحقيقي");
        assert_eq!(r.text_similarity, 1.0);
    }

    #[test]
    fn test_one_word_missing() {
        // 3 of 4 words: word 3/3.5, char 1 - 4/19.
        let r = verify("أنا صاحب الحساب", "أنا صاحب هذا الحساب");
        let expected = 0.7 * (3.0 / 3.5) + 0.3 * (1.0 - 4.0 / 19.0);
        assert!((r.text_similarity - expected).abs() < 1e-12);
        assert!(r.is_valid);
    }

    #[test]
    fn test_empty_recognition() {
        for text in ["", "   "] {
            let r = verify(text, "هذا صوتي الحقيقي");
            assert!(!r.is_valid);
            assert_eq!(r.text_similarity, 0.0);
            assert_eq!(r.failure_reason.as_deref(), Some(NO_SPEECH_REASON));
        }
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = PassphraseConfig { threshold: 0.95 };
        let r = verify_passphrase("أنا صاحب الحساب", "أنا صاحب هذا الحساب", &strict);
        assert!(!r.is_valid);
    }

    #[test]
    fn test_state_machine_accept() {
        let mut v = PassphraseVerifier::default();
        assert_eq!(v.state(), VerifierState::Idle);
        v.start("تحقق من هويتي الصوتية");
        assert_eq!(v.state(), VerifierState::Listening);

        let r = v.on_recognized("تحقق من هويتي الصوتية").unwrap();
        assert!(r.is_valid);
        assert_eq!(v.state(), VerifierState::Accepted);
        assert!(v.result().is_some());

        // A finished attempt does not take more input.
        assert!(matches!(
            v.on_recognized("again"),
            Err(PassphraseError::InvalidState {
                state: VerifierState::Accepted,
                expected: VerifierState::Listening
            })
        ));

        v.stop();
        assert_eq!(v.state(), VerifierState::Idle);
        assert!(v.result().is_none());
        assert_eq!(v.expected(), "");
    }

    #[test]
    fn test_state_machine_reject_and_restart() {
        let mut v = PassphraseVerifier::default();
        v.start("هذا صوتي الحقيقي");
        let r = v.on_recognized("شيء آخر تماما").unwrap();
        assert!(!r.is_valid);
        assert_eq!(v.state(), VerifierState::Rejected);

        v.start("هذا صوتي الحقيقي");
        assert!(v.result().is_none());
        let r = v.on_recognition_error(RecognitionError::NetworkTimeout).unwrap();
        assert_eq!(
            r.failure_reason.as_deref(),
            Some("speech recognition error: network timeout")
        );
        assert_eq!(v.state(), VerifierState::Rejected);
    }

    #[test]
    fn test_idle_rejects_input() {
        let mut v = PassphraseVerifier::default();
        assert!(v.on_recognized("x").is_err());
        assert!(v.on_recognition_error(RecognitionError::Unknown(42)).is_err());
        assert_eq!(v.state(), VerifierState::Idle);
    }

    #[test]
    fn test_result_serializes() {
        let r = verify("هذا صوتي الحقيقي", "هذا صوتي الحقيقي");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["is_valid"], true);
        assert!(json.get("failure_reason").is_none());
    }
}
