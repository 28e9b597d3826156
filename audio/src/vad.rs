//! Energy-based voice activity detection with hysteresis.
//!
//! The detector tracks mean absolute amplitude per buffer. Speech starts as
//! soon as one buffer exceeds the threshold; it only ends after a long
//! enough silence following a long enough speech segment, so short pauses
//! and short bursts never produce an end-of-speech event.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::descriptors::average_amplitude;
use crate::pcm::Format;

/// VAD configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    /// Mean absolute amplitude, in 16-bit units, above which a buffer is
    /// speech (default: 500.0).
    pub energy_threshold: f64,
    /// Silence required after speech before it ends, in ms (default: 1500).
    pub silence_duration_ms: u64,
    /// Minimum speech length that may end, in ms (default: 2000).
    pub min_speech_duration_ms: u64,
    /// Sample rate used by the stream clock (default: 16000).
    pub sample_rate: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            energy_threshold: 500.0,
            silence_duration_ms: 1500,
            min_speech_duration_ms: 2000,
            sample_rate: 16000,
        }
    }
}

/// Detector state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VadState {
    Silent,
    Speaking,
}

/// Transition reported by [`Vad::process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEvent {
    SpeechStart,
    /// Speech ended; `speech_duration` spans from the start of the segment
    /// to the last buffer above the threshold.
    SpeechEnd { speech_duration: Duration },
}

/// Voice activity detector.
///
/// Single-writer: feed buffers from one capture loop and call
/// [`reset`](Vad::reset) between sessions.
#[derive(Debug, Clone)]
pub struct Vad {
    cfg: VadConfig,
    format: Format,
    state: VadState,
    speech_start: Duration,
    last_speech: Duration,
    consumed: usize,
}

impl Vad {
    pub fn new(cfg: VadConfig) -> Self {
        let format = Format::mono(cfg.sample_rate);
        Self {
            cfg,
            format,
            state: VadState::Silent,
            speech_start: Duration::ZERO,
            last_speech: Duration::ZERO,
            consumed: 0,
        }
    }

    pub fn config(&self) -> &VadConfig {
        &self.cfg
    }

    pub fn state(&self) -> VadState {
        self.state
    }

    pub fn is_speaking(&self) -> bool {
        self.state == VadState::Speaking
    }

    /// Stream position: duration of all samples consumed since the last reset.
    pub fn position(&self) -> Duration {
        self.format.duration_of_samples(self.consumed)
    }

    /// Clears state and rewinds the stream clock.
    pub fn reset(&mut self) {
        self.state = VadState::Silent;
        self.speech_start = Duration::ZERO;
        self.last_speech = Duration::ZERO;
        self.consumed = 0;
    }

    /// Drops an open segment without an event, keeping the stream clock.
    ///
    /// For callers that give up on a burst the detector would otherwise
    /// hold open; the next buffer above the threshold starts a new segment.
    pub fn abandon(&mut self) {
        self.state = VadState::Silent;
        self.speech_start = Duration::ZERO;
        self.last_speech = Duration::ZERO;
    }

    /// Processes the next buffer of the stream.
    ///
    /// The buffer ends at the stream position after consuming it.
    pub fn process(&mut self, buf: &[i16]) -> Option<VadEvent> {
        if buf.is_empty() {
            return None;
        }
        self.consumed += buf.len();
        let now = self.position();
        self.process_at(buf, now)
    }

    /// Processes a buffer that ends at `now`.
    ///
    /// Does not advance the stream clock.
    pub fn process_at(&mut self, buf: &[i16], now: Duration) -> Option<VadEvent> {
        if buf.is_empty() {
            return None;
        }
        let energy = average_amplitude(buf);

        if energy > self.cfg.energy_threshold {
            self.last_speech = now;
            if self.state == VadState::Silent {
                let len = self.format.duration_of_samples(buf.len());
                self.speech_start = now.saturating_sub(len);
                self.state = VadState::Speaking;
                tracing::debug!(energy, at = ?self.speech_start, "vad: speech start");
                return Some(VadEvent::SpeechStart);
            }
            return None;
        }

        if self.state == VadState::Speaking {
            let silence = now.saturating_sub(self.last_speech);
            let speech = self.last_speech.saturating_sub(self.speech_start);
            if silence >= Duration::from_millis(self.cfg.silence_duration_ms)
                && speech >= Duration::from_millis(self.cfg.min_speech_duration_ms)
            {
                self.state = VadState::Silent;
                tracing::debug!(?speech, ?silence, "vad: speech end");
                return Some(VadEvent::SpeechEnd {
                    speech_duration: speech,
                });
            }
        }
        None
    }
}

impl Default for Vad {
    fn default() -> Self {
        Self::new(VadConfig::default())
    }
}
