//! Live capture segmentation.
//!
//! A [`CaptureWorker`] owns a [`Vad`] on its own task. The capture loop
//! pushes sample buffers through a bounded channel and never waits on
//! analysis; finished utterances come out of a second channel.
//!
//! A burst too short for the VAD to close is dropped once the silence hold
//! passes, so gaps between bursts are never buffered.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use vocalid_audio::descriptors::average_amplitude;
use vocalid_audio::pcm::Format;
use vocalid_audio::vad::{Vad, VadConfig, VadEvent};

use crate::VoiceprintError;

/// Capture worker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub vad: VadConfig,
    /// Capacity of the input and output channels (default: 32).
    pub channel_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            vad: VadConfig::default(),
            channel_capacity: 32,
        }
    }
}

/// One speech segment cut from the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Stream position of the first sample.
    pub start: Duration,
    /// Samples from the opening buffer through the last buffer above the
    /// VAD threshold; trailing silence is dropped.
    pub samples: Vec<i16>,
    /// Speech length reported by the VAD, or the sample duration for a
    /// segment cut short by the end of the stream.
    pub speech_duration: Duration,
    /// False when the stream ended before the VAD closed the segment.
    pub complete: bool,
}

/// Handle to a running segmentation task.
pub struct CaptureWorker {
    tx: mpsc::Sender<Vec<i16>>,
    handle: JoinHandle<()>,
}

impl CaptureWorker {
    /// Starts the worker on the current tokio runtime.
    ///
    /// The returned receiver yields segments in stream order. It should be
    /// drained while feeding: once its channel is full the worker stops
    /// reading input.
    pub fn spawn(cfg: CaptureConfig) -> (Self, mpsc::Receiver<Segment>) {
        let capacity = cfg.channel_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let (seg_tx, seg_rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(run(cfg.vad, rx, seg_tx));
        (Self { tx, handle }, seg_rx)
    }

    /// Queues one buffer, waiting if the worker is behind.
    pub async fn feed(&self, buf: Vec<i16>) -> Result<(), VoiceprintError> {
        self.tx.send(buf).await.map_err(|_| VoiceprintError::Closed)
    }

    /// Closes the input and waits for the worker to flush.
    pub async fn finish(self) -> Result<(), VoiceprintError> {
        drop(self.tx);
        self.handle.await?;
        Ok(())
    }
}

async fn run(cfg: VadConfig, mut rx: mpsc::Receiver<Vec<i16>>, tx: mpsc::Sender<Segment>) {
    let format = Format::mono(cfg.sample_rate);
    let threshold = cfg.energy_threshold;
    // Trailing silence kept past the last voiced buffer of an open segment.
    let hold = format.samples_in_duration(Duration::from_millis(cfg.silence_duration_ms));
    let mut vad = Vad::new(cfg);
    vad.reset();

    let mut current: Vec<i16> = Vec::new();
    let mut voiced_len = 0;
    let mut start = Duration::ZERO;

    while let Some(buf) = rx.recv().await {
        match vad.process(&buf) {
            Some(VadEvent::SpeechStart) => {
                start = vad
                    .position()
                    .saturating_sub(format.duration_of_samples(buf.len()));
                current.clear();
                current.extend_from_slice(&buf);
                voiced_len = current.len();
            }
            Some(VadEvent::SpeechEnd { speech_duration }) => {
                current.truncate(voiced_len);
                let segment = Segment {
                    start,
                    samples: std::mem::take(&mut current),
                    speech_duration,
                    complete: true,
                };
                tracing::debug!(?start, ?speech_duration, "capture: segment");
                if tx.send(segment).await.is_err() {
                    tracing::debug!("capture: segment receiver dropped");
                    return;
                }
            }
            None if vad.is_speaking() => {
                current.extend_from_slice(&buf);
                if average_amplitude(&buf) > threshold {
                    voiced_len = current.len();
                } else if current.len() - voiced_len > hold {
                    // Too short for the VAD to close; start over at the next voiced buffer.
                    tracing::debug!(?start, voiced = voiced_len, "capture: burst dropped");
                    vad.abandon();
                    current.clear();
                    voiced_len = 0;
                }
            }
            None => {}
        }
    }

    if vad.is_speaking() && voiced_len > 0 {
        current.truncate(voiced_len);
        let speech_duration = format.duration_of_samples(current.len());
        tracing::debug!(?start, ?speech_duration, "capture: trailing segment");
        let _ = tx
            .send(Segment {
                start,
                samples: current,
                speech_duration,
                complete: false,
            })
            .await;
    }
}
