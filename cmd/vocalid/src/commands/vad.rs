//! Speech segmentation command.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use vocalid_voiceprint::CaptureWorker;

use super::{get_config, load_audio, output};
use crate::Cli;

/// List speech segments in a recording.
///
/// The file is streamed through the capture worker in fixed-size buffers,
/// the same way live audio would arrive.
#[derive(Args)]
pub struct VadCommand {
    /// WAV file to segment
    file: PathBuf,

    /// Buffer length in milliseconds
    #[arg(long, default_value_t = 100)]
    buffer_ms: u32,
}

#[derive(Serialize)]
struct SegmentReport {
    start_ms: u128,
    length_ms: u128,
    speech_ms: u128,
    complete: bool,
}

impl VadCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let cfg = get_config(cli)?;
        let sample_rate = cfg.capture.vad.sample_rate;
        let samples = load_audio(&self.file, sample_rate)?;
        let chunk = (sample_rate as usize * self.buffer_ms.max(1) as usize / 1000).max(1);

        let (worker, mut segments) = CaptureWorker::spawn(cfg.capture);
        let feeder = tokio::spawn(async move {
            for buf in samples.chunks(chunk) {
                worker.feed(buf.to_vec()).await?;
            }
            worker.finish().await
        });

        let mut reports = Vec::new();
        while let Some(segment) = segments.recv().await {
            let length = segment.samples.len() as u128 * 1000 / sample_rate as u128;
            reports.push(SegmentReport {
                start_ms: segment.start.as_millis(),
                length_ms: length,
                speech_ms: segment.speech_duration.as_millis(),
                complete: segment.complete,
            });
        }
        feeder.await??;

        tracing::info!(segments = reports.len(), "segmentation complete");
        output(cli).write(&reports)
    }
}
