use std::f64::consts::PI;

use vocalid_audio::Format;
use vocalid_audio::wav::{read_wav, write_wav};
use vocalid_voiceprint::{
    CaptureConfig, CaptureWorker, Enroller, MatchWeights, VoiceFeatures, compare_features,
    compare_templates,
};

const RATE: u32 = 16000;

/// Harmonic tone standing in for a speaker: fundamental plus weighted overtones.
fn speaker(f0: f64, harmonics: &[f64], amp: f64, seconds: f64) -> Vec<i16> {
    let n = (RATE as f64 * seconds) as usize;
    let norm: f64 = harmonics.iter().sum();
    (0..n)
        .map(|i| {
            let t = i as f64 / RATE as f64;
            let s: f64 = harmonics
                .iter()
                .enumerate()
                .map(|(h, w)| w * (2.0 * PI * f0 * (h + 1) as f64 * t).sin())
                .sum();
            (amp * s / norm) as i16
        })
        .collect()
}

fn alice(amp: f64) -> Vec<i16> {
    speaker(140.0, &[1.0, 0.6, 0.3], amp, 1.5)
}

fn bob(amp: f64) -> Vec<i16> {
    speaker(260.0, &[1.0, 0.2, 0.5, 0.4], amp, 1.5)
}

#[tokio::test]
async fn t_enroll_then_verify() {
    let enroller = Enroller::default();
    let template = enroller
        .enroll(vec![alice(6000.0), alice(8000.0), alice(10000.0)])
        .await
        .expect("enrollment should succeed");
    assert!(template.is_valid(), "quality {}", template.quality_score());
    assert_eq!(template.frame_count(), 3);
    assert_eq!(template.mean_features().len(), 13);
    assert!((template.fundamental_frequency() - 140.0).abs() < 10.0);

    let weights = MatchWeights::default();
    let same = compare_templates(&template, &enroller.probe(&alice(7000.0)).unwrap(), &weights);
    let other = compare_templates(&template, &enroller.probe(&bob(7000.0)).unwrap(), &weights);

    assert!(same > 0.5, "same speaker scored {same}");
    assert!(other < same - 0.1, "other speaker scored {other} vs {same}");
    assert!((0.0..=1.0).contains(&other));
}

#[tokio::test]
async fn t_enroll_from_wav_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = Vec::new();
    for (i, amp) in [5000.0, 9000.0].into_iter().enumerate() {
        let path = dir.path().join(format!("alice_{i}.wav"));
        write_wav(&path, &alice(amp), Format::MONO_16K).unwrap();
        paths.push(path);
    }

    let mut utterances = Vec::new();
    for path in &paths {
        let (format, samples) = read_wav(path).unwrap();
        assert_eq!(format, Format::MONO_16K);
        assert_eq!(samples.len(), 24000);
        utterances.push(samples);
    }
    assert_eq!(utterances[0], alice(5000.0));

    let template = Enroller::default().enroll(utterances).await.unwrap();
    assert!(template.is_valid());

    let json = template.to_json().unwrap();
    std::fs::write(dir.path().join("alice.json"), &json).unwrap();
    let loaded = std::fs::read_to_string(dir.path().join("alice.json")).unwrap();
    assert_eq!(vocalid_voiceprint::VoiceTemplate::from_json(&loaded).unwrap(), template);
}

#[test]
fn t_feature_comparison_ranks_speakers() {
    let a1 = VoiceFeatures::extract(&alice(8000.0), RATE).unwrap();
    let a2 = VoiceFeatures::extract(&alice(7000.0), RATE).unwrap();
    let b = VoiceFeatures::extract(&bob(8000.0), RATE).unwrap();

    assert!((compare_features(&a1, &a1) - 1.0).abs() < 1e-12);
    let same = compare_features(&a1, &a2);
    let other = compare_features(&a1, &b);
    assert!(same > other, "same {same} vs other {other}");

    let decoded = VoiceFeatures::from_feature_string(&a1.to_feature_string()).unwrap();
    assert_eq!(decoded, a1);
}

#[tokio::test]
async fn t_capture_then_enroll() {
    let (worker, mut segments) = CaptureWorker::spawn(CaptureConfig::default());

    let mut stream = vec![0i16; 8000];
    for amp in [6000.0, 9000.0] {
        stream.extend(speaker(140.0, &[1.0, 0.6, 0.3], amp, 2.5));
        stream.extend(std::iter::repeat_n(0i16, 32000));
    }
    for chunk in stream.chunks(1600) {
        worker.feed(chunk.to_vec()).await.unwrap();
    }
    worker.finish().await.unwrap();

    let mut utterances = Vec::new();
    while let Some(segment) = segments.recv().await {
        assert!(segment.complete);
        assert_eq!(segment.samples.len(), 40000);
        utterances.push(segment.samples);
    }
    assert_eq!(utterances.len(), 2);

    let template = Enroller::default().enroll(utterances).await.unwrap();
    assert!(template.is_valid());
}
