//! Audio Test Fixture Generator
//!
//! Writes short mono WAV files so duration probing has real content to read

use std::path::{Path, PathBuf};

/// Generate a 16-bit mono WAV tone of `duration_seconds`
pub fn generate_test_wav(path: &Path, duration_seconds: f64) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (duration_seconds * spec.sample_rate as f64) as usize;

    for i in 0..total_samples {
        let t = i as f32 / spec.sample_rate as f32;
        let sample = (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
        writer.write_sample(sample)?;
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}
