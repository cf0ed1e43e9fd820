use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::shared::constants::{CHANNELS, SAMPLE_RATE};

/// Writes 16-bit mono PCM samples as a WAV file at the pipeline sample rate.
pub fn write_mono_i16(path: &Path, samples: &[i16]) -> Result<(), Box<dyn std::error::Error>> {
    let spec = WavSpec {
        channels: CHANNELS,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Reads a WAV file as normalized f32 mono samples (whisper input format).
/// Multi-channel input is averaged down to mono.
pub fn read_mono_f32(path: &Path) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<Result<_, _>>()?
        }
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
    };

    if channels == 1 {
        return Ok(interleaved);
    }

    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok(mono)
}
