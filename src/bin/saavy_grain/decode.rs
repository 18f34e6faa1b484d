//! WAV decoding into planar `f32` channels.

use std::path::Path;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use hound::{SampleFormat, WavReader};

pub struct Decoded {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: f64,
}

pub fn decode_wav(path: &Path) -> EyreResult<Decoded> {
    let reader = WavReader::open(path)
        .wrap_err_with(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels == 0 {
        return Err(eyre!("{} has no channels", path.display()));
    }

    let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .wrap_err("failed to read float samples")?,
        (SampleFormat::Int, bits @ 1..=32) => {
            let scale = 1.0 / (1u64 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .wrap_err("failed to read integer samples")?
        }
        (format, bits) => {
            return Err(eyre!(
                "unsupported WAV format in {}: {:?} {} bit",
                path.display(),
                format,
                bits
            ))
        }
    };

    let frames = interleaved.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(frames); num_channels];
    for frame in interleaved.chunks_exact(num_channels) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }

    Ok(Decoded {
        channels,
        sample_rate: spec.sample_rate as f64,
    })
}
