use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{FractalAudioError, Result};

pub const HEADER_LEN: usize = 44;
pub const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;

/// Sample rate and channel layout of a 16-bit PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(FractalAudioError::config("sample rate must be positive"));
        }
        if channels == 0 {
            return Err(FractalAudioError::config("channel count must be positive"));
        }
        let fits = channels
            .checked_mul(BYTES_PER_SAMPLE)
            .and_then(|align| sample_rate.checked_mul(u32::from(align)))
            .is_some();
        if !fits {
            return Err(FractalAudioError::config(format!(
                "{channels} channels at {sample_rate} Hz overflow the WAV header fields"
            )));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn block_align(&self) -> u16 {
        self.channels * BYTES_PER_SAMPLE
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

/// Complete RIFF/WAVE file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBuffer {
    bytes: Vec<u8>,
}

impl WavBuffer {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the PCM payload following the header.
    pub fn data_len(&self) -> usize {
        self.bytes.len() - HEADER_LEN
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

impl AsRef<[u8]> for WavBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Encodes samples as a canonical 16-bit PCM WAV file.
///
/// Every sample is one frame and is written once per channel. Values are not
/// clamped: negatives scale by 32767, the rest by 32768, the product is
/// floored and wraps into 16 bits. NaN encodes as silence.
pub fn encode(samples: &[f32], sample_rate: u32, channels: u16) -> Result<WavBuffer> {
    let format = PcmFormat::new(sample_rate, channels)?;

    let data_len = samples.len() as u64 * u64::from(format.block_align());
    let riff_len = data_len + HEADER_LEN as u64 - 8;
    if riff_len > u64::from(u32::MAX) {
        return Err(FractalAudioError::EncodeOverflow { bytes: data_len });
    }

    let mut bytes = Vec::with_capacity(HEADER_LEN + data_len as usize);

    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(riff_len as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&format.channels.to_le_bytes());
    bytes.extend_from_slice(&format.sample_rate.to_le_bytes());
    bytes.extend_from_slice(&format.byte_rate().to_le_bytes());
    bytes.extend_from_slice(&format.block_align().to_le_bytes());
    bytes.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&(data_len as u32).to_le_bytes());

    for &sample in samples {
        let encoded = sample_to_i16(sample).to_le_bytes();
        for _ in 0..format.channels {
            bytes.extend_from_slice(&encoded);
        }
    }

    Ok(WavBuffer { bytes })
}

/// Converts one float sample to its 16-bit PCM value, wrapping on overflow.
///
/// NaN and infinities encode as 0.
pub fn sample_to_i16(sample: f32) -> i16 {
    let scaled = scale(sample);
    if !scaled.is_finite() {
        return 0;
    }
    // Reduce modulo 2^16 in float space so magnitudes beyond i64 still wrap.
    scaled.floor().rem_euclid(65_536.0) as u16 as i16
}

/// True when the encoded value of `sample` differs from its floored scaled
/// value, i.e. it wraps or is an infinity flushed to 0. NaN is not counted.
pub fn wraps_in_pcm(sample: f32) -> bool {
    let scaled = scale(sample);
    if scaled.is_nan() {
        return false;
    }
    !(f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&scaled.floor())
}

fn scale(sample: f32) -> f64 {
    let value = f64::from(sample);
    if value < 0.0 {
        value * 32767.0
    } else {
        value * 32768.0
    }
}
