use std::f32::consts::PI;

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};

use crate::{wav::wraps_in_pcm, FractalAudioError, Result};

/// Level and spectrum statistics for a rendered waveform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveformSummary {
    pub sample_rate: u32,
    pub sample_count: usize,
    pub duration_seconds: f32,
    pub peak: f32,
    pub rms: f32,
    /// Samples that wrap when encoded to 16-bit PCM.
    pub out_of_range: usize,
    /// Magnitude-weighted mean frequency of the Hann-windowed buffer.
    pub spectral_centroid_hz: f32,
}

impl WaveformSummary {
    pub fn analyse(samples: &[f32], sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(FractalAudioError::config("sample rate must be positive"));
        }

        let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        let out_of_range = samples.iter().filter(|s| wraps_in_pcm(**s)).count();

        Ok(Self {
            sample_rate,
            sample_count: samples.len(),
            duration_seconds: samples.len() as f32 / sample_rate as f32,
            peak,
            rms: compute_rms(samples),
            out_of_range,
            spectral_centroid_hz: spectral_centroid(samples, sample_rate)?,
        })
    }

    /// True when every sample survives 16-bit encoding without wrapping.
    pub fn fits_pcm_range(&self) -> bool {
        self.out_of_range == 0
    }
}

fn compute_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|sample| sample * sample).sum();
    (sum / samples.len() as f32).sqrt()
}

fn spectral_centroid(samples: &[f32], sample_rate: u32) -> Result<f32> {
    let len = samples.len();
    if len < 2 {
        return Ok(0.0);
    }

    let mut planner = RealFftPlanner::<f32>::new();
    let plan = planner.plan_fft_forward(len);
    let mut input = plan.make_input_vec();
    let mut spectrum = plan.make_output_vec();
    let mut scratch = plan.make_scratch_vec();

    for (index, value) in samples.iter().enumerate() {
        input[index] = *value * hann_value(index, len);
    }

    plan.process_with_scratch(&mut input, &mut spectrum, &mut scratch)?;

    let bin_hz = sample_rate as f32 / len as f32;
    let mut magnitude_sum = 0.0;
    let mut weighted_sum = 0.0;
    for (i, bin) in spectrum.iter().enumerate() {
        let magnitude = bin.norm();
        magnitude_sum += magnitude;
        weighted_sum += magnitude * (i as f32 * bin_hz);
    }

    if magnitude_sum <= f32::EPSILON {
        Ok(0.0)
    } else {
        Ok(weighted_sum / magnitude_sum)
    }
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }

    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_has_no_energy() {
        let summary = WaveformSummary::analyse(&[0.0; 1024], 48_000).unwrap();

        assert_eq!(summary.peak, 0.0);
        assert_eq!(summary.rms, 0.0);
        assert_eq!(summary.spectral_centroid_hz, 0.0);
        assert!(summary.fits_pcm_range());
        assert!((summary.duration_seconds - 1024.0 / 48_000.0).abs() < 1e-6);
    }

    #[test]
    fn centroid_tracks_a_sine() {
        let sample_rate = 8_000;
        let samples: Vec<f32> = (0..4_000)
            .map(|i| (2.0 * PI * 1_000.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();

        let summary = WaveformSummary::analyse(&samples, sample_rate).unwrap();
        assert!((summary.spectral_centroid_hz - 1_000.0).abs() < 50.0);
        assert!((summary.peak - 0.5).abs() < 1e-3);
        assert!((summary.rms - 0.5 / 2.0_f32.sqrt()).abs() < 1e-2);
    }

    #[test]
    fn counts_samples_that_would_wrap() {
        // 1.0 scales to 32768, one past i16::MAX.
        let summary = WaveformSummary::analyse(&[0.2, 1.2, -1.4, 1.0, -1.0], 100).unwrap();
        assert_eq!(summary.out_of_range, 3);
        assert!(!summary.fits_pcm_range());
        assert!((summary.peak - 1.4).abs() < 1e-6);
    }

    #[test]
    fn full_scale_positive_sample_does_not_fit() {
        let summary = WaveformSummary::analyse(&[1.0], 100).unwrap();
        assert!(!summary.fits_pcm_range());
        assert!(WaveformSummary::analyse(&[0.999, -1.0], 100)
            .unwrap()
            .fits_pcm_range());
    }

    #[test]
    fn empty_buffer_is_summarised() {
        let summary = WaveformSummary::analyse(&[], 44_100).unwrap();
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.rms, 0.0);
    }
}
