use rayon::prelude::*;

use crate::{
    config::{GenerationSelection, SynthesisConfig},
    fractal::FractalIterator,
    resample::resample,
    wav::{encode, WavBuffer},
    Curve, Result, WaveformSummary,
};

/// Everything produced for one fractal generation.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    /// 1-based iteration count that produced the curve.
    pub generation: usize,
    pub point_count: usize,
    pub samples: Vec<f32>,
    pub wav: WavBuffer,
    pub summary: WaveformSummary,
}

/// Runs initiator and generator through iteration, resampling and encoding.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: SynthesisConfig,
}

impl Pipeline {
    pub fn new(config: SynthesisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Iterates sequentially, then renders the selected generations in
    /// parallel. Outputs are ordered by generation.
    pub fn run(&self, initiator: &Curve, generator: &Curve) -> Result<Vec<GenerationOutput>> {
        let iterator = FractalIterator::new(generator.clone());
        let count = self.config.generations;

        let selected: Vec<(usize, Curve)> = match self.config.selection {
            GenerationSelection::All => iterator
                .generations(initiator, count)?
                .into_iter()
                .enumerate()
                .map(|(index, curve)| (index + 1, curve))
                .collect(),
            GenerationSelection::Final => vec![(count, iterator.nth_generation(initiator, count)?)],
        };

        selected
            .into_par_iter()
            .map(|(generation, curve)| self.render(generation, &curve))
            .collect()
    }

    /// Resamples, encodes and analyses a single curve.
    pub fn render(&self, generation: usize, curve: &Curve) -> Result<GenerationOutput> {
        let samples = resample(curve, self.config.sample_count)?;
        let wav = encode(&samples, self.config.sample_rate, self.config.channels)?;
        let summary = WaveformSummary::analyse(&samples, self.config.sample_rate)?;
        tracing::debug!(
            generation,
            points = curve.len(),
            peak = summary.peak,
            bytes = wav.len(),
            "rendered generation"
        );

        Ok(GenerationOutput {
            generation,
            point_count: curve.len(),
            samples,
            wav,
            summary,
        })
    }
}
