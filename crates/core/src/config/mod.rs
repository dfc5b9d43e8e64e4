use std::{ops::RangeInclusive, path::Path};

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{wav::PcmFormat, Curve, FractalAudioError, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub synthesis: SynthesisConfig,
    pub curves: CurveConfig,
}

impl AppConfig {
    /// Reads a JSON config file. Missing sections fall back to defaults.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.synthesis.validate()?;
        self.curves.validate()
    }
}

/// Which generations the pipeline renders to audio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSelection {
    #[default]
    Final,
    All,
}

/// Parameters of the iterate, resample and encode stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub generations: usize,
    pub sample_count: usize,
    pub sample_rate: u32,
    pub channels: u16,
    pub selection: GenerationSelection,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            generations: 8,
            sample_count: 44_100,
            sample_rate: 44_100,
            channels: 1,
            selection: GenerationSelection::Final,
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.generations == 0 {
            return Err(FractalAudioError::config("generation count must be positive"));
        }
        if self.sample_count == 0 {
            return Err(FractalAudioError::config("sample count must be positive"));
        }
        self.format().map(|_| ())
    }

    pub fn format(&self) -> Result<PcmFormat> {
        PcmFormat::new(self.sample_rate, self.channels)
    }
}

/// Where a curve comes from: literal points or a random draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveSource {
    Points(Curve),
    Random { min_points: usize, max_points: usize },
}

impl CurveSource {
    pub fn random(points: RangeInclusive<usize>) -> Self {
        Self::Random {
            min_points: *points.start(),
            max_points: *points.end(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Points(curve) => curve.validate_unit_domain(),
            Self::Random {
                min_points,
                max_points,
            } => {
                if *min_points < 2 {
                    return Err(FractalAudioError::config(
                        "random curves need at least two points",
                    ));
                }
                if min_points > max_points {
                    return Err(FractalAudioError::config(format!(
                        "random point range {min_points}..={max_points} is empty"
                    )));
                }
                Ok(())
            }
        }
    }

    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Curve> {
        self.validate()?;
        match self {
            Self::Points(curve) => Ok(curve.clone()),
            Self::Random {
                min_points,
                max_points,
            } => {
                let count = rng.gen_range(*min_points..=*max_points);
                Curve::random(rng, count)
            }
        }
    }
}

/// Initiator and generator sources plus the seed used for random ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub initiator: CurveSource,
    pub generator: CurveSource,
    pub seed: Option<u64>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            initiator: CurveSource::random(2..=5),
            generator: CurveSource::random(3..=7),
            seed: None,
        }
    }
}

impl CurveConfig {
    pub fn validate(&self) -> Result<()> {
        self.initiator.validate()?;
        self.generator.validate()
    }

    /// Seed to use for this run: the configured one or a fresh draw.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::thread_rng().gen())
    }

    /// Produces the concrete `(initiator, generator)` pair.
    ///
    /// The generator is drawn before the initiator so a seed always yields the
    /// same generator regardless of how the initiator is configured.
    pub fn resolve(&self, seed: u64) -> Result<ResolvedCurves> {
        let mut rng = StdRng::seed_from_u64(seed);
        let generator = self.generator.resolve(&mut rng)?;
        let initiator = self.initiator.resolve(&mut rng)?;
        Ok(ResolvedCurves {
            seed,
            initiator,
            generator,
        })
    }
}

/// Curves chosen for one run, with the seed that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCurves {
    pub seed: u64,
    pub initiator: Curve,
    pub generator: Curve,
}
