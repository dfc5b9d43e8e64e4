//! Core library that turns linear fractals into audio.
//!
//! A fractal is grown by repeatedly substituting a generator curve into every
//! segment of an initiator curve. The final curve is resampled into a fixed
//! rate waveform and encoded as a 16-bit PCM WAV file. Each module owns one
//! stage of that flow; [`pipeline`] chains them together.

pub mod analysis;
pub mod config;
pub mod curve;
pub mod error;
pub mod fractal;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod resample;
pub mod wav;

pub use analysis::WaveformSummary;
pub use config::{
    AppConfig, CurveConfig, CurveSource, GenerationSelection, ResolvedCurves, SynthesisConfig,
};
pub use curve::{Curve, Point, Segment};
pub use error::{FractalAudioError, Result};
pub use fractal::{iterate, FractalIterator};
pub use pipeline::{GenerationOutput, Pipeline};
pub use record::{Recorder, RecordingSettings, RenderManifest};
pub use render::PlotSettings;
pub use resample::resample;
pub use wav::{encode, PcmFormat, WavBuffer};
