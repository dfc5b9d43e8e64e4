/// Result alias that carries the custom [`FractalAudioError`] type.
pub type Result<T> = std::result::Result<T, FractalAudioError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum FractalAudioError {
    /// A curve needs at least two points to form a segment.
    #[error("curve must contain at least two points, got {points}")]
    MalformedCurve { points: usize },
    /// A coordinate was NaN or infinite.
    #[error("point {index} has a non-finite coordinate ({x}, {y})")]
    InvalidPoint { index: usize, x: f64, y: f64 },
    /// A template curve point lies outside x in [0, 1], y in [-0.5, 0.5].
    #[error("point {index} at ({x}, {y}) lies outside the unit domain")]
    OutOfDomain { index: usize, x: f64, y: f64 },
    /// X values must never decrease along a curve.
    #[error("x value at point {index} is smaller than the one before it")]
    NonMonotonic { index: usize },
    /// The curve ends before the last position the resampler has to cover.
    #[error("curve ends at x = {last_x} but sample position {target} must be covered")]
    ResampleRange { target: f64, last_x: f64 },
    /// The PCM payload does not fit the 32-bit RIFF size fields.
    #[error("wav payload of {bytes} bytes exceeds the RIFF size limit")]
    EncodeOverflow { bytes: u64 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("fft failed: {0}")]
    Fft(#[from] realfft::FftError),
}

impl FractalAudioError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
