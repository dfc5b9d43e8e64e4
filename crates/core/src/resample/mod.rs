use crate::{Curve, FractalAudioError, Result};

/// Backward x steps up to this size are rounding noise from repeated affine
/// remapping and are tolerated.
const X_TOLERANCE: f64 = 1e-9;

/// Converts a curve into `sample_count` evenly spaced amplitude samples.
///
/// Sample `i` sits at `x = i / sample_count`. The curve is walked in a single
/// forward pass; between two points with distinct x the value is
/// `2 * y_left * w_left + 2 * y_right * w_right`, and where both points share
/// an x the value is `y_left + y_right`. Both forms are part of the sound and
/// are not normalised.
///
/// Returns [`FractalAudioError::NonMonotonic`] if x decreases by more than
/// rounding noise and [`FractalAudioError::ResampleRange`] if the curve stops
/// short of the last sample position.
pub fn resample(curve: &Curve, sample_count: usize) -> Result<Vec<f32>> {
    let points = curve.points();
    if let Some(position) = points
        .windows(2)
        .position(|pair| pair[1].x < pair[0].x - X_TOLERANCE)
    {
        return Err(FractalAudioError::NonMonotonic {
            index: position + 1,
        });
    }

    let mut samples = Vec::with_capacity(sample_count);
    let mut upper = 1;

    for i in 0..sample_count {
        let target = i as f64 / sample_count as f64;
        while upper < points.len() && points[upper].x < target {
            upper += 1;
        }
        if upper == points.len() {
            return Err(FractalAudioError::ResampleRange {
                target,
                last_x: points[points.len() - 1].x,
            });
        }

        let (left, right) = (points[upper - 1], points[upper]);
        let dx = right.x - left.x;

        let value = if dx == 0.0 {
            left.y + right.y
        } else {
            let w_left = (right.x - target) / dx;
            let w_right = (target - left.x) / dx;
            zero_if_nan(2.0 * left.y * w_left) + zero_if_nan(2.0 * right.y * w_right)
        };

        samples.push(value as f32);
    }

    Ok(samples)
}

fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}
