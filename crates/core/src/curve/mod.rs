use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{FractalAudioError, Result};

/// A single vertex of a piecewise-linear curve.
///
/// Coordinates are conceptually `x` in `[0, 1]` and `y` in `[-0.5, 0.5]`,
/// but nothing is checked here; see [`Curve::validate_unit_domain`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pair of consecutive curve points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn delta_x(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn delta_y(&self) -> f64 {
        self.end.y - self.start.y
    }

    /// Y value halfway between both endpoints.
    pub fn y_midpoint(&self) -> f64 {
        (self.end.y + self.start.y) / 2.0
    }
}

/// Ordered list of at least two points describing a piecewise-linear curve.
///
/// Curves are never mutated once built; every fractal step allocates a new
/// one. Deserialisation goes through [`Curve::new`] so a curve read from a
/// config file carries the same guarantees as one built in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Curve {
    points: Vec<Point>,
}

impl Curve {
    /// Builds a curve, rejecting fewer than two points or non-finite values.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            return Err(FractalAudioError::MalformedCurve {
                points: points.len(),
            });
        }

        if let Some((index, point)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(FractalAudioError::InvalidPoint {
                index,
                x: point.x,
                y: point.y,
            });
        }

        Ok(Self { points })
    }

    /// Convenience constructor from `(x, y)` tuples.
    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Draws a random curve spanning `x = 0` to `x = 1`.
    ///
    /// Interior x positions are uniform draws sorted ascending, every y is an
    /// independent draw from `[-0.5, 0.5)`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, point_count: usize) -> Result<Self> {
        if point_count < 2 {
            return Err(FractalAudioError::MalformedCurve {
                points: point_count,
            });
        }

        let mut xs = Vec::with_capacity(point_count);
        xs.push(0.0);
        let mut interior: Vec<f64> = (0..point_count - 2).map(|_| rng.gen::<f64>()).collect();
        interior.sort_by(f64::total_cmp);
        xs.extend(interior);
        xs.push(1.0);

        let points = xs
            .into_iter()
            .map(|x| Point::new(x, rng.gen::<f64>() - 0.5))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A constructed curve is never empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// The `n - 1` consecutive point pairs, in curve order.
    pub fn segments(&self) -> impl ExactSizeIterator<Item = Segment> + '_ {
        self.points.windows(2).map(|pair| Segment {
            start: pair[0],
            end: pair[1],
        })
    }

    /// Fresh copy of the point list, owned by the caller.
    pub fn clone_points(&self) -> Vec<Point> {
        self.points.clone()
    }

    /// Checks the contract expected of initiator and generator curves:
    /// non-decreasing x within `[0, 1]` and y within `[-0.5, 0.5]`.
    pub fn validate_unit_domain(&self) -> Result<()> {
        for (index, point) in self.points.iter().enumerate() {
            if !(0.0..=1.0).contains(&point.x) || !(-0.5..=0.5).contains(&point.y) {
                return Err(FractalAudioError::OutOfDomain {
                    index,
                    x: point.x,
                    y: point.y,
                });
            }
        }
        check_non_decreasing(&self.points)
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }
}

fn check_non_decreasing(points: &[Point]) -> Result<()> {
    match points.windows(2).position(|pair| pair[1].x < pair[0].x) {
        Some(position) => Err(FractalAudioError::NonMonotonic {
            index: position + 1,
        }),
        None => Ok(()),
    }
}

impl TryFrom<Vec<Point>> for Curve {
    type Error = FractalAudioError;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<Curve> for Vec<Point> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}
