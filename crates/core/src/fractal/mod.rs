use crate::{curve::Segment, Curve, FractalAudioError, Point, Result};

/// Replaces every segment of `shape` with a copy of `generator` mapped into
/// that segment's frame.
///
/// Generator x in `[0, 1]` maps onto the segment's x range; generator y is
/// scaled by the segment's y span and centred on its y midpoint. Segments
/// without forward x progress are not subdivided: with no upward y change
/// they are dropped, otherwise their two endpoints are kept verbatim as a
/// vertical jump.
pub fn iterate(shape: &Curve, generator: &Curve) -> Result<Curve> {
    let mut points = Vec::with_capacity(shape.segment_count() * generator.len());

    for segment in shape.segments() {
        let delta_x = segment.delta_x();
        if delta_x <= 0.0 {
            if segment.delta_y() <= 0.0 {
                continue;
            }
            points.push(segment.start);
            points.push(segment.end);
            continue;
        }

        points.extend(
            generator
                .clone_points()
                .into_iter()
                .map(|point| map_into(&segment, point)),
        );
    }

    if points.len() < 2 {
        return Err(FractalAudioError::MalformedCurve {
            points: points.len(),
        });
    }

    Curve::new(points)
}

fn map_into(segment: &Segment, point: Point) -> Point {
    Point {
        x: segment.delta_x() * point.x + segment.start.x,
        y: segment.delta_y() * point.y + segment.y_midpoint(),
    }
}

/// Applies a fixed generator repeatedly, each step consuming the previous
/// step's output.
#[derive(Debug, Clone)]
pub struct FractalIterator {
    generator: Curve,
}

impl FractalIterator {
    pub fn new(generator: Curve) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &Curve {
        &self.generator
    }

    pub fn step(&self, shape: &Curve) -> Result<Curve> {
        iterate(shape, &self.generator)
    }

    /// Runs `count` steps keeping only the latest curve, so peak memory is
    /// two generations rather than all of them. Zero steps returns the
    /// initiator.
    pub fn nth_generation(&self, initiator: &Curve, count: usize) -> Result<Curve> {
        let mut current = initiator.clone();
        for generation in 1..=count {
            current = self.step(&current)?;
            tracing::debug!(generation, points = current.len(), "iterated fractal");
        }
        Ok(current)
    }

    /// Returns the curve after each of `count` steps, first generation first.
    pub fn generations(&self, initiator: &Curve, count: usize) -> Result<Vec<Curve>> {
        let mut curves: Vec<Curve> = Vec::with_capacity(count);
        for generation in 1..=count {
            let next = match curves.last() {
                Some(previous) => self.step(previous)?,
                None => self.step(initiator)?,
            };
            tracing::debug!(generation, points = next.len(), "iterated fractal");
            curves.push(next);
        }
        Ok(curves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(coords: &[(f64, f64)]) -> Curve {
        Curve::from_coords(coords).unwrap()
    }

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert!((actual.x - x).abs() < 1e-12, "x {} != {}", actual.x, x);
        assert!((actual.y - y).abs() < 1e-12, "y {} != {}", actual.y, y);
    }

    #[test]
    fn output_size_is_segments_times_generator_points() {
        let shape = curve(&[(0.0, 0.0), (0.25, 0.5), (0.75, -0.5), (1.0, 0.0)]);
        let generator = curve(&[(0.0, -0.5), (0.25, 0.0), (0.75, 0.25), (1.0, 0.5)]);

        let next = iterate(&shape, &generator).unwrap();
        assert_eq!(next.len(), shape.segment_count() * generator.len());
    }

    #[test]
    fn maps_generator_into_segment_frame() {
        let shape = curve(&[(0.0, -0.5), (1.0, 0.5)]);
        let generator = curve(&[(0.0, 0.0), (0.5, 0.5), (1.0, 0.0)]);

        let next = iterate(&shape, &generator).unwrap();
        // delta_y = 1, midpoint = 0.
        assert_point(next.points()[0], 0.0, 0.0);
        assert_point(next.points()[1], 0.5, 0.5);
        assert_point(next.points()[2], 1.0, 0.0);
    }

    #[test]
    fn hand_computed_offset_segment() {
        let shape = curve(&[(0.2, 0.1), (0.6, -0.3)]);
        let generator = curve(&[(0.0, -0.5), (0.25, 0.2), (1.0, 0.5)]);

        let next = iterate(&shape, &generator).unwrap();
        // delta_x = 0.4, delta_y = -0.4, x offset = 0.2, y offset = -0.1.
        assert_point(next.points()[0], 0.2, 0.1);
        assert_point(next.points()[1], 0.3, -0.18);
        assert_point(next.points()[2], 0.6, -0.3);
    }

    #[test]
    fn zero_width_flat_segment_contributes_nothing() {
        let shape = curve(&[(0.0, 0.0), (0.2, 0.1), (0.2, 0.1), (1.0, 0.0)]);
        let generator = curve(&[(0.0, 0.0), (0.5, 0.25), (1.0, 0.0)]);

        let next = iterate(&shape, &generator).unwrap();
        assert_eq!(next.len(), 2 * generator.len());
    }

    #[test]
    fn zero_width_rising_segment_keeps_literal_endpoints() {
        let shape = curve(&[(0.0, 0.0), (0.2, 0.0), (0.2, 0.5), (1.0, 0.0)]);
        let generator = curve(&[(0.0, 0.0), (0.5, 0.25), (1.0, 0.0)]);

        let next = iterate(&shape, &generator).unwrap();
        assert_eq!(next.len(), 2 * generator.len() + 2);
        assert_eq!(next.points()[3], Point::new(0.2, 0.0));
        assert_eq!(next.points()[4], Point::new(0.2, 0.5));
    }

    #[test]
    fn zero_width_falling_segment_is_dropped() {
        let shape = curve(&[(0.0, 0.0), (0.5, 0.4), (0.5, -0.4), (1.0, 0.0)]);
        let generator = curve(&[(0.0, 0.0), (1.0, 0.0)]);

        let next = iterate(&shape, &generator).unwrap();
        assert_eq!(next.len(), 4);
    }

    #[test]
    fn positive_width_flat_segment_is_subdivided() {
        let shape = curve(&[(0.0, 0.2), (1.0, 0.2)]);
        let generator = curve(&[(0.0, -0.5), (0.5, 0.5), (1.0, 0.0)]);

        let next = iterate(&shape, &generator).unwrap();
        assert_eq!(next.len(), 3);
        assert!(next.ys().iter().all(|y| (y - 0.2).abs() < 1e-12));
    }

    #[test]
    fn fully_degenerate_shape_is_rejected() {
        let shape = curve(&[(0.3, 0.1), (0.3, 0.1)]);
        let generator = curve(&[(0.0, 0.0), (1.0, 0.0)]);

        assert!(matches!(
            iterate(&shape, &generator),
            Err(FractalAudioError::MalformedCurve { points: 0 })
        ));
    }

    #[test]
    fn generator_is_left_untouched() {
        let shape = curve(&[(0.0, 0.0), (0.5, 0.5), (1.0, -0.5)]);
        let generator = curve(&[(0.0, -0.5), (0.5, 0.5), (1.0, 0.25)]);
        let before = generator.clone();

        iterate(&shape, &generator).unwrap();
        assert_eq!(generator, before);
    }

    #[test]
    fn generations_feed_forward() {
        let initiator = curve(&[(0.0, 0.0), (0.5, 0.5), (1.0, 0.0)]);
        let generator = curve(&[(0.0, 0.0), (0.3, 0.2), (0.7, -0.2), (1.0, 0.0)]);
        let iterator = FractalIterator::new(generator.clone());

        let curves = iterator.generations(&initiator, 3).unwrap();
        assert_eq!(curves.len(), 3);
        assert_eq!(curves[0].len(), 2 * 4);
        // The repeated join point at x = 0.5 forms a zero-length segment
        // that the second step drops, leaving 6 of 7 segments.
        assert_eq!(curves[1].len(), 6 * 4);
        assert_eq!(curves[1], iterate(&curves[0], &generator).unwrap());
        assert_eq!(curves[2], iterate(&curves[1], &generator).unwrap());
    }

    #[test]
    fn nth_generation_matches_last_of_all_generations() {
        let initiator = curve(&[(0.0, 0.0), (0.4, -0.3), (1.0, 0.2)]);
        let generator = curve(&[(0.0, -0.5), (0.6, 0.3), (1.0, 0.5)]);
        let iterator = FractalIterator::new(generator);

        let all = iterator.generations(&initiator, 4).unwrap();
        let last = iterator.nth_generation(&initiator, 4).unwrap();
        assert_eq!(Some(&last), all.last());
        assert_eq!(iterator.nth_generation(&initiator, 0).unwrap(), initiator);
    }
}
