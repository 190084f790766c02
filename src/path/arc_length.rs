//! Arc-length resampling of single Bézier segments.
//!
//! A segment is walked in small parameter steps and a sample is dropped every
//! time the accumulated polyline distance reaches the spacing. The sample is
//! placed by backing up linearly along the last mini-segment, so the curve is
//! never re-evaluated between steps.

use bevy::prelude::*;

use crate::bezier::{evaluate_cubic, first_derivative_cubic, normal_at};

/// Number of polyline steps used by distance queries.
pub const DEFAULT_DISTANCE_SAMPLES: usize = 64;

/// One resampled point before banking is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Position on (or extremely close to) the curve.
    pub position: Vec3,
    /// Unit tangent.
    pub direction: Vec3,
    /// Unbanked planar normal.
    pub normal: Vec3,
}

/// Estimate how many parameter steps to take across a segment.
///
/// The estimate is the chord length plus half the control-net length, padded
/// by `resolution * 10`.
pub fn estimate_divisions(segment: &[Vec3; 4], resolution: f32) -> usize {
    let control_net_length = segment[0].distance(segment[1])
        + segment[1].distance(segment[2])
        + segment[2].distance(segment[3]);
    let estimated_curve_length = segment[0].distance(segment[3]) + control_net_length / 2.0;

    (estimated_curve_length + resolution * 10.0).ceil().max(1.0) as usize
}

/// Resample one segment at (approximately) uniform arc-length `spacing`.
///
/// Distance is measured from `previous`, normally the last sample of the
/// preceding segment. When `emit_start` is set, `previous` itself becomes the
/// first sample (used for the path start).
///
/// The walk keeps stepping while `t <= 1`, so its last step evaluates slightly
/// past the end of the segment.
pub fn resample_segment(
    segment: &[Vec3; 4],
    previous: Vec3,
    emit_start: bool,
    spacing: f32,
    resolution: f32,
) -> Vec<RawSample> {
    let [p0, p1, p2, p3] = *segment;
    let divisions = estimate_divisions(segment, resolution);
    let step = 1.0 / divisions as f32;

    let mut samples = Vec::new();
    let mut last_direction = Vec3::Z;
    let mut last_normal = Vec3::Y;

    if emit_start {
        last_direction = first_derivative_cubic(p0, p1, p2, p3, 0.0)
            .try_normalize()
            .unwrap_or(last_direction);
        last_normal = normal_at(p0, p1, p2, p3, 0.0).unwrap_or(last_normal);
        samples.push(RawSample {
            position: previous,
            direction: last_direction,
            normal: last_normal,
        });
    }

    let mut previous_point = previous;
    let mut distance_since_last = 0.0;
    let mut t = 0.0;

    while t <= 1.0 {
        t += step;
        let point_on_curve = evaluate_cubic(p0, p1, p2, p3, t);
        distance_since_last += previous_point.distance(point_on_curve);

        while distance_since_last >= spacing {
            let overshoot = distance_since_last - spacing;
            let position =
                point_on_curve + (previous_point - point_on_curve).normalize_or_zero() * overshoot;

            // Coincident control points give a zero tangent; keep the last frame.
            last_direction = first_derivative_cubic(p0, p1, p2, p3, t)
                .try_normalize()
                .unwrap_or(last_direction);
            last_normal = normal_at(p0, p1, p2, p3, t).unwrap_or(last_normal);

            samples.push(RawSample {
                position,
                direction: last_direction,
                normal: last_normal,
            });

            distance_since_last = overshoot;
            previous_point = position;
        }

        previous_point = point_on_curve;
    }

    samples
}

/// Approximate the length of a segment with a fixed number of chords.
pub fn approximate_segment_length(segment: &[Vec3; 4], samples: usize) -> f32 {
    let [p0, p1, p2, p3] = *segment;
    let samples = samples.max(1);
    let mut length = 0.0;
    let mut prev_point = p0;

    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        let point = evaluate_cubic(p0, p1, p2, p3, t);
        length += point.distance(prev_point);
        prev_point = point;
    }

    length
}

/// Approximate distance from `point` to a segment's curve.
///
/// The curve is flattened into `samples` chords and the closest chord wins.
pub fn distance_to_segment(segment: &[Vec3; 4], point: Vec3, samples: usize) -> f32 {
    let [p0, p1, p2, p3] = *segment;
    let samples = samples.max(1);
    let mut closest = f32::INFINITY;
    let mut prev_point = p0;

    for i in 1..=samples {
        let t = i as f32 / samples as f32;
        let next = evaluate_cubic(p0, p1, p2, p3, t);
        closest = closest.min(distance_to_chord(point, prev_point, next));
        prev_point = next;
    }

    closest
}

fn distance_to_chord(point: Vec3, start: Vec3, end: Vec3) -> f32 {
    let chord = end - start;
    let length_squared = chord.length_squared();
    if length_squared < 1e-12 {
        return point.distance(start);
    }
    let t = ((point - start).dot(chord) / length_squared).clamp(0.0, 1.0);
    point.distance(start + chord * t)
}
