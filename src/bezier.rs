//! Stateless quadratic and cubic Bézier evaluation.
//!
//! None of these functions clamp `t`. Values outside `[0, 1]` extrapolate the
//! curve, which the resampler relies on for its final step past `t = 1`.

use bevy::prelude::*;

/// Evaluate a quadratic Bézier with two nested lerps.
pub fn evaluate_quadratic(a: Vec3, b: Vec3, c: Vec3, t: f32) -> Vec3 {
    let p0 = a.lerp(b, t);
    let p1 = b.lerp(c, t);
    p0.lerp(p1, t)
}

/// Evaluate a cubic Bézier (de Casteljau via two quadratic evaluations).
pub fn evaluate_cubic(a: Vec3, b: Vec3, c: Vec3, d: Vec3, t: f32) -> Vec3 {
    let p0 = evaluate_quadratic(a, b, c, t);
    let p1 = evaluate_quadratic(b, c, d, t);
    p0.lerp(p1, t)
}

/// First derivative of a quadratic Bézier.
pub fn first_derivative_quadratic(p0: Vec3, p1: Vec3, p2: Vec3, t: f32) -> Vec3 {
    2.0 * (1.0 - t) * (p1 - p0) + 2.0 * t * (p2 - p1)
}

/// First derivative of a cubic Bézier.
pub fn first_derivative_cubic(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let mt = 1.0 - t;
    (p1 - p0) * 3.0 * mt * mt + (p2 - p1) * 6.0 * mt * t + (p3 - p2) * 3.0 * t * t
}

/// Planar normal of a cubic Bézier at `t`.
///
/// Only the XY projection of the derivative is used: the result is that
/// projection rotated by 90 degrees, `(-dy, dx, 0) / |(dx, dy)|`. For a curve
/// lying in the XZ ground plane this degenerates to `±Y`. Returns `None` when
/// the projected derivative has zero length.
pub fn normal_at(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Option<Vec3> {
    let derivative = first_derivative_cubic(p0, p1, p2, p3, t);
    let q = (derivative.x * derivative.x + derivative.y * derivative.y).sqrt();
    if q <= f32::EPSILON {
        return None;
    }

    Some(Vec3::new(-derivative.y / q, derivative.x / q, 0.0))
}
