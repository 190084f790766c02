//! Geometry utilities for path sampling and ribbon building.

use bevy::prelude::*;

/// Tolerance used by the rotate/move-towards helpers.
const VECTOR_EPSILON: f32 = 1e-5;

/// Up vector tilted by `degrees` around the X axis.
///
/// This is the target orientation for a sample normal banked by `degrees`.
pub fn banked_up(degrees: f32) -> Vec3 {
    Quat::from_rotation_x(degrees.to_radians()) * Vec3::Y
}

/// Linearly map `value` from `[from_min, from_max]` onto `[to_min, to_max]`.
pub fn remap(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    (value - from_min) / (from_max - from_min) * (to_max - to_min) + to_min
}

/// Move `current` toward `target` by at most `max_distance_delta`.
pub fn move_towards(current: Vec3, target: Vec3, max_distance_delta: f32) -> Vec3 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_distance_delta || distance < VECTOR_EPSILON {
        return target;
    }
    current + to_target / distance * max_distance_delta
}

fn clamped_move(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta > 0.0 {
        current + delta.min(max_delta)
    } else {
        current - (-delta).min(max_delta)
    }
}

/// Rotate `current` toward `target`, limited per call.
///
/// The direction turns by at most `max_radians_delta` and the length changes
/// by at most `max_magnitude_delta`. The rotation never passes the target
/// direction, so repeated calls converge monotonically.
pub fn rotate_towards(
    current: Vec3,
    target: Vec3,
    max_radians_delta: f32,
    max_magnitude_delta: f32,
) -> Vec3 {
    let current_length = current.length();
    let target_length = target.length();

    if current_length <= VECTOR_EPSILON || target_length <= VECTOR_EPSILON {
        return move_towards(current, target, max_magnitude_delta);
    }

    let from = current / current_length;
    let to = target / target_length;
    let dot = from.dot(to);

    if dot > 1.0 - VECTOR_EPSILON {
        return move_towards(current, target, max_magnitude_delta);
    }

    let (axis, angle) = if dot < -1.0 + VECTOR_EPSILON {
        (from.any_orthonormal_vector(), max_radians_delta)
    } else {
        (
            from.cross(to).normalize(),
            max_radians_delta.min(dot.clamp(-1.0, 1.0).acos()),
        )
    };

    let length = clamped_move(current_length, target_length, max_magnitude_delta);
    Quat::from_axis_angle(axis, angle) * from * length
}

/// Cross-section frame of a ribbon at one sample.
///
/// Unlike an orthonormal basis, `up` is kept exactly as supplied (the banked
/// sample normal); only `left` is derived from it.
#[derive(Debug, Clone, Copy)]
pub struct RibbonFrame {
    /// Direction of travel.
    pub forward: Vec3,
    /// Up direction of the ribbon surface.
    pub up: Vec3,
    /// `forward × up`, normalized.
    pub left: Vec3,
}

impl RibbonFrame {
    /// Build a frame from a travel direction and an up vector.
    ///
    /// Falls back to the X axis when `forward` is parallel to `up`.
    pub fn new(forward: Vec3, up: Vec3) -> Self {
        let forward = forward.normalize_or_zero();
        let left = forward.cross(up).normalize_or_zero();
        let left = if left.length_squared() < 0.001 {
            Vec3::X
        } else {
            left
        };

        Self { forward, up, left }
    }

    /// World offset of a cross-section point `(x along left, y along up)`.
    pub fn profile_offset(&self, left: f32, up: f32) -> Vec3 {
        self.left * left + self.up * up
    }
}
