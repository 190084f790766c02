use bevy::prelude::*;

/// Fraction of a local banking angle applied at the rotated anchor.
///
/// Banking ramps from this fraction at the anchor down to zero at the far end
/// of each adjacent segment.
pub const MAX_ANGLE_CHANGE: f32 = 0.5;

/// Smallest accepted sample spacing.
///
/// Anything finer would produce millions of samples per unit of path.
pub const MIN_SPACING: f32 = 1e-3;

/// How moving one control point affects the opposite control point of the
/// same anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Default)]
pub enum ControlMode {
    /// Control points move independently.
    #[default]
    Free,
    /// The opposite control point stays collinear through the anchor but keeps
    /// its own distance.
    Aligned,
    /// The opposite control point is the exact reflection through the anchor.
    Mirrored,
}

impl ControlMode {
    /// Cycle to the next mode.
    pub fn next(self) -> Self {
        match self {
            Self::Free => Self::Aligned,
            Self::Aligned => Self::Mirrored,
            Self::Mirrored => Self::Free,
        }
    }

    /// Display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Aligned => "Aligned",
            Self::Mirrored => "Mirrored",
        }
    }
}

/// Plane the control polygon is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Default)]
pub enum AxisConstraint {
    /// Free 3D editing.
    #[default]
    Free,
    /// Locked to the XY plane (`z = 0`).
    Xy,
    /// Locked to the XZ ground plane (`y = 0`).
    Xz,
}

impl AxisConstraint {
    /// Project a point onto the constrained plane.
    pub fn apply(&self, point: Vec3) -> Vec3 {
        match self {
            Self::Free => point,
            Self::Xy => Vec3::new(point.x, point.y, 0.0),
            Self::Xz => Vec3::new(point.x, 0.0, point.z),
        }
    }
}

/// Banking ramp of one segment.
///
/// Sample `i` of `n` is banked by `amount * remap(i / n, 0, 1, from, to)`
/// degrees on top of the path's global normal angle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct Banking {
    /// Banking angle in degrees.
    pub amount: f32,
    /// Ramp factor at the start of the segment.
    pub from: f32,
    /// Ramp factor at the end of the segment.
    pub to: f32,
}

impl Banking {
    /// No banking.
    pub const NONE: Self = Self {
        amount: 0.0,
        from: 0.0,
        to: 0.0,
    };

    /// Banking that eases out from the segment start.
    pub fn easing_out(amount: f32) -> Self {
        Self {
            amount,
            from: MAX_ANGLE_CHANGE,
            to: 0.0,
        }
    }

    /// Banking that eases in toward the segment end.
    pub fn easing_in(amount: f32) -> Self {
        Self {
            amount,
            from: 0.0,
            to: MAX_ANGLE_CHANGE,
        }
    }

    /// Local banking angle of sample `index` out of `count`.
    pub fn rotation_at(&self, index: usize, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        let completion = index as f32 / count as f32;
        self.amount * crate::geometry::remap(completion, 0.0, 1.0, self.from, self.to)
    }
}

/// Tunable parameters of a [`BezierPath`](super::BezierPath).
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Default)]
pub struct PathSettings {
    /// Arc-length distance between consecutive samples, at least
    /// [`MIN_SPACING`].
    pub spacing: f32,
    /// Extra subdivision density used while walking each segment.
    pub resolution: f32,
    /// Behaviour of the opposite control point when one is moved.
    pub control_mode: ControlMode,
    /// Derive control points from neighbouring anchors instead of editing them.
    pub auto_set_control_points: bool,
    /// Plane the control polygon is locked to.
    pub axis_constraint: AxisConstraint,
    /// Banking applied to every sample, in degrees.
    pub global_normal_angle: f32,
    /// Maximum angle (radians) a normal may turn per update.
    pub max_radians_delta: f32,
    /// Maximum length change of a normal per update.
    pub max_magnitude_delta: f32,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            spacing: 1.0,
            resolution: 1.0,
            control_mode: ControlMode::Free,
            auto_set_control_points: false,
            axis_constraint: AxisConstraint::Free,
            global_normal_angle: 0.0,
            max_radians_delta: 0.25,
            max_magnitude_delta: 0.0,
        }
    }
}

impl PathSettings {
    /// Set the sample spacing.
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the subdivision resolution.
    pub fn with_resolution(mut self, resolution: f32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the control point mode.
    pub fn with_control_mode(mut self, mode: ControlMode) -> Self {
        self.control_mode = mode;
        self
    }

    /// Enable or disable automatic control points.
    pub fn with_auto_set_control_points(mut self, auto: bool) -> Self {
        self.auto_set_control_points = auto;
        self
    }

    /// Set the axis constraint.
    pub fn with_axis_constraint(mut self, constraint: AxisConstraint) -> Self {
        self.axis_constraint = constraint;
        self
    }

    /// Set the global banking angle in degrees.
    pub fn with_global_normal_angle(mut self, degrees: f32) -> Self {
        self.global_normal_angle = degrees;
        self
    }

    /// Set the per-update rotation limits for normals.
    pub fn with_rotation_limits(mut self, max_radians_delta: f32, max_magnitude_delta: f32) -> Self {
        self.max_radians_delta = max_radians_delta.max(0.0);
        self.max_magnitude_delta = max_magnitude_delta.max(0.0);
        self
    }
}
