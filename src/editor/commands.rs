use bevy::prelude::*;

use crate::error::PathResult;
use crate::path::{AxisConstraint, BezierPath, ControlMode};

/// An edit a front end can request on a [`BezierPath`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Move a control polygon point to a new position.
    MovePoint { index: usize, position: Vec3 },
    /// Append a segment ending at an anchor position.
    AddSegment { anchor: Vec3 },
    /// Insert an anchor into a segment.
    SplitSegment { anchor: Vec3, segment: usize },
    /// Remove an anchor and its control points.
    DeleteSegment { anchor: usize },
    /// Open a closed path or close an open one.
    ToggleClosed,
    /// Open or close the path.
    SetClosed(bool),
    /// Bank the path around an anchor, in degrees.
    RotateLocalNormals { anchor: usize, angle: f32 },
    /// Bank the whole path, in degrees.
    SetGlobalNormalAngle(f32),
    /// Change the sample spacing.
    SetSpacing(f32),
    /// Change how control points constrain each other.
    SetControlMode(ControlMode),
    /// Switch to the next control mode (free, aligned, mirrored).
    CycleControlMode,
    /// Enable or disable automatic control points.
    SetAutoSetControlPoints(bool),
    /// Lock the path to a plane.
    SetAxisConstraint(AxisConstraint),
    /// Move the whole path.
    Translate(Vec3),
}

impl PathCommand {
    /// Run the command against a path.
    pub fn apply(self, path: &mut BezierPath) -> PathResult<()> {
        match self {
            Self::MovePoint { index, position } => path.move_point(index, position),
            Self::AddSegment { anchor } => path.add_segment(anchor),
            Self::SplitSegment { anchor, segment } => path.split_segment(anchor, segment),
            Self::DeleteSegment { anchor } => path.delete_segment(anchor),
            Self::ToggleClosed => {
                path.toggle_closed();
                Ok(())
            }
            Self::SetClosed(closed) => {
                path.set_closed(closed);
                Ok(())
            }
            Self::RotateLocalNormals { anchor, angle } => path.rotate_local_normals(anchor, angle),
            Self::SetGlobalNormalAngle(degrees) => {
                path.set_global_normal_angle(degrees);
                Ok(())
            }
            Self::SetSpacing(spacing) => path.set_spacing(spacing),
            Self::SetControlMode(mode) => {
                path.set_control_mode(mode);
                Ok(())
            }
            Self::CycleControlMode => {
                let mode = path.settings().control_mode.next();
                path.set_control_mode(mode);
                debug!("control mode: {}", mode.name());
                Ok(())
            }
            Self::SetAutoSetControlPoints(auto) => {
                path.set_auto_set_control_points(auto);
                Ok(())
            }
            Self::SetAxisConstraint(constraint) => {
                path.set_axis_constraint(constraint);
                Ok(())
            }
            Self::Translate(offset) => {
                path.translate(offset);
                Ok(())
            }
        }
    }

    /// Whether the command edits the control polygon's structure.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::AddSegment { .. }
                | Self::SplitSegment { .. }
                | Self::DeleteSegment { .. }
                | Self::ToggleClosed
                | Self::SetClosed(_)
        )
    }
}
