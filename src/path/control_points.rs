//! Control point derivation and constraints.

use bevy::prelude::*;

use super::components::BezierPath;
use super::types::ControlMode;

impl BezierPath {
    /// Derive both control points of an anchor from its neighbouring anchors.
    ///
    /// The controls lie on the line through the anchor that bisects the
    /// directions to its neighbours, each at half the distance to the
    /// neighbour on its side.
    pub(crate) fn auto_set_anchor_control_points(&mut self, anchor_index: usize) {
        let closed = self.is_closed();
        let len = self.number_of_points() as isize;
        let anchor = anchor_index as isize;
        let position = self.points()[anchor_index];

        let mut direction = Vec3::ZERO;
        let mut distances = [0.0_f32; 2];

        if anchor - 3 >= 0 || closed {
            let offset = self.points()[self.loop_index(anchor - 3)] - position;
            direction += offset.normalize_or_zero();
            distances[0] = offset.length();
        }
        if anchor + 3 < len || closed {
            let offset = self.points()[self.loop_index(anchor + 3)] - position;
            direction -= offset.normalize_or_zero();
            distances[1] = -offset.length();
        }

        let direction = direction.normalize_or_zero();

        for (i, distance) in distances.into_iter().enumerate() {
            let control = anchor + i as isize * 2 - 1;
            if (0..len).contains(&control) || closed {
                let control = self.loop_index(control);
                self.points_mut()[control] = position + direction * distance * 0.5;
            }
        }
    }

    /// Place the outer controls of an open path halfway to their neighbours.
    pub(crate) fn auto_set_start_and_end_controls(&mut self) {
        if self.is_closed() {
            return;
        }
        let points = self.points_mut();
        let len = points.len();
        points[1] = (points[0] + points[2]) * 0.5;
        points[len - 2] = (points[len - 1] + points[len - 3]) * 0.5;
    }

    /// Re-derive the controls of an anchor and of the anchors on either side.
    pub(crate) fn auto_set_affected_control_points(&mut self, anchor_index: usize) {
        let closed = self.is_closed();
        let len = self.number_of_points() as isize;
        let anchor = anchor_index as isize;

        for neighbour in [anchor - 3, anchor, anchor + 3] {
            if (0..len).contains(&neighbour) || closed {
                let neighbour = self.loop_index(neighbour);
                self.auto_set_anchor_control_points(neighbour);
            }
        }

        self.auto_set_start_and_end_controls();
    }

    /// Re-derive every control point.
    pub(crate) fn auto_set_all_control_points(&mut self) {
        for anchor_index in (0..self.number_of_points()).step_by(3) {
            self.auto_set_anchor_control_points(anchor_index);
        }
        self.auto_set_start_and_end_controls();
    }

    /// Apply the control mode after the control point at `index` moved.
    ///
    /// The opposite control point of the same anchor is aligned or mirrored.
    /// Nothing happens at the outer controls of an open path.
    pub(crate) fn enforce_control_mode(&mut self, index: usize) {
        let len = self.number_of_points() as isize;
        let moved = index as isize;
        let (anchor, opposite) = if (index + 1) % 3 == 0 {
            (moved + 1, moved + 2)
        } else {
            (moved - 1, moved - 2)
        };

        if !((0..len).contains(&opposite) || self.is_closed()) {
            return;
        }

        let anchor_position = self.points()[self.loop_index(anchor)];
        let moved_position = self.points()[index];
        let opposite = self.loop_index(opposite);

        match self.settings().control_mode {
            ControlMode::Free => {}
            ControlMode::Aligned => {
                let Some(direction) = (anchor_position - moved_position).try_normalize() else {
                    return;
                };
                let distance = anchor_position.distance(self.points()[opposite]);
                self.points_mut()[opposite] = anchor_position + direction * distance;
            }
            ControlMode::Mirrored => {
                self.points_mut()[opposite] = anchor_position * 2.0 - moved_position;
            }
        }
    }

    /// Project every point onto the constrained plane.
    pub(crate) fn apply_axis_constraint(&mut self) {
        let constraint = self.settings().axis_constraint;
        for point in self.points_mut() {
            *point = constraint.apply(*point);
        }
    }
}
