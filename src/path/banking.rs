//! Local and global banking of sample normals.

use bevy::prelude::*;

use crate::error::PathResult;

use super::components::BezierPath;
use super::types::Banking;

impl BezierPath {
    /// Bank the path around an anchor by `angle` degrees.
    ///
    /// The segment arriving at the anchor eases into half the angle and the
    /// segment leaving it eases back out, so the banking peaks at the anchor.
    /// Each affected normal then takes one limited step toward its target.
    pub fn rotate_local_normals(&mut self, anchor_index: usize, angle: f32) -> PathResult<()> {
        self.check_anchor(anchor_index)?;

        let count = self.number_of_segments();
        let anchor = anchor_index / 3;
        let (incoming, outgoing) = if self.is_closed() {
            (Some((anchor + count - 1) % count), Some(anchor % count))
        } else {
            (anchor.checked_sub(1), (anchor < count).then_some(anchor))
        };

        if let Some(segment_index) = incoming {
            self.set_segment_banking(segment_index, Banking::easing_in(angle));
        }
        if let Some(segment_index) = outgoing {
            self.set_segment_banking(segment_index, Banking::easing_out(angle));
        }
        debug!("banked anchor {anchor_index} by {angle} degrees");
        Ok(())
    }

    /// Step every normal toward its banked target.
    ///
    /// Returns `true` while any normal is still turning.
    pub fn rotate_global_normals(&mut self) -> bool {
        let settings = *self.settings();
        let mut moved = false;
        for spline in self.splines_mut() {
            moved |= spline.rotate_normals(&settings);
        }
        moved
    }

    /// Change the banking applied to every sample.
    pub fn set_global_normal_angle(&mut self, degrees: f32) {
        self.settings_mut().global_normal_angle = degrees;
        self.rotate_global_normals();
    }

    /// Change how far a normal may turn per update.
    pub fn set_max_radians_delta(&mut self, max_radians_delta: f32) {
        self.settings_mut().max_radians_delta = max_radians_delta.max(0.0);
        self.rotate_global_normals();
    }

    /// Change how much a normal's length may change per update.
    pub fn set_max_magnitude_delta(&mut self, max_magnitude_delta: f32) {
        self.settings_mut().max_magnitude_delta = max_magnitude_delta.max(0.0);
        self.rotate_global_normals();
    }

    fn set_segment_banking(&mut self, segment_index: usize, banking: Banking) {
        let settings = *self.settings();
        if let Some(spline) = self.splines_mut().get_mut(segment_index) {
            spline.set_banking(banking);
            spline.rotate_normals(&settings);
        }
    }
}
