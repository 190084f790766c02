use bevy::prelude::*;

use crate::geometry::{banked_up, rotate_towards};

use super::arc_length::RawSample;
use super::types::{Banking, PathSettings};

/// Resampled output of one path segment.
///
/// A `Spline` is rebuilt from scratch whenever its segment changes; only the
/// normals are updated in place as banking eases toward its target.
#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Spline {
    segment_index: usize,
    points: Vec<Vec3>,
    directions: Vec<Vec3>,
    normals: Vec<Vec3>,
    normal_rotations: Vec<f32>,
    banking: Banking,
}

impl Spline {
    /// Apply banking to freshly resampled points.
    pub(crate) fn from_samples(
        segment_index: usize,
        samples: Vec<RawSample>,
        banking: Banking,
        settings: &PathSettings,
    ) -> Self {
        let count = samples.len();
        let mut spline = Self {
            segment_index,
            points: Vec::with_capacity(count),
            directions: Vec::with_capacity(count),
            normals: Vec::with_capacity(count),
            normal_rotations: Vec::with_capacity(count),
            banking,
        };

        for (i, sample) in samples.into_iter().enumerate() {
            let rotation = banking.rotation_at(i, count);
            let target = banked_up(rotation + settings.global_normal_angle);

            spline.points.push(sample.position);
            spline.directions.push(sample.direction);
            spline.normals.push(rotate_towards(
                sample.normal,
                target,
                settings.max_radians_delta,
                settings.max_magnitude_delta,
            ));
            spline.normal_rotations.push(rotation);
        }

        spline
    }

    /// Empty spline carrying only a banking ramp, replaced on the next rebuild.
    pub(crate) fn placeholder(segment_index: usize, banking: Banking) -> Self {
        Self {
            segment_index,
            banking,
            ..default()
        }
    }

    /// Index of the segment this spline was sampled from.
    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    /// Number of samples.
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Whether the segment produced no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample positions.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Unit tangents at each sample.
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// Banked normals at each sample.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Local banking angle (degrees) of each sample, excluding the global angle.
    pub fn normal_rotations(&self) -> &[f32] {
        &self.normal_rotations
    }

    /// Segment-level banking angle in degrees.
    pub fn rotation_amount(&self) -> f32 {
        self.banking.amount
    }

    /// Banking ramp of this segment.
    pub fn banking(&self) -> Banking {
        self.banking
    }

    /// Last sample position, if any.
    pub fn last_point(&self) -> Option<Vec3> {
        self.points.last().copied()
    }

    pub(crate) fn set_segment_index(&mut self, segment_index: usize) {
        self.segment_index = segment_index;
    }

    /// Replace the banking ramp and recompute the per-sample rotations.
    pub(crate) fn set_banking(&mut self, banking: Banking) {
        self.banking = banking;
        let count = self.normal_rotations.len();
        for (i, rotation) in self.normal_rotations.iter_mut().enumerate() {
            *rotation = banking.rotation_at(i, count);
        }
    }

    /// Turn every normal one limited step toward its banked target.
    ///
    /// Returns `true` if any normal moved.
    pub(crate) fn rotate_normals(&mut self, settings: &PathSettings) -> bool {
        let mut moved = false;
        for (normal, rotation) in self.normals.iter_mut().zip(&self.normal_rotations) {
            let target = banked_up(rotation + settings.global_normal_angle);
            let next = rotate_towards(
                *normal,
                target,
                settings.max_radians_delta,
                settings.max_magnitude_delta,
            );
            if next != *normal {
                moved = true;
                *normal = next;
            }
        }
        moved
    }
}
