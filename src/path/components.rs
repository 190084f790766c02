use bevy::prelude::*;

use crate::error::{PathEditError, PathResult};

use super::arc_length::{
    approximate_segment_length, distance_to_segment, resample_segment, DEFAULT_DISTANCE_SAMPLES,
};
use super::spline::Spline;
use super::types::{AxisConstraint, Banking, ControlMode, PathSettings, MIN_SPACING};

/// A piecewise cubic Bézier path with evenly spaced, banked samples.
///
/// The control polygon holds `3N + 1` points for an open path and `3N` for a
/// closed one, where `N` is the number of segments. Every index divisible by
/// three is an anchor; its neighbours are its control points. Each segment
/// owns one [`Spline`] of resampled points that is rebuilt whenever the
/// segment changes.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component, Default)]
pub struct BezierPath {
    points: Vec<Vec3>,
    closed: bool,
    settings: PathSettings,
    splines: Vec<Spline>,
}

/// One sample of the concatenated path output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    /// Sample position.
    pub position: Vec3,
    /// Unit tangent.
    pub direction: Vec3,
    /// Banked normal.
    pub normal: Vec3,
}

impl Default for BezierPath {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl BezierPath {
    /// Create a single-segment open path around `center` with default settings.
    pub fn new(center: Vec3) -> Self {
        let points = default_polygon(center);
        let mut path = Self {
            points,
            closed: false,
            settings: PathSettings::default(),
            splines: Vec::new(),
        };
        path.rebuild_all();
        path
    }

    /// Create a single-segment open path around `center`.
    pub fn with_settings(center: Vec3, settings: PathSettings) -> PathResult<Self> {
        Self::from_points(default_polygon(center), false, settings)
    }

    /// Build a path from an existing control polygon.
    ///
    /// Open paths need `3N + 1` points with `N >= 1`, closed paths `3N`
    /// points with `N >= 2`.
    pub fn from_points(points: Vec<Vec3>, closed: bool, settings: PathSettings) -> PathResult<Self> {
        validate_spacing(settings.spacing)?;

        let len = points.len();
        let valid = if closed {
            len % 3 == 0 && len >= 6
        } else {
            len % 3 == 1 && len >= 4
        };
        if !valid {
            return Err(PathEditError::InvalidPointCount { len, closed });
        }

        let mut path = Self {
            points,
            closed,
            settings: PathSettings {
                max_radians_delta: settings.max_radians_delta.max(0.0),
                max_magnitude_delta: settings.max_magnitude_delta.max(0.0),
                ..settings
            },
            splines: Vec::new(),
        };
        if path.settings.auto_set_control_points {
            path.auto_set_all_control_points();
        }
        path.apply_axis_constraint();
        path.rebuild_all();
        Ok(path)
    }

    /// The control polygon.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// A single control polygon point.
    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    /// Length of the control polygon.
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of cubic segments.
    pub fn number_of_segments(&self) -> usize {
        self.points.len() / 3
    }

    /// Number of anchors.
    pub fn number_of_anchors(&self) -> usize {
        self.number_of_segments() + usize::from(!self.closed)
    }

    /// Whether the last anchor connects back to the first.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether `index` addresses an anchor.
    pub fn is_anchor(&self, index: usize) -> bool {
        index < self.points.len() && index % 3 == 0
    }

    /// Current settings.
    pub fn settings(&self) -> &PathSettings {
        &self.settings
    }

    /// The four control points of a segment.
    pub fn segment_points(&self, segment_index: usize) -> Option<[Vec3; 4]> {
        (segment_index < self.number_of_segments()).then(|| self.segment(segment_index))
    }

    /// Segment that starts at `anchor_index`, wrapping for closed paths.
    ///
    /// For the last anchor of an open path this equals the segment count.
    pub fn segment_index_from_anchor(&self, anchor_index: usize) -> usize {
        self.loop_index(anchor_index as isize) / 3
    }

    /// Resampled output, one [`Spline`] per segment.
    pub fn splines(&self) -> &[Spline] {
        &self.splines
    }

    /// Resampled output of one segment.
    pub fn spline(&self, segment_index: usize) -> Option<&Spline> {
        self.splines.get(segment_index)
    }

    /// Total number of samples across all segments.
    pub fn sample_count(&self) -> usize {
        self.splines.iter().map(Spline::number_of_points).sum()
    }

    /// All samples in path order.
    pub fn samples(&self) -> impl Iterator<Item = PathSample> + '_ {
        self.splines.iter().flat_map(|spline| {
            spline
                .points()
                .iter()
                .zip(spline.directions())
                .zip(spline.normals())
                .map(|((&position, &direction), &normal)| PathSample {
                    position,
                    direction,
                    normal,
                })
        })
    }

    /// Sample positions of every segment, concatenated.
    pub fn concatenated_points(&self) -> Vec<Vec3> {
        self.splines
            .iter()
            .flat_map(|spline| spline.points().iter().copied())
            .collect()
    }

    /// Sample normals of every segment, concatenated.
    pub fn concatenated_normals(&self) -> Vec<Vec3> {
        self.splines
            .iter()
            .flat_map(|spline| spline.normals().iter().copied())
            .collect()
    }

    /// Approximate arc length of one segment.
    pub fn segment_length(&self, segment_index: usize) -> Option<f32> {
        self.segment_points(segment_index)
            .map(|segment| approximate_segment_length(&segment, DEFAULT_DISTANCE_SAMPLES))
    }

    /// Approximate arc length of the whole path.
    pub fn length(&self) -> f32 {
        (0..self.number_of_segments())
            .filter_map(|s| self.segment_length(s))
            .sum()
    }

    /// Segment whose curve passes closest to `point`, if within `max_distance`.
    pub fn nearest_segment(&self, point: Vec3, max_distance: f32) -> Option<usize> {
        (0..self.number_of_segments())
            .map(|s| {
                let distance = distance_to_segment(&self.segment(s), point, DEFAULT_DISTANCE_SAMPLES);
                (s, distance)
            })
            .filter(|(_, distance)| *distance < max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }

    /// Append a segment ending at `anchor_position`.
    ///
    /// The first new control point mirrors the previous end control, the
    /// second sits halfway between that and the new anchor. Only valid on
    /// open paths.
    pub fn add_segment(&mut self, anchor_position: Vec3) -> PathResult<()> {
        if self.closed {
            return Err(PathEditError::ClosedPath);
        }

        let anchor_position = self.settings.axis_constraint.apply(anchor_position);
        let len = self.points.len();
        let control = self.points[len - 1] * 2.0 - self.points[len - 2];
        self.points.push(control);
        self.points.push((control + anchor_position) * 0.5);
        self.points.push(anchor_position);

        let segment_index = self.number_of_segments() - 1;
        self.splines.push(Spline::placeholder(segment_index, Banking::NONE));
        debug!("added segment {segment_index} ending at {anchor_position}");

        if self.settings.auto_set_control_points {
            self.auto_set_affected_control_points(len + 2);
            self.apply_axis_constraint();
            self.rebuild_all();
        } else {
            self.rebuild_segment(segment_index);
        }
        Ok(())
    }

    /// Split a segment in two by inserting a new anchor.
    ///
    /// The segment's banking is kept and ramps in toward the new anchor and
    /// out after it.
    pub fn split_segment(&mut self, anchor_position: Vec3, segment_index: usize) -> PathResult<()> {
        let count = self.number_of_segments();
        if segment_index >= count {
            return Err(PathEditError::SegmentOutOfRange {
                index: segment_index,
                count,
            });
        }

        let anchor_position = self.settings.axis_constraint.apply(anchor_position);
        let insert_at = segment_index * 3 + 2;
        self.points.splice(
            insert_at..insert_at,
            [Vec3::ZERO, anchor_position, Vec3::ZERO],
        );

        let new_anchor = segment_index * 3 + 3;
        if self.settings.auto_set_control_points {
            self.auto_set_affected_control_points(new_anchor);
        } else {
            self.auto_set_anchor_control_points(new_anchor);
        }
        self.apply_axis_constraint();

        let amount = self.splines[segment_index].rotation_amount();
        self.splines[segment_index] = Spline::placeholder(segment_index, Banking::easing_in(amount));
        self.splines.insert(
            segment_index + 1,
            Spline::placeholder(segment_index + 1, Banking::easing_out(amount)),
        );
        self.renumber_splines();
        debug!("split segment {segment_index} at {anchor_position}");

        if self.settings.auto_set_control_points {
            self.rebuild_all();
        } else {
            self.rebuild_segment(segment_index);
            self.rebuild_segment(segment_index + 1);
            // The closing segment was split: the wraparound is renumbered.
            if self.closed && segment_index + 1 == self.number_of_segments() - 1 {
                self.rebuild_segment(0);
            }
        }

        self.rotate_global_normals();
        Ok(())
    }

    /// Remove an anchor together with its two control points.
    ///
    /// Rejected when the path would drop below one segment (open) or two
    /// segments (closed).
    pub fn delete_segment(&mut self, anchor_index: usize) -> PathResult<()> {
        self.check_anchor(anchor_index)?;

        let count = self.number_of_segments();
        let minimum = if self.closed { 2 } else { 1 };
        if count <= minimum {
            return Err(PathEditError::TooFewSegments {
                minimum,
                actual: count,
            });
        }

        let len = self.points.len();
        if anchor_index == 0 {
            if self.closed {
                self.points[len - 1] = self.points[2];
            }
            self.points.drain(0..3);
        } else if anchor_index == len - 1 && !self.closed {
            self.points.drain(anchor_index - 2..=anchor_index);
        } else {
            self.points.drain(anchor_index - 1..=anchor_index + 1);
        }

        let anchor = anchor_index / 3;
        let mut rebuild = Vec::with_capacity(2);
        if anchor == 0 {
            self.splines.remove(0);
            rebuild.push(0);
            if self.closed {
                let closing = self.splines.pop().map(|s| s.banking()).unwrap_or_default();
                self.splines.push(Spline::placeholder(count - 2, closing));
                rebuild.push(count - 2);
            }
        } else if anchor == count && !self.closed {
            self.splines.pop();
        } else {
            let banking = self.splines[anchor - 1].banking();
            self.splines.drain(anchor - 1..=anchor);
            self.splines.insert(anchor - 1, Spline::placeholder(anchor - 1, banking));
            rebuild.push(anchor - 1);
        }
        self.renumber_splines();
        debug!("deleted anchor {anchor_index}, {} segments left", count - 1);

        if self.settings.auto_set_control_points {
            self.auto_set_all_control_points();
            self.apply_axis_constraint();
            self.rebuild_all();
        } else {
            for segment_index in rebuild {
                self.rebuild_segment(segment_index);
            }
        }
        Ok(())
    }

    /// Open a closed path or close an open one.
    ///
    /// Closing appends two control points that mirror the existing end
    /// controls; opening removes them again.
    pub fn toggle_closed(&mut self) {
        let len = self.points.len();
        if self.closed {
            self.points.truncate(len - 2);
            self.closed = false;
            self.splines.pop();

            if self.settings.auto_set_control_points {
                self.auto_set_start_and_end_controls();
                self.rebuild_all();
            }
        } else {
            let end_control = self.points[len - 1] * 2.0 - self.points[len - 2];
            let start_control = self.points[0] * 2.0 - self.points[1];
            self.points.push(end_control);
            self.points.push(start_control);
            self.closed = true;

            let closing = self.number_of_segments() - 1;
            self.splines.push(Spline::placeholder(closing, Banking::NONE));

            if self.settings.auto_set_control_points {
                self.auto_set_anchor_control_points(0);
                self.auto_set_anchor_control_points(len - 1);
                self.apply_axis_constraint();
                self.rebuild_all();
            } else {
                self.apply_axis_constraint();
                self.rebuild_segment(closing);
            }
        }
        debug!("path is now {}", if self.closed { "closed" } else { "open" });

        self.rotate_global_normals();
    }

    /// Open or close the path.
    pub fn set_closed(&mut self, closed: bool) {
        if self.closed != closed {
            self.toggle_closed();
        }
    }

    /// Move one control polygon point.
    ///
    /// Anchors carry their control points along, or have them re-derived when
    /// automatic control points are on. Control points apply the control mode
    /// to the opposite control point of the same anchor.
    pub fn move_point(&mut self, index: usize, new_position: Vec3) -> PathResult<()> {
        self.check_point(index)?;

        let delta = new_position - self.points[index];
        let anchor = self.anchor_of(index);
        let auto = self.settings.auto_set_control_points;
        self.points[index] = new_position;

        if self.is_anchor(index) {
            if auto {
                self.auto_set_affected_control_points(index);
            } else {
                let len = self.points.len();
                if index + 1 < len || self.closed {
                    let next = self.loop_index(index as isize + 1);
                    self.points[next] += delta;
                }
                if index >= 1 || self.closed {
                    let previous = self.loop_index(index as isize - 1);
                    self.points[previous] += delta;
                }
            }
        } else {
            self.enforce_control_mode(index);
        }

        self.apply_axis_constraint();
        trace!("moved point {index} to {new_position}");

        if auto && self.is_anchor(index) {
            self.rebuild_all();
        } else {
            self.rebuild_around_anchor(anchor);
        }
        self.rotate_global_normals();
        Ok(())
    }

    /// Move every point by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for point in &mut self.points {
            *point += offset;
        }
        self.apply_axis_constraint();
        self.rebuild_all();
    }

    /// Change the sample spacing and resample everything.
    pub fn set_spacing(&mut self, spacing: f32) -> PathResult<()> {
        validate_spacing(spacing)?;
        self.settings.spacing = spacing;
        self.rebuild_all();
        Ok(())
    }

    /// Change the subdivision resolution and resample everything.
    pub fn set_resolution(&mut self, resolution: f32) {
        self.settings.resolution = resolution.max(0.0);
        self.rebuild_all();
    }

    /// Change the control point mode.
    pub fn set_control_mode(&mut self, mode: ControlMode) {
        self.settings.control_mode = mode;
    }

    /// Enable or disable automatic control points.
    ///
    /// Enabling re-derives every control point from its anchor's neighbours.
    pub fn set_auto_set_control_points(&mut self, auto: bool) {
        if self.settings.auto_set_control_points == auto {
            return;
        }
        self.settings.auto_set_control_points = auto;
        if auto {
            self.auto_set_all_control_points();
            self.apply_axis_constraint();
            self.rebuild_all();
        }
    }

    /// Lock the polygon to a plane and resample.
    pub fn set_axis_constraint(&mut self, constraint: AxisConstraint) {
        self.settings.axis_constraint = constraint;
        self.apply_axis_constraint();
        self.rebuild_all();
    }

    /// Resample every segment, keeping each segment's banking ramp.
    pub fn rebuild_all(&mut self) {
        let count = self.number_of_segments();
        self.splines.truncate(count);
        while self.splines.len() < count {
            self.splines
                .push(Spline::placeholder(self.splines.len(), Banking::NONE));
        }
        for segment_index in 0..count {
            self.rebuild_segment(segment_index);
        }
    }

    pub(crate) fn rebuild_segment(&mut self, segment_index: usize) {
        let segment = self.segment(segment_index);
        let (previous, emit_start) = self.resample_origin(segment_index);
        let samples = resample_segment(
            &segment,
            previous,
            emit_start,
            self.settings.spacing,
            self.settings.resolution,
        );
        trace!("segment {segment_index} resampled into {} points", samples.len());

        let banking = self.splines[segment_index].banking();
        self.splines[segment_index] =
            Spline::from_samples(segment_index, samples, banking, &self.settings);
    }

    /// Rebuild the segments touching an anchor.
    fn rebuild_around_anchor(&mut self, anchor_index: usize) {
        let count = self.number_of_segments();
        let anchor = anchor_index / 3;
        if self.closed {
            self.rebuild_segment((anchor + count - 1) % count);
            self.rebuild_segment(anchor % count);
        } else {
            if anchor >= 1 {
                self.rebuild_segment(anchor - 1);
            }
            if anchor < count {
                self.rebuild_segment(anchor);
            }
        }
    }

    /// Where resampling of a segment starts measuring distance from.
    ///
    /// The first segment always starts at (and emits) the first anchor; later
    /// segments continue from the last sample before them.
    fn resample_origin(&self, segment_index: usize) -> (Vec3, bool) {
        if segment_index == 0 {
            return (self.points[0], true);
        }
        let previous = self.splines[..segment_index]
            .iter()
            .rev()
            .find_map(Spline::last_point)
            .unwrap_or(self.points[segment_index * 3]);
        (previous, false)
    }

    fn renumber_splines(&mut self) {
        for (i, spline) in self.splines.iter_mut().enumerate() {
            spline.set_segment_index(i);
        }
    }

    pub(crate) fn segment(&self, segment_index: usize) -> [Vec3; 4] {
        let i = segment_index * 3;
        [
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[self.loop_index(i as isize + 3)],
        ]
    }

    /// Anchor owning a point: the point itself, or the adjacent anchor.
    fn anchor_of(&self, index: usize) -> usize {
        if index % 3 == 0 {
            index
        } else if (index + 1) % 3 == 0 {
            self.loop_index(index as isize + 1)
        } else {
            index - 1
        }
    }

    pub(crate) fn loop_index(&self, index: isize) -> usize {
        index.rem_euclid(self.points.len() as isize) as usize
    }

    pub(crate) fn points_mut(&mut self) -> &mut Vec<Vec3> {
        &mut self.points
    }

    pub(crate) fn splines_mut(&mut self) -> &mut [Spline] {
        &mut self.splines
    }

    pub(crate) fn settings_mut(&mut self) -> &mut PathSettings {
        &mut self.settings
    }

    fn check_point(&self, index: usize) -> PathResult<()> {
        if index >= self.points.len() {
            return Err(PathEditError::PointOutOfRange {
                index,
                len: self.points.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_anchor(&self, index: usize) -> PathResult<()> {
        self.check_point(index)?;
        if !self.is_anchor(index) {
            return Err(PathEditError::NotAnAnchor(index));
        }
        Ok(())
    }
}

fn default_polygon(center: Vec3) -> Vec<Vec3> {
    vec![
        center + Vec3::NEG_X,
        center + (Vec3::NEG_X + Vec3::Y) * 0.5,
        center + (Vec3::X + Vec3::NEG_Y) * 0.5,
        center + Vec3::X,
    ]
}

fn validate_spacing(spacing: f32) -> PathResult<()> {
    if spacing.is_finite() && spacing >= MIN_SPACING {
        Ok(())
    } else {
        Err(PathEditError::InvalidSpacing(spacing))
    }
}
