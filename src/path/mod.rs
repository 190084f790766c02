//! Editable Bézier paths with arc-length resampling and banked normals.

mod arc_length;
mod banking;
mod components;
mod control_points;
mod spline;
mod systems;
mod types;

pub use arc_length::{
    approximate_segment_length, distance_to_segment, estimate_divisions, resample_segment,
    RawSample, DEFAULT_DISTANCE_SAMPLES,
};
pub use components::*;
pub use spline::Spline;
pub use systems::ease_path_normals;
pub use types::*;

use bevy::prelude::*;

/// Plugin that registers path types and eases banked normals every frame.
///
/// This plugin does NOT include editing - use `PathEditorPlugin` for that.
pub struct PathPlugin;

impl Plugin for PathPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<BezierPath>()
            .register_type::<PathSettings>()
            .register_type::<ControlMode>()
            .register_type::<AxisConstraint>()
            .register_type::<Banking>()
            .register_type::<Spline>()
            .add_systems(Update, systems::ease_path_normals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathEditError;

    fn straight_path(length: f32, spacing: f32) -> BezierPath {
        BezierPath::from_points(
            vec![
                Vec3::ZERO,
                Vec3::new(length / 3.0, 0.0, 0.0),
                Vec3::new(length * 2.0 / 3.0, 0.0, 0.0),
                Vec3::new(length, 0.0, 0.0),
            ],
            false,
            PathSettings::default().with_spacing(spacing),
        )
        .unwrap()
    }

    fn winding_path() -> BezierPath {
        let mut path = BezierPath::new(Vec3::ZERO);
        path.add_segment(Vec3::new(4.0, 0.0, 3.0)).unwrap();
        path.add_segment(Vec3::new(8.0, 1.0, -2.0)).unwrap();
        path.add_segment(Vec3::new(12.0, 0.0, 0.0)).unwrap();
        path
    }

    fn assert_consistent(path: &BezierPath) {
        let len = path.number_of_points();
        if path.is_closed() {
            assert_eq!(len % 3, 0);
        } else {
            assert_eq!(len % 3, 1);
        }
        assert_eq!(path.number_of_segments(), len / 3);
        assert_eq!(path.splines().len(), path.number_of_segments());
        for (i, spline) in path.splines().iter().enumerate() {
            assert_eq!(spline.segment_index(), i);
            assert_eq!(spline.points().len(), spline.normals().len());
            assert_eq!(spline.points().len(), spline.directions().len());
            assert_eq!(spline.points().len(), spline.normal_rotations().len());
        }
    }

    #[test]
    fn test_default_path() {
        let path = BezierPath::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(path.number_of_points(), 4);
        assert_eq!(path.number_of_segments(), 1);
        assert_eq!(path.number_of_anchors(), 2);
        assert!(!path.is_closed());
        assert_eq!(path.points()[0], Vec3::new(0.0, 2.0, 3.0));
        assert_eq!(path.points()[3], Vec3::new(2.0, 2.0, 3.0));
        assert!(path.sample_count() > 0);
        assert_consistent(&path);
    }

    #[test]
    fn test_from_points_rejects_bad_polygons() {
        let settings = PathSettings::default();
        assert_eq!(
            BezierPath::from_points(vec![Vec3::ZERO; 5], false, settings).unwrap_err(),
            PathEditError::InvalidPointCount {
                len: 5,
                closed: false
            }
        );
        assert!(BezierPath::from_points(vec![Vec3::ZERO; 3], true, settings).is_err());
        assert!(BezierPath::from_points(vec![Vec3::ZERO; 6], true, settings).is_ok());
        assert_eq!(
            BezierPath::from_points(vec![Vec3::ZERO; 4], false, settings.with_spacing(0.0))
                .unwrap_err(),
            PathEditError::InvalidSpacing(0.0)
        );
    }

    #[test]
    fn test_first_sample_is_first_anchor() {
        let path = winding_path();
        let first = path.concatenated_points()[0];
        assert_eq!(first, path.points()[0]);
    }

    #[test]
    fn test_samples_are_evenly_spaced() {
        let path = winding_path();
        let points = path.concatenated_points();
        let spacing = path.settings().spacing;

        for pair in points.windows(2) {
            let gap = pair[0].distance(pair[1]);
            assert!(gap <= spacing + 1e-3, "gap {gap}");
        }
        assert_eq!(points.len(), path.sample_count());
        assert_eq!(path.samples().count(), path.sample_count());
    }

    #[test]
    fn test_add_segment() {
        let mut path = straight_path(3.0, 1.0);
        path.add_segment(Vec3::new(6.0, 3.0, 0.0)).unwrap();

        assert_eq!(path.number_of_segments(), 2);
        let points = path.points();
        // Reflected end control, then halfway to the new anchor.
        assert_eq!(points[4], Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(points[5], Vec3::new(5.0, 1.5, 0.0));
        assert_eq!(points[6], Vec3::new(6.0, 3.0, 0.0));
        assert_consistent(&path);
    }

    #[test]
    fn test_add_segment_rejected_on_closed_path() {
        let mut path = winding_path();
        path.toggle_closed();
        let before = path.points().to_vec();

        assert_eq!(
            path.add_segment(Vec3::new(20.0, 0.0, 0.0)),
            Err(PathEditError::ClosedPath)
        );
        assert_eq!(path.points(), before.as_slice());
    }

    #[test]
    fn test_add_then_delete_restores_path() {
        let mut path = winding_path();
        let points = path.points().to_vec();
        let samples = path.concatenated_points();

        path.add_segment(Vec3::new(15.0, 0.0, 5.0)).unwrap();
        let last = path.number_of_points() - 1;
        path.delete_segment(last).unwrap();

        assert_eq!(path.points(), points.as_slice());
        assert_eq!(path.concatenated_points(), samples);
        assert_consistent(&path);
    }

    #[test]
    fn test_toggle_closed_twice_restores_path() {
        let mut path = winding_path();
        let points = path.points().to_vec();
        let samples = path.concatenated_points();

        path.toggle_closed();
        assert!(path.is_closed());
        assert_eq!(path.number_of_points(), points.len() + 2);
        assert_consistent(&path);

        path.toggle_closed();
        assert!(!path.is_closed());
        assert_eq!(path.points(), points.as_slice());
        assert_eq!(path.concatenated_points(), samples);
        assert_consistent(&path);
    }

    #[test]
    fn test_toggle_closed_twice_with_auto_controls() {
        let mut path = winding_path();
        path.set_auto_set_control_points(true);
        let points = path.points().to_vec();

        path.toggle_closed();
        assert_consistent(&path);
        for anchor in (0..points.len()).step_by(3) {
            assert_eq!(path.points()[anchor], points[anchor]);
        }

        path.toggle_closed();
        assert!(!path.is_closed());
        assert_eq!(path.number_of_points(), points.len());
        for (after, before) in path.points().iter().zip(&points) {
            assert!((*after - *before).length() < 1e-4);
        }
        assert_eq!(path.concatenated_points()[0], path.points()[0]);
        assert_consistent(&path);
    }

    #[test]
    fn test_closing_controls_reflect_end_controls() {
        let mut path = winding_path();
        let before = path.points().to_vec();
        let len = before.len();
        path.set_closed(true);

        let points = path.points();
        assert_eq!(points[len], before[len - 1] * 2.0 - before[len - 2]);
        assert_eq!(points[len + 1], before[0] * 2.0 - before[1]);

        // Setting the same state again is a no-op.
        path.set_closed(true);
        assert_eq!(path.number_of_points(), len + 2);
    }

    #[test]
    fn test_split_segment() {
        let mut path = straight_path(30.0, 0.9);
        let before = path.sample_count();

        path.split_segment(Vec3::new(15.0, 0.0, 0.0), 0).unwrap();

        assert_eq!(path.number_of_segments(), 2);
        assert_eq!(path.points()[3], Vec3::new(15.0, 0.0, 0.0));
        assert!((path.points()[2] - Vec3::new(7.5, 0.0, 0.0)).length() < 1e-4);
        assert!((path.points()[4] - Vec3::new(22.5, 0.0, 0.0)).length() < 1e-4);
        assert!(path.sample_count() >= before);
        assert_consistent(&path);
    }

    #[test]
    fn test_split_keeps_banking_as_ramps() {
        let mut path = winding_path();
        path.rotate_local_normals(3, 30.0).unwrap();
        path.split_segment(Vec3::new(2.0, 0.0, 1.0), 1).unwrap();

        assert_eq!(path.splines()[1].banking(), Banking::easing_in(30.0));
        assert_eq!(path.splines()[2].banking(), Banking::easing_out(30.0));
    }

    #[test]
    fn test_split_closing_segment() {
        let mut path = winding_path();
        path.toggle_closed();
        let count = path.number_of_segments();

        path.split_segment(Vec3::new(6.0, 0.0, -6.0), count - 1).unwrap();
        assert_eq!(path.number_of_segments(), count + 1);
        assert_eq!(path.concatenated_points()[0], path.points()[0]);
        assert_consistent(&path);
    }

    #[test]
    fn test_split_first_segment_of_banked_closed_path() {
        let mut path = winding_path();
        path.toggle_closed();
        path.rotate_local_normals(0, 20.0).unwrap();
        let count = path.number_of_segments();
        assert_eq!(path.splines()[0].banking(), Banking::easing_out(20.0));

        path.split_segment(Vec3::new(1.5, 0.5, 2.0), 0).unwrap();

        assert_eq!(path.number_of_segments(), count + 1);
        assert_eq!(path.splines()[0].banking(), Banking::easing_in(20.0));
        assert_eq!(path.splines()[1].banking(), Banking::easing_out(20.0));
        // The closing segment still eases into the first anchor.
        assert_eq!(path.splines()[count].banking(), Banking::easing_in(20.0));
        assert_eq!(path.concatenated_points()[0], path.points()[0]);
        assert_consistent(&path);
    }

    #[test]
    fn test_split_rejects_bad_segment() {
        let mut path = winding_path();
        assert_eq!(
            path.split_segment(Vec3::ZERO, 4),
            Err(PathEditError::SegmentOutOfRange { index: 4, count: 4 })
        );
    }

    #[test]
    fn test_delete_middle_anchor() {
        let mut path = winding_path();
        let removed = path.points()[3];
        path.delete_segment(3).unwrap();

        assert_eq!(path.number_of_segments(), 3);
        assert!(!path.points().contains(&removed));
        assert_consistent(&path);
    }

    #[test]
    fn test_delete_first_anchor() {
        let mut path = winding_path();
        let next_anchor = path.points()[3];
        path.delete_segment(0).unwrap();

        assert_eq!(path.points()[0], next_anchor);
        assert_eq!(path.concatenated_points()[0], next_anchor);
        assert_consistent(&path);
    }

    #[test]
    fn test_delete_first_anchor_of_closed_path() {
        let mut path = winding_path();
        path.toggle_closed();
        let control = path.points()[2];
        path.delete_segment(0).unwrap();

        assert_eq!(path.number_of_segments(), 4);
        assert_eq!(*path.points().last().unwrap(), control);
        assert_consistent(&path);
    }

    #[test]
    fn test_delete_last_anchor_of_closed_path() {
        let mut path = winding_path();
        path.toggle_closed();
        let len = path.number_of_points();
        let count = path.number_of_segments();
        let removed = path.points()[len - 3];

        path.delete_segment(len - 3).unwrap();

        assert_eq!(path.number_of_segments(), count - 1);
        assert!(!path.points().contains(&removed));
        assert_eq!(path.concatenated_points()[0], path.points()[0]);

        // The closing segment still ends at the first anchor.
        let spacing = path.settings().spacing;
        let seam = path.splines().last().unwrap().last_point().unwrap();
        assert!(seam.distance(path.points()[0]) < spacing * 2.0);
        assert_consistent(&path);
    }

    #[test]
    fn test_delete_keeps_minimum_segments() {
        let mut path = BezierPath::new(Vec3::ZERO);
        assert_eq!(
            path.delete_segment(0),
            Err(PathEditError::TooFewSegments {
                minimum: 1,
                actual: 1
            })
        );

        let mut closed = BezierPath::new(Vec3::ZERO);
        closed.add_segment(Vec3::new(3.0, 0.0, 2.0)).unwrap();
        closed.toggle_closed();
        assert_eq!(closed.number_of_segments(), 3);
        closed.delete_segment(3).unwrap();
        assert_eq!(
            closed.delete_segment(0),
            Err(PathEditError::TooFewSegments {
                minimum: 2,
                actual: 2
            })
        );
        assert_consistent(&closed);
    }

    #[test]
    fn test_delete_rejects_control_point() {
        let mut path = winding_path();
        assert_eq!(path.delete_segment(4), Err(PathEditError::NotAnAnchor(4)));
        assert_eq!(
            path.delete_segment(30),
            Err(PathEditError::PointOutOfRange { index: 30, len: 13 })
        );
    }

    #[test]
    fn test_move_anchor_carries_controls() {
        let mut path = winding_path();
        let before = path.points().to_vec();
        let offset = Vec3::new(0.0, 2.0, 1.0);
        path.move_point(3, before[3] + offset).unwrap();

        let points = path.points();
        for i in 2..=4 {
            assert!((points[i] - (before[i] + offset)).length() < 1e-5);
        }
        assert_eq!(points[1], before[1]);
        assert_eq!(points[5], before[5]);
        assert_consistent(&path);
    }

    #[test]
    fn test_move_first_anchor_of_closed_path_wraps() {
        let mut path = winding_path();
        path.toggle_closed();
        let before = path.points().to_vec();
        let offset = Vec3::new(1.0, 0.0, 0.0);
        path.move_point(0, before[0] + offset).unwrap();

        let last = before.len() - 1;
        assert!((path.points()[last] - (before[last] + offset)).length() < 1e-5);
        assert!((path.points()[1] - (before[1] + offset)).length() < 1e-5);
    }

    #[test]
    fn test_move_last_control_of_closed_path_mirrors_first() {
        let mut path = winding_path();
        path.toggle_closed();
        path.set_control_mode(ControlMode::Mirrored);
        let last = path.number_of_points() - 1;
        let anchor = path.points()[0];
        let target = anchor + Vec3::new(-1.0, 0.5, 0.3);

        path.move_point(last, target).unwrap();

        assert_eq!(path.points()[0], anchor);
        assert!((path.points()[1] - (anchor * 2.0 - target)).length() < 1e-5);
        assert_consistent(&path);
    }

    #[test]
    fn test_move_last_control_of_closed_path_aligns_first() {
        let mut path = winding_path();
        path.toggle_closed();
        path.set_control_mode(ControlMode::Aligned);
        let last = path.number_of_points() - 1;
        let anchor = path.points()[0];
        let distance = anchor.distance(path.points()[1]);
        let target = anchor + Vec3::new(-2.0, 0.0, 1.0);

        path.move_point(last, target).unwrap();

        let opposite = path.points()[1] - anchor;
        assert!((opposite.length() - distance).abs() < 1e-4);
        let moved = (target - anchor).normalize();
        assert!(opposite.normalize().dot(moved) < -0.9999);
    }

    #[test]
    fn test_move_with_auto_controls() {
        let mut path = winding_path();
        path.set_auto_set_control_points(true);
        path.move_point(6, Vec3::new(8.0, 0.0, 0.0)).unwrap();

        let points = path.points();
        let before = points[5] - points[6];
        let after = points[7] - points[6];
        assert!(before.normalize().dot(after.normalize()) < -0.999);
        assert_consistent(&path);
    }

    #[test]
    fn test_move_rejects_bad_index() {
        let mut path = winding_path();
        assert_eq!(
            path.move_point(13, Vec3::ZERO),
            Err(PathEditError::PointOutOfRange { index: 13, len: 13 })
        );
    }

    #[test]
    fn test_set_spacing_resamples() {
        let mut path = straight_path(10.0, 1.0);
        let coarse = path.sample_count();
        path.set_spacing(0.5).unwrap();
        assert!(path.sample_count() > coarse);

        assert!(path.set_spacing(-1.0).is_err());
        assert!(path.set_spacing(f32::NAN).is_err());
        assert_eq!(path.settings().spacing, 0.5);
    }

    #[test]
    fn test_set_spacing_rejects_tiny_spacing() {
        let mut path = straight_path(10.0, 1.0);
        let samples = path.sample_count();

        assert_eq!(path.set_spacing(1e-9), Err(PathEditError::InvalidSpacing(1e-9)));
        assert_eq!(path.settings().spacing, 1.0);
        assert_eq!(path.sample_count(), samples);

        assert!(path.set_spacing(MIN_SPACING).is_ok());
        assert!(BezierPath::with_settings(Vec3::ZERO, PathSettings::default().with_spacing(1e-6))
            .is_err());
    }

    #[test]
    fn test_translate() {
        let mut path = winding_path();
        let before = path.concatenated_points();
        path.translate(Vec3::new(0.0, 0.0, 5.0));

        let after = path.concatenated_points();
        // The last extrapolated sample may flip on rounding.
        assert!(before.len().abs_diff(after.len()) <= 1);
        for (a, b) in before.iter().zip(&after) {
            assert!((*b - *a - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-3);
        }
    }

    #[test]
    fn test_nearest_segment() {
        let path = winding_path();
        let anchor = path.points()[6];
        let near = path.nearest_segment(anchor + Vec3::new(0.0, 0.1, 0.0), 1.0);
        assert!(matches!(near, Some(1) | Some(2)));
        assert_eq!(path.nearest_segment(Vec3::splat(100.0), 1.0), None);
    }

    #[test]
    fn test_segment_accessors() {
        let path = winding_path();
        let segment = path.segment_points(1).unwrap();
        assert_eq!(segment[0], path.points()[3]);
        assert_eq!(segment[3], path.points()[6]);
        assert_eq!(path.segment_points(4), None);
        assert_eq!(path.segment_index_from_anchor(6), 2);
        assert_eq!(path.point(100), None);
    }

    #[test]
    fn test_path_length() {
        let path = straight_path(9.0, 1.0);
        assert!((path.length() - 9.0).abs() < 1e-3);
        assert!((path.segment_length(0).unwrap() - 9.0).abs() < 1e-3);
        assert_eq!(path.segment_length(1), None);

        let winding = winding_path();
        let chords: f32 = (0..4)
            .map(|s| {
                let [start, _, _, end] = winding.segment_points(s).unwrap();
                start.distance(end)
            })
            .sum();
        assert!(winding.length() >= chords);
    }

    #[test]
    fn test_is_anchor() {
        let path = winding_path();
        assert!(path.is_anchor(0));
        assert!(path.is_anchor(12));
        assert!(!path.is_anchor(4));
        assert!(!path.is_anchor(15));
    }

    #[test]
    fn test_ease_system_marks_changed_paths() {
        let mut app = App::new();
        app.add_plugins(PathPlugin);

        let settings = PathSettings::default()
            .with_global_normal_angle(45.0)
            .with_rotation_limits(0.05, 0.0);
        let path = BezierPath::with_settings(Vec3::ZERO, settings).unwrap();
        let entity = app.world_mut().spawn(path).id();

        let before = app.world().get::<BezierPath>(entity).unwrap().concatenated_normals();
        app.update();
        let after = app.world().get::<BezierPath>(entity).unwrap().concatenated_normals();

        let target = crate::geometry::banked_up(45.0);
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert!(a.angle_between(target) < b.angle_between(target));
        }
    }
}
