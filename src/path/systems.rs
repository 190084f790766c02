use bevy::prelude::*;

use super::BezierPath;

/// System that eases every path's normals one step toward their banked targets.
///
/// Change detection is bypassed for the check so that only paths whose normals
/// actually moved are marked changed.
pub fn ease_path_normals(mut paths: Query<(Entity, &mut BezierPath)>) {
    for (entity, mut path) in &mut paths {
        if path.bypass_change_detection().rotate_global_normals() {
            trace!("normals of path {entity} still easing");
            path.set_changed();
        }
    }
}
