mod fence;
mod mesh_gen;

pub use fence::*;
pub use mesh_gen::*;

use bevy::prelude::*;

use crate::path::PathPlugin;

/// Plugin for generating road and fence meshes along paths.
///
/// A road is a ribbon with a seven-vertex cross-section extruded through the
/// path's evenly spaced samples. With [`RoadProfile::allow_tilt`] the ribbon
/// banks with the sample normals:
///
/// ```text
///        up (sample normal)
///        │
///   0────1────2────3────4
///   │                   │
///   6───────────────────5
///        │
///        ▼ forward (along the samples)
/// ```
///
/// A [`PathFence`] extrudes the same road with a wall along each edge, see
/// [`FenceProfile`].
///
/// # Usage
///
/// ```ignore
/// use bevy_kart_path::prelude::*;
///
/// fn setup(mut commands: Commands) {
///     let path = commands.spawn(BezierPath::new(Vec3::ZERO)).id();
///
///     commands.spawn(PathRoad {
///         path,
///         profile: RoadProfile::default().with_width(6.0).with_height(0.5),
///         ..default()
///     });
/// }
/// ```
pub struct PathRoadPlugin;

impl Plugin for PathRoadPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PathPlugin>() {
            app.add_plugins(PathPlugin);
        }

        app.register_type::<PathRoad>()
            .register_type::<RoadProfile>()
            .register_type::<PathFence>()
            .register_type::<FenceProfile>()
            .add_systems(
                Update,
                (mesh_gen::update_road_meshes, fence::update_fence_meshes),
            );
    }
}

/// Component that defines a road mesh generated along a path.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PathRoad {
    /// The path entity to follow.
    pub path: Entity,
    /// Cross-section of the road.
    pub profile: RoadProfile,
    /// Whether to automatically update when the path changes.
    pub auto_update: bool,
}

impl Default for PathRoad {
    fn default() -> Self {
        Self {
            path: Entity::PLACEHOLDER,
            profile: RoadProfile::default(),
            auto_update: true,
        }
    }
}

impl PathRoad {
    /// Create a new road along `path`.
    pub fn new(path: Entity) -> Self {
        Self { path, ..default() }
    }

    /// Set the cross-section.
    pub fn with_profile(mut self, profile: RoadProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Marker component for the generated road mesh entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct GeneratedRoadMesh {
    /// The PathRoad entity this mesh belongs to.
    pub road: Entity,
}
