use bevy::prelude::*;

use crate::path::BezierPath;

use super::mesh_gen::{ribbon_frames, texture_repeat, RoadGeometry};

/// Vertices in one fenced cross-section.
pub const FENCE_VERTICES_PER_RING: usize = 11;

/// Triangles between two consecutive fenced cross-sections.
///
/// The outer top quads sit under the walls and are not emitted.
pub const FENCE_TRIANGLES_PER_SECTION: usize = 22;

/// Largest inset of a wall's inner face, as a fraction of the road width.
pub const MAX_FENCE_INSET: f32 = 0.5;

/// Cross-section of a road with a wall along each edge.
///
/// ```text
///   7----8              9----10    wall tops
///   |    |              |    |
///   0----1------2-------3----4     road top, at +height/2
///   |                        |
///   6------------------------5     bottom, at -height/2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Default)]
pub struct FenceProfile {
    /// Full road width.
    pub width: f32,
    /// Full road thickness.
    pub height: f32,
    /// Wall height, measured from the road's center line; the walls rise
    /// `fence_height / 2` above the road top.
    pub fence_height: f32,
    /// Distance of each wall's inner face from the center line, as a fraction
    /// of the road width, in `0..=0.5`.
    pub fence_inset: f32,
    /// Bank with the path normals instead of staying level.
    pub allow_tilt: bool,
    /// Texture repeat density along the road.
    pub tiling: f32,
}

impl Default for FenceProfile {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            fence_height: 1.0,
            fence_inset: 0.25,
            allow_tilt: true,
            tiling: 1.0,
        }
    }
}

impl FenceProfile {
    /// Set the road width.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Set the road thickness.
    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    /// Set the wall height.
    pub fn with_fence_height(mut self, fence_height: f32) -> Self {
        self.fence_height = fence_height;
        self
    }

    /// Set the wall inset, clamped to `0..=0.5`.
    pub fn with_fence_inset(mut self, fence_inset: f32) -> Self {
        self.fence_inset = fence_inset.clamp(0.0, MAX_FENCE_INSET);
        self
    }

    /// Enable or disable banking with the path normals.
    pub fn with_tilt(mut self, allow_tilt: bool) -> Self {
        self.allow_tilt = allow_tilt;
        self
    }

    /// Set the texture tiling factor.
    pub fn with_tiling(mut self, tiling: f32) -> Self {
        self.tiling = tiling;
        self
    }

    /// How many times the texture repeats along `sample_count` samples spaced
    /// `spacing` apart.
    pub fn texture_repeat(&self, sample_count: usize, spacing: f32) -> f32 {
        texture_repeat(self.tiling, sample_count, spacing)
    }
}

/// Extrude the fenced cross-section along sampled path points.
///
/// Same inputs and wrapping as [`build_road_geometry`](super::build_road_geometry).
pub fn build_fence_geometry(
    points: &[Vec3],
    normals: &[Vec3],
    closed: bool,
    profile: &FenceProfile,
) -> RoadGeometry {
    let count = points.len().min(normals.len());
    if count == 0 {
        return RoadGeometry::default();
    }

    let vertex_count = count * FENCE_VERTICES_PER_RING;
    let sections = if closed { count } else { count - 1 };

    let mut geometry = RoadGeometry {
        positions: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity(sections * FENCE_TRIANGLES_PER_SECTION * 3),
    };

    let half_height = profile.height * 0.5;
    let half_width = profile.width * 0.5;
    let inset = profile.width * profile.fence_inset.clamp(0.0, MAX_FENCE_INSET);
    let wall_top = profile.fence_height * 0.5 + half_height;

    for (point, frame, v) in ribbon_frames(points, normals, closed, profile.allow_tilt) {
        let ring = [
            frame.profile_offset(half_width, half_height),
            frame.profile_offset(inset, half_height),
            frame.profile_offset(0.0, half_height),
            frame.profile_offset(-inset, half_height),
            frame.profile_offset(-half_width, half_height),
            frame.profile_offset(-half_width, -half_height),
            frame.profile_offset(half_width, -half_height),
            frame.profile_offset(half_width, wall_top),
            frame.profile_offset(inset, wall_top),
            frame.profile_offset(-inset, wall_top),
            frame.profile_offset(-half_width, wall_top),
        ];
        geometry.push_ring(point, &ring, v);
    }

    for i in 0..sections {
        let a = (i * FENCE_VERTICES_PER_RING) as u32;
        let b = (((i + 1) % count) * FENCE_VERTICES_PER_RING) as u32;

        // Top, between the walls
        for j in 1..3 {
            geometry
                .indices
                .extend_from_slice(&[a + j, b + j, a + j + 1]);
            geometry
                .indices
                .extend_from_slice(&[a + j + 1, b + j, b + j + 1]);
        }
        // Right
        geometry.indices.extend_from_slice(&[a + 4, b + 5, a + 5]);
        geometry.indices.extend_from_slice(&[a + 4, b + 4, b + 5]);
        // Left
        geometry.indices.extend_from_slice(&[a, b + 6, b]);
        geometry.indices.extend_from_slice(&[a, a + 6, b + 6]);
        // Bottom
        geometry.indices.extend_from_slice(&[a + 6, a + 5, b + 6]);
        geometry.indices.extend_from_slice(&[a + 5, b + 5, b + 6]);

        // Left wall: outer, top, inner
        geometry.indices.extend_from_slice(&[a, b + 7, a + 7]);
        geometry.indices.extend_from_slice(&[a, b, b + 7]);
        geometry.indices.extend_from_slice(&[a + 7, b + 8, a + 8]);
        geometry.indices.extend_from_slice(&[a + 7, b + 7, b + 8]);
        geometry.indices.extend_from_slice(&[a + 8, b + 1, a + 1]);
        geometry.indices.extend_from_slice(&[a + 8, b + 8, b + 1]);

        // Right wall: outer, top, inner
        geometry.indices.extend_from_slice(&[a + 4, b + 10, b + 4]);
        geometry.indices.extend_from_slice(&[a + 4, a + 10, b + 10]);
        geometry.indices.extend_from_slice(&[a + 10, b + 9, b + 10]);
        geometry.indices.extend_from_slice(&[a + 10, a + 9, b + 9]);
        geometry.indices.extend_from_slice(&[a + 9, a + 3, b + 3]);
        geometry.indices.extend_from_slice(&[a + 9, b + 3, b + 9]);
    }

    geometry
}

/// Generate a fenced road mesh from a path's concatenated samples.
///
/// Returns `None` when the path has fewer than two samples.
pub fn generate_fence_mesh(path: &BezierPath, profile: &FenceProfile) -> Option<Mesh> {
    let points = path.concatenated_points();
    if points.len() < 2 {
        return None;
    }
    let normals = path.concatenated_normals();

    let geometry = build_fence_geometry(&points, &normals, path.is_closed(), profile);
    let repeat = profile.texture_repeat(points.len(), path.settings().spacing);
    Some(geometry.into_mesh(repeat))
}

/// Component that defines a fenced road mesh generated along a path.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PathFence {
    /// The path entity to follow.
    pub path: Entity,
    /// Cross-section of the fenced road.
    pub profile: FenceProfile,
    /// Whether to automatically update when the path changes.
    pub auto_update: bool,
}

impl Default for PathFence {
    fn default() -> Self {
        Self {
            path: Entity::PLACEHOLDER,
            profile: FenceProfile::default(),
            auto_update: true,
        }
    }
}

impl PathFence {
    /// Create a new fenced road along `path`.
    pub fn new(path: Entity) -> Self {
        Self { path, ..default() }
    }

    /// Set the cross-section.
    pub fn with_profile(mut self, profile: FenceProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Marker component for the generated fence mesh entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct GeneratedFenceMesh {
    /// The PathFence entity this mesh belongs to.
    pub fence: Entity,
}

/// System to update fence meshes when their paths change.
pub fn update_fence_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    fences: Query<(Entity, Ref<PathFence>, Option<&MeshMaterial3d<StandardMaterial>>)>,
    paths: Query<Ref<BezierPath>>,
    existing_fence_meshes: Query<(), With<GeneratedFenceMesh>>,
    fence_mesh_children: Query<&Children>,
) {
    for (fence_entity, fence, material) in &fences {
        let Ok(path) = paths.get(fence.path) else {
            continue;
        };

        let path_changed = fence.auto_update && path.is_changed();
        if !fence.is_changed() && !path_changed {
            continue;
        }

        let Some(generated) = generate_fence_mesh(&path, &fence.profile) else {
            continue;
        };
        let mesh_handle = meshes.add(generated);
        debug!("regenerated fence mesh for {fence_entity}");

        let found_mesh_entity = fence_mesh_children.get(fence_entity).ok().and_then(|children| {
            children
                .iter()
                .find(|child| existing_fence_meshes.get(*child).is_ok())
        });

        if let Some(mesh_entity) = found_mesh_entity {
            let mut entity_commands = commands.entity(mesh_entity);
            entity_commands.insert(Mesh3d(mesh_handle));
            if let Some(mat) = material {
                entity_commands.insert(mat.clone());
            }
        } else {
            let mut entity_commands = commands.spawn((
                Mesh3d(mesh_handle),
                Transform::default(),
                Visibility::default(),
                GeneratedFenceMesh {
                    fence: fence_entity,
                },
            ));
            if let Some(mat) = material {
                entity_commands.insert(mat.clone());
            }

            let mesh_entity = entity_commands.id();
            commands.entity(fence_entity).add_child(mesh_entity);
        }
    }
}
