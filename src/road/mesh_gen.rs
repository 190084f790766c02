use bevy::{
    mesh::{Indices, PrimitiveTopology},
    prelude::*,
};

use crate::geometry::RibbonFrame;
use crate::path::BezierPath;

use super::{GeneratedRoadMesh, PathRoad};

/// Vertices in one road cross-section.
pub const VERTICES_PER_RING: usize = 7;

/// Triangles between two consecutive cross-sections.
pub const TRIANGLES_PER_SECTION: usize = 14;

/// Quads across the top surface of the road.
const TOP_SECTIONS: u32 = 4;

/// Cross-section of the road ribbon.
///
/// ```text
///   0----1----2----3----4      top, at +height/2 along the normal
///   |                   |
///   6-------------------5      bottom, at -height/2
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Default)]
pub struct RoadProfile {
    /// Full road width.
    pub width: f32,
    /// Full road thickness.
    pub height: f32,
    /// Bank the road with the path normals instead of keeping it level.
    pub allow_tilt: bool,
    /// Texture repeat density along the road.
    pub tiling: f32,
}

impl Default for RoadProfile {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            allow_tilt: true,
            tiling: 1.0,
        }
    }
}

impl RoadProfile {
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

    /// How many times the texture repeats along a road of `sample_count`
    /// samples spaced `spacing` apart.
    pub fn texture_repeat(&self, sample_count: usize, spacing: f32) -> f32 {
        texture_repeat(self.tiling, sample_count, spacing)
    }
}

pub(crate) fn texture_repeat(tiling: f32, sample_count: usize, spacing: f32) -> f32 {
    (tiling * sample_count as f32 * spacing * 0.05).round()
}

/// Raw buffers of a road ribbon.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadGeometry {
    /// Vertex positions, [`VERTICES_PER_RING`] per sample.
    pub positions: Vec<[f32; 3]>,
    /// Texture coordinates, one per vertex.
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
}

impl RoadGeometry {
    /// Append one cross-section, spreading U across the ring.
    pub(crate) fn push_ring(&mut self, point: Vec3, ring: &[Vec3], v: f32) {
        let divisions = (ring.len() + 1) as f32;
        for (j, offset) in ring.iter().enumerate() {
            self.positions.push((point + *offset).to_array());
            let percent = j as f32 / divisions;
            self.uvs.push([1.0 - (2.0 * percent - 1.0).abs(), v]);
        }
    }

    /// Build a triangle-list mesh, repeating the texture `repeat` times along V.
    pub(crate) fn into_mesh(mut self, repeat: f32) -> Mesh {
        if repeat > 0.0 {
            for uv in &mut self.uvs {
                uv[1] *= repeat;
            }
        }

        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs);
        mesh.insert_indices(Indices::U32(self.indices));
        mesh.compute_normals();
        mesh
    }
}

/// Frame and V coordinate of every sample along a ribbon.
///
/// Forward is the sum of the differences to both neighbours; V rises from 0 at
/// the ends to 1 in the middle.
pub(crate) fn ribbon_frames<'a>(
    points: &'a [Vec3],
    normals: &'a [Vec3],
    closed: bool,
    allow_tilt: bool,
) -> impl Iterator<Item = (Vec3, RibbonFrame, f32)> + 'a {
    let count = points.len().min(normals.len());
    (0..count).map(move |i| {
        let point = points[i];

        let mut forward = Vec3::ZERO;
        if i + 1 < count || closed {
            forward += points[(i + 1) % count] - point;
        }
        if i > 0 || closed {
            forward += point - points[(i + count - 1) % count];
        }

        let up = if allow_tilt { normals[i] } else { Vec3::Y };

        let completion = if count > 1 {
            i as f32 / (count - 1) as f32
        } else {
            0.0
        };
        let v = 1.0 - (2.0 * completion - 1.0).abs();

        (point, RibbonFrame::new(forward, up), v)
    })
}

/// Extrude the road cross-section along sampled path points.
///
/// `normals` must have one entry per point. With `closed` the last ring is
/// stitched back to the first.
pub fn build_road_geometry(
    points: &[Vec3],
    normals: &[Vec3],
    closed: bool,
    profile: &RoadProfile,
) -> RoadGeometry {
    let count = points.len().min(normals.len());
    if count == 0 {
        return RoadGeometry::default();
    }

    let vertex_count = count * VERTICES_PER_RING;
    let sections = if closed { count } else { count - 1 };

    let mut geometry = RoadGeometry {
        positions: Vec::with_capacity(vertex_count),
        uvs: Vec::with_capacity(vertex_count),
        indices: Vec::with_capacity(sections * TRIANGLES_PER_SECTION * 3),
    };

    let half_height = profile.height * 0.5;
    let half_width = profile.width * 0.5;
    let quarter_width = profile.width * 0.25;

    for (point, frame, v) in ribbon_frames(points, normals, closed, profile.allow_tilt) {
        let ring = [
            frame.profile_offset(half_width, half_height),
            frame.profile_offset(quarter_width, half_height),
            frame.profile_offset(0.0, half_height),
            frame.profile_offset(-quarter_width, half_height),
            frame.profile_offset(-half_width, half_height),
            frame.profile_offset(-half_width, -half_height),
            frame.profile_offset(half_width, -half_height),
        ];
        geometry.push_ring(point, &ring, v);
    }

    for i in 0..sections {
        let a = (i * VERTICES_PER_RING) as u32;
        let b = (((i + 1) % count) * VERTICES_PER_RING) as u32;

        // Top
        for j in 0..TOP_SECTIONS {
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
    }

    geometry
}

/// Generate a road mesh from a path's concatenated samples.
///
/// Returns `None` when the path has fewer than two samples.
pub fn generate_road_mesh(path: &BezierPath, profile: &RoadProfile) -> Option<Mesh> {
    let points = path.concatenated_points();
    if points.len() < 2 {
        return None;
    }
    let normals = path.concatenated_normals();

    let geometry = build_road_geometry(&points, &normals, path.is_closed(), profile);
    let repeat = profile.texture_repeat(points.len(), path.settings().spacing);
    Some(geometry.into_mesh(repeat))
}

/// System to update road meshes when their paths change.
pub fn update_road_meshes(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    roads: Query<(Entity, Ref<PathRoad>, Option<&MeshMaterial3d<StandardMaterial>>)>,
    paths: Query<Ref<BezierPath>>,
    existing_road_meshes: Query<(), With<GeneratedRoadMesh>>,
    road_mesh_children: Query<&Children>,
) {
    for (road_entity, road, material) in &roads {
        let Ok(path) = paths.get(road.path) else {
            continue;
        };

        let path_changed = road.auto_update && path.is_changed();
        if !road.is_changed() && !path_changed {
            continue;
        }

        let Some(generated) = generate_road_mesh(&path, &road.profile) else {
            continue;
        };
        let mesh_handle = meshes.add(generated);
        debug!("regenerated road mesh for {road_entity}");

        let found_mesh_entity = road_mesh_children.get(road_entity).ok().and_then(|children| {
            children
                .iter()
                .find(|child| existing_road_meshes.get(*child).is_ok())
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
                GeneratedRoadMesh { road: road_entity },
            ));
            if let Some(mat) = material {
                entity_commands.insert(mat.clone());
            }

            let mesh_entity = entity_commands.id();
            commands.entity(road_entity).add_child(mesh_entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight(count: usize) -> (Vec<Vec3>, Vec<Vec3>) {
        let points = (0..count).map(|i| Vec3::new(0.0, 0.0, i as f32)).collect();
        (points, vec![Vec3::Y; count])
    }

    #[test]
    fn test_open_road_buffer_sizes() {
        let (points, normals) = straight(5);
        let geometry = build_road_geometry(&points, &normals, false, &RoadProfile::default());

        assert_eq!(geometry.positions.len(), 5 * VERTICES_PER_RING);
        assert_eq!(geometry.uvs.len(), geometry.positions.len());
        assert_eq!(geometry.indices.len(), 4 * TRIANGLES_PER_SECTION * 3);
        let max = *geometry.indices.iter().max().unwrap() as usize;
        assert!(max < geometry.positions.len());
    }

    #[test]
    fn test_closed_road_wraps() {
        let (points, normals) = straight(5);
        let geometry = build_road_geometry(&points, &normals, true, &RoadProfile::default());

        assert_eq!(geometry.indices.len(), 5 * TRIANGLES_PER_SECTION * 3);
        // The last section refers back to the first ring.
        let last_section = &geometry.indices[4 * TRIANGLES_PER_SECTION * 3..];
        assert!(last_section.iter().any(|&i| (i as usize) < VERTICES_PER_RING));
    }

    #[test]
    fn test_cross_section_layout() {
        let (points, normals) = straight(2);
        let profile = RoadProfile::default().with_width(4.0).with_height(2.0);
        let geometry = build_road_geometry(&points, &normals, false, &profile);

        // Travelling +Z with +Y up puts "left" on -X.
        assert_eq!(geometry.positions[0], [-2.0, 1.0, 0.0]);
        assert_eq!(geometry.positions[1], [-1.0, 1.0, 0.0]);
        assert_eq!(geometry.positions[2], [0.0, 1.0, 0.0]);
        assert_eq!(geometry.positions[4], [2.0, 1.0, 0.0]);
        assert_eq!(geometry.positions[5], [2.0, -1.0, 0.0]);
        assert_eq!(geometry.positions[6], [-2.0, -1.0, 0.0]);
    }

    #[test]
    fn test_tilt_follows_normals() {
        let points = vec![Vec3::ZERO, Vec3::Z];
        let normals = vec![Vec3::X; 2];

        let tilted = build_road_geometry(&points, &normals, false, &RoadProfile::default());
        assert_eq!(tilted.positions[2], [0.5, 0.0, 0.0]);

        let level = build_road_geometry(
            &points,
            &normals,
            false,
            &RoadProfile::default().with_tilt(false),
        );
        assert_eq!(level.positions[2], [0.0, 0.5, 0.0]);
    }

    #[test]
    fn test_uv_v_peaks_mid_road() {
        let (points, normals) = straight(3);
        let geometry = build_road_geometry(&points, &normals, false, &RoadProfile::default());

        assert_eq!(geometry.uvs[0][1], 0.0);
        assert_eq!(geometry.uvs[VERTICES_PER_RING][1], 1.0);
        assert_eq!(geometry.uvs[2 * VERTICES_PER_RING][1], 0.0);
    }

    #[test]
    fn test_empty_input() {
        let geometry = build_road_geometry(&[], &[], false, &RoadProfile::default());
        assert!(geometry.positions.is_empty());
        assert!(geometry.indices.is_empty());
    }

    #[test]
    fn test_generate_road_mesh_from_path() {
        let mut path = BezierPath::new(Vec3::ZERO);
        path.add_segment(Vec3::new(4.0, 0.0, 2.0)).unwrap();

        let mesh = generate_road_mesh(&path, &RoadProfile::default()).unwrap();
        assert_eq!(mesh.count_vertices(), path.sample_count() * VERTICES_PER_RING);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
    }

    #[test]
    fn test_texture_repeat() {
        let profile = RoadProfile::default().with_tiling(2.0);
        assert_eq!(profile.texture_repeat(100, 1.0), 10.0);
    }
}
