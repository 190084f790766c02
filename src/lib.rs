//! # bevy_kart_path
//!
//! A Bevy plugin for authoring banked race-track paths from cubic Bézier
//! segments.
//!
//! ## Features
//!
//! - Piecewise cubic Bézier paths, open or closed
//! - Structural edits: append, split and delete segments, open/close the loop
//! - Free, aligned and mirrored control points, or fully automatic ones
//! - Evenly spaced samples with tangents and banked normals per segment
//! - Local banking around an anchor and global banking, eased frame by frame
//! - Road and fenced road meshes, and terrain shaping along the samples
//!
//! ## Quick Start
//!
//! ```ignore
//! use bevy::prelude::*;
//! use bevy_kart_path::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(PathPlugin)
//!         .add_plugins(PathRoadPlugin)     // Optional: road meshes along paths
//!         .add_plugins(PathEditorPlugin)   // Optional: command-driven editing
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(mut commands: Commands) {
//!     let mut path = BezierPath::new(Vec3::ZERO);
//!     path.add_segment(Vec3::new(10.0, 0.0, 5.0)).unwrap();
//!     path.rotate_local_normals(3, 25.0).unwrap();
//!
//!     let path = commands.spawn(path).id();
//!     commands.spawn(PathRoad::new(path).with_profile(RoadProfile::default().with_width(6.0)));
//! }
//! ```
//!
//! ## Plugins
//!
//! - [`PathPlugin`]: Path type registration and normal easing (required)
//! - [`PathRoadPlugin`]: Road and fence meshes along paths (optional)
//! - [`PathTerrainPlugin`]: Heightmaps shaped along paths (optional)
//! - [`PathEditorPlugin`]: Applies [`editor::PathCommand`]s sent as messages (optional)

pub mod bezier;
pub mod error;
pub mod geometry;
pub mod path;
pub mod road;
pub mod terrain;

#[cfg(feature = "editor")]
pub mod editor;

pub use error::{PathEditError, PathResult};
pub use path::PathPlugin;
pub use road::PathRoadPlugin;
pub use terrain::PathTerrainPlugin;

#[cfg(feature = "editor")]
pub use editor::PathEditorPlugin;

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::error::{PathEditError, PathResult};
    pub use crate::path::{
        AxisConstraint, Banking, BezierPath, ControlMode, PathPlugin, PathSample, PathSettings,
        Spline,
    };
    pub use crate::road::{
        build_fence_geometry, build_road_geometry, generate_fence_mesh, generate_road_mesh,
        FenceProfile, GeneratedFenceMesh, GeneratedRoadMesh, PathFence, PathRoad, PathRoadPlugin,
        RoadGeometry, RoadProfile,
    };
    pub use crate::terrain::{
        brush_strokes, Heightmap, PathTerrain, PathTerrainPlugin, TerrainShaper,
    };

    #[cfg(feature = "editor")]
    pub use crate::editor::{
        EditorSettings, PathCommand, PathCommandMessage, PathCommandRejected, PathEditorPlugin,
    };
}
