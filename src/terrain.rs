//! Terrain shaping along a path.
//!
//! The path's samples are stamped into a heightmap as radial brushes, widest
//! pass first, so the ground rises to meet the road.

use bevy::prelude::*;

use crate::path::{BezierPath, PathPlugin};

/// Default falloff of the brush weight.
pub const DEFAULT_BRUSH_FALLOFF: f32 = 0.3;

/// Default brush radii (in heightmap cells), one pass each.
pub const DEFAULT_PASS_RADII: [i32; 3] = [15, 7, 2];

/// Square grid of normalized heights.
///
/// Row `r` runs along world Z and column `c` along world X. A height of `0.0`
/// is the terrain origin and `1.0` is the top of the terrain volume.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Heightmap {
    resolution: usize,
    heights: Vec<f32>,
}

impl Heightmap {
    /// Flat heightmap of `resolution × resolution` cells.
    pub fn flat(resolution: usize, height: f32) -> Self {
        Self {
            resolution,
            heights: vec![height; resolution * resolution],
        }
    }

    /// Heightmap from row-major heights.
    ///
    /// Returns `None` unless `heights.len() == resolution²`.
    pub fn from_heights(resolution: usize, heights: Vec<f32>) -> Option<Self> {
        (heights.len() == resolution * resolution).then_some(Self {
            resolution,
            heights,
        })
    }

    /// Cells per side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Row-major heights.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Height at a cell.
    pub fn get(&self, row: usize, column: usize) -> Option<f32> {
        (row < self.resolution && column < self.resolution)
            .then(|| self.heights[row * self.resolution + column])
    }

    fn cell_mut(&mut self, row: i32, column: i32) -> Option<&mut f32> {
        let resolution = self.resolution as i32;
        if row < 0 || column < 0 || row >= resolution || column >= resolution {
            return None;
        }
        self.heights
            .get_mut(row as usize * self.resolution + column as usize)
    }
}

/// Sample points of a path ordered from highest to lowest.
///
/// Raising sequentially in path order would let a low point undercut a higher
/// one painted before it.
pub fn brush_strokes(path: &BezierPath) -> Vec<Vec3> {
    let mut strokes = path.concatenated_points();
    strokes.sort_by(|a, b| b.y.total_cmp(&a.y));
    strokes
}

/// Stamps path samples into a heightmap.
#[derive(Debug, Clone, PartialEq, Reflect)]
#[reflect(Default)]
pub struct TerrainShaper {
    /// World position of the terrain's minimum corner.
    pub origin: Vec3,
    /// World extent of the terrain volume.
    pub size: Vec3,
    /// Falloff of the exponential brush weight.
    pub brush_falloff: f32,
    /// Brush radius of each pass, in cells.
    pub pass_radii: Vec<i32>,
}

impl Default for TerrainShaper {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            size: Vec3::new(100.0, 20.0, 100.0),
            brush_falloff: DEFAULT_BRUSH_FALLOFF,
            pass_radii: DEFAULT_PASS_RADII.to_vec(),
        }
    }
}

impl TerrainShaper {
    /// Shaper for a terrain volume.
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self {
            origin,
            size,
            ..default()
        }
    }

    /// Set the brush falloff.
    pub fn with_brush_falloff(mut self, falloff: f32) -> Self {
        self.brush_falloff = falloff;
        self
    }

    /// Set the pass radii.
    pub fn with_pass_radii(mut self, radii: impl Into<Vec<i32>>) -> Self {
        self.pass_radii = radii.into();
        self
    }

    /// Shape a copy of `original` along `strokes`.
    ///
    /// `strokes` should already be sorted highest first, see [`brush_strokes`].
    pub fn shape(&self, original: &Heightmap, strokes: &[Vec3]) -> Heightmap {
        let mut heights = original.clone();
        let resolution = original.resolution as f32;

        for &radius in &self.pass_radii {
            for stroke in strokes {
                let local = stroke - self.origin;
                let target = local.y / self.size.y;
                let column = (local.x / self.size.x) * resolution;
                let row = (local.z / self.size.z) * resolution;
                if !column.is_finite() || !row.is_finite() || column < 0.0 || row < 0.0 {
                    continue;
                }
                self.stamp(&mut heights, radius, row as i32, column as i32, target);
            }
        }

        heights
    }

    fn stamp(&self, heights: &mut Heightmap, radius: i32, row: i32, column: i32, target: f32) {
        let Some(center) = heights.cell_mut(row, column).map(|h| *h) else {
            return;
        };
        let delta = target - center;
        let radius_squared = radius * radius;

        for offset_row in -radius..=radius {
            for offset_column in -radius..=radius {
                let distance_squared = offset_row * offset_row + offset_column * offset_column;
                if distance_squared > radius_squared {
                    continue;
                }

                let t = if radius > 0 {
                    (distance_squared as f32).sqrt() / radius as f32
                } else {
                    0.0
                };
                let weight = (-t * t / self.brush_falloff).exp();

                if let Some(height) = heights.cell_mut(row + offset_row, column + offset_column) {
                    *height = (*height + delta * weight).min(target);
                }
            }
        }
    }
}

/// Keeps a heightmap shaped to a path.
///
/// The original heights are kept so every reshape starts from scratch.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PathTerrain {
    /// The path entity to follow.
    pub path: Entity,
    /// Brush configuration.
    pub shaper: TerrainShaper,
    /// Heights before any shaping.
    pub original: Heightmap,
    /// Heights after the last reshape.
    pub shaped: Heightmap,
}

impl PathTerrain {
    /// Terrain following `path`, starting from `original`.
    pub fn new(path: Entity, shaper: TerrainShaper, original: Heightmap) -> Self {
        Self {
            path,
            shaper,
            shaped: original.clone(),
            original,
        }
    }
}

/// Plugin that reshapes [`PathTerrain`] heightmaps when their paths change.
pub struct PathTerrainPlugin;

impl Plugin for PathTerrainPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<PathPlugin>() {
            app.add_plugins(PathPlugin);
        }

        app.register_type::<PathTerrain>()
            .register_type::<TerrainShaper>()
            .register_type::<Heightmap>()
            .add_systems(Update, shape_path_terrain);
    }
}

/// System that reshapes terrain whose path or configuration changed.
pub fn shape_path_terrain(
    mut terrains: Query<(Entity, &mut PathTerrain)>,
    paths: Query<Ref<BezierPath>>,
) {
    for (entity, mut terrain) in &mut terrains {
        let Ok(path) = paths.get(terrain.path) else {
            continue;
        };
        if !path.is_changed() && !terrain.is_changed() {
            continue;
        }

        let strokes = brush_strokes(&path);
        let terrain = terrain.bypass_change_detection();
        terrain.shaped = terrain.shaper.shape(&terrain.original, &strokes);
        debug!("reshaped terrain {entity} from {} strokes", strokes.len());
    }
}
