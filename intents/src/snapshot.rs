//! Persisted map shape, shared by save files and network hydration.
//!
//! The snapshot is the camelCase JSON document both sides agree on: the
//! world's definition plus tokens, walls, terrain, light sources, the
//! explored fog layer, and the ambient light. The visible fog set is never
//! persisted; it is recomputed after every load.
//!
//! Loading is best-effort by policy: a broken map file must not block a
//! session. Missing or invalid grid config falls back to the default cell
//! size, off-map tokens are clamped back into bounds, and degenerate walls
//! are dropped. [`MapSnapshot::into_world`] therefore returns a world, never
//! an error.

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tabletop::fog::FogOfWar;
use tabletop::grid::{Cell, Grid};
use tabletop::world::{
    AmbientLight, LightAnchor, LightSource, MapDefinition, TerrainCell, Token, WallSegment,
    WorldModel,
};

/// Fallback map extent, in cells, when a snapshot carries no usable size.
const DEFAULT_MAP_CELLS: f64 = 20.0;

/// The explored fog layer as persisted. `visible` is deliberately absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FogSnapshot {
    #[serde(default)]
    pub explored: Vec<Cell>,
}

/// One map, in the exact shape written to disk and sent to joining clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Missing grid config loads as the default grid.
    #[serde(default)]
    pub grid: Option<Grid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub wall_segments: Vec<WallSegment>,
    #[serde(default)]
    pub terrain: Vec<TerrainCell>,
    #[serde(default)]
    pub lights: Vec<LightSource>,
    #[serde(default)]
    pub fog_of_war: FogSnapshot,
    #[serde(default)]
    pub ambient_light: AmbientLight,
}

impl MapSnapshot {
    /// Capture the current world and explored layer.
    #[must_use]
    pub fn from_world(world: &WorldModel, fog: &FogOfWar) -> Self {
        Self {
            id: world.map.id,
            width: world.map.width,
            height: world.map.height,
            grid: Some(world.map.grid),
            image_path: world.map.image_path.clone(),
            tokens: world.tokens().cloned().collect(),
            wall_segments: world.walls().cloned().collect(),
            terrain: world.terrain().copied().collect(),
            lights: world.lights().cloned().collect(),
            fog_of_war: FogSnapshot { explored: fog.explored().iter().copied().collect() },
            ambient_light: world.ambient(),
        }
    }

    /// Rebuild a world and fog layer, repairing whatever the snapshot got
    /// wrong rather than failing the load.
    #[must_use]
    pub fn into_world(self) -> (WorldModel, FogOfWar) {
        let grid = self.grid.map_or_else(Grid::default, |g| Grid::new(g.cell_size, g.offset_x, g.offset_y));
        let width = sanitized_extent(self.width, grid.cell_size);
        let height = sanitized_extent(self.height, grid.cell_size);

        let map = MapDefinition {
            id: self.id,
            width,
            height,
            grid,
            image_path: self.image_path,
        };
        let mut world = WorldModel::new(map);

        for mut token in self.tokens {
            token.size_x = token.size_x.max(1);
            token.size_y = token.size_y.max(1);
            token.cell = clamp_footprint(&world.map, token.cell, token.size_x, token.size_y);
            // A token that still does not fit (footprint wider than the map)
            // is dropped, matching the degenerate-wall policy below.
            let _ = world.place_token(token);
        }
        for wall in self.wall_segments {
            // Zero-length walls never make it into the model.
            let _ = world.place_wall(wall);
        }
        for terrain in self.terrain {
            if world.map.contains_cell(terrain.cell) {
                world.set_terrain(terrain);
            }
        }
        for light in self.lights {
            // A light whose anchor no longer resolves (its token was dropped
            // above, or its fixed cell is off the map) is dropped with it.
            let resolvable = match light.anchor {
                LightAnchor::Token(id) => world.token(id).is_some(),
                LightAnchor::Fixed(cell) => world.map.contains_cell(cell),
            };
            if resolvable {
                world.set_light(light);
            }
        }
        world.set_ambient(self.ambient_light);

        let fog = FogOfWar::from_explored(
            self.fog_of_war.explored.into_iter().filter(|c| world.map.contains_cell(*c)),
        );
        (world, fog)
    }
}

/// A usable map extent: finite and at least one cell, else the fallback.
fn sanitized_extent(extent: f64, cell_size: f64) -> f64 {
    if extent.is_finite() && extent >= cell_size {
        extent
    } else {
        DEFAULT_MAP_CELLS * cell_size
    }
}

/// Clamp a token's top-left cell so its footprint stays on the map.
fn clamp_footprint(map: &MapDefinition, cell: Cell, size_x: u32, size_y: u32) -> Cell {
    #[allow(clippy::cast_possible_wrap)]
    let (sx, sy) = (size_x as i32, size_y as i32);
    Cell {
        x: cell.x.clamp(0, (map.cols() - sx).max(0)),
        y: cell.y.clamp(0, (map.rows() - sy).max(0)),
    }
}
