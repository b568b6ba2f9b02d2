//! Shared numeric constants for the map engine.

/// Minimum camera zoom factor.
pub const MIN_ZOOM: f64 = 0.25;

/// Maximum camera zoom factor.
pub const MAX_ZOOM: f64 = 4.0;

/// Default grid cell size in world units when a map omits or corrupts it.
pub const DEFAULT_CELL_SIZE: f64 = 50.0;

/// In-fiction distance represented by one grid cell, in feet.
pub const FEET_PER_CELL: f64 = 5.0;

/// Screen-pixel radius within which a new wall endpoint snaps onto an
/// existing wall endpoint instead of the nearest grid intersection.
pub const WALL_SNAP_PX: f64 = 8.0;

/// Default token vision range in cells when a token does not specify one.
pub const DEFAULT_VISION_RANGE: u32 = 24;

/// Sampling step, in cells, used when collecting the cells a straight-line
/// movement path touches. Small enough that no crossed cell is skipped for
/// any path between cell centers.
pub const PATH_SAMPLE_STEP: f64 = 0.125;
