//! Conversions between world space and the discrete tile grid.

use bomb_arena_core::CellCoord;
use glam::Vec2;

/// Maps world-space positions onto grid cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    tile_size: f32,
    origin: Vec2,
}

impl GridMetrics {
    /// Creates metrics for square tiles of `tile_size` anchored at `origin`.
    ///
    /// Non-positive or non-finite sizes fall back to unit tiles.
    #[must_use]
    pub fn new(tile_size: f32, origin: Vec2) -> Self {
        let tile_size = if tile_size.is_finite() && tile_size > 0.0 {
            tile_size
        } else {
            1.0
        };
        Self { tile_size, origin }
    }

    /// Side length of a tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World-space center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.origin
            + Vec2::new(
                (cell.column() as f32 + 0.5) * self.tile_size,
                (cell.row() as f32 + 0.5) * self.tile_size,
            )
    }

    /// Cell containing the provided world-space position.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> CellCoord {
        let local = (position - self.origin) / self.tile_size;
        CellCoord::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    /// Rounds a position to the nearest tile center.
    #[must_use]
    pub fn snap(&self, position: Vec2) -> Vec2 {
        self.cell_center(self.cell_at(position))
    }
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self::new(1.0, Vec2::ZERO)
    }
}

/// Wraps one axis of a cell index into the inclusive range `min..=max`.
///
/// Values below `min` reappear at `max` and values above `max` reappear at
/// `min`; values inside the range are returned untouched.
#[must_use]
pub fn wrap_index(value: i32, min: i32, max: i32) -> (i32, bool) {
    if min > max {
        return (value, false);
    }
    if value < min {
        (max, true)
    } else if value > max {
        (min, true)
    } else {
        (value, false)
    }
}
