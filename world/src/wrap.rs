//! Derivation of the toroidal wrap domain from the indestructible layer.

use std::collections::BTreeMap;

use bomb_arena_core::{CellCoord, TileId};

use crate::grid::wrap_index;

/// Inclusive rectangle of cells within which off-edge movement wraps around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WrapDomain {
    min: CellCoord,
    max: CellCoord,
}

impl WrapDomain {
    /// Creates a domain spanning `min..=max` on both axes.
    #[must_use]
    pub const fn new(min: CellCoord, max: CellCoord) -> Self {
        Self { min, max }
    }

    /// Upper-left cell of the domain.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Lower-right cell of the domain.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Reports whether the cell lies inside the domain.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        (self.min.column()..=self.max.column()).contains(&cell.column())
            && (self.min.row()..=self.max.row()).contains(&cell.row())
    }

    /// Maps a cell outside the domain onto the opposite edge.
    ///
    /// Each axis wraps independently, so a diagonal overshoot wraps both.
    #[must_use]
    pub fn wrap_cell(&self, cell: CellCoord) -> (CellCoord, bool) {
        let (column, column_wrapped) =
            wrap_index(cell.column(), self.min.column(), self.max.column());
        let (row, row_wrapped) = wrap_index(cell.row(), self.min.row(), self.max.row());
        (
            CellCoord::new(column, row),
            column_wrapped || row_wrapped,
        )
    }

    /// Derives the traversable interior from an indestructible layer.
    ///
    /// Fully solid border rows and columns are trimmed from the layer's
    /// bounding rectangle. Returns `None` when there is no layer or when
    /// nothing remains after trimming.
    pub(crate) fn derive(layer: Option<&BTreeMap<CellCoord, TileId>>) -> Option<Self> {
        let layer = layer?;
        let mut cells = layer.keys();
        let first = cells.next()?;
        let (mut min_column, mut max_column) = (first.column(), first.column());
        let (mut min_row, mut max_row) = (first.row(), first.row());
        for cell in cells {
            min_column = min_column.min(cell.column());
            max_column = max_column.max(cell.column());
            min_row = min_row.min(cell.row());
            max_row = max_row.max(cell.row());
        }

        let solid_row = |row: i32, from: i32, to: i32| {
            (from..=to).all(|column| layer.contains_key(&CellCoord::new(column, row)))
        };
        let solid_column = |column: i32, from: i32, to: i32| {
            (from..=to).all(|row| layer.contains_key(&CellCoord::new(column, row)))
        };

        while min_row <= max_row && solid_row(min_row, min_column, max_column) {
            min_row += 1;
        }
        while max_row >= min_row && solid_row(max_row, min_column, max_column) {
            max_row -= 1;
        }
        while min_column <= max_column && solid_column(min_column, min_row, max_row) {
            min_column += 1;
        }
        while max_column >= min_column && solid_column(max_column, min_row, max_row) {
            max_column -= 1;
        }

        if min_row > max_row || min_column > max_column {
            return None;
        }

        Some(Self::new(
            CellCoord::new(min_column, min_row),
            CellCoord::new(max_column, max_row),
        ))
    }
}
