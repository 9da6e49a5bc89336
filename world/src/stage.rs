//! Runtime stage state: tile layers, crumbling tiles and the hidden-item reveal order.

use std::{
    cell::OnceCell,
    collections::{BTreeMap, VecDeque},
    time::Duration,
};

use bomb_arena_core::{tiles, CellCoord, Direction, ItemKind, StageLayout, TileId};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::wrap::WrapDomain;

/// Destination produced by taking a single step across the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepTarget {
    /// The step lands on a cell inside the raw stage bounds.
    Inside(CellCoord),
    /// The step crossed the wrap seam and reappears on the opposite edge.
    Wrapped {
        /// Out-of-domain cell the step attempted to enter.
        raw: CellCoord,
        /// Cell the step actually lands on.
        cell: CellCoord,
    },
    /// The step leaves the stage and no wrap domain catches it.
    Outside,
}

#[derive(Clone, Copy, Debug)]
struct Crumble {
    remaining: Duration,
    reveal: Option<ItemKind>,
}

/// Authoritative tile state of the active stage.
#[derive(Debug)]
pub struct Stage {
    columns: u32,
    rows: u32,
    indestructible: Option<BTreeMap<CellCoord, TileId>>,
    destructible: BTreeMap<CellCoord, TileId>,
    ground: BTreeMap<CellCoord, TileId>,
    items: BTreeMap<CellCoord, ItemKind>,
    crumbling: BTreeMap<CellCoord, Crumble>,
    reveal_order: VecDeque<Option<ItemKind>>,
    wrap: OnceCell<Option<WrapDomain>>,
}

impl Stage {
    /// Builds the runtime stage from a static layout.
    ///
    /// Hidden items are mixed with empty slots, one slot per destructible
    /// tile, and shuffled with the layout seed. Each cleared tile consumes the
    /// next slot.
    #[must_use]
    pub fn from_layout(layout: StageLayout) -> Self {
        let StageLayout {
            columns,
            rows,
            indestructible,
            destructible,
            ground,
            items,
            hidden_items,
            seed,
        } = layout;

        if hidden_items.len() > destructible.len() {
            log::warn!(
                "stage hides {} items under {} destructible tiles; the surplus never surfaces",
                hidden_items.len(),
                destructible.len()
            );
        }

        let mut slots: Vec<Option<ItemKind>> = hidden_items.into_iter().map(Some).collect();
        slots.resize(slots.len().max(destructible.len()), None);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        slots.shuffle(&mut rng);

        Self {
            columns,
            rows,
            indestructible,
            destructible,
            ground,
            items,
            crumbling: BTreeMap::new(),
            reveal_order: slots.into(),
            wrap: OnceCell::new(),
        }
    }

    /// Number of columns in the stage.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the stage.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the raw stage bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= 0
            && cell.row() >= 0
            && (cell.column() as u32) < self.columns
            && (cell.row() as u32) < self.rows
    }

    /// Indestructible tile at the cell, if any.
    #[must_use]
    pub fn indestructible(&self, cell: CellCoord) -> Option<TileId> {
        self.indestructible
            .as_ref()
            .and_then(|layer| layer.get(&cell).copied())
    }

    /// Destructible tile at the cell, if any. Crumbling tiles are not included.
    #[must_use]
    pub fn destructible(&self, cell: CellCoord) -> Option<TileId> {
        self.destructible.get(&cell).copied()
    }

    /// Ground tile at the cell, if any.
    #[must_use]
    pub fn ground(&self, cell: CellCoord) -> Option<TileId> {
        self.ground.get(&cell).copied()
    }

    /// Item pickup resting on the cell, if any.
    #[must_use]
    pub fn item(&self, cell: CellCoord) -> Option<ItemKind> {
        self.items.get(&cell).copied()
    }

    /// Reports whether a cleared destructible tile is still crumbling on the cell.
    #[must_use]
    pub fn is_crumbling(&self, cell: CellCoord) -> bool {
        self.crumbling.contains_key(&cell)
    }

    /// Number of destructible tiles left on the stage.
    #[must_use]
    pub fn destructible_count(&self) -> usize {
        self.destructible.len()
    }

    /// Iterator over the item pickups lying on the stage.
    pub fn items(&self) -> impl Iterator<Item = (CellCoord, ItemKind)> + '_ {
        self.items.iter().map(|(cell, item)| (*cell, *item))
    }

    /// Iterator over the destructible tiles still standing.
    pub fn destructibles(&self) -> impl Iterator<Item = (CellCoord, TileId)> + '_ {
        self.destructible.iter().map(|(cell, tile)| (*cell, *tile))
    }

    /// Wrap domain of the stage, derived on first use.
    ///
    /// A stage without a usable indestructible layer logs a single warning
    /// and never wraps.
    pub fn wrap_domain(&self) -> Option<WrapDomain> {
        *self.wrap.get_or_init(|| {
            let domain = WrapDomain::derive(self.indestructible.as_ref());
            if domain.is_none() {
                log::warn!(
                    "stage has no resolvable indestructible interior; wrapping disabled"
                );
            }
            domain
        })
    }

    /// Resolves a single step from `from` along `direction`.
    ///
    /// Indestructible tiles inside the stage are returned as-is so callers
    /// treat them as blocked before any wrapping is considered. A wrap that
    /// would land back on `from` counts as leaving the stage.
    pub fn resolve_step(&self, from: CellCoord, direction: Direction) -> StepTarget {
        let raw = from.step(direction, 1);
        if self.contains(raw) && self.indestructible(raw).is_some() {
            return StepTarget::Inside(raw);
        }

        if let Some(domain) = self.wrap_domain() {
            if !domain.contains(raw) {
                let (cell, wrapped) = domain.wrap_cell(raw);
                if wrapped {
                    if cell == from || !self.contains(cell) {
                        return StepTarget::Outside;
                    }
                    return StepTarget::Wrapped { raw, cell };
                }
            }
        }

        if self.contains(raw) {
            StepTarget::Inside(raw)
        } else {
            StepTarget::Outside
        }
    }

    /// Removes a destructible tile and starts its crumble.
    ///
    /// Returns the cleared tile, or `None` when the cell held none.
    pub(crate) fn clear_destructible(
        &mut self,
        cell: CellCoord,
        crumble: Duration,
    ) -> Option<TileId> {
        let tile = self.destructible.remove(&cell)?;
        let reveal = self.reveal_order.pop_front().flatten();
        let _ = self.crumbling.insert(
            cell,
            Crumble {
                remaining: crumble,
                reveal,
            },
        );
        Some(tile)
    }

    /// Removes the item on the cell.
    pub(crate) fn take_item(&mut self, cell: CellCoord) -> Option<ItemKind> {
        self.items.remove(&cell)
    }

    /// Places an item on an open cell, reporting whether it was placed.
    pub(crate) fn place_item(&mut self, cell: CellCoord, item: ItemKind) -> bool {
        if !self.contains(cell)
            || self.indestructible(cell).is_some()
            || self.destructible.contains_key(&cell)
        {
            return false;
        }
        let _ = self.items.insert(cell, item);
        true
    }

    /// Advances crumbling tiles and surfaces the items of those that finished.
    pub(crate) fn advance_crumbling(&mut self, dt: Duration) -> Vec<(CellCoord, ItemKind)> {
        let mut finished = Vec::new();
        for (cell, crumble) in &mut self.crumbling {
            crumble.remaining = crumble.remaining.saturating_sub(dt);
            if crumble.remaining.is_zero() {
                finished.push((*cell, crumble.reveal));
            }
        }

        let mut revealed = Vec::new();
        for (cell, reveal) in finished {
            let _ = self.crumbling.remove(&cell);
            if let Some(item) = reveal {
                let _ = self.items.insert(cell, item);
                revealed.push((cell, item));
            }
        }
        revealed
    }
}

/// Errors raised while parsing an ASCII stage map.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageParseError {
    /// The map contained no rows.
    #[error("stage map is empty")]
    Empty,
    /// A glyph outside the legend was found.
    #[error("unknown glyph {glyph:?} at column {column}, row {row}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Column of the glyph.
        column: u32,
        /// Row of the glyph.
        row: u32,
    },
}

/// Parses an ASCII stage map into a layout.
///
/// Legend: `#` wall, `+` crate, `D` dynamite, `^` power floor, `f` fire-up
/// item, `b` extra-bomb item, `.` or space open. Shorter rows are padded with
/// open cells. A map without any wall has no indestructible layer.
pub fn parse_layout(map: &str, seed: u64) -> Result<StageLayout, StageParseError> {
    let lines: Vec<&str> = map
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .skip_while(|line| line.trim().is_empty())
        .collect();
    let trailing = lines
        .iter()
        .rev()
        .take_while(|line| line.trim().is_empty())
        .count();
    let lines = &lines[..lines.len() - trailing];
    if lines.is_empty() {
        return Err(StageParseError::Empty);
    }

    let mut layout = StageLayout {
        rows: lines.len() as u32,
        columns: lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or_default() as u32,
        seed,
        ..StageLayout::default()
    };
    let mut walls = BTreeMap::new();

    for (row, line) in lines.iter().enumerate() {
        for (column, glyph) in line.chars().enumerate() {
            let cell = CellCoord::new(column as i32, row as i32);
            match glyph {
                '.' | ' ' => {}
                '#' => {
                    let _ = walls.insert(cell, tiles::WALL);
                }
                '+' => {
                    let _ = layout.destructible.insert(cell, tiles::CRATE);
                }
                'D' => {
                    let _ = layout.destructible.insert(cell, tiles::DYNAMITE);
                }
                '^' => {
                    let _ = layout.ground.insert(cell, tiles::POWER_FLOOR);
                }
                'f' => {
                    let _ = layout.items.insert(cell, ItemKind::FireUp);
                }
                'b' => {
                    let _ = layout.items.insert(cell, ItemKind::ExtraBomb);
                }
                other => {
                    return Err(StageParseError::UnknownGlyph {
                        glyph: other,
                        column: column as u32,
                        row: row as u32,
                    });
                }
            }
        }
    }

    if !walls.is_empty() {
        layout.indestructible = Some(walls);
    }
    Ok(layout)
}
