//! Read-only view of everything surrounding a bomb while it is being advanced.

use std::{collections::BTreeMap, time::Duration};

use bomb_arena_core::{
    BombId, CellCoord, CharacterId, EngineConfig, ObstacleMask, TileEffectResolver,
};

use crate::{bomb::Bomb, grid::GridMetrics, stage::Stage};

/// Borrowed world state visible to a bomb that was taken out of the registry.
///
/// The bomb under evaluation is never part of `bombs`, so it cannot block itself.
pub(crate) struct Surroundings<'a> {
    pub(crate) stage: &'a Stage,
    pub(crate) metrics: GridMetrics,
    pub(crate) config: &'a EngineConfig,
    pub(crate) bombs: &'a BTreeMap<BombId, Bomb>,
    pub(crate) characters: &'a BTreeMap<CharacterId, CellCoord>,
    pub(crate) blasts: &'a BTreeMap<CellCoord, Duration>,
    pub(crate) effects: &'a dyn TileEffectResolver,
    pub(crate) now: Duration,
}

impl Surroundings<'_> {
    /// Lowest-id bomb resting on the cell that is neither exploded nor airborne.
    pub(crate) fn live_bomb_at(&self, cell: CellCoord) -> Option<&Bomb> {
        self.bombs
            .values()
            .find(|bomb| bomb.is_live() && bomb.cell() == cell)
    }

    pub(crate) fn character_at(&self, cell: CellCoord) -> bool {
        self.characters.values().any(|occupied| *occupied == cell)
    }

    pub(crate) fn is_live_blast(&self, cell: CellCoord) -> bool {
        self.blasts
            .get(&cell)
            .map_or(false, |expiry| *expiry > self.now)
    }

    /// Reports whether any feature selected by `mask` occupies the cell.
    ///
    /// Cells outside the raw stage bounds count as indestructible.
    pub(crate) fn blocks(&self, cell: CellCoord, mask: ObstacleMask) -> bool {
        if mask.contains(ObstacleMask::INDESTRUCTIBLE)
            && (!self.stage.contains(cell) || self.stage.indestructible(cell).is_some())
        {
            return true;
        }
        if mask.contains(ObstacleMask::DESTRUCTIBLE)
            && (self.stage.destructible(cell).is_some() || self.stage.is_crumbling(cell))
        {
            return true;
        }
        if mask.contains(ObstacleMask::BOMB) && self.live_bomb_at(cell).is_some() {
            return true;
        }
        if mask.contains(ObstacleMask::CHARACTER) && self.character_at(cell) {
            return true;
        }
        if mask.contains(ObstacleMask::ITEM) && self.stage.item(cell).is_some() {
            return true;
        }
        mask.contains(ObstacleMask::HAZARD) && self.is_live_blast(cell)
    }

    /// Reports whether the ground under the cell sets off a bomb arriving on it.
    pub(crate) fn ground_ignites(&self, bomb: BombId, cell: CellCoord) -> bool {
        self.stage
            .ground(cell)
            .and_then(|tile| self.effects.ground(tile))
            .map_or(false, |effect| effect.ignites_bomb(bomb, cell))
    }
}
