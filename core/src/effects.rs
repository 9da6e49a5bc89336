//! Tile effect protocol consulted when blasts or travelling bombs reach a tile.
//!
//! The concrete effect catalog lives outside the engine. The world resolves a
//! handler by tile identity and hands it a [`BlastContext`] through which the
//! handler queues the actions it wants applied.

use std::{fmt::Debug, time::Duration};

use glam::Vec2;

use crate::{BombId, CellCoord, ItemKind, OwnerId, TileId};

/// Action queued by a tile effect while a blast is being resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BlastAction {
    /// Clears the destructible tile at the cell.
    ClearDestructible {
        /// Cell holding the tile.
        cell: CellCoord,
    },
    /// Places an item pickup on the cell.
    SpawnItem {
        /// Cell receiving the item.
        cell: CellCoord,
        /// Item to place.
        item: ItemKind,
    },
    /// Lights a dynamite tile so that it branches into its own blast.
    IgniteDynamite {
        /// Cell holding the dynamite.
        cell: CellCoord,
        /// Radius of the branch blast.
        radius: u32,
        /// Delay before the branch fires, `None` uses the scheduler default.
        delay: Option<Duration>,
    },
}

/// Context handed to tile effects while a single detonation is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct BlastContext {
    owner: Option<OwnerId>,
    origin: CellCoord,
    actions: Vec<BlastAction>,
}

impl BlastContext {
    /// Creates an empty context for a blast originating at `origin`.
    #[must_use]
    pub fn new(owner: Option<OwnerId>, origin: CellCoord) -> Self {
        Self {
            owner,
            origin,
            actions: Vec::new(),
        }
    }

    /// Controller responsible for the blast, if any.
    #[must_use]
    pub const fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    /// Cell the blast originated from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Queues the removal of a destructible tile.
    pub fn clear_destructible(&mut self, cell: CellCoord) {
        self.actions.push(BlastAction::ClearDestructible { cell });
    }

    /// Queues the placement of an item.
    pub fn spawn_item(&mut self, cell: CellCoord, item: ItemKind) {
        self.actions.push(BlastAction::SpawnItem { cell, item });
    }

    /// Queues the ignition of a dynamite tile.
    pub fn ignite_dynamite(&mut self, cell: CellCoord, radius: u32, delay: Option<Duration>) {
        self.actions.push(BlastAction::IgniteDynamite {
            cell,
            radius,
            delay,
        });
    }

    /// Reports whether a clear was already queued for the cell.
    #[must_use]
    pub fn clears(&self, cell: CellCoord) -> bool {
        self.actions
            .iter()
            .any(|action| matches!(action, BlastAction::ClearDestructible { cell: queued } if *queued == cell))
    }

    /// Actions queued so far, in order.
    #[must_use]
    pub fn actions(&self) -> &[BlastAction] {
        &self.actions
    }

    /// Consumes the context, yielding the queued actions.
    #[must_use]
    pub fn into_actions(self) -> Vec<BlastAction> {
        self.actions
    }
}

/// Reaction of a destructible tile to a blast.
pub trait DestructibleEffect: Debug {
    /// Handles a blast reaching the tile.
    ///
    /// Returning `false` lets the engine clear the tile itself.
    fn handle_blast_hit(&self, context: &mut BlastContext, position: Vec2, cell: CellCoord) -> bool;
}

/// Reaction of an indestructible tile to a blast. The ray stops regardless.
pub trait IndestructibleEffect: Debug {
    /// Handles a blast reaching the tile.
    fn handle_blast_hit(&self, context: &mut BlastContext, position: Vec2, cell: CellCoord) -> bool;
}

/// Behaviour of a ground tile under blasts and travelling bombs.
pub trait GroundEffect: Debug {
    /// Adjusts the radius and piercing of a blast originating on this tile.
    ///
    /// Returns whether anything was modified.
    fn try_modify_explosion(
        &self,
        context: &BlastContext,
        position: Vec2,
        tile: TileId,
        radius: &mut u32,
        pierce: &mut bool,
    ) -> bool;

    /// Reports whether a bomb that travelled onto this tile must chain-detonate.
    fn ignites_bomb(&self, _bomb: BombId, _cell: CellCoord) -> bool {
        false
    }
}

/// Lookup from tile identity to effect handler, one map per terrain category.
pub trait TileEffectResolver: Debug {
    /// Handler for a destructible tile identity.
    fn destructible(&self, tile: TileId) -> Option<&dyn DestructibleEffect>;

    /// Handler for a ground tile identity.
    fn ground(&self, tile: TileId) -> Option<&dyn GroundEffect>;

    /// Handler for an indestructible tile identity.
    fn indestructible(&self, tile: TileId) -> Option<&dyn IndestructibleEffect>;
}
