//! Identity-keyed registry of tile effect handlers.

use std::collections::BTreeMap;

use bomb_arena_core::{
    DestructibleEffect, GroundEffect, IndestructibleEffect, TileEffectResolver, TileId,
};

/// Tile effect handlers grouped by terrain category.
///
/// Lookups for unregistered identities yield no handler.
#[derive(Debug, Default)]
pub struct TileEffectRegistry {
    destructible: BTreeMap<TileId, Box<dyn DestructibleEffect>>,
    ground: BTreeMap<TileId, Box<dyn GroundEffect>>,
    indestructible: BTreeMap<TileId, Box<dyn IndestructibleEffect>>,
}

impl TileEffectRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for a destructible tile identity, replacing any previous one.
    pub fn register_destructible(
        &mut self,
        tile: TileId,
        effect: impl DestructibleEffect + 'static,
    ) -> &mut Self {
        let _ = self.destructible.insert(tile, Box::new(effect));
        self
    }

    /// Registers the handler for a ground tile identity, replacing any previous one.
    pub fn register_ground(&mut self, tile: TileId, effect: impl GroundEffect + 'static) -> &mut Self {
        let _ = self.ground.insert(tile, Box::new(effect));
        self
    }

    /// Registers the handler for an indestructible tile identity, replacing any previous one.
    pub fn register_indestructible(
        &mut self,
        tile: TileId,
        effect: impl IndestructibleEffect + 'static,
    ) -> &mut Self {
        let _ = self.indestructible.insert(tile, Box::new(effect));
        self
    }

    /// Number of registered handlers across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.destructible.len() + self.ground.len() + self.indestructible.len()
    }

    /// Reports whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TileEffectResolver for TileEffectRegistry {
    fn destructible(&self, tile: TileId) -> Option<&dyn DestructibleEffect> {
        self.destructible.get(&tile).map(|effect| effect.as_ref())
    }

    fn ground(&self, tile: TileId) -> Option<&dyn GroundEffect> {
        self.ground.get(&tile).map(|effect| effect.as_ref())
    }

    fn indestructible(&self, tile: TileId) -> Option<&dyn IndestructibleEffect> {
        self.indestructible.get(&tile).map(|effect| effect.as_ref())
    }
}
