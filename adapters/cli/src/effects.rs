//! Tile effects bundled with the headless driver.

use bomb_arena_core::{
    tiles, BlastContext, CellCoord, DestructibleEffect, EngineConfig, GroundEffect, TileId,
};
use bomb_arena_world::TileEffectRegistry;
use glam::Vec2;

/// Destructible tile that lights a secondary blast instead of crumbling at once.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Dynamite {
    radius: u32,
}

impl DestructibleEffect for Dynamite {
    fn handle_blast_hit(&self, context: &mut BlastContext, _position: Vec2, cell: CellCoord) -> bool {
        log::debug!("dynamite at {cell:?} lit by blast from {:?}", context.origin());
        context.ignite_dynamite(cell, self.radius, None);
        true
    }
}

/// Ground tile that widens and sharpens blasts originating on it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PowerFloor;

impl GroundEffect for PowerFloor {
    fn try_modify_explosion(
        &self,
        _context: &BlastContext,
        _position: Vec2,
        _tile: TileId,
        radius: &mut u32,
        pierce: &mut bool,
    ) -> bool {
        *radius = radius.saturating_add(1);
        *pierce = true;
        true
    }
}

/// Registry holding every effect understood by the bundled stage legend.
pub(crate) fn registry(config: &EngineConfig) -> TileEffectRegistry {
    let mut registry = TileEffectRegistry::new();
    let _ = registry
        .register_destructible(
            tiles::DYNAMITE,
            Dynamite {
                radius: config.default_radius,
            },
        )
        .register_ground(tiles::POWER_FLOOR, PowerFloor);
    registry
}
