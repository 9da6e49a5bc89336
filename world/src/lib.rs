#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Bomb Arena engine.
//!
//! The world owns the stage, every bomb and the live blast cells. It only
//! changes through [`apply`], which executes a single [`Command`] and reports
//! what happened as [`Event`] values. Read access goes through [`query`].

mod blast;
mod bomb;
pub mod effects;
pub mod grid;
mod occupancy;
pub mod stage;
pub mod wrap;

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use bomb_arena_core::{
    BlastAction, BombId, BombVariant, CellCoord, CharacterId, Command, DetonationRejection,
    Direction, EngineConfig, Event, MotionKind, MotionRejection, ObstacleMask, OwnerId,
    PlacementError, StageLayout, TileEffectResolver,
};
use glam::Vec2;

use crate::{
    blast::{BlastHit, BlastOutcome},
    bomb::{Bomb, TickOutcome},
    occupancy::Surroundings,
};

pub use effects::TileEffectRegistry;
pub use grid::{wrap_index, GridMetrics};
pub use stage::{parse_layout, Stage, StageParseError, StepTarget};
pub use wrap::WrapDomain;

/// Represents the authoritative Bomb Arena world state.
#[derive(Debug)]
pub struct World {
    config: EngineConfig,
    metrics: GridMetrics,
    effects: Box<dyn TileEffectResolver>,
    stage: Option<Stage>,
    bombs: BTreeMap<BombId, Bomb>,
    characters: BTreeMap<CharacterId, CellCoord>,
    blasts: BTreeMap<CellCoord, Duration>,
    next_bomb: Option<u32>,
    elapsed: Duration,
}

impl World {
    /// Creates an empty world without tile effect handlers.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self::with_effects(config, TileEffectRegistry::new())
    }

    /// Creates an empty world that consults `effects` when blasts reach tiles.
    #[must_use]
    pub fn with_effects(config: EngineConfig, effects: impl TileEffectResolver + 'static) -> Self {
        Self {
            metrics: GridMetrics::new(config.tile_size, Vec2::ZERO),
            config,
            effects: Box::new(effects),
            stage: None,
            bombs: BTreeMap::new(),
            characters: BTreeMap::new(),
            blasts: BTreeMap::new(),
            next_bomb: Some(1),
            elapsed: Duration::ZERO,
        }
    }

    fn surroundings(&self) -> Option<Surroundings<'_>> {
        let stage = self.stage.as_ref()?;
        Some(Surroundings {
            stage,
            metrics: self.metrics,
            config: &self.config,
            bombs: &self.bombs,
            characters: &self.characters,
            blasts: &self.blasts,
            effects: self.effects.as_ref(),
            now: self.elapsed,
        })
    }

    /// Runs `operate` on a bomb taken out of the registry so that it observes
    /// every other bomb but never itself.
    fn with_bomb<R>(
        &mut self,
        id: BombId,
        operate: impl FnOnce(&mut Bomb, &Surroundings<'_>) -> R,
    ) -> Option<R> {
        let mut bomb = self.bombs.remove(&id)?;
        let result = self
            .surroundings()
            .map(|surroundings| operate(&mut bomb, &surroundings));
        let _ = self.bombs.insert(id, bomb);
        result
    }

    fn is_live_blast(&self, cell: CellCoord) -> bool {
        self.blasts
            .get(&cell)
            .map_or(false, |expiry| *expiry > self.elapsed)
    }

    fn chain_delay_of(&self, bomb: BombId) -> Option<Duration> {
        self.bombs.get(&bomb).and_then(Bomb::chain_delay)
    }

    fn load_stage(&mut self, layout: StageLayout, out_events: &mut Vec<Event>) {
        for bomb in std::mem::take(&mut self.bombs).into_keys() {
            out_events.push(Event::BombRemoved { bomb });
        }
        self.characters.clear();
        self.blasts.clear();

        let stage = Stage::from_layout(layout);
        log::info!(
            "loaded {}x{} stage with {} destructible tiles",
            stage.columns(),
            stage.rows(),
            stage.destructible_count()
        );
        out_events.push(Event::StageLoaded {
            columns: stage.columns(),
            rows: stage.rows(),
            destructible_count: stage.destructible_count(),
        });
        self.stage = Some(stage);
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let now = self.elapsed;
        self.blasts.retain(|_, expiry| *expiry > now);

        if let Some(stage) = self.stage.as_mut() {
            for (cell, item) in stage.advance_crumbling(dt) {
                out_events.push(Event::ItemRevealed { cell, item });
            }
        }

        let ids: Vec<BombId> = self.bombs.keys().copied().collect();
        for id in ids {
            let outcome = self.with_bomb(id, |bomb, surroundings| {
                bomb.advance(dt, surroundings, out_events)
            });
            match outcome {
                Some(TickOutcome::Contact) => out_events.push(Event::BlastReachedBomb {
                    bomb: id,
                    delay: self.chain_delay_of(id),
                }),
                Some(TickOutcome::FuseExpired) => self.explode_bomb(id, out_events),
                Some(TickOutcome::Quiet) | None => {}
            }
        }

        let despawn = self.config.despawn_delay();
        let expired: Vec<BombId> = self
            .bombs
            .values()
            .filter(|bomb| {
                bomb.exploded_at()
                    .map_or(false, |exploded_at| exploded_at.saturating_add(despawn) <= now)
            })
            .map(Bomb::id)
            .collect();
        for bomb in expired {
            let _ = self.bombs.remove(&bomb);
            log::debug!("bomb {} removed", bomb.get());
            out_events.push(Event::BombRemoved { bomb });
        }
    }

    fn place_bomb(
        &mut self,
        owner: Option<OwnerId>,
        position: Vec2,
        variant: BombVariant,
        radius: u32,
        chain_delay: Option<Duration>,
        out_events: &mut Vec<Event>,
    ) {
        let cell = self.metrics.cell_at(position);
        let rejection = match self.surroundings() {
            None => Some(PlacementError::NoStage),
            Some(surroundings) if !surroundings.stage.contains(cell) => {
                Some(PlacementError::OutOfBounds)
            }
            Some(surroundings)
                if surroundings.blocks(
                    cell,
                    ObstacleMask::INDESTRUCTIBLE.union(ObstacleMask::DESTRUCTIBLE),
                ) =>
            {
                Some(PlacementError::Obstructed)
            }
            Some(surroundings) if surroundings.live_bomb_at(cell).is_some() => {
                Some(PlacementError::Occupied)
            }
            Some(_) if self.next_bomb.is_none() => Some(PlacementError::IdsExhausted),
            Some(_) => None,
        };
        if let Some(reason) = rejection {
            log::debug!("placement at {cell:?} rejected: {reason}");
            out_events.push(Event::BombPlacementRejected {
                owner,
                cell,
                reason,
            });
            return;
        }

        let Some(id) = self.next_bomb else {
            return;
        };
        let bomb = BombId::new(id);
        self.next_bomb = id.checked_add(1);
        let occupied = self.characters.values().any(|occupied| *occupied == cell);
        let mut placed = Bomb::new(
            bomb,
            owner,
            variant,
            radius,
            chain_delay,
            cell,
            self.metrics.cell_center(cell),
            !occupied,
        );
        let _ = placed.begin_fuse(self.elapsed, self.config.fuse());
        let _ = self.bombs.insert(bomb, placed);

        log::debug!("bomb {} placed at {cell:?}", bomb.get());
        out_events.push(Event::BombPlaced {
            bomb,
            owner,
            cell,
            variant,
        });
        if self.is_live_blast(cell) {
            out_events.push(Event::BlastReachedBomb {
                bomb,
                delay: chain_delay,
            });
        }
    }

    fn start_motion(
        &mut self,
        bomb: BombId,
        motion: MotionKind,
        out_events: &mut Vec<Event>,
        start: impl FnOnce(&mut Bomb, &Surroundings<'_>) -> Result<Direction, MotionRejection>,
    ) {
        match self
            .with_bomb(bomb, start)
            .unwrap_or(Err(MotionRejection::UnknownBomb))
        {
            Ok(direction) => {
                log::debug!("bomb {} started {motion:?} towards {direction:?}", bomb.get());
                out_events.push(Event::BombMotionStarted {
                    bomb,
                    motion,
                    direction,
                });
            }
            Err(MotionRejection::AlreadyExploded) => {
                log::debug!("ignoring {motion:?} for exploded bomb {}", bomb.get());
            }
            Err(reason) => out_events.push(Event::MotionRejected {
                bomb,
                motion,
                reason,
            }),
        }
    }

    fn magnet_pulse(
        &mut self,
        origin: CellCoord,
        facing: Direction,
        range: u32,
        speed_multiplier: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(surroundings) = self.surroundings() else {
            return;
        };
        let mut cell = origin;
        let mut found = None;
        for distance in 1..=range {
            cell = match surroundings.stage.resolve_step(cell, facing) {
                StepTarget::Inside(next) | StepTarget::Wrapped { cell: next, .. } => next,
                StepTarget::Outside => break,
            };
            if surroundings.blocks(
                cell,
                ObstacleMask::INDESTRUCTIBLE.union(ObstacleMask::DESTRUCTIBLE),
            ) {
                break;
            }
            if let Some(bomb) = surroundings.live_bomb_at(cell) {
                found = Some((bomb.id(), distance));
                break;
            }
        }

        let Some((bomb, distance)) = found else {
            log::debug!("magnet at {origin:?} found no bomb facing {facing:?}");
            return;
        };
        let direction = facing.opposite().as_vector();
        self.start_motion(bomb, MotionKind::MagnetPull, out_events, |target, surroundings| {
            target.start_magnet_pull(direction, distance - 1, speed_multiplier, surroundings)
        });
    }

    fn detonate(&mut self, bomb: BombId, out_events: &mut Vec<Event>) {
        let rejection = match self.bombs.get(&bomb) {
            None => Some(DetonationRejection::UnknownBomb),
            Some(target) if target.is_exploded() => {
                log::debug!("ignoring detonation of exploded bomb {}", bomb.get());
                return;
            }
            Some(target) if !target.variant().remote => Some(DetonationRejection::NotRemote),
            Some(target) if target.is_airborne() => Some(DetonationRejection::Airborne),
            Some(_) => None,
        };
        match rejection {
            Some(reason) => out_events.push(Event::DetonationRejected {
                bomb: Some(bomb),
                reason,
            }),
            None => self.explode_bomb(bomb, out_events),
        }
    }

    fn trigger_remote(&mut self, owner: OwnerId, out_events: &mut Vec<Event>) {
        let oldest = self
            .bombs
            .values()
            .find(|bomb| {
                bomb.owner() == Some(owner)
                    && bomb.variant().remote
                    && !bomb.is_exploded()
                    && !bomb.is_airborne()
            })
            .map(Bomb::id);
        match oldest {
            Some(bomb) => self.explode_bomb(bomb, out_events),
            None => out_events.push(Event::DetonationRejected {
                bomb: None,
                reason: DetonationRejection::NoRemoteBombs,
            }),
        }
    }

    fn chain_detonate(&mut self, bomb: BombId, out_events: &mut Vec<Event>) {
        if self
            .bombs
            .get(&bomb)
            .map_or(false, |target| !target.is_exploded())
        {
            self.explode_bomb(bomb, out_events);
        } else {
            log::debug!("chain release for bomb {} found nothing to detonate", bomb.get());
        }
    }

    /// Open ground under an airborne bomb, if any, for it to drop onto.
    fn airborne_landing(&self, id: BombId) -> Option<CellCoord> {
        let cell = self.bombs.get(&id)?.airborne_cell(self.metrics)?;
        let surroundings = self.surroundings()?;
        let blocked = surroundings.blocks(
            cell,
            ObstacleMask::INDESTRUCTIBLE
                .union(ObstacleMask::DESTRUCTIBLE)
                .union(ObstacleMask::BOMB),
        );
        (!blocked).then_some(cell)
    }

    fn explode_bomb(&mut self, id: BombId, out_events: &mut Vec<Event>) {
        let landing = self.airborne_landing(id);
        let Some(bomb) = self.bombs.get_mut(&id) else {
            return;
        };
        if !bomb.mark_exploded(self.elapsed, self.metrics, landing) {
            return;
        }
        let (owner, cell, radius, pierce) = (
            bomb.owner(),
            bomb.cell(),
            bomb.radius(),
            bomb.variant().pierce,
        );

        let Some(outcome) = self
            .surroundings()
            .map(|surroundings| blast::cast(&surroundings, owner, cell, radius, pierce))
        else {
            return;
        };
        log::info!(
            "bomb {} exploded at {cell:?} with radius {} (pierce: {})",
            id.get(),
            outcome.radius,
            outcome.pierce
        );
        out_events.push(Event::BombExploded {
            bomb: id,
            owner,
            cell,
            radius: outcome.radius,
            pierce: outcome.pierce,
        });
        self.apply_blast(cell, outcome, out_events);
    }

    fn detonate_dynamite(&mut self, cell: CellCoord, radius: u32, out_events: &mut Vec<Event>) {
        self.clear_destructible(cell, out_events);
        let Some(outcome) = self
            .surroundings()
            .map(|surroundings| blast::cast(&surroundings, None, cell, radius, false))
        else {
            return;
        };
        log::info!("dynamite at {cell:?} exploded with radius {}", outcome.radius);
        out_events.push(Event::DynamiteExploded {
            cell,
            radius: outcome.radius,
        });
        self.apply_blast(cell, outcome, out_events);
    }

    fn clear_destructible(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let crumble = self.config.crumble_duration();
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        if let Some(tile) = stage.clear_destructible(cell, crumble) {
            out_events.push(Event::DestructibleCleared {
                cell,
                tile,
                remaining: stage.destructible_count(),
            });
        }
    }

    /// Applies the decisions of a cast blast: render segments first, then
    /// item and bomb hits in ray order, queued tile actions, and finally the
    /// characters standing in the blast.
    fn apply_blast(&mut self, origin: CellCoord, outcome: BlastOutcome, out_events: &mut Vec<Event>) {
        let BlastOutcome {
            segments,
            hits,
            actions,
            ..
        } = outcome;

        let mut blasted = BTreeSet::new();
        for segment in &segments {
            let expiry = self
                .elapsed
                .saturating_add(segment.start_delay)
                .saturating_add(segment.duration);
            let live_until = self.blasts.entry(segment.cell).or_insert(expiry);
            *live_until = (*live_until).max(expiry);
            let _ = blasted.insert(segment.cell);
        }
        out_events.push(Event::BlastSegments { origin, segments });

        let mut reached = BTreeSet::new();
        for hit in hits {
            match hit {
                BlastHit::Item { cell, item } => {
                    let destroyed = self
                        .stage
                        .as_mut()
                        .and_then(|stage| stage.take_item(cell))
                        .is_some();
                    if destroyed {
                        out_events.push(Event::ItemDestroyed { cell, item });
                    }
                }
                BlastHit::Bomb(bomb) => {
                    if reached.insert(bomb) {
                        out_events.push(Event::BlastReachedBomb {
                            bomb,
                            delay: self.chain_delay_of(bomb),
                        });
                    }
                }
            }
        }

        for action in actions {
            match action {
                BlastAction::ClearDestructible { cell } => self.clear_destructible(cell, out_events),
                BlastAction::SpawnItem { cell, item } => {
                    let placed = self
                        .stage
                        .as_mut()
                        .map_or(false, |stage| stage.place_item(cell, item));
                    if placed {
                        out_events.push(Event::ItemRevealed { cell, item });
                    }
                }
                BlastAction::IgniteDynamite {
                    cell,
                    radius,
                    delay,
                } => out_events.push(Event::DynamiteIgnited {
                    cell,
                    radius,
                    delay,
                }),
            }
        }

        for (character, cell) in &self.characters {
            if blasted.contains(cell) {
                out_events.push(Event::CharacterCaught {
                    character: *character,
                    cell: *cell,
                });
            }
        }
    }

    fn set_character_cell(
        &mut self,
        character: CharacterId,
        cell: Option<CellCoord>,
        out_events: &mut Vec<Event>,
    ) {
        match cell {
            Some(cell) => {
                let _ = self.characters.insert(character, cell);
                if self.is_live_blast(cell) {
                    out_events.push(Event::CharacterCaught { character, cell });
                }
            }
            None => {
                let _ = self.characters.remove(&character);
            }
        }

        for bomb in self.bombs.values_mut() {
            let occupied = self
                .characters
                .values()
                .any(|occupied| *occupied == bomb.cell());
            bomb.refresh_solidity(occupied);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadStage { layout } => world.load_stage(layout, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::PlaceBomb {
            owner,
            position,
            variant,
            radius,
            chain_delay,
        } => world.place_bomb(owner, position, variant, radius, chain_delay, out_events),
        Command::Detonate { bomb } => world.detonate(bomb, out_events),
        Command::TriggerRemote { owner } => world.trigger_remote(owner, out_events),
        Command::Kick { bomb, direction } => {
            world.start_motion(bomb, MotionKind::Kick, out_events, |target, surroundings| {
                target.start_kick(direction, surroundings)
            });
        }
        Command::Punch {
            bomb,
            direction,
            distance,
        } => {
            let distance = distance.unwrap_or(world.config.punch_distance);
            world.start_motion(bomb, MotionKind::Punch, out_events, |target, surroundings| {
                target.start_punch(direction, distance, surroundings)
            });
        }
        Command::MagnetPull {
            bomb,
            direction,
            steps,
            speed_multiplier,
        } => {
            world.start_motion(
                bomb,
                MotionKind::MagnetPull,
                out_events,
                |target, surroundings| {
                    target.start_magnet_pull(direction, steps, speed_multiplier, surroundings)
                },
            );
        }
        Command::MagnetPulse {
            origin,
            facing,
            range,
            speed_multiplier,
        } => world.magnet_pulse(origin, facing, range, speed_multiplier, out_events),
        Command::ChainDetonate { bomb } => world.chain_detonate(bomb, out_events),
        Command::DetonateDynamite { cell, radius } => {
            world.detonate_dynamite(cell, radius, out_events);
        }
        Command::SetCharacterCell { character, cell } => {
            world.set_character_cell(character, cell, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use bomb_arena_core::{
        BombId, BombSnapshot, BombView, CellCoord, CharacterId, EngineConfig, ObstacleMask,
        OwnerId,
    };

    use super::World;
    use crate::{bomb::Bomb, grid::GridMetrics, stage::Stage, wrap::WrapDomain};

    /// Configuration the world was created with.
    #[must_use]
    pub fn config(world: &World) -> &EngineConfig {
        &world.config
    }

    /// Grid metrics used to convert between cells and world positions.
    #[must_use]
    pub fn metrics(world: &World) -> GridMetrics {
        world.metrics
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Active stage, if one was loaded.
    #[must_use]
    pub fn stage(world: &World) -> Option<&Stage> {
        world.stage.as_ref()
    }

    /// Wrap domain of the active stage.
    #[must_use]
    pub fn wrap_domain(world: &World) -> Option<WrapDomain> {
        world.stage.as_ref().and_then(Stage::wrap_domain)
    }

    /// Captures a read-only view of every bomb, including exploded ones not yet removed.
    #[must_use]
    pub fn bomb_view(world: &World) -> BombView {
        BombView::from_snapshots(
            world
                .bombs
                .values()
                .map(|bomb| bomb.snapshot(world.elapsed))
                .collect(),
        )
    }

    /// Snapshot of a single bomb.
    #[must_use]
    pub fn bomb(world: &World, bomb: BombId) -> Option<BombSnapshot> {
        world
            .bombs
            .get(&bomb)
            .map(|bomb| bomb.snapshot(world.elapsed))
    }

    /// Remote bombs of the owner that can still be detonated, oldest first.
    #[must_use]
    pub fn remote_roster(world: &World, owner: OwnerId) -> Vec<BombId> {
        world
            .bombs
            .values()
            .filter(|bomb| {
                bomb.owner() == Some(owner) && bomb.variant().remote && !bomb.is_exploded()
            })
            .map(Bomb::id)
            .collect()
    }

    /// Cells covered by a blast that has not yet expired, in ascending order.
    #[must_use]
    pub fn live_blast_cells(world: &World) -> Vec<CellCoord> {
        world
            .blasts
            .iter()
            .filter(|(_, expiry)| **expiry > world.elapsed)
            .map(|(cell, _)| *cell)
            .collect()
    }

    /// Reports whether the cell is covered by a live blast.
    #[must_use]
    pub fn is_live_blast(world: &World, cell: CellCoord) -> bool {
        world.is_live_blast(cell)
    }

    /// Reports whether any feature selected by `mask` occupies the cell.
    ///
    /// Every cell counts as blocked while no stage is loaded.
    #[must_use]
    pub fn is_blocked(world: &World, cell: CellCoord, mask: ObstacleMask) -> bool {
        world
            .surroundings()
            .map_or(true, |surroundings| surroundings.blocks(cell, mask))
    }

    /// Cell last reported for the character.
    #[must_use]
    pub fn character_cell(world: &World, character: CharacterId) -> Option<CellCoord> {
        world.characters.get(&character).copied()
    }
}
