//! Per-bomb lifecycle: fuse, kick and magnet slides, punch flights and the terminal explosion.

use std::{collections::VecDeque, time::Duration};

use bomb_arena_core::{
    BombId, BombSnapshot, BombVariant, CellCoord, Direction, Event, MotionKind, MotionRejection,
    MotionState, ObstacleMask, OwnerId,
};
use glam::Vec2;

use crate::{
    grid::GridMetrics,
    occupancy::Surroundings,
    stage::StepTarget,
};

/// Countdown measured against the world clock.
///
/// The countdown is expressed through the placement reference so that pausing
/// and resuming only shifts the reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Fuse {
    placed_at: Duration,
    length: Duration,
    paused_at: Option<Duration>,
}

impl Fuse {
    pub(crate) const fn new(placed_at: Duration, length: Duration) -> Self {
        Self {
            placed_at,
            length,
            paused_at: None,
        }
    }

    pub(crate) fn remaining(&self, now: Duration) -> Duration {
        let reference = self.paused_at.unwrap_or(now);
        self.placed_at
            .saturating_add(self.length)
            .saturating_sub(reference)
    }

    pub(crate) const fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub(crate) fn pause(&mut self, now: Duration) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub(crate) fn resume(&mut self, now: Duration) {
        if let Some(paused_at) = self.paused_at.take() {
            self.placed_at = self.placed_at.saturating_add(now.saturating_sub(paused_at));
        }
    }

    pub(crate) fn expired(&self, now: Duration) -> bool {
        !self.is_paused() && self.remaining(now).is_zero()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SlideLeg {
    from: Vec2,
    to: Vec2,
    cell: CellCoord,
    progress: f32,
}

/// Tile-by-tile travel shared by kicks and magnet pulls.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Slide {
    direction: Direction,
    tiles_per_second: f32,
    steps_left: Option<u32>,
    leg: Option<SlideLeg>,
}

impl Slide {
    fn new(direction: Direction, tiles_per_second: f32, steps_left: Option<u32>) -> Self {
        Self {
            direction,
            tiles_per_second,
            steps_left,
            leg: None,
        }
    }

    fn consume_step(&mut self) {
        if let Some(steps) = self.steps_left.as_mut() {
            *steps = steps.saturating_sub(1);
        }
    }
}

/// One airborne leg. Legs carrying `jump_from` are instant wrap teleports.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ArcLeg {
    from: Vec2,
    to: Vec2,
    cell: CellCoord,
    duration: Duration,
    elapsed: Duration,
    jump_from: Option<CellCoord>,
}

impl ArcLeg {
    fn arc(from: Vec2, to: Vec2, cell: CellCoord, duration: Duration) -> Self {
        Self {
            from,
            to,
            cell,
            duration,
            elapsed: Duration::ZERO,
            jump_from: None,
        }
    }

    fn jump(raw: CellCoord, to: Vec2, cell: CellCoord) -> Self {
        Self {
            from: to,
            to,
            cell,
            duration: Duration::ZERO,
            elapsed: Duration::ZERO,
            jump_from: Some(raw),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Flight {
    direction: Direction,
    legs: VecDeque<ArcLeg>,
    bounces: u32,
    max_bounces: u32,
    leg_duration: Duration,
    arc_height: f32,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Motion {
    #[default]
    Idle,
    Kicked(Slide),
    Punched(Flight),
    MagnetPulled(Slide),
}

/// Result of advancing a bomb by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Quiet,
    /// The bomb arrived on a live blast cell or an igniting ground tile.
    Contact,
    FuseExpired,
}

/// Authoritative state of a single bomb.
#[derive(Clone, Debug)]
pub(crate) struct Bomb {
    id: BombId,
    owner: Option<OwnerId>,
    variant: BombVariant,
    radius: u32,
    chain_delay: Option<Duration>,
    cell: CellCoord,
    position: Vec2,
    height: f32,
    fuse: Option<Fuse>,
    motion: Motion,
    solid: bool,
    exploded_at: Option<Duration>,
}

impl Bomb {
    pub(crate) fn new(
        id: BombId,
        owner: Option<OwnerId>,
        variant: BombVariant,
        radius: u32,
        chain_delay: Option<Duration>,
        cell: CellCoord,
        position: Vec2,
        solid: bool,
    ) -> Self {
        Self {
            id,
            owner,
            variant,
            radius,
            chain_delay,
            cell,
            position,
            height: 0.0,
            fuse: None,
            motion: Motion::Idle,
            solid,
            exploded_at: None,
        }
    }

    pub(crate) const fn id(&self) -> BombId {
        self.id
    }

    pub(crate) const fn owner(&self) -> Option<OwnerId> {
        self.owner
    }

    pub(crate) const fn variant(&self) -> BombVariant {
        self.variant
    }

    pub(crate) const fn radius(&self) -> u32 {
        self.radius
    }

    pub(crate) const fn chain_delay(&self) -> Option<Duration> {
        self.chain_delay
    }

    pub(crate) const fn cell(&self) -> CellCoord {
        self.cell
    }

    pub(crate) const fn is_exploded(&self) -> bool {
        self.exploded_at.is_some()
    }

    pub(crate) const fn exploded_at(&self) -> Option<Duration> {
        self.exploded_at
    }

    pub(crate) const fn is_airborne(&self) -> bool {
        matches!(self.motion, Motion::Punched(_))
    }

    /// Live bombs take part in blasts and block travel.
    pub(crate) const fn is_live(&self) -> bool {
        !self.is_exploded() && !self.is_airborne()
    }

    pub(crate) fn motion_state(&self) -> MotionState {
        match self.motion {
            Motion::Idle => MotionState::Idle,
            Motion::Kicked(_) => MotionState::Kicked,
            Motion::Punched(_) => MotionState::Punched,
            Motion::MagnetPulled(_) => MotionState::MagnetPulled,
        }
    }

    pub(crate) fn snapshot(&self, now: Duration) -> BombSnapshot {
        BombSnapshot {
            id: self.id,
            owner: self.owner,
            position: self.position,
            cell: self.cell,
            height: self.height,
            variant: self.variant,
            radius: self.radius,
            motion: self.motion_state(),
            fuse_remaining: self.fuse.map(|fuse| fuse.remaining(now)),
            fuse_paused: self.fuse.map_or(false, |fuse| fuse.is_paused()),
            solid: self.solid,
            exploded: self.is_exploded(),
        }
    }

    /// Starts the countdown of an armed, non-remote bomb.
    ///
    /// Returns `false` without effect for remote or exploded bombs and for
    /// bombs whose fuse already runs.
    pub(crate) fn begin_fuse(&mut self, now: Duration, length: Duration) -> bool {
        if self.is_exploded() || self.variant.remote || self.fuse.is_some() {
            return false;
        }
        self.fuse = Some(Fuse::new(now, length));
        true
    }

    pub(crate) fn pause_fuse(&mut self, now: Duration) {
        if let Some(fuse) = self.fuse.as_mut() {
            fuse.pause(now);
        }
    }

    pub(crate) fn resume_fuse(&mut self, now: Duration) {
        if let Some(fuse) = self.fuse.as_mut() {
            fuse.resume(now);
        }
    }

    /// Makes a non-solid bomb solid once no character stands on it.
    pub(crate) fn refresh_solidity(&mut self, occupied: bool) {
        if !self.solid && !occupied {
            self.solid = true;
        }
    }

    /// Cell under a bomb that is still in flight.
    pub(crate) fn airborne_cell(&self, metrics: GridMetrics) -> Option<CellCoord> {
        self.is_airborne().then(|| metrics.cell_at(self.position))
    }

    /// Terminal transition. Cancels the fuse and any travel, settling the bomb
    /// on a tile center. An airborne bomb drops onto `landing` when one is
    /// given, otherwise back onto the cell it was launched from. Returns
    /// `false` if the bomb had already exploded.
    pub(crate) fn mark_exploded(
        &mut self,
        now: Duration,
        metrics: GridMetrics,
        landing: Option<CellCoord>,
    ) -> bool {
        if self.is_exploded() {
            return false;
        }
        let landing = landing.filter(|_| self.is_airborne());
        self.settle(metrics);
        if let Some(cell) = landing {
            self.cell = cell;
            self.position = metrics.cell_center(cell);
        }
        self.fuse = None;
        self.exploded_at = Some(now);
        true
    }

    /// Cell the bomb would rest on if its current travel were cancelled.
    fn settled_cell(&self, metrics: GridMetrics) -> CellCoord {
        match &self.motion {
            Motion::Kicked(slide) | Motion::MagnetPulled(slide) => match slide.leg {
                Some(leg) if metrics.cell_at(self.position) == leg.cell => leg.cell,
                _ => self.cell,
            },
            Motion::Idle | Motion::Punched(_) => self.cell,
        }
    }

    fn settle(&mut self, metrics: GridMetrics) {
        self.cell = self.settled_cell(metrics);
        self.position = metrics.cell_center(self.cell);
        self.height = 0.0;
        self.motion = Motion::Idle;
    }

    fn check_startable(&self, direction: Vec2) -> Result<Direction, MotionRejection> {
        if self.is_exploded() {
            return Err(MotionRejection::AlreadyExploded);
        }
        if self.is_airborne() {
            return Err(MotionRejection::Airborne);
        }
        Direction::from_vector(direction).ok_or(MotionRejection::ZeroDirection)
    }

    /// Starts a kick. The bomb must be solid, idle and unoccupied, and the
    /// first tile ahead must be free of obstacles and live blasts.
    pub(crate) fn start_kick(
        &mut self,
        direction: Vec2,
        surroundings: &Surroundings<'_>,
    ) -> Result<Direction, MotionRejection> {
        if self.is_exploded() {
            return Err(MotionRejection::AlreadyExploded);
        }
        if self.is_airborne() {
            return Err(MotionRejection::Airborne);
        }
        if !matches!(self.motion, Motion::Idle) {
            return Err(MotionRejection::AlreadyMoving);
        }
        let direction = Direction::from_vector(direction).ok_or(MotionRejection::ZeroDirection)?;
        if !self.solid {
            return Err(MotionRejection::NotSolid);
        }
        if surroundings.character_at(self.cell) {
            return Err(MotionRejection::CharacterOnTile);
        }
        ensure_first_step_free(self.cell, direction, surroundings)?;

        self.position = surroundings.metrics.cell_center(self.cell);
        self.motion = Motion::Kicked(Slide::new(
            direction,
            positive_or(surroundings.config.kick_tiles_per_second, 1.0),
            None,
        ));
        Ok(direction)
    }

    /// Starts a magnet pull bounded by `steps` tiles, cancelling any slide.
    pub(crate) fn start_magnet_pull(
        &mut self,
        direction: Vec2,
        steps: u32,
        speed_multiplier: f32,
        surroundings: &Surroundings<'_>,
    ) -> Result<Direction, MotionRejection> {
        let direction = self.check_startable(direction)?;
        if steps == 0 {
            return Err(MotionRejection::TargetBlocked);
        }
        let origin = self.settled_cell(surroundings.metrics);
        ensure_first_step_free(origin, direction, surroundings)?;

        self.settle(surroundings.metrics);
        let speed = positive_or(surroundings.config.magnet_tiles_per_second, 1.0)
            * positive_or(speed_multiplier, 1.0);
        self.motion = Motion::MagnetPulled(Slide::new(direction, speed, Some(steps)));
        Ok(direction)
    }

    /// Launches the bomb over `distance` tiles, cancelling any slide.
    ///
    /// A path that never crosses the wrap seam flies as a single arc. A path
    /// that does is split into one leg per tile with an instant jump at the
    /// seam. The fuse stays paused while airborne.
    pub(crate) fn start_punch(
        &mut self,
        direction: Vec2,
        distance: u32,
        surroundings: &Surroundings<'_>,
    ) -> Result<Direction, MotionRejection> {
        let direction = self.check_startable(direction)?;
        let metrics = surroundings.metrics;
        let origin = self.settled_cell(metrics);

        let mut path: Vec<(CellCoord, Option<CellCoord>)> = Vec::new();
        let mut current = origin;
        for _ in 0..distance {
            match surroundings.stage.resolve_step(current, direction) {
                StepTarget::Inside(next) => path.push((next, None)),
                StepTarget::Wrapped { raw, cell } => path.push((cell, Some(raw))),
                StepTarget::Outside => break,
            }
            current = path[path.len() - 1].0;
        }
        let Some(&(landing, _)) = path.last() else {
            return Err(MotionRejection::TargetBlocked);
        };

        self.settle(metrics);
        let leg_duration = surroundings.config.punch_leg();
        let mut legs = VecDeque::new();
        if path.iter().all(|(_, raw)| raw.is_none()) {
            legs.push_back(ArcLeg::arc(
                self.position,
                metrics.cell_center(landing),
                landing,
                leg_duration.saturating_mul(path.len() as u32),
            ));
        } else {
            let mut from = self.position;
            for (cell, raw) in path {
                let to = metrics.cell_center(cell);
                legs.push_back(match raw {
                    Some(raw) => ArcLeg::jump(raw, to, cell),
                    None => ArcLeg::arc(from, to, cell, leg_duration),
                });
                from = to;
            }
        }

        self.pause_fuse(surroundings.now);
        self.motion = Motion::Punched(Flight {
            direction,
            legs,
            bounces: 0,
            max_bounces: surroundings.config.max_bounces,
            leg_duration,
            arc_height: surroundings.config.punch_arc_height.max(0.0),
        });
        Ok(direction)
    }

    /// Advances travel and the fuse by `dt`; the world clock already reads `now`.
    pub(crate) fn advance(
        &mut self,
        dt: Duration,
        surroundings: &Surroundings<'_>,
        out_events: &mut Vec<Event>,
    ) -> TickOutcome {
        if self.is_exploded() {
            return TickOutcome::Quiet;
        }

        let outcome = match std::mem::take(&mut self.motion) {
            Motion::Idle => TickOutcome::Quiet,
            Motion::Kicked(slide) => {
                self.advance_slide(slide, MotionKind::Kick, dt, surroundings, out_events)
            }
            Motion::MagnetPulled(slide) => {
                self.advance_slide(slide, MotionKind::MagnetPull, dt, surroundings, out_events)
            }
            Motion::Punched(flight) => self.advance_flight(flight, dt, surroundings, out_events),
        };

        if self
            .fuse
            .map_or(false, |fuse| fuse.expired(surroundings.now))
        {
            return TickOutcome::FuseExpired;
        }
        outcome
    }

    fn touches_blast(&self, surroundings: &Surroundings<'_>) -> bool {
        surroundings.is_live_blast(self.cell) || surroundings.ground_ignites(self.id, self.cell)
    }

    fn stop(&mut self, kind: MotionKind, metrics: GridMetrics, out_events: &mut Vec<Event>) {
        self.position = metrics.cell_center(self.cell);
        self.motion = Motion::Idle;
        out_events.push(Event::BombStopped {
            bomb: self.id,
            cell: self.cell,
            motion: kind,
        });
    }

    fn advance_slide(
        &mut self,
        mut slide: Slide,
        kind: MotionKind,
        dt: Duration,
        surroundings: &Surroundings<'_>,
        out_events: &mut Vec<Event>,
    ) -> TickOutcome {
        let metrics = surroundings.metrics;
        let mut budget = dt.as_secs_f32() * slide.tiles_per_second;

        loop {
            let mut leg = match slide.leg.take() {
                Some(leg) => leg,
                None => {
                    if slide.steps_left == Some(0) {
                        self.stop(kind, metrics, out_events);
                        return TickOutcome::Quiet;
                    }
                    match surroundings.stage.resolve_step(self.cell, slide.direction) {
                        StepTarget::Outside => {
                            self.stop(kind, metrics, out_events);
                            return TickOutcome::Quiet;
                        }
                        StepTarget::Inside(next) => {
                            if surroundings.blocks(next, ObstacleMask::SLIDE) {
                                self.stop(kind, metrics, out_events);
                                return TickOutcome::Quiet;
                            }
                            SlideLeg {
                                from: self.position,
                                to: metrics.cell_center(next),
                                cell: next,
                                progress: 0.0,
                            }
                        }
                        StepTarget::Wrapped { raw, cell } => {
                            if surroundings.blocks(cell, ObstacleMask::SLIDE) {
                                self.stop(kind, metrics, out_events);
                                return TickOutcome::Quiet;
                            }
                            self.cell = cell;
                            self.position = metrics.cell_center(cell);
                            slide.consume_step();
                            out_events.push(Event::BombWrapped {
                                bomb: self.id,
                                from: raw,
                                to: cell,
                            });
                            if self.touches_blast(surroundings) {
                                self.stop(kind, metrics, out_events);
                                return TickOutcome::Contact;
                            }
                            continue;
                        }
                    }
                }
            };

            let remaining = 1.0 - leg.progress;
            if budget < remaining {
                leg.progress += budget;
                self.position = leg.from.lerp(leg.to, leg.progress);
                slide.leg = Some(leg);
                self.motion = match kind {
                    MotionKind::MagnetPull => Motion::MagnetPulled(slide),
                    MotionKind::Kick | MotionKind::Punch => Motion::Kicked(slide),
                };
                return TickOutcome::Quiet;
            }

            budget -= remaining;
            let from = self.cell;
            self.cell = leg.cell;
            self.position = leg.to;
            slide.consume_step();
            out_events.push(Event::BombMoved {
                bomb: self.id,
                from,
                to: leg.cell,
            });
            if self.touches_blast(surroundings) {
                self.stop(kind, metrics, out_events);
                return TickOutcome::Contact;
            }
        }
    }

    fn advance_flight(
        &mut self,
        mut flight: Flight,
        dt: Duration,
        surroundings: &Surroundings<'_>,
        out_events: &mut Vec<Event>,
    ) -> TickOutcome {
        let metrics = surroundings.metrics;
        let mut budget = dt;

        loop {
            let Some(mut leg) = flight.legs.pop_front() else {
                if flight.bounces < flight.max_bounces
                    && surroundings.blocks(self.cell, ObstacleMask::LANDING)
                {
                    let bounce = match surroundings.stage.resolve_step(self.cell, flight.direction)
                    {
                        StepTarget::Inside(next) => Some(ArcLeg::arc(
                            self.position,
                            metrics.cell_center(next),
                            next,
                            flight.leg_duration,
                        )),
                        StepTarget::Wrapped { raw, cell } => {
                            Some(ArcLeg::jump(raw, metrics.cell_center(cell), cell))
                        }
                        StepTarget::Outside => None,
                    };
                    if let Some(bounce) = bounce {
                        flight.bounces += 1;
                        flight.legs.push_back(bounce);
                        out_events.push(Event::BombBounced {
                            bomb: self.id,
                            cell: self.cell,
                        });
                        continue;
                    }
                }
                return self.land(surroundings, out_events);
            };

            if let Some(raw) = leg.jump_from {
                self.cell = leg.cell;
                self.position = leg.to;
                self.height = 0.0;
                out_events.push(Event::BombWrapped {
                    bomb: self.id,
                    from: raw,
                    to: leg.cell,
                });
                continue;
            }

            let left = leg.duration.saturating_sub(leg.elapsed);
            if budget < left {
                leg.elapsed += budget;
                let t = leg.elapsed.as_secs_f32() / leg.duration.as_secs_f32();
                self.position = leg.from.lerp(leg.to, t);
                self.height = 4.0 * flight.arc_height * t * (1.0 - t);
                flight.legs.push_front(leg);
                self.motion = Motion::Punched(flight);
                return TickOutcome::Quiet;
            }

            budget -= left;
            self.cell = leg.cell;
            self.position = leg.to;
            self.height = 0.0;
        }
    }

    fn land(&mut self, surroundings: &Surroundings<'_>, out_events: &mut Vec<Event>) -> TickOutcome {
        self.position = surroundings.metrics.cell_center(self.cell);
        self.height = 0.0;
        self.motion = Motion::Idle;
        self.resume_fuse(surroundings.now);
        self.solid = !surroundings.character_at(self.cell);
        out_events.push(Event::BombLanded {
            bomb: self.id,
            cell: self.cell,
        });
        if self.touches_blast(surroundings) {
            TickOutcome::Contact
        } else {
            TickOutcome::Quiet
        }
    }
}

fn ensure_first_step_free(
    origin: CellCoord,
    direction: Direction,
    surroundings: &Surroundings<'_>,
) -> Result<(), MotionRejection> {
    let target = match surroundings.stage.resolve_step(origin, direction) {
        StepTarget::Inside(cell) | StepTarget::Wrapped { cell, .. } => cell,
        StepTarget::Outside => return Err(MotionRejection::TargetBlocked),
    };
    if surroundings.blocks(target, ObstacleMask::KICK_START) {
        return Err(MotionRejection::TargetBlocked);
    }
    Ok(())
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}
