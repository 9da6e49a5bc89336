//! Cross-shaped blast propagation.
//!
//! Rays only read the stage; every mutation they decide on is collected and
//! applied by the world once all four rays have been cast.

use std::{collections::BTreeSet, time::Duration};

use bomb_arena_core::{
    BlastAction, BlastContext, BombId, CellCoord, Direction, ExplosionPart, ExplosionSegment,
    ItemKind, OwnerId,
};

use crate::{occupancy::Surroundings, stage::StepTarget};

/// Side effect discovered by a ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BlastHit {
    /// An item pickup caught in the blast.
    Item { cell: CellCoord, item: ItemKind },
    /// A live bomb the blast must hand to the chain scheduler.
    Bomb(BombId),
}

/// Segments and hits produced by a single ray.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Ray {
    pub(crate) segments: Vec<ExplosionSegment>,
    pub(crate) hits: Vec<BlastHit>,
}

/// Everything a detonation decided, ready to be applied.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BlastOutcome {
    pub(crate) radius: u32,
    pub(crate) pierce: bool,
    pub(crate) segments: Vec<ExplosionSegment>,
    pub(crate) hits: Vec<BlastHit>,
    pub(crate) actions: Vec<BlastAction>,
}

/// Casts a full blast from `origin`.
///
/// The ground tile under the origin may rewrite radius and piercing once
/// before the four rays are cast in [`Direction::ALL`] order.
pub(crate) fn cast(
    surroundings: &Surroundings<'_>,
    owner: Option<OwnerId>,
    origin: CellCoord,
    radius: u32,
    pierce: bool,
) -> BlastOutcome {
    let mut context = BlastContext::new(owner, origin);
    let position = surroundings.metrics.cell_center(origin);
    let (mut radius, mut pierce) = (radius, pierce);

    if let Some(tile) = surroundings.stage.ground(origin) {
        if let Some(effect) = surroundings.effects.ground(tile) {
            if effect.try_modify_explosion(&context, position, tile, &mut radius, &mut pierce) {
                log::debug!(
                    "ground tile {} at {:?} modified blast to radius {radius}, pierce {pierce}",
                    tile.get(),
                    origin
                );
            }
        }
    }

    let mut segments = vec![ExplosionSegment {
        cell: origin,
        position,
        direction: None,
        part: ExplosionPart::Start,
        start_delay: Duration::ZERO,
        duration: surroundings.config.segment_duration(),
    }];
    let mut hits = Vec::new();
    for direction in Direction::ALL {
        let ray = explode_direction(surroundings, &mut context, origin, direction, radius, pierce);
        segments.extend(ray.segments);
        hits.extend(ray.hits);
    }

    BlastOutcome {
        radius,
        pierce,
        segments,
        hits,
        actions: context.into_actions(),
    }
}

/// Marches a single ray of at most `max_length` tiles.
///
/// Indestructible tiles, the stage edge and a wrap back onto a cell the ray
/// already covered stop it without a segment.
/// Items, destructible and crumbling tiles add their segment and stop the ray
/// unless it pierces. Live bombs add their segment and always stop it. Only a
/// ray that runs its full length tags its last segment [`ExplosionPart::End`].
pub(crate) fn explode_direction(
    surroundings: &Surroundings<'_>,
    context: &mut BlastContext,
    origin: CellCoord,
    direction: Direction,
    max_length: u32,
    pierce: bool,
) -> Ray {
    let stage = surroundings.stage;
    let metrics = surroundings.metrics;
    let stagger = surroundings.config.segment_stagger();
    let duration = surroundings.config.segment_duration();

    let mut ray = Ray::default();
    let mut cell = origin;
    let mut covered = BTreeSet::from([origin]);
    let mut stopped = false;

    for step in 1..=max_length {
        cell = match stage.resolve_step(cell, direction) {
            StepTarget::Inside(next) | StepTarget::Wrapped { cell: next, .. } => next,
            StepTarget::Outside => {
                stopped = true;
                break;
            }
        };
        if !covered.insert(cell) {
            stopped = true;
            break;
        }
        let position = metrics.cell_center(cell);

        if let Some(tile) = stage.indestructible(cell) {
            if let Some(effect) = surroundings.effects.indestructible(tile) {
                let _ = effect.handle_blast_hit(context, position, cell);
            }
            stopped = true;
            break;
        }

        ray.segments.push(ExplosionSegment {
            cell,
            position,
            direction: Some(direction),
            part: ExplosionPart::Middle,
            start_delay: stagger.saturating_mul(step),
            duration,
        });

        if let Some(item) = stage.item(cell) {
            ray.hits.push(BlastHit::Item { cell, item });
            if !pierce {
                stopped = true;
                break;
            }
            continue;
        }

        if let Some(tile) = stage.destructible(cell) {
            let handled = surroundings
                .effects
                .destructible(tile)
                .map_or(false, |effect| effect.handle_blast_hit(context, position, cell));
            if !handled && !context.clears(cell) {
                context.clear_destructible(cell);
            }
            if !pierce {
                stopped = true;
                break;
            }
            continue;
        }

        if stage.is_crumbling(cell) {
            if !pierce {
                stopped = true;
                break;
            }
            continue;
        }

        if let Some(bomb) = surroundings.live_bomb_at(cell) {
            ray.hits.push(BlastHit::Bomb(bomb.id()));
            stopped = true;
            break;
        }
    }

    if !stopped {
        if let Some(last) = ray.segments.last_mut() {
            last.part = ExplosionPart::End;
        }
    }
    ray
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bomb_arena_core::{
        BombVariant, CharacterId, DestructibleEffect, EngineConfig, StageLayout,
    };
    use glam::Vec2;

    use super::*;
    use crate::{bomb::Bomb, effects::TileEffectRegistry, grid::GridMetrics, stage::Stage};

    struct Fixture {
        stage: Stage,
        config: EngineConfig,
        bombs: BTreeMap<BombId, Bomb>,
        characters: BTreeMap<CharacterId, CellCoord>,
        blasts: BTreeMap<CellCoord, Duration>,
        effects: TileEffectRegistry,
    }

    impl Fixture {
        fn new(map: &str) -> Self {
            let layout = crate::stage::parse_layout(map, 0).expect("test map should parse");
            Self::from_layout(layout)
        }

        fn from_layout(layout: StageLayout) -> Self {
            Self {
                stage: Stage::from_layout(layout),
                config: EngineConfig::default(),
                bombs: BTreeMap::new(),
                characters: BTreeMap::new(),
                blasts: BTreeMap::new(),
                effects: TileEffectRegistry::new(),
            }
        }

        fn with_bomb(mut self, id: u32, cell: CellCoord) -> Self {
            let bomb = Bomb::new(
                BombId::new(id),
                None,
                BombVariant::NORMAL,
                1,
                None,
                cell,
                Vec2::ZERO,
                true,
            );
            let _ = self.bombs.insert(BombId::new(id), bomb);
            self
        }

        fn surroundings(&self) -> Surroundings<'_> {
            Surroundings {
                stage: &self.stage,
                metrics: GridMetrics::default(),
                config: &self.config,
                bombs: &self.bombs,
                characters: &self.characters,
                blasts: &self.blasts,
                effects: &self.effects,
                now: Duration::ZERO,
            }
        }

        fn ray(&self, origin: CellCoord, direction: Direction, length: u32, pierce: bool) -> Ray {
            let mut context = BlastContext::new(None, origin);
            explode_direction(
                &self.surroundings(),
                &mut context,
                origin,
                direction,
                length,
                pierce,
            )
        }
    }

    fn parts(ray: &Ray) -> Vec<ExplosionPart> {
        ray.segments.iter().map(|segment| segment.part).collect()
    }

    const OPEN: &str = "\
.........
.........
.........
.........
.........";

    #[test]
    fn unobstructed_ray_ends_at_full_length() {
        let fixture = Fixture::new(OPEN);
        for radius in 0..=3 {
            let ray = fixture.ray(CellCoord::new(4, 2), Direction::East, radius, false);
            assert_eq!(ray.segments.len(), radius as usize);
            if radius > 0 {
                assert_eq!(ray.segments.last().map(|s| s.part), Some(ExplosionPart::End));
                assert!(ray.segments[..radius as usize - 1]
                    .iter()
                    .all(|segment| segment.part == ExplosionPart::Middle));
            }
        }
    }

    #[test]
    fn segment_delays_grow_with_distance() {
        let fixture = Fixture::new(OPEN);
        let ray = fixture.ray(CellCoord::new(4, 2), Direction::West, 3, false);
        let stagger = fixture.config.segment_stagger();
        let delays: Vec<Duration> = ray.segments.iter().map(|s| s.start_delay).collect();
        assert_eq!(delays, vec![stagger, stagger * 2, stagger * 3]);
        assert!(ray
            .segments
            .iter()
            .all(|segment| segment.direction == Some(Direction::West)));
    }

    #[test]
    fn wall_stops_ray_without_a_segment() {
        let fixture = Fixture::new("....#....");
        let ray = fixture.ray(CellCoord::new(1, 0), Direction::East, 5, true);
        assert_eq!(ray.segments.len(), 2);
        assert_eq!(parts(&ray), vec![ExplosionPart::Middle, ExplosionPart::Middle]);
    }

    #[test]
    fn stage_edge_without_wrap_stops_ray() {
        let fixture = Fixture::new(OPEN);
        let ray = fixture.ray(CellCoord::new(1, 2), Direction::West, 4, false);
        assert_eq!(ray.segments.len(), 1);
        assert_eq!(parts(&ray), vec![ExplosionPart::Middle]);
    }

    #[test]
    fn destructible_stops_plain_ray_and_is_cleared() {
        let fixture = Fixture::new(".....+...");
        let mut context = BlastContext::new(None, CellCoord::new(2, 0));
        let ray = explode_direction(
            &fixture.surroundings(),
            &mut context,
            CellCoord::new(2, 0),
            Direction::East,
            3,
            false,
        );
        assert_eq!(ray.segments.len(), 3);
        assert_eq!(ray.segments[2].cell, CellCoord::new(5, 0));
        assert_eq!(ray.segments[2].part, ExplosionPart::Middle);
        assert_eq!(
            context.actions(),
            &[BlastAction::ClearDestructible {
                cell: CellCoord::new(5, 0)
            }]
        );
    }

    #[test]
    fn piercing_ray_passes_soft_obstacles_but_not_bombs() {
        let fixture = Fixture::new("..+f+....").with_bomb(9, CellCoord::new(6, 0));
        let ray = fixture.ray(CellCoord::new(0, 0), Direction::East, 8, true);
        assert_eq!(ray.segments.len(), 6);
        assert_eq!(ray.segments.last().map(|s| s.part), Some(ExplosionPart::Middle));
        assert_eq!(
            ray.hits,
            vec![
                BlastHit::Item {
                    cell: CellCoord::new(3, 0),
                    item: ItemKind::FireUp
                },
                BlastHit::Bomb(BombId::new(9)),
            ]
        );
    }

    #[test]
    fn piercing_ray_of_exact_length_ends_on_destructible() {
        let fixture = Fixture::new("..+");
        let ray = fixture.ray(CellCoord::new(0, 0), Direction::East, 2, true);
        assert_eq!(parts(&ray), vec![ExplosionPart::Middle, ExplosionPart::End]);

        let blocked = fixture.ray(CellCoord::new(0, 0), Direction::East, 2, false);
        assert_eq!(parts(&blocked), vec![ExplosionPart::Middle, ExplosionPart::Middle]);
    }

    #[test]
    fn bomb_always_stops_the_ray() {
        let fixture = Fixture::new(OPEN).with_bomb(2, CellCoord::new(4, 0));
        let ray = fixture.ray(CellCoord::new(4, 2), Direction::North, 2, true);
        assert_eq!(ray.segments.len(), 2);
        assert_eq!(ray.segments[1].part, ExplosionPart::Middle);
        assert_eq!(ray.hits, vec![BlastHit::Bomb(BombId::new(2))]);
    }

    #[test]
    fn crumbling_tile_stops_without_second_clear() {
        let mut fixture = Fixture::new("...+.");
        let _ = fixture
            .stage
            .clear_destructible(CellCoord::new(3, 0), Duration::from_secs(1));
        let mut context = BlastContext::new(None, CellCoord::new(0, 0));
        let ray = explode_direction(
            &fixture.surroundings(),
            &mut context,
            CellCoord::new(0, 0),
            Direction::East,
            4,
            false,
        );
        assert_eq!(ray.segments.len(), 3);
        assert_eq!(ray.segments[2].part, ExplosionPart::Middle);
        assert!(context.actions().is_empty());
    }

    #[derive(Debug)]
    struct Sturdy;

    impl DestructibleEffect for Sturdy {
        fn handle_blast_hit(
            &self,
            _context: &mut BlastContext,
            _position: Vec2,
            _cell: CellCoord,
        ) -> bool {
            true
        }
    }

    #[test]
    fn handled_destructible_is_not_cleared_by_the_engine() {
        let mut fixture = Fixture::new("..+..");
        let _ = fixture
            .effects
            .register_destructible(bomb_arena_core::tiles::CRATE, Sturdy);
        let mut context = BlastContext::new(None, CellCoord::new(0, 0));
        let ray = explode_direction(
            &fixture.surroundings(),
            &mut context,
            CellCoord::new(0, 0),
            Direction::East,
            4,
            false,
        );
        assert_eq!(ray.segments.len(), 2);
        assert!(context.actions().is_empty());
    }

    #[test]
    fn blast_through_side_tunnel_wraps() {
        let fixture = Fixture::new(
            "\
#####
#...#
.....
#...#
#####",
        );
        let ray = fixture.ray(CellCoord::new(1, 2), Direction::West, 3, false);
        let cells: Vec<CellCoord> = ray.segments.iter().map(|s| s.cell).collect();
        assert_eq!(
            cells,
            vec![CellCoord::new(0, 2), CellCoord::new(4, 2), CellCoord::new(3, 2)]
        );
        assert_eq!(ray.segments[2].part, ExplosionPart::End);
    }

    #[test]
    fn wrapped_ray_stops_before_lapping_its_origin() {
        let fixture = Fixture::new(
            "\
#####
#...#
.....
#...#
#####",
        );
        let ray = fixture.ray(CellCoord::new(2, 2), Direction::East, 8, false);
        let cells: Vec<CellCoord> = ray.segments.iter().map(|s| s.cell).collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(3, 2),
                CellCoord::new(4, 2),
                CellCoord::new(0, 2),
                CellCoord::new(1, 2),
            ]
        );
        assert_eq!(ray.segments[3].part, ExplosionPart::Middle);
    }

    #[test]
    fn full_blast_lists_origin_first_then_rays() {
        let fixture = Fixture::from_layout(StageLayout {
            columns: 5,
            rows: 5,
            ..StageLayout::default()
        });
        let outcome = cast(&fixture.surroundings(), None, CellCoord::new(2, 2), 2, false);
        assert_eq!(outcome.segments.len(), 9);
        assert_eq!(outcome.segments[0].part, ExplosionPart::Start);
        assert_eq!(outcome.segments[0].direction, None);
        let directions: Vec<Option<Direction>> = outcome.segments[1..]
            .iter()
            .map(|segment| segment.direction)
            .collect();
        assert_eq!(
            directions,
            vec![
                Some(Direction::North),
                Some(Direction::North),
                Some(Direction::East),
                Some(Direction::East),
                Some(Direction::South),
                Some(Direction::South),
                Some(Direction::West),
                Some(Direction::West),
            ]
        );
        assert!(outcome.hits.is_empty());
        assert_eq!(outcome.radius, 2);
    }
}
