use std::time::Duration;

use bomb_arena_core::{
    BombId, BombVariant, CellCoord, CharacterId, Command, DetonationRejection, Direction,
    EngineConfig, Event, MotionKind, MotionRejection, MotionState, OwnerId,
};
use bomb_arena_world::{self as world, parse_layout, query, World};
use glam::Vec2;

const CORRIDOR: &str = "\
#########
#.......#
#########";

const SIDE_TUNNEL: &str = "\
#####
#...#
..+..
#...#
#####";

const RING: &str = "\
#######
#.....#
#.....#
#.....#
#######";

fn stage(map: &str) -> World {
    let mut world = World::new(EngineConfig::default());
    let layout = parse_layout(map, 5).expect("test map should parse");
    let _ = run(&mut world, Command::LoadStage { layout });
    world
}

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    run(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
    )
}

/// Ticks in small steps until `done` matches an event or the budget runs out.
fn tick_until(world: &mut World, done: impl Fn(&Event) -> bool) -> Vec<Event> {
    let mut collected = Vec::new();
    for _ in 0..40 {
        let events = tick(world, 50);
        let finished = events.iter().any(&done);
        collected.extend(events);
        if finished {
            break;
        }
    }
    collected
}

fn place(world: &mut World, cell: (i32, i32), variant: BombVariant) -> BombId {
    let events = run(
        world,
        Command::PlaceBomb {
            owner: Some(OwnerId::new(7)),
            position: Vec2::new(cell.0 as f32 + 0.5, cell.1 as f32 + 0.5),
            variant,
            radius: 1,
            chain_delay: None,
        },
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::BombPlaced { bomb, .. } => Some(*bomb),
            _ => None,
        })
        .expect("placement should succeed")
}

fn kick(world: &mut World, bomb: BombId, direction: Vec2) -> Vec<Event> {
    run(world, Command::Kick { bomb, direction })
}

fn punch(world: &mut World, bomb: BombId, direction: Vec2, distance: Option<u32>) -> Vec<Event> {
    run(
        world,
        Command::Punch {
            bomb,
            direction,
            distance,
        },
    )
}

fn rejection(events: &[Event]) -> Option<MotionRejection> {
    match events {
        [Event::MotionRejected { reason, .. }] => Some(*reason),
        _ => None,
    }
}

fn cell_of(world: &World, bomb: BombId) -> CellCoord {
    query::bomb(world, bomb).expect("bomb should exist").cell
}

fn travel(events: &[Event]) -> Vec<Event> {
    events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::BombMoved { .. }
                    | Event::BombWrapped { .. }
                    | Event::BombStopped { .. }
                    | Event::BombBounced { .. }
                    | Event::BombLanded { .. }
            )
        })
        .cloned()
        .collect()
}

#[test]
fn kicked_bomb_slides_until_the_wall() {
    let mut world = stage(CORRIDOR);
    let bomb = place(&mut world, (2, 1), BombVariant::NORMAL);

    let events = kick(&mut world, bomb, Vec2::new(0.9, 0.2));
    assert_eq!(
        events,
        vec![Event::BombMotionStarted {
            bomb,
            motion: MotionKind::Kick,
            direction: Direction::East,
        }]
    );
    assert_eq!(
        query::bomb(&world, bomb).map(|snapshot| snapshot.motion),
        Some(MotionState::Kicked)
    );

    let events = tick(&mut world, 1_000);
    let moves = events
        .iter()
        .filter(|event| matches!(event, Event::BombMoved { .. }))
        .count();
    assert_eq!(moves, 5);
    assert!(events.contains(&Event::BombStopped {
        bomb,
        cell: CellCoord::new(7, 1),
        motion: MotionKind::Kick,
    }));
    let snapshot = query::bomb(&world, bomb).expect("bomb");
    assert_eq!(snapshot.position, Vec2::new(7.5, 1.5));
    assert_eq!(snapshot.motion, MotionState::Idle);
}

#[test]
fn kick_requests_are_validated_in_order() {
    let mut world = stage(CORRIDOR);
    let walled = place(&mut world, (7, 1), BombVariant::NORMAL);
    assert_eq!(
        rejection(&kick(&mut world, walled, Vec2::X)),
        Some(MotionRejection::TargetBlocked)
    );
    assert_eq!(
        rejection(&kick(&mut world, walled, Vec2::ZERO)),
        Some(MotionRejection::ZeroDirection)
    );
    assert_eq!(
        rejection(&kick(&mut world, BombId::new(99), Vec2::X)),
        Some(MotionRejection::UnknownBomb)
    );

    let player = CharacterId::new(1);
    let _ = run(
        &mut world,
        Command::SetCharacterCell {
            character: player,
            cell: Some(CellCoord::new(3, 1)),
        },
    );
    let fresh = place(&mut world, (3, 1), BombVariant::NORMAL);
    assert_eq!(
        rejection(&kick(&mut world, fresh, Vec2::NEG_X)),
        Some(MotionRejection::NotSolid)
    );

    let _ = run(
        &mut world,
        Command::SetCharacterCell {
            character: player,
            cell: Some(CellCoord::new(4, 1)),
        },
    );
    assert!(query::bomb(&world, fresh).map_or(false, |snapshot| snapshot.solid));
    let _ = run(
        &mut world,
        Command::SetCharacterCell {
            character: player,
            cell: Some(CellCoord::new(3, 1)),
        },
    );
    assert_eq!(
        rejection(&kick(&mut world, fresh, Vec2::NEG_X)),
        Some(MotionRejection::CharacterOnTile)
    );

    let _ = run(
        &mut world,
        Command::SetCharacterCell {
            character: player,
            cell: None,
        },
    );
    assert!(rejection(&kick(&mut world, fresh, Vec2::NEG_X)).is_none());
    assert_eq!(
        rejection(&kick(&mut world, fresh, Vec2::NEG_X)),
        Some(MotionRejection::AlreadyMoving)
    );
}

#[test]
fn kick_into_a_bomb_is_blocked() {
    let mut world = stage(CORRIDOR);
    let kicked = place(&mut world, (2, 1), BombVariant::NORMAL);
    let _ = place(&mut world, (3, 1), BombVariant::NORMAL);
    assert_eq!(
        rejection(&kick(&mut world, kicked, Vec2::X)),
        Some(MotionRejection::TargetBlocked)
    );

    let _ = place(&mut world, (6, 1), BombVariant::NORMAL);
    let runner = place(&mut world, (4, 1), BombVariant::NORMAL);
    let _ = kick(&mut world, runner, Vec2::X);
    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::BombStopped {
        bomb: runner,
        cell: CellCoord::new(5, 1),
        motion: MotionKind::Kick,
    }));
}

#[test]
fn kick_through_a_side_tunnel_wraps_around() {
    let mut world = stage(SIDE_TUNNEL);
    let bomb = place(&mut world, (3, 2), BombVariant::NORMAL);
    let _ = kick(&mut world, bomb, Vec2::X);

    let events = tick(&mut world, 1_000);
    assert_eq!(
        travel(&events),
        vec![
            Event::BombMoved {
                bomb,
                from: CellCoord::new(3, 2),
                to: CellCoord::new(4, 2),
            },
            Event::BombWrapped {
                bomb,
                from: CellCoord::new(5, 2),
                to: CellCoord::new(0, 2),
            },
            Event::BombMoved {
                bomb,
                from: CellCoord::new(0, 2),
                to: CellCoord::new(1, 2),
            },
            Event::BombStopped {
                bomb,
                cell: CellCoord::new(1, 2),
                motion: MotionKind::Kick,
            },
        ]
    );
}

#[test]
fn stage_edge_without_walls_stops_a_kick() {
    let mut world = stage("......");
    assert!(query::wrap_domain(&world).is_none());
    let bomb = place(&mut world, (4, 0), BombVariant::NORMAL);
    let _ = kick(&mut world, bomb, Vec2::X);
    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::BombStopped {
        bomb,
        cell: CellCoord::new(5, 0),
        motion: MotionKind::Kick,
    }));
    assert_eq!(
        rejection(&kick(&mut world, bomb, Vec2::X)),
        Some(MotionRejection::TargetBlocked)
    );
}

#[test]
fn punch_over_the_ring_wall_wraps_to_the_far_side() {
    let mut world = stage(RING);
    let bomb = place(&mut world, (4, 2), BombVariant::NORMAL);

    let events = punch(&mut world, bomb, Vec2::X, Some(3));
    assert_eq!(
        events,
        vec![Event::BombMotionStarted {
            bomb,
            motion: MotionKind::Punch,
            direction: Direction::East,
        }]
    );
    assert!(query::bomb(&world, bomb).map_or(false, |snapshot| snapshot.fuse_paused));

    let events = tick_until(&mut world, |event| matches!(event, Event::BombLanded { .. }));
    assert_eq!(
        travel(&events),
        vec![
            Event::BombWrapped {
                bomb,
                from: CellCoord::new(7, 2),
                to: CellCoord::new(1, 2),
            },
            Event::BombLanded {
                bomb,
                cell: CellCoord::new(1, 2),
            },
        ]
    );
    assert_eq!(cell_of(&world, bomb), CellCoord::new(1, 2));
}

#[test]
fn punch_keeps_the_remaining_fuse() {
    let mut world = stage(RING);
    let bomb = place(&mut world, (1, 1), BombVariant::NORMAL);
    let _ = tick(&mut world, 1_000);

    let _ = punch(&mut world, bomb, Vec2::Y, Some(2));
    let mut peak: f32 = 0.0;
    for _ in 0..3 {
        let _ = tick(&mut world, 50);
        let snapshot = query::bomb(&world, bomb).expect("bomb");
        assert_eq!(snapshot.fuse_remaining, Some(Duration::from_secs(2)));
        peak = peak.max(snapshot.height);
    }
    assert!(peak > 0.0);

    let _ = tick_until(&mut world, |event| matches!(event, Event::BombLanded { .. }));
    let snapshot = query::bomb(&world, bomb).expect("bomb");
    assert_eq!(snapshot.cell, CellCoord::new(1, 3));
    assert_eq!(snapshot.height, 0.0);
    assert!(!snapshot.fuse_paused);
    assert_eq!(snapshot.fuse_remaining, Some(Duration::from_secs(2)));
}

#[test]
fn punched_bomb_bounces_off_another_bomb() {
    let mut world = stage("........");
    let punched = place(&mut world, (1, 0), BombVariant::NORMAL);
    let _ = place(&mut world, (4, 0), BombVariant::NORMAL);

    let _ = punch(&mut world, punched, Vec2::X, None);
    let events = tick_until(&mut world, |event| matches!(event, Event::BombLanded { .. }));
    assert_eq!(
        travel(&events),
        vec![
            Event::BombBounced {
                bomb: punched,
                cell: CellCoord::new(4, 0),
            },
            Event::BombLanded {
                bomb: punched,
                cell: CellCoord::new(5, 0),
            },
        ]
    );
}

#[test]
fn punch_requests_are_validated() {
    let mut world = stage("....");
    let bomb = place(&mut world, (3, 0), BombVariant::REMOTE);
    assert_eq!(
        rejection(&punch(&mut world, bomb, Vec2::ZERO, None)),
        Some(MotionRejection::ZeroDirection)
    );
    assert_eq!(
        rejection(&punch(&mut world, bomb, Vec2::NEG_X, Some(0))),
        Some(MotionRejection::TargetBlocked)
    );
    assert_eq!(
        rejection(&punch(&mut world, bomb, Vec2::X, Some(2))),
        Some(MotionRejection::TargetBlocked)
    );

    assert!(rejection(&punch(&mut world, bomb, Vec2::NEG_X, Some(3))).is_none());
    assert_eq!(
        rejection(&punch(&mut world, bomb, Vec2::NEG_X, Some(1))),
        Some(MotionRejection::Airborne)
    );
    assert_eq!(
        rejection(&kick(&mut world, bomb, Vec2::NEG_X)),
        Some(MotionRejection::Airborne)
    );
    assert_eq!(
        run(&mut world, Command::Detonate { bomb }),
        vec![Event::DetonationRejected {
            bomb: Some(bomb),
            reason: DetonationRejection::Airborne,
        }]
    );
    assert_eq!(
        run(
            &mut world,
            Command::TriggerRemote {
                owner: OwnerId::new(7)
            }
        ),
        vec![Event::DetonationRejected {
            bomb: None,
            reason: DetonationRejection::NoRemoteBombs,
        }]
    );
}

#[test]
fn punch_interrupts_a_slide() {
    let mut world = stage(CORRIDOR);
    let bomb = place(&mut world, (2, 1), BombVariant::NORMAL);
    let _ = kick(&mut world, bomb, Vec2::X);
    let _ = tick(&mut world, 50);

    assert!(rejection(&punch(&mut world, bomb, Vec2::X, Some(2))).is_none());
    let events = tick_until(&mut world, |event| matches!(event, Event::BombLanded { .. }));
    assert!(events.contains(&Event::BombLanded {
        bomb,
        cell: CellCoord::new(4, 1),
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::BombMoved { .. })));
}

#[test]
fn magnet_pulse_pulls_the_first_bomb_in_line() {
    let mut world = stage("..........");
    let bomb = place(&mut world, (4, 0), BombVariant::NORMAL);

    let events = run(
        &mut world,
        Command::MagnetPulse {
            origin: CellCoord::new(0, 0),
            facing: Direction::East,
            range: 6,
            speed_multiplier: 1.0,
        },
    );
    assert_eq!(
        events,
        vec![Event::BombMotionStarted {
            bomb,
            motion: MotionKind::MagnetPull,
            direction: Direction::West,
        }]
    );

    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::BombStopped {
        bomb,
        cell: CellCoord::new(1, 0),
        motion: MotionKind::MagnetPull,
    }));
}

#[test]
fn magnet_cannot_pull_an_adjacent_bomb() {
    let mut world = stage("..........");
    let bomb = place(&mut world, (1, 0), BombVariant::NORMAL);

    let events = run(
        &mut world,
        Command::MagnetPulse {
            origin: CellCoord::new(0, 0),
            facing: Direction::East,
            range: 6,
            speed_multiplier: 1.0,
        },
    );
    assert_eq!(
        events,
        vec![Event::MotionRejected {
            bomb,
            motion: MotionKind::MagnetPull,
            reason: MotionRejection::TargetBlocked,
        }]
    );

    let events = run(
        &mut world,
        Command::MagnetPull {
            bomb,
            direction: Vec2::X,
            steps: 0,
            speed_multiplier: 2.0,
        },
    );
    assert_eq!(rejection(&events), Some(MotionRejection::TargetBlocked));
}

#[test]
fn magnet_pull_respects_its_step_budget() {
    let mut world = stage("..........");
    let bomb = place(&mut world, (2, 0), BombVariant::NORMAL);

    let _ = run(
        &mut world,
        Command::MagnetPull {
            bomb,
            direction: Vec2::X,
            steps: 3,
            speed_multiplier: 2.0,
        },
    );
    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::BombStopped {
        bomb,
        cell: CellCoord::new(5, 0),
        motion: MotionKind::MagnetPull,
    }));
}

#[test]
fn sliding_into_a_live_blast_requests_a_chain() {
    let mut world = stage("..........");
    let kicked = place(&mut world, (5, 0), BombVariant::NORMAL);
    let remote = place(&mut world, (8, 0), BombVariant::REMOTE);
    let _ = run(&mut world, Command::Detonate { bomb: remote });
    assert!(query::is_live_blast(&world, CellCoord::new(7, 0)));

    assert!(rejection(&kick(&mut world, kicked, Vec2::X)).is_none());
    let events = tick(&mut world, 300);
    assert!(events.contains(&Event::BombMoved {
        bomb: kicked,
        from: CellCoord::new(6, 0),
        to: CellCoord::new(7, 0),
    }));
    assert!(events.contains(&Event::BlastReachedBomb {
        bomb: kicked,
        delay: None,
    }));
    assert_eq!(cell_of(&world, kicked), CellCoord::new(7, 0));
}

#[test]
fn kick_start_refuses_a_live_blast_ahead() {
    let mut world = stage("..........");
    let kicked = place(&mut world, (5, 0), BombVariant::NORMAL);
    let remote = place(&mut world, (7, 0), BombVariant::REMOTE);
    let _ = run(&mut world, Command::Detonate { bomb: remote });
    assert_eq!(
        rejection(&kick(&mut world, kicked, Vec2::X)),
        Some(MotionRejection::TargetBlocked)
    );
}

#[test]
fn detonation_mid_slide_settles_the_bomb() {
    let mut world = stage(CORRIDOR);
    let bomb = place(&mut world, (2, 1), BombVariant::NORMAL);
    let _ = kick(&mut world, bomb, Vec2::X);
    let _ = tick(&mut world, 50);

    let events = run(&mut world, Command::ChainDetonate { bomb });
    assert!(events.contains(&Event::BombExploded {
        bomb,
        owner: Some(OwnerId::new(7)),
        cell: CellCoord::new(2, 1),
        radius: 1,
        pierce: false,
    }));

    let events = tick(&mut world, 200);
    assert!(travel(&events).is_empty());
    let snapshot = query::bomb(&world, bomb).expect("bomb");
    assert_eq!(snapshot.motion, MotionState::Idle);
    assert_eq!(snapshot.position, Vec2::new(2.5, 1.5));
    assert_eq!(
        run(
            &mut world,
            Command::Kick {
                bomb,
                direction: Vec2::X
            }
        ),
        Vec::new()
    );
}

#[test]
fn detonation_mid_flight_drops_the_bomb_where_it_flies() {
    let mut world = stage(CORRIDOR);
    let bomb = place(&mut world, (1, 1), BombVariant::NORMAL);
    assert!(rejection(&punch(&mut world, bomb, Vec2::X, Some(4))).is_none());
    let _ = tick(&mut world, 200);

    let events = run(&mut world, Command::ChainDetonate { bomb });
    assert!(events.contains(&Event::BombExploded {
        bomb,
        owner: Some(OwnerId::new(7)),
        cell: CellCoord::new(3, 1),
        radius: 1,
        pierce: false,
    }));
    let snapshot = query::bomb(&world, bomb).expect("bomb");
    assert_eq!(snapshot.position, Vec2::new(3.5, 1.5));
    assert_eq!(snapshot.height, 0.0);
}

#[test]
fn detonation_over_a_crate_drops_the_bomb_at_its_launch_cell() {
    let mut world = stage("\
#########
#.+.....#
#########");
    let bomb = place(&mut world, (1, 1), BombVariant::NORMAL);
    assert!(rejection(&punch(&mut world, bomb, Vec2::X, Some(4))).is_none());
    let _ = tick(&mut world, 100);

    let events = run(&mut world, Command::ChainDetonate { bomb });
    assert!(events.iter().any(|event| matches!(
        event,
        Event::BombExploded { cell, .. } if *cell == CellCoord::new(1, 1)
    )));
}
