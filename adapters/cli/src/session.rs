//! Fixed-step pump connecting the world with the scheduler and presentation.

use std::{fmt, time::Duration};

use bomb_arena_core::{Command, EngineConfig, Event, StageLayout};
use bomb_arena_system_chain_reaction::{self as chain_reaction, ChainReactionScheduler};
use bomb_arena_system_presentation::{self as presentation, Presentation};
use bomb_arena_world::{self as world, query, World};

use crate::{effects, scenario::ScriptedStep, sinks::LogSink};

/// Counters describing what happened during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) placed: usize,
    pub(crate) explosions: usize,
    pub(crate) dynamite: usize,
    pub(crate) chained: usize,
    pub(crate) cleared: usize,
    pub(crate) revealed: usize,
    pub(crate) destroyed_items: usize,
    pub(crate) caught: usize,
    pub(crate) rejections: usize,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::BombPlaced { .. } => self.placed += 1,
            Event::BombExploded { .. } => self.explosions += 1,
            Event::DynamiteExploded { .. } => self.dynamite += 1,
            Event::BlastReachedBomb { .. } => self.chained += 1,
            Event::DestructibleCleared { .. } => self.cleared += 1,
            Event::ItemRevealed { .. } => self.revealed += 1,
            Event::ItemDestroyed { .. } => self.destroyed_items += 1,
            Event::CharacterCaught { character, cell } => {
                log::info!("character {} caught at {cell:?}", character.get());
                self.caught += 1;
            }
            event if event.is_rejection() => {
                log::warn!("rejected: {event:?}");
                self.rejections += 1;
            }
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bombs placed:      {}", self.placed)?;
        writeln!(f, "explosions:        {}", self.explosions)?;
        writeln!(f, "dynamite branches: {}", self.dynamite)?;
        writeln!(f, "chain contacts:    {}", self.chained)?;
        writeln!(f, "tiles cleared:     {}", self.cleared)?;
        writeln!(f, "items revealed:    {}", self.revealed)?;
        writeln!(f, "items destroyed:   {}", self.destroyed_items)?;
        writeln!(f, "characters caught: {}", self.caught)?;
        write!(f, "rejected commands: {}", self.rejections)
    }
}

pub(crate) struct Session {
    world: World,
    scheduler: ChainReactionScheduler,
    presentation: Presentation,
    summary: Summary,
}

impl Session {
    pub(crate) fn new(config: EngineConfig, layout: StageLayout) -> Self {
        let scheduler = ChainReactionScheduler::new(chain_reaction::Config::from_engine(&config));
        let presentation = Presentation::new(presentation::Config::from_engine(&config))
            .with_visual(LogSink)
            .with_audio(LogSink)
            .with_level(LogSink);
        let effects = effects::registry(&config);
        let mut session = Self {
            world: World::with_effects(config, effects),
            scheduler,
            presentation,
            summary: Summary::default(),
        };
        session.submit(vec![Command::LoadStage { layout }]);
        session
    }

    /// Applies `commands` and keeps feeding the resulting events to the
    /// systems until they stop answering with new commands.
    pub(crate) fn submit(&mut self, mut commands: Vec<Command>) {
        while !commands.is_empty() {
            let mut events = Vec::new();
            for command in commands.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            for event in &events {
                self.summary.record(event);
            }
            self.presentation.handle(&events);
            self.scheduler.handle(&events, &mut commands);
        }
    }

    /// Replays `script` while advancing the clock in `step` increments until
    /// `duration` elapsed.
    pub(crate) fn run(&mut self, script: &[ScriptedStep], duration: Duration, step: Duration) -> Summary {
        let step = if step.is_zero() {
            Duration::from_millis(1)
        } else {
            step
        };
        let config = query::config(&self.world).clone();
        let mut next = 0;
        loop {
            let elapsed = query::elapsed(&self.world);
            let due: Vec<Command> = script[next..]
                .iter()
                .take_while(|scripted| scripted.due(elapsed))
                .map(|scripted| scripted.action.to_command(&config))
                .collect();
            next += due.len();
            self.submit(due);

            if elapsed >= duration {
                break;
            }
            self.submit(vec![Command::Tick { dt: step }]);
        }

        let live = query::bomb_view(&self.world)
            .iter()
            .filter(|snapshot| !snapshot.exploded)
            .count();
        log::info!(
            "run finished after {:?} with {live} bombs still live",
            query::elapsed(&self.world)
        );
        self.summary
    }
}

#[cfg(test)]
mod tests {
    use bomb_arena_world::parse_layout;

    use super::*;
    use crate::scenario::Scenario;

    fn session(map: &str, scenario: &Scenario) -> Session {
        let mut layout = parse_layout(map, 9).expect("map parses");
        layout.hidden_items = scenario.hidden_items.clone();
        Session::new(scenario.config.clone(), layout)
    }

    #[test]
    fn scripted_cascade_clears_the_corridor() {
        let scenario = Scenario::from_json(
            r#"{
                "hidden_items": ["FireUp"],
                "steps": [
                    { "at": 0.0, "action": { "place": { "column": 1, "row": 1, "owner": 1,
                        "variant": { "pierce": false, "remote": true } } } },
                    { "at": 0.0, "action": { "place": { "column": 3, "row": 1 } } },
                    { "at": 0.1, "action": { "trigger_remote": { "owner": 1 } } }
                ]
            }"#,
        )
        .expect("scenario parses");
        let mut session = session("#######\n#....+#\n#######", &scenario);

        let summary = session.run(
            &scenario.steps,
            Duration::from_secs(1),
            Duration::from_millis(50),
        );
        assert_eq!(summary.placed, 2);
        assert_eq!(summary.explosions, 2);
        assert_eq!(summary.chained, 1);
        assert_eq!(summary.cleared, 1);
        assert_eq!(summary.revealed, 1);
        assert_eq!(summary.rejections, 0);
    }

    #[test]
    fn dynamite_from_the_legend_branches() {
        let scenario = Scenario::from_json(
            r#"{
                "config": { "default_radius": 1 },
                "steps": [
                    { "at": 0.0, "action": { "place": { "column": 0, "row": 0, "owner": 2,
                        "variant": { "pierce": false, "remote": true }, "radius": 2 } } },
                    { "at": 0.0, "action": { "detonate": { "bomb": 1 } } }
                ]
            }"#,
        )
        .expect("scenario parses");
        let mut session = session("..D..", &scenario);

        let summary = session.run(
            &scenario.steps,
            Duration::from_secs(1),
            Duration::from_millis(50),
        );
        assert_eq!(summary.explosions, 1);
        assert_eq!(summary.dynamite, 1);
        assert_eq!(summary.cleared, 1);
    }

    #[test]
    fn rejected_script_actions_are_counted() {
        let scenario = Scenario::from_json(
            r#"{ "steps": [ { "at": 0.0, "action": { "detonate": { "bomb": 42 } } } ] }"#,
        )
        .expect("scenario parses");
        let mut session = session("...", &scenario);
        let summary = session.run(&scenario.steps, Duration::ZERO, Duration::from_millis(50));
        assert_eq!(summary.rejections, 1);
        assert!(summary.to_string().contains("rejected commands: 1"));
    }
}
