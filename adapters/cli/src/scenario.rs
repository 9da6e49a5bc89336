//! Scripted scenarios replayed by the headless driver.

use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use bomb_arena_core::{
    config::seconds, BombId, BombVariant, CellCoord, CharacterId, Command, Direction, EngineConfig, ItemKind,
    OwnerId,
};
use glam::Vec2;
use serde::Deserialize;

/// Engine configuration, hidden items and the timed actions of one run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Scenario {
    pub(crate) config: EngineConfig,
    pub(crate) hidden_items: Vec<ItemKind>,
    pub(crate) steps: Vec<ScriptedStep>,
}

impl Scenario {
    /// Reads and validates a JSON scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_json(&source).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub(crate) fn from_json(source: &str) -> Result<Self> {
        let mut scenario: Self = serde_json::from_str(source)?;
        for step in &scenario.steps {
            ensure!(
                Duration::try_from_secs_f32(step.at).is_ok(),
                "step time {} must be a non-negative number of seconds",
                step.at
            );
        }
        scenario.steps.sort_by(|left, right| left.at.total_cmp(&right.at));
        Ok(scenario)
    }
}

/// Action submitted once the simulation clock reaches `at` seconds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub(crate) struct ScriptedStep {
    pub(crate) at: f32,
    pub(crate) action: Action,
}

impl ScriptedStep {
    pub(crate) fn due(&self, elapsed: Duration) -> bool {
        seconds(self.at) <= elapsed
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Action {
    Place {
        column: i32,
        row: i32,
        #[serde(default)]
        owner: Option<u32>,
        #[serde(default)]
        variant: BombVariant,
        #[serde(default)]
        radius: Option<u32>,
        #[serde(default)]
        chain_delay: Option<f32>,
    },
    Detonate {
        bomb: u32,
    },
    TriggerRemote {
        owner: u32,
    },
    Kick {
        bomb: u32,
        direction: Direction,
    },
    Punch {
        bomb: u32,
        direction: Direction,
        #[serde(default)]
        distance: Option<u32>,
    },
    MagnetPulse {
        column: i32,
        row: i32,
        facing: Direction,
        range: u32,
        #[serde(default = "unit_multiplier")]
        speed_multiplier: f32,
    },
    Character {
        id: u32,
        cell: Option<(i32, i32)>,
    },
}

fn unit_multiplier() -> f32 {
    1.0
}

impl Action {
    /// Translates the scripted action into a world command.
    pub(crate) fn to_command(&self, config: &EngineConfig) -> Command {
        match *self {
            Self::Place {
                column,
                row,
                owner,
                variant,
                radius,
                chain_delay,
            } => Command::PlaceBomb {
                owner: owner.map(OwnerId::new),
                position: Vec2::new(column as f32 + 0.5, row as f32 + 0.5) * config.tile_size,
                variant,
                radius: radius.unwrap_or(config.default_radius),
                chain_delay: chain_delay
                    .filter(|delay| delay.is_finite() && *delay >= 0.0)
                    .map(seconds),
            },
            Self::Detonate { bomb } => Command::Detonate {
                bomb: BombId::new(bomb),
            },
            Self::TriggerRemote { owner } => Command::TriggerRemote {
                owner: OwnerId::new(owner),
            },
            Self::Kick { bomb, direction } => Command::Kick {
                bomb: BombId::new(bomb),
                direction: direction.as_vector(),
            },
            Self::Punch {
                bomb,
                direction,
                distance,
            } => Command::Punch {
                bomb: BombId::new(bomb),
                direction: direction.as_vector(),
                distance,
            },
            Self::MagnetPulse {
                column,
                row,
                facing,
                range,
                speed_multiplier,
            } => Command::MagnetPulse {
                origin: CellCoord::new(column, row),
                facing,
                range,
                speed_multiplier,
            },
            Self::Character { id, cell } => Command::SetCharacterCell {
                character: CharacterId::new(id),
                cell: cell.map(|(column, row)| CellCoord::new(column, row)),
            },
        }
    }
}
