#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Chain reaction scheduling that turns blast contact into delayed detonations.
//!
//! The world reports every bomb reached by a blast and every dynamite tile a
//! blast ignites. This system keeps at most one pending request per target,
//! counts the requests down on [`Event::TimeAdvanced`] and releases them as
//! [`Command::ChainDetonate`] or [`Command::DetonateDynamite`].

use std::{collections::BTreeMap, time::Duration};

use bomb_arena_core::{BombId, CellCoord, Command, EngineConfig, Event};

/// Configuration parameters required to construct the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    default_chain_delay: Duration,
    default_dynamite_delay: Duration,
}

impl Config {
    /// Creates a configuration from the fallback delays of both request kinds.
    #[must_use]
    pub const fn new(default_chain_delay: Duration, default_dynamite_delay: Duration) -> Self {
        Self {
            default_chain_delay,
            default_dynamite_delay,
        }
    }

    /// Derives the fallback delays from the engine configuration.
    #[must_use]
    pub fn from_engine(config: &EngineConfig) -> Self {
        Self::new(config.chain_delay(), config.dynamite_delay())
    }
}

/// Target of a pending chain request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainKey {
    /// A bomb reached by a blast.
    Bomb(BombId),
    /// A dynamite tile ignited by a blast.
    Dynamite(CellCoord),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    due: Duration,
    sequence: u64,
    radius: u32,
}

/// Pure system that defers chain detonations without double-triggering.
#[derive(Debug)]
pub struct ChainReactionScheduler {
    config: Config,
    now: Duration,
    sequence: u64,
    pending: BTreeMap<ChainKey, Pending>,
}

impl ChainReactionScheduler {
    /// Creates a scheduler with no pending requests.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            now: Duration::ZERO,
            sequence: 0,
            pending: BTreeMap::new(),
        }
    }

    /// Consumes world events and emits the detonations that became due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.now = self.now.saturating_add(*dt);
                    self.release_due(out);
                }
                Event::BlastReachedBomb { bomb, delay } => {
                    let delay = delay.unwrap_or(self.config.default_chain_delay);
                    let _ = self.request(ChainKey::Bomb(*bomb), delay, 0);
                }
                Event::DynamiteIgnited {
                    cell,
                    radius,
                    delay,
                } => {
                    let delay = delay.unwrap_or(self.config.default_dynamite_delay);
                    let _ = self.request(ChainKey::Dynamite(*cell), delay, *radius);
                }
                Event::BombExploded { bomb, .. } => {
                    let _ = self.pending.remove(&ChainKey::Bomb(*bomb));
                }
                Event::StageLoaded { .. } => {
                    if !self.pending.is_empty() {
                        log::debug!("dropping {} pending chain requests", self.pending.len());
                    }
                    self.pending.clear();
                }
                _ => {}
            }
        }
    }

    /// Schedules a request unless one is already pending for the key.
    ///
    /// Returns whether a new request was recorded.
    pub fn request(&mut self, key: ChainKey, delay: Duration, radius: u32) -> bool {
        if self.pending.contains_key(&key) {
            log::debug!("chain request for {key:?} already pending");
            return false;
        }
        let sequence = self.sequence;
        self.sequence += 1;
        let _ = self.pending.insert(
            key,
            Pending {
                due: self.now.saturating_add(delay),
                sequence,
                radius,
            },
        );
        true
    }

    /// Reports whether a request for the key is waiting to be released.
    #[must_use]
    pub fn is_pending(&self, key: ChainKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Number of requests waiting to be released.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn release_due(&mut self, out: &mut Vec<Command>) {
        let mut due: Vec<(ChainKey, Pending)> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= self.now)
            .map(|(key, pending)| (*key, *pending))
            .collect();
        due.sort_by_key(|(_, pending)| (pending.due, pending.sequence));

        for (key, pending) in due {
            let _ = self.pending.remove(&key);
            out.push(match key {
                ChainKey::Bomb(bomb) => Command::ChainDetonate { bomb },
                ChainKey::Dynamite(cell) => Command::DetonateDynamite {
                    cell,
                    radius: pending.radius,
                },
            });
        }
    }
}
