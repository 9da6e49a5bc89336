#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fire-and-forget forwarding of world events to presentation sinks.
//!
//! The engine never waits on a sink and never learns whether one is
//! attached. Missing sinks simply drop the corresponding notifications.

use std::fmt;

use bomb_arena_core::{AudioCue, EngineConfig, Event, ExplosionVisual, LevelNotifier};

/// Configuration parameters required to construct the presentation system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    explosion_clip_count: u32,
}

impl Config {
    /// Creates a configuration with the number of available explosion clips.
    #[must_use]
    pub const fn new(explosion_clip_count: u32) -> Self {
        Self {
            explosion_clip_count,
        }
    }

    /// Derives the configuration from the engine configuration.
    #[must_use]
    pub fn from_engine(config: &EngineConfig) -> Self {
        Self::new(config.explosion_clip_count)
    }

    /// Clip index for an effective blast radius, clamped to `1..=clip_count`.
    #[must_use]
    pub fn explosion_clip(&self, radius: u32) -> u32 {
        radius.clamp(1, self.explosion_clip_count.max(1))
    }
}

/// Pure system that forwards blast, audio and level notifications.
pub struct Presentation {
    config: Config,
    visual: Option<Box<dyn ExplosionVisual>>,
    audio: Option<Box<dyn AudioCue>>,
    level: Option<Box<dyn LevelNotifier>>,
}

impl Presentation {
    /// Creates a presentation system without any sink attached.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            visual: None,
            audio: None,
            level: None,
        }
    }

    /// Attaches the sink that plays blast segments.
    #[must_use]
    pub fn with_visual(mut self, visual: impl ExplosionVisual + 'static) -> Self {
        self.visual = Some(Box::new(visual));
        self
    }

    /// Attaches the sink that plays audio cues.
    #[must_use]
    pub fn with_audio(mut self, audio: impl AudioCue + 'static) -> Self {
        self.audio = Some(Box::new(audio));
        self
    }

    /// Attaches the sink notified about cleared destructible tiles.
    #[must_use]
    pub fn with_level(mut self, level: impl LevelNotifier + 'static) -> Self {
        self.level = Some(Box::new(level));
        self
    }

    /// Forwards the presentation-relevant subset of `events` to the attached sinks.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::BlastSegments { segments, .. } => {
                    if let Some(visual) = self.visual.as_mut() {
                        for segment in segments {
                            visual.play(
                                segment.part,
                                segment.direction,
                                segment.start_delay,
                                segment.duration,
                                segment.position,
                            );
                        }
                    }
                }
                Event::BombExploded { radius, .. } | Event::DynamiteExploded { radius, .. } => {
                    let clip = self.config.explosion_clip(*radius);
                    if let Some(audio) = self.audio.as_mut() {
                        audio.play_explosion(clip);
                    }
                }
                Event::BombBounced { .. } => {
                    if let Some(audio) = self.audio.as_mut() {
                        audio.play_bounce();
                    }
                }
                Event::DestructibleCleared {
                    cell, remaining, ..
                } => match self.level.as_mut() {
                    Some(level) => level.on_destructible_cleared(*cell, *remaining),
                    None => log::trace!("no level notifier for cleared tile at {cell:?}"),
                },
                _ => {}
            }
        }
    }
}

impl fmt::Debug for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presentation")
            .field("config", &self.config)
            .field("visual", &self.visual.is_some())
            .field("audio", &self.audio.is_some())
            .field("level", &self.level.is_some())
            .finish()
    }
}
