//! Presentation sinks that write to the log instead of a screen or speaker.

use std::time::Duration;

use bomb_arena_core::{
    AudioCue, CellCoord, Direction, ExplosionPart, ExplosionVisual, LevelNotifier,
};
use glam::Vec2;

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LogSink;

impl ExplosionVisual for LogSink {
    fn play(
        &mut self,
        part: ExplosionPart,
        direction: Option<Direction>,
        start_delay: Duration,
        duration: Duration,
        origin: Vec2,
    ) {
        log::trace!(
            "segment {part:?} {direction:?} at {origin} after {start_delay:?} for {duration:?}"
        );
    }
}

impl AudioCue for LogSink {
    fn play_explosion(&mut self, clip: u32) {
        log::debug!("explosion clip {clip}");
    }

    fn play_bounce(&mut self) {
        log::debug!("bounce cue");
    }
}

impl LevelNotifier for LogSink {
    fn on_destructible_cleared(&mut self, cell: CellCoord, remaining: usize) {
        if remaining == 0 {
            log::info!("last destructible tile cleared at {cell:?}");
        } else {
            log::debug!("tile cleared at {cell:?}, {remaining} left");
        }
    }
}
