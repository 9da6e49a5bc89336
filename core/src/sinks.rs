//! Presentation sinks fed by the engine on a fire-and-forget basis.

use std::time::Duration;

use glam::Vec2;

use crate::{CellCoord, Direction, ExplosionPart};

/// Plays blast sprites.
pub trait ExplosionVisual {
    /// Starts a segment animation; the engine never waits for completion.
    fn play(
        &mut self,
        part: ExplosionPart,
        direction: Option<Direction>,
        start_delay: Duration,
        duration: Duration,
        origin: Vec2,
    );
}

/// Plays audio cues.
pub trait AudioCue {
    /// Plays the explosion clip selected for the effective radius.
    fn play_explosion(&mut self, clip: u32);

    /// Plays the cue for a punched bomb bouncing off a blocked tile.
    fn play_bounce(&mut self);
}

/// Receives level bookkeeping notifications.
pub trait LevelNotifier {
    /// Called once per destructible tile removed from the stage.
    fn on_destructible_cleared(&mut self, cell: CellCoord, remaining: usize);
}
