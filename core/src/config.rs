//! Tunable parameters of the bomb lifecycle and blast propagation.

use std::time::Duration;

use serde::Deserialize;

/// Engine configuration shared by the world and its systems.
///
/// Timings are expressed in seconds so that scenario files stay readable;
/// accessor methods convert them into [`Duration`] values.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length of a tile in world units.
    pub tile_size: f32,
    /// Blast radius used when a placement request does not name one.
    pub default_radius: u32,
    /// Seconds between placement and detonation of a fused bomb.
    pub fuse_seconds: f32,
    /// Delay used by chain reactions when the reached bomb has none configured.
    pub chain_delay_seconds: f32,
    /// Delay used by dynamite branches when the tile effect requests none.
    pub dynamite_delay_seconds: f32,
    /// Travel speed of kicked bombs.
    pub kick_tiles_per_second: f32,
    /// Base travel speed of magnet-pulled bombs.
    pub magnet_tiles_per_second: f32,
    /// Default forward distance of a punch.
    pub punch_distance: u32,
    /// Airborne time spent per tile of punch travel.
    pub punch_seconds_per_tile: f32,
    /// Peak height of a punch arc in world units.
    pub punch_arc_height: f32,
    /// Maximum bounces performed after a punch lands on a blocked tile.
    pub max_bounces: u32,
    /// Seconds a blast segment stays live.
    pub segment_seconds: f32,
    /// Additional start delay per tile of distance from the origin.
    pub segment_stagger_seconds: f32,
    /// Seconds an exploded bomb lingers before removal.
    pub despawn_seconds: f32,
    /// Seconds a cleared destructible tile keeps crumbling.
    pub crumble_seconds: f32,
    /// Number of explosion audio clips, keyed by radius.
    pub explosion_clip_count: u32,
}

impl EngineConfig {
    /// Fuse duration of a freshly placed bomb.
    #[must_use]
    pub fn fuse(&self) -> Duration {
        seconds(self.fuse_seconds)
    }

    /// Default chain delay.
    #[must_use]
    pub fn chain_delay(&self) -> Duration {
        seconds(self.chain_delay_seconds)
    }

    /// Default dynamite branch delay.
    #[must_use]
    pub fn dynamite_delay(&self) -> Duration {
        seconds(self.dynamite_delay_seconds)
    }

    /// Airborne time per punched tile.
    #[must_use]
    pub fn punch_leg(&self) -> Duration {
        seconds(self.punch_seconds_per_tile)
    }

    /// Lifetime of a blast segment.
    #[must_use]
    pub fn segment_duration(&self) -> Duration {
        seconds(self.segment_seconds)
    }

    /// Start delay added per tile of distance.
    #[must_use]
    pub fn segment_stagger(&self) -> Duration {
        seconds(self.segment_stagger_seconds)
    }

    /// Time between explosion and removal of a bomb.
    #[must_use]
    pub fn despawn_delay(&self) -> Duration {
        seconds(self.despawn_seconds)
    }

    /// Duration of the crumble animation of a destructible tile.
    #[must_use]
    pub fn crumble_duration(&self) -> Duration {
        seconds(self.crumble_seconds)
    }

    /// Audio clip index for an effective blast radius, clamped to `1..=clip_count`.
    #[must_use]
    pub fn explosion_clip(&self, radius: u32) -> u32 {
        radius.clamp(1, self.explosion_clip_count.max(1))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: 1.0,
            default_radius: 2,
            fuse_seconds: 3.0,
            chain_delay_seconds: 0.1,
            dynamite_delay_seconds: 0.25,
            kick_tiles_per_second: 8.0,
            magnet_tiles_per_second: 10.0,
            punch_distance: 3,
            punch_seconds_per_tile: 0.1,
            punch_arc_height: 1.5,
            max_bounces: 8,
            segment_seconds: 0.5,
            segment_stagger_seconds: 0.02,
            despawn_seconds: 0.6,
            crumble_seconds: 0.5,
            explosion_clip_count: 4,
        }
    }
}

/// Converts configured seconds, clamping negative or NaN values to zero and
/// values past the representable range to [`Duration::MAX`].
pub fn seconds(value: f32) -> Duration {
    if value.is_nan() || value <= 0.0 {
        Duration::ZERO
    } else {
        Duration::try_from_secs_f32(value).unwrap_or(Duration::MAX)
    }
}
