#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bomb Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod effects;
pub mod sinks;

pub use config::EngineConfig;
pub use effects::{
    BlastAction, BlastContext, DestructibleEffect, GroundEffect, IndestructibleEffect,
    TileEffectResolver,
};
pub use sinks::{AudioCue, ExplosionVisual, LevelNotifier};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active stage with the provided layout.
    LoadStage {
        /// Tile layers and hidden items describing the stage.
        layout: StageLayout,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests placement of a bomb at the tile containing `position`.
    PlaceBomb {
        /// Controller that owns the bomb, `None` for neutral bombs.
        owner: Option<OwnerId>,
        /// World-space position; the bomb snaps to the containing tile center.
        position: Vec2,
        /// Fuse and blast behaviour flags.
        variant: BombVariant,
        /// Number of tiles the blast reaches in each direction.
        radius: u32,
        /// Delay applied when another blast chains into this bomb.
        chain_delay: Option<Duration>,
    },
    /// Requests immediate detonation of a remote bomb.
    Detonate {
        /// Identifier of the bomb to detonate.
        bomb: BombId,
    },
    /// Detonates the oldest detonatable remote bomb owned by the controller.
    TriggerRemote {
        /// Controller whose remote roster is consulted.
        owner: OwnerId,
    },
    /// Requests that a bomb be kicked along a cardinal direction.
    Kick {
        /// Identifier of the bomb to kick.
        bomb: BombId,
        /// Requested direction; normalized to the dominant cardinal axis.
        direction: Vec2,
    },
    /// Requests that a bomb be punched into the air.
    Punch {
        /// Identifier of the bomb to punch.
        bomb: BombId,
        /// Requested direction; normalized to the dominant cardinal axis.
        direction: Vec2,
        /// Forward distance in tiles, `None` uses the configured default.
        distance: Option<u32>,
    },
    /// Requests that a bomb be pulled by a magnet for a bounded number of tiles.
    MagnetPull {
        /// Identifier of the bomb to pull.
        bomb: BombId,
        /// Requested direction; normalized to the dominant cardinal axis.
        direction: Vec2,
        /// Maximum number of tiles the bomb may travel.
        steps: u32,
        /// Multiplier applied to the configured magnet travel speed.
        speed_multiplier: f32,
    },
    /// Pulls the first bomb found along a line back toward the origin cell.
    MagnetPulse {
        /// Cell holding the magnet.
        origin: CellCoord,
        /// Direction the magnet faces.
        facing: Direction,
        /// Number of tiles scanned in front of the magnet.
        range: u32,
        /// Multiplier applied to the configured magnet travel speed.
        speed_multiplier: f32,
    },
    /// Releases a deferred chain reaction for the provided bomb.
    ChainDetonate {
        /// Identifier of the bomb reached by an earlier blast.
        bomb: BombId,
    },
    /// Releases a deferred dynamite branch anchored at the provided cell.
    DetonateDynamite {
        /// Cell holding the ignited dynamite tile.
        cell: CellCoord,
        /// Number of tiles the branch reaches in each direction.
        radius: u32,
    },
    /// Reports the tile currently occupied by an external character.
    SetCharacterCell {
        /// Identifier of the character.
        character: CharacterId,
        /// Occupied cell, `None` when the character left the stage.
        cell: Option<CellCoord>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a new stage became active.
    StageLoaded {
        /// Number of columns in the stage.
        columns: u32,
        /// Number of rows in the stage.
        rows: u32,
        /// Number of destructible tiles placed on the stage.
        destructible_count: usize,
    },
    /// Confirms that a bomb was placed on the grid.
    BombPlaced {
        /// Identifier allocated to the bomb.
        bomb: BombId,
        /// Controller that owns the bomb.
        owner: Option<OwnerId>,
        /// Cell the bomb rests on.
        cell: CellCoord,
        /// Behaviour flags of the bomb.
        variant: BombVariant,
    },
    /// Reports that a placement request was rejected.
    BombPlacementRejected {
        /// Controller that requested the placement.
        owner: Option<OwnerId>,
        /// Cell targeted by the request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a bomb entered a travel mode.
    BombMotionStarted {
        /// Identifier of the travelling bomb.
        bomb: BombId,
        /// Travel mode that became active.
        motion: MotionKind,
        /// Normalized travel direction.
        direction: Direction,
    },
    /// Reports that a motion request was rejected without state change.
    MotionRejected {
        /// Identifier of the bomb targeted by the request.
        bomb: BombId,
        /// Travel mode that was requested.
        motion: MotionKind,
        /// Specific reason the request failed.
        reason: MotionRejection,
    },
    /// Confirms that a travelling bomb committed a move to a new tile.
    BombMoved {
        /// Identifier of the bomb.
        bomb: BombId,
        /// Cell occupied before the move.
        from: CellCoord,
        /// Cell occupied after the move.
        to: CellCoord,
    },
    /// Reports that a bomb jumped across the stage wrap seam.
    BombWrapped {
        /// Identifier of the bomb.
        bomb: BombId,
        /// Out-of-domain cell the bomb attempted to enter.
        from: CellCoord,
        /// Wrapped cell the bomb was placed on.
        to: CellCoord,
    },
    /// Reports that a sliding bomb came to rest.
    BombStopped {
        /// Identifier of the bomb.
        bomb: BombId,
        /// Cell the bomb rests on.
        cell: CellCoord,
        /// Travel mode that ended.
        motion: MotionKind,
    },
    /// Reports that a punched bomb bounced off a blocked landing tile.
    BombBounced {
        /// Identifier of the bomb.
        bomb: BombId,
        /// Blocked cell the bomb bounced on.
        cell: CellCoord,
    },
    /// Reports that a punched bomb landed.
    BombLanded {
        /// Identifier of the bomb.
        bomb: BombId,
        /// Cell the bomb landed on.
        cell: CellCoord,
    },
    /// Reports that a detonation request was rejected.
    DetonationRejected {
        /// Identifier of the bomb, when the request named one.
        bomb: Option<BombId>,
        /// Specific reason the request failed.
        reason: DetonationRejection,
    },
    /// Confirms that a bomb exploded.
    BombExploded {
        /// Identifier of the bomb.
        bomb: BombId,
        /// Controller that owned the bomb.
        owner: Option<OwnerId>,
        /// Cell the blast originated from.
        cell: CellCoord,
        /// Effective blast radius after ground modifiers.
        radius: u32,
        /// Effective piercing flag after ground modifiers.
        pierce: bool,
    },
    /// Confirms that an ignited dynamite tile exploded.
    DynamiteExploded {
        /// Cell the branch originated from.
        cell: CellCoord,
        /// Effective branch radius after ground modifiers.
        radius: u32,
    },
    /// Render descriptors produced by a single detonation.
    BlastSegments {
        /// Cell the blast originated from.
        origin: CellCoord,
        /// Ordered segments: origin first, then north, east, south, west rays.
        segments: Vec<ExplosionSegment>,
    },
    /// Reports that a blast reached a live bomb, which must chain.
    BlastReachedBomb {
        /// Identifier of the bomb that was reached.
        bomb: BombId,
        /// Chain delay configured on the reached bomb.
        delay: Option<Duration>,
    },
    /// Reports that a dynamite tile was lit by a blast.
    DynamiteIgnited {
        /// Cell holding the dynamite.
        cell: CellCoord,
        /// Radius of the pending branch.
        radius: u32,
        /// Delay requested by the tile effect.
        delay: Option<Duration>,
    },
    /// Reports that an item pickup was destroyed by a blast.
    ItemDestroyed {
        /// Cell that held the item.
        cell: CellCoord,
        /// Item that was destroyed.
        item: ItemKind,
    },
    /// Reports that a destructible tile was cleared.
    DestructibleCleared {
        /// Cell that held the tile.
        cell: CellCoord,
        /// Identity of the cleared tile.
        tile: TileId,
        /// Destructible tiles left on the stage.
        remaining: usize,
    },
    /// Reports that a hidden item surfaced after its tile finished crumbling.
    ItemRevealed {
        /// Cell the item appeared on.
        cell: CellCoord,
        /// Item that appeared.
        item: ItemKind,
    },
    /// Reports that a character stood inside a blast.
    CharacterCaught {
        /// Identifier of the character.
        character: CharacterId,
        /// Cell where the character was caught.
        cell: CellCoord,
    },
    /// Reports that an exploded bomb was removed from the world.
    BombRemoved {
        /// Identifier of the bomb.
        bomb: BombId,
    },
}

impl Event {
    /// Reports whether the event signals a rejected command.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::BombPlacementRejected { .. }
                | Self::MotionRejected { .. }
                | Self::DetonationRejected { .. }
        )
    }
}

/// Cardinal directions available to travelling bombs and blast rays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// All cardinal directions in ray-casting order.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Unit vector in world space. Rows grow along positive `y`.
    #[must_use]
    pub fn as_vector(self) -> Vec2 {
        let (dx, dy) = self.offset();
        Vec2::new(dx as f32, dy as f32)
    }

    /// Normalizes an arbitrary vector to its dominant cardinal axis.
    ///
    /// Returns `None` for zero-length or non-finite input. Ties favour the
    /// horizontal axis.
    #[must_use]
    pub fn from_vector(vector: Vec2) -> Option<Self> {
        if !vector.is_finite() || vector.length_squared() <= f32::EPSILON {
            return None;
        }

        if vector.x.abs() >= vector.y.abs() {
            Some(if vector.x > 0.0 { Self::East } else { Self::West })
        } else {
            Some(if vector.y > 0.0 { Self::South } else { Self::North })
        }
    }
}

/// Unique identifier assigned to a bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BombId(u32);

impl BombId {
    /// Creates a new bomb identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of the controller (player or AI) that placed a bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(u32);

impl OwnerId {
    /// Creates a new owner identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of an external character standing on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identity of a tile inside one of the stage layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u16);

impl TileId {
    /// Creates a new tile identity.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identity.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Tile identities understood by the bundled stage parser.
pub mod tiles {
    use super::TileId;

    /// Solid wall that blocks every blast.
    pub const WALL: TileId = TileId::new(1);
    /// Plain destructible crate.
    pub const CRATE: TileId = TileId::new(2);
    /// Destructible tile that ignites a secondary blast branch.
    pub const DYNAMITE: TileId = TileId::new(3);
    /// Ground tile that boosts blasts originating on it.
    pub const POWER_FLOOR: TileId = TileId::new(4);
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that steps past the stage edge can be expressed
/// before they are wrapped or rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: i32,
    row: i32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Cell reached after `tiles` steps along `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction, tiles: i32) -> Self {
        let (dx, dy) = direction.offset();
        Self {
            column: self.column + dx * tiles,
            row: self.row + dy * tiles,
        }
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Behaviour flags selected when a bomb is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BombVariant {
    /// Blast continues through destructible tiles and items.
    pub pierce: bool,
    /// Fuse never runs; the owner detonates the bomb on demand.
    pub remote: bool,
}

impl BombVariant {
    /// Standard fused bomb.
    pub const NORMAL: Self = Self {
        pierce: false,
        remote: false,
    };
    /// Fused bomb whose blast pierces soft obstacles.
    pub const PIERCE: Self = Self {
        pierce: true,
        remote: false,
    };
    /// Remote-detonated bomb.
    pub const REMOTE: Self = Self {
        pierce: false,
        remote: true,
    };
}

/// Travel mode currently driving a bomb.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionState {
    /// Resting on a tile center.
    #[default]
    Idle,
    /// Sliding after a kick.
    Kicked,
    /// Flying along a punch arc.
    Punched,
    /// Sliding toward a magnet.
    MagnetPulled,
}

/// Travel mode requested by a motion command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    /// Kick request.
    Kick,
    /// Punch request.
    Punch,
    /// Magnet pull request.
    MagnetPull,
}

/// Classification of a rendered blast cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionPart {
    /// Origin cell of the blast.
    Start,
    /// Interior cell, or the last cell of a ray stopped by an obstruction.
    Middle,
    /// Last cell of a ray that travelled its full length.
    End,
}

/// Render-only description of a single blast cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionSegment {
    /// Cell covered by the segment.
    pub cell: CellCoord,
    /// World-space center of the cell.
    pub position: Vec2,
    /// Ray direction, `None` for the origin segment.
    pub direction: Option<Direction>,
    /// Sprite classification.
    pub part: ExplosionPart,
    /// Delay before the segment should start playing.
    pub start_delay: Duration,
    /// How long the segment stays live.
    pub duration: Duration,
}

/// Item pickups that can rest on the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Raises the bomb capacity.
    ExtraBomb,
    /// Raises the blast radius.
    FireUp,
    /// Raises walking speed.
    SpeedUp,
    /// Grants the kick ability.
    Kick,
    /// Grants the punch ability.
    Punch,
    /// Switches bombs to the piercing variant.
    PierceBomb,
    /// Switches bombs to the remote variant.
    RemoteBomb,
}

/// Reasons a bomb placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// No stage has been loaded yet.
    #[error("no stage is loaded")]
    NoStage,
    /// The requested cell lies outside the stage.
    #[error("cell lies outside the stage")]
    OutOfBounds,
    /// The requested cell holds a solid or destructible tile.
    #[error("cell is obstructed by terrain")]
    Obstructed,
    /// The requested cell already holds a bomb.
    #[error("cell already holds a bomb")]
    Occupied,
    /// Every bomb identifier has been handed out.
    #[error("bomb identifiers are exhausted")]
    IdsExhausted,
}

/// Reasons a motion request may be rejected without any state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MotionRejection {
    /// No live bomb carries the identifier.
    #[error("unknown bomb")]
    UnknownBomb,
    /// The bomb already exploded.
    #[error("bomb already exploded")]
    AlreadyExploded,
    /// The bomb is already travelling.
    #[error("bomb is already moving")]
    AlreadyMoving,
    /// The bomb is airborne after a punch.
    #[error("bomb is airborne")]
    Airborne,
    /// The bomb is still a trigger volume for the character that placed it.
    #[error("bomb is not solid yet")]
    NotSolid,
    /// A character stands on the bomb's tile.
    #[error("a character stands on the bomb")]
    CharacterOnTile,
    /// The first target tile is blocked.
    #[error("target tile is blocked")]
    TargetBlocked,
    /// The requested direction had no length.
    #[error("direction has zero length")]
    ZeroDirection,
}

/// Reasons a detonation request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DetonationRejection {
    /// No live bomb carries the identifier.
    #[error("unknown bomb")]
    UnknownBomb,
    /// Only remote bombs can be detonated on demand.
    #[error("bomb is not a remote bomb")]
    NotRemote,
    /// Airborne bombs cannot be detonated.
    #[error("bomb is airborne")]
    Airborne,
    /// The owner has no detonatable remote bomb.
    #[error("owner has no remote bomb ready")]
    NoRemoteBombs,
}

/// Bit set of tile features that stop a travelling bomb.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObstacleMask(u8);

impl ObstacleMask {
    /// Mask that blocks nothing.
    pub const EMPTY: Self = Self(0);
    /// Indestructible terrain and cells outside the stage.
    pub const INDESTRUCTIBLE: Self = Self(1);
    /// Destructible terrain, including tiles still crumbling.
    pub const DESTRUCTIBLE: Self = Self(1 << 1);
    /// Other live bombs.
    pub const BOMB: Self = Self(1 << 2);
    /// Cells occupied by characters.
    pub const CHARACTER: Self = Self(1 << 3);
    /// Cells holding item pickups.
    pub const ITEM: Self = Self(1 << 4);
    /// Cells covered by a live blast.
    pub const HAZARD: Self = Self(1 << 5);

    /// Mask used while a kicked or magnet-pulled bomb slides.
    pub const SLIDE: Self = Self::INDESTRUCTIBLE
        .union(Self::DESTRUCTIBLE)
        .union(Self::BOMB)
        .union(Self::CHARACTER);
    /// Mask used to validate the first tile of a kick.
    pub const KICK_START: Self = Self::SLIDE.union(Self::HAZARD);
    /// Mask used to decide whether a punched bomb must bounce.
    pub const LANDING: Self = Self::SLIDE;

    /// Combines two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Reports whether every flag in `other` is present.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Static description of a stage: dimensions, tile layers and hidden items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StageLayout {
    /// Number of columns in the stage.
    pub columns: u32,
    /// Number of rows in the stage.
    pub rows: u32,
    /// Indestructible layer, `None` when the stage has no such tilemap.
    pub indestructible: Option<BTreeMap<CellCoord, TileId>>,
    /// Destructible layer.
    pub destructible: BTreeMap<CellCoord, TileId>,
    /// Ground layer consulted for blast modifiers and bomb arrivals.
    pub ground: BTreeMap<CellCoord, TileId>,
    /// Item pickups lying on the stage.
    pub items: BTreeMap<CellCoord, ItemKind>,
    /// Items hidden under destructible tiles, revealed in clear order.
    pub hidden_items: Vec<ItemKind>,
    /// Seed used to shuffle the reveal order.
    pub seed: u64,
}

impl StageLayout {
    /// Reports whether the cell lies inside the raw stage bounds.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() >= 0
            && cell.row() >= 0
            && (cell.column() as u32) < self.columns
            && (cell.row() as u32) < self.rows
    }
}

/// Immutable representation of a single bomb's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BombSnapshot {
    /// Identifier of the bomb.
    pub id: BombId,
    /// Controller that owns the bomb.
    pub owner: Option<OwnerId>,
    /// Current world-space position.
    pub position: Vec2,
    /// Cell the bomb currently counts as occupying.
    pub cell: CellCoord,
    /// Height above the ground while flying after a punch.
    pub height: f32,
    /// Behaviour flags of the bomb.
    pub variant: BombVariant,
    /// Blast radius in tiles.
    pub radius: u32,
    /// Active travel mode.
    pub motion: MotionState,
    /// Remaining fuse, `None` for remote bombs and bombs whose fuse is not running.
    pub fuse_remaining: Option<Duration>,
    /// Whether the fuse is currently paused.
    pub fuse_paused: bool,
    /// Whether the bomb blocks characters.
    pub solid: bool,
    /// Whether the bomb already exploded.
    pub exploded: bool,
}

/// Read-only snapshot describing all bombs in the world.
#[derive(Clone, Debug, Default)]
pub struct BombView {
    snapshots: Vec<BombSnapshot>,
}

impl BombView {
    /// Creates a new bomb view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BombSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured bomb snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &BombSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by identifier.
    #[must_use]
    pub fn get(&self, bomb: BombId) -> Option<&BombSnapshot> {
        self.snapshots
            .binary_search_by_key(&bomb, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BombSnapshot> {
        self.snapshots
    }
}
