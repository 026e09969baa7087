#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects the host, the
//! authoritative world, and pure systems. The host and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume event streams, query
//! immutable snapshots, and respond exclusively with new command batches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical simulation rate the host scheduler is expected to honour.
pub const TICKS_PER_SECOND: u32 = 60;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Marks the session as running so that waves start spawning.
    StartSession,
    /// Restores the initial economy and clears every entity.
    ResetSession,
    /// Advances the simulation clock by one tick and cools down every tower.
    Tick,
    /// Requests that a tower fire a projectile at the provided monster.
    FireProjectile {
        /// Identifier of the tower attempting to fire.
        tower: TowerId,
        /// Identifier of the monster that should be tracked by the projectile.
        target: MonsterId,
    },
    /// Requests that a batch of monsters be spawned at the start of the route.
    SpawnWave {
        /// Level the wave belongs to.
        level: u32,
        /// Number of monsters that compose the wave.
        count: u32,
    },
    /// Advances every monster along the route and ticks its status effects.
    StepMonsters,
    /// Advances every projectile toward its target and resolves impacts.
    StepProjectiles,
    /// Requests placement of a tower on the provided grid cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower should occupy.
        cell: GridCell,
    },
    /// Trades gold for one additional life.
    BuyLife,
    /// Defeats every active monster as if a tower had killed it.
    DefeatAllMonsters,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the session started running.
    SessionStarted,
    /// Announces that the session returned to its initial state.
    SessionReset {
        /// Why the reset happened.
        reason: ResetReason,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Number of ticks elapsed since the world was created.
        tick: u64,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: GridCell,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: GridCell,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower released a projectile.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Tower that fired.
        tower: TowerId,
        /// Monster tracked by the projectile.
        target: MonsterId,
    },
    /// Confirms that a wave of monsters entered the route.
    WaveSpawned {
        /// Level the wave belongs to.
        level: u32,
        /// Number of monsters spawned.
        count: u32,
    },
    /// Confirms that a single monster entered the route.
    MonsterSpawned {
        /// Identifier assigned to the monster.
        monster: MonsterId,
        /// Initial position of the monster.
        position: Position,
    },
    /// Reports that a monster walked off the end of the route.
    MonsterEscaped {
        /// Identifier of the escaped monster.
        monster: MonsterId,
    },
    /// Reports that the player lost a life to an escaped monster.
    LifeLost {
        /// Lives left after the loss.
        lives_remaining: u32,
    },
    /// Reports that a projectile reached its target.
    ProjectileHit {
        /// Identifier of the projectile that was consumed.
        projectile: ProjectileId,
        /// Monster struck by the projectile.
        monster: MonsterId,
        /// Kind of tower that fired the projectile.
        kind: TowerKind,
    },
    /// Reports that a projectile lost its target and was discarded.
    ProjectileDiscarded {
        /// Identifier of the discarded projectile.
        projectile: ProjectileId,
    },
    /// Reports that a monster's health was depleted.
    MonsterDefeated {
        /// Identifier of the defeated monster.
        monster: MonsterId,
        /// Gold awarded for the kill.
        reward: u32,
    },
    /// Confirms that gold was traded for a life.
    LifePurchased {
        /// Lives available after the purchase.
        lives: u32,
    },
    /// Reports that a life purchase was rejected.
    LifePurchaseRejected {
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
}

/// Reasons the session can return to its initial state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResetReason {
    /// The player ran out of lives.
    GameOver,
    /// The host explicitly requested a reset.
    Requested,
}

/// Unique identifier assigned to a monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
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

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the projectile identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Coordinates are signed so that routes may enter the playfield from outside
/// its visible bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    column: i32,
    row: i32,
}

impl GridCell {
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

    /// Continuous position of the cell's anchor point.
    #[must_use]
    pub fn position(self) -> Position {
        Position::new(self.column as f32, self.row as f32)
    }
}

/// Continuous point expressed in cell units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from its components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component measured in cells.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component measured in cells.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Remaining hit points of a monster.
///
/// Damage saturates at zero so that depleted monsters never report negative
/// health.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a new health value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the remaining hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Returns the health left after subtracting `damage`.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.0 == 0
    }
}

/// Types of towers that can be constructed along the route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Moderate direct damage without side effects.
    Regular,
    /// Light damage that freezes the target in place.
    Ice,
    /// Medium damage that sets the target on fire.
    Fire,
}

impl TowerKind {
    /// Every tower kind in presentation order.
    pub const ALL: [TowerKind; 3] = [Self::Regular, Self::Ice, Self::Fire];

    /// Damage dealt immediately when a projectile of this kind hits.
    #[must_use]
    pub const fn direct_damage(self) -> u32 {
        match self {
            Self::Regular => 30,
            Self::Ice => 10,
            Self::Fire => 20,
        }
    }

    /// Status effect applied to the target after the direct damage.
    #[must_use]
    pub const fn status_effect(self) -> Option<StatusEffect> {
        match self {
            Self::Regular => None,
            Self::Ice => Some(StatusEffect::Freeze { ticks: 60 }),
            Self::Fire => Some(StatusEffect::Burn {
                ticks: 30,
                tick_damage: 1,
            }),
        }
    }
}

/// Timed effect a projectile leaves on the monster it hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Holds the monster in place.
    Freeze {
        /// Number of ticks the monster stays frozen.
        ticks: u32,
    },
    /// Deals damage on every tick.
    Burn {
        /// Number of ticks the burn lasts.
        ticks: u32,
        /// Damage applied on each burning tick.
        tick_damage: u32,
    },
}

/// Rule a tower uses to choose among monsters inside its engagement radius.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingPolicy {
    /// Selects the earliest spawned monster in range.
    #[default]
    FirstMatch,
    /// Selects the closest monster, preferring the earliest spawned on ties.
    Nearest,
}

/// Tunable constants that drive a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Corners of the route monsters follow.
    pub waypoints: Vec<GridCell>,
    /// Width of the playfield in cells.
    pub columns: u32,
    /// Height of the playfield in cells.
    pub rows: u32,
    /// Gold available when a session begins.
    pub starting_gold: u32,
    /// Lives available when a session begins.
    pub starting_lives: u32,
    /// Gold deducted for every placed tower.
    pub tower_cost: u32,
    /// Gold deducted for every purchased life.
    pub life_cost: u32,
    /// Gold awarded for every defeated monster.
    pub kill_reward: u32,
    /// Ticks between forced waves.
    pub wave_interval_ticks: u32,
    /// Hit points of a freshly spawned monster.
    pub monster_health: u32,
    /// Distance a monster covers per tick, in cells.
    pub monster_speed: f32,
    /// Ticks a tower waits after firing.
    pub tower_cooldown_ticks: u32,
    /// Distance within which a tower may select a target, in cells.
    pub engagement_radius: f32,
    /// Rule towers use to pick among monsters in range.
    pub targeting: TargetingPolicy,
    /// Distance a projectile covers per tick, in cells.
    pub projectile_speed: f32,
    /// Distance at which a projectile counts as a hit, in cells.
    pub impact_radius: f32,
}

impl Rules {
    /// Checks that the continuous parameters describe a playable session.
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(self.monster_speed.is_finite() && self.monster_speed > 0.0) {
            return Err(RulesError::NonPositive("monster_speed"));
        }
        if !(self.projectile_speed.is_finite() && self.projectile_speed > 0.0) {
            return Err(RulesError::NonPositive("projectile_speed"));
        }
        if !(self.engagement_radius.is_finite() && self.engagement_radius > 0.0) {
            return Err(RulesError::NonPositive("engagement_radius"));
        }
        if !(self.impact_radius.is_finite() && self.impact_radius >= 0.0) {
            return Err(RulesError::Negative("impact_radius"));
        }
        if self.monster_health == 0 {
            return Err(RulesError::NonPositive("monster_health"));
        }
        Ok(())
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            waypoints: DEFAULT_WAYPOINTS
                .iter()
                .map(|&(column, row)| GridCell::new(column, row))
                .collect(),
            columns: 20,
            rows: 15,
            starting_gold: 10_000,
            starting_lives: 3,
            tower_cost: 50,
            life_cost: 100,
            kill_reward: 10,
            wave_interval_ticks: TICKS_PER_SECOND * 5,
            monster_health: 100,
            monster_speed: 0.05,
            tower_cooldown_ticks: TICKS_PER_SECOND,
            engagement_radius: 3.0,
            targeting: TargetingPolicy::FirstMatch,
            projectile_speed: 0.5,
            impact_radius: 0.5,
        }
    }
}

const DEFAULT_WAYPOINTS: [(i32, i32); 19] = [
    (1, -1),
    (1, 13),
    (3, 13),
    (3, 1),
    (5, 1),
    (5, 13),
    (7, 13),
    (7, 1),
    (9, 1),
    (9, 13),
    (11, 13),
    (11, 1),
    (13, 1),
    (13, 13),
    (15, 13),
    (15, 1),
    (17, 1),
    (17, 13),
    (20, 13),
];

/// Reasons a [`Rules`] value may be unusable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The named parameter must be strictly positive and finite.
    #[error("`{0}` must be a positive, finite number")]
    NonPositive(&'static str),
    /// The named parameter must not be negative.
    #[error("`{0}` must not be negative")]
    Negative(&'static str),
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested cell lies outside the playfield.
    #[error("cell lies outside the playfield")]
    OutOfBounds,
    /// The requested cell is part of the monster route.
    #[error("towers cannot be placed on the monster path")]
    OnPath,
    /// Another tower already occupies the requested cell.
    #[error("a tower already occupies this cell")]
    Occupied,
    /// The player cannot afford the tower.
    #[error("placing a tower costs {required} gold but only {available} is available")]
    InsufficientGold {
        /// Gold required for the placement.
        required: u32,
        /// Gold held by the player.
        available: u32,
    },
}

/// Reasons a purchase may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PurchaseError {
    /// The player cannot afford the purchase.
    #[error("purchase costs {required} gold but only {available} is available")]
    InsufficientGold {
        /// Gold required for the purchase.
        required: u32,
        /// Gold held by the player.
        available: u32,
    },
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Unique identifier assigned to the monster.
    pub id: MonsterId,
    /// Current continuous position.
    pub position: Position,
    /// Index of the route cell the monster is walking toward.
    pub route_index: usize,
    /// Remaining hit points.
    pub health: Health,
    /// Distance the monster would cover on its next tick.
    pub speed: f32,
    /// Indicates whether a freeze currently holds the monster.
    pub frozen: bool,
    /// Indicates whether a burn is currently damaging the monster.
    pub burning: bool,
    /// Indicates whether the monster's health was depleted.
    pub defeated: bool,
}

/// Read-only snapshot describing all active monsters.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured monster snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured monsters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no monsters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: GridCell,
    /// Ticks left before the tower may fire again.
    pub cooldown_remaining: u32,
}

impl TowerSnapshot {
    /// Reports whether the tower may fire on this tick.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.cooldown_remaining == 0
    }
}

/// Read-only snapshot describing all placed towers.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot captured for the provided tower.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Kind of tower that fired the projectile.
    pub kind: TowerKind,
    /// Current continuous position.
    pub position: Position,
    /// Monster tracked by the projectile.
    pub target: MonsterId,
}

/// Read-only snapshot describing all projectiles in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ProjectileSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured projectile snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }
}

/// Target assignment computed for a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that will fire.
    pub tower: TowerId,
    /// Monster selected as the target.
    pub monster: MonsterId,
    /// Distance between the tower and the monster, in cells.
    pub distance: f32,
}

/// Gold, lives and kill counters owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EconomySnapshot {
    /// Indicates whether the session is running.
    pub started: bool,
    /// Gold available to the player.
    pub gold: u32,
    /// Lives left before the session resets.
    pub lives: u32,
    /// Monsters defeated during the session.
    pub kills: u32,
}
