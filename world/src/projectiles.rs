//! Homing projectiles released by towers.

use glam::Vec2;
use lane_defence_core::{MonsterId, ProjectileId, ProjectileSnapshot, TowerKind};

use crate::to_position;

/// Result of advancing a projectile by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Flight {
    /// The projectile is still travelling.
    Flying,
    /// The target left play; the projectile must be discarded without damage.
    TargetGone,
    /// The projectile reached its target.
    Hit,
}

/// Projectile tracking a single monster.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    id: ProjectileId,
    kind: TowerKind,
    position: Vec2,
    target: MonsterId,
    spent: bool,
}

impl Projectile {
    pub(crate) fn launch(id: ProjectileId, kind: TowerKind, origin: Vec2, target: MonsterId) -> Self {
        Self {
            id,
            kind,
            position: origin,
            target,
            spent: false,
        }
    }

    pub(crate) fn id(&self) -> ProjectileId {
        self.id
    }

    pub(crate) fn kind(&self) -> TowerKind {
        self.kind
    }

    pub(crate) fn target(&self) -> MonsterId {
        self.target
    }

    pub(crate) fn is_spent(&self) -> bool {
        self.spent
    }

    /// Marks the projectile for removal at the end of the phase.
    pub(crate) fn spend(&mut self) {
        self.spent = true;
    }

    /// Re-aims at the target's current position and moves toward it.
    ///
    /// `target` is `None` when the tracked monster is no longer active. A
    /// projectile within `impact_radius` hits without moving, which also covers
    /// a zero distance. Movement is clamped to the remaining distance.
    pub(crate) fn advance(&mut self, target: Option<Vec2>, speed: f32, impact_radius: f32) -> Flight {
        let Some(goal) = target else {
            return Flight::TargetGone;
        };

        let offset = goal - self.position;
        let distance = offset.length();
        if distance <= impact_radius {
            return Flight::Hit;
        }

        self.position += offset / distance * speed.min(distance);
        Flight::Flying
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            kind: self.kind,
            position: to_position(self.position),
            target: self.target,
        }
    }
}
