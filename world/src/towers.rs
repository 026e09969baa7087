//! Authoritative tower state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use lane_defence_core::{GridCell, ProjectileId, TowerId, TowerKind, TowerSnapshot};

use crate::{monsters::Monster, projectiles::Projectile, to_vec2};

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Tower {
    id: TowerId,
    kind: TowerKind,
    cell: GridCell,
    cooldown_remaining: u32,
}

impl Tower {
    /// Counts the cooldown down by one tick, stopping at zero.
    pub(crate) fn cool_down(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }

    /// Continuous point projectiles are launched from.
    pub(crate) fn muzzle(&self) -> Vec2 {
        to_vec2(self.cell.position())
    }

    /// Fires at `target` when the tower is ready and the target is live and
    /// within `engagement_radius`.
    ///
    /// Firing restarts the cooldown at `cooldown_ticks`. `allocate` is only
    /// called once the shot is certain.
    pub(crate) fn try_fire(
        &mut self,
        target: &Monster,
        engagement_radius: f32,
        cooldown_ticks: u32,
        allocate: impl FnOnce() -> ProjectileId,
    ) -> Option<Projectile> {
        if self.cooldown_remaining > 0 || !target.is_active() {
            return None;
        }

        if self.muzzle().distance(target.position()) > engagement_radius {
            return None;
        }

        self.cooldown_remaining = cooldown_ticks;
        Some(Projectile::launch(
            allocate(),
            self.kind,
            self.muzzle(),
            target.id(),
        ))
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            cooldown_remaining: self.cooldown_remaining,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, Tower>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new, ready-to-fire tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: GridCell) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(
            id,
            Tower {
                id,
                kind,
                cell,
                cooldown_remaining: 0,
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, tower: TowerId) -> Option<&mut Tower> {
        self.entries.get_mut(&tower)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tower> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Tower> {
        self.entries.values_mut()
    }

    /// Tower occupying the provided cell, if any.
    pub(crate) fn at(&self, cell: GridCell) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.cell == cell)
            .map(|tower| tower.id)
    }
}
