//! Monster state, route traversal and tick-counted status effects.

use glam::Vec2;
use lane_defence_core::{Health, MonsterId, MonsterSnapshot, StatusEffect, TowerKind};

use crate::{route::Route, to_position, to_vec2};

/// Result of advancing a monster by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// The monster is still walking the route.
    Traveling,
    /// The monster ran out of route cells and left the playfield.
    Escaped,
    /// A burn depleted the monster's health on this tick.
    Burned,
    /// The monster had already left play and ignored the tick.
    Inert,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Burn {
    remaining: u32,
    tick_damage: u32,
}

/// Monster walking the route.
#[derive(Clone, Debug)]
pub(crate) struct Monster {
    id: MonsterId,
    position: Vec2,
    route_index: usize,
    speed: f32,
    health: Health,
    defeated: bool,
    escaped: bool,
    freeze_remaining: u32,
    burn: Burn,
}

impl Monster {
    /// Places a new monster on the first cell of the route.
    ///
    /// The monster already stands on `route[0]`, so it heads for `route[1]`.
    /// On an empty route it starts at the origin and escapes on its first tick.
    pub(crate) fn spawn(id: MonsterId, route: &Route, health: Health, speed: f32) -> Self {
        let (position, route_index) = match route.first() {
            Some(cell) => (to_vec2(cell.position()), 1),
            None => (Vec2::ZERO, 0),
        };

        Self {
            id,
            position,
            route_index,
            speed,
            health,
            defeated: false,
            escaped: false,
            freeze_remaining: 0,
            burn: Burn::default(),
        }
    }

    pub(crate) fn id(&self) -> MonsterId {
        self.id
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    /// Reports whether the monster still belongs in the active collection.
    pub(crate) fn is_active(&self) -> bool {
        !self.defeated && !self.escaped
    }

    /// Distance the monster covers on its next tick.
    pub(crate) fn current_speed(&self) -> f32 {
        if self.freeze_remaining > 0 {
            0.0
        } else {
            self.speed
        }
    }

    /// Advances status effects, then walks toward the next route cell.
    pub(crate) fn tick(&mut self, route: &Route) -> StepOutcome {
        if !self.is_active() {
            return StepOutcome::Inert;
        }

        if self.burn.remaining > 0 {
            self.burn.remaining -= 1;
            if self.apply_damage(self.burn.tick_damage) {
                return StepOutcome::Burned;
            }
        }

        if self.freeze_remaining > 0 {
            self.freeze_remaining -= 1;
            return StepOutcome::Traveling;
        }

        let Some(cell) = route.get(self.route_index) else {
            self.escaped = true;
            return StepOutcome::Escaped;
        };

        let destination = to_vec2(cell.position());
        let offset = destination - self.position;
        let distance = offset.length();

        if distance <= self.speed {
            self.position = destination;
            self.route_index += 1;
        } else {
            self.position += offset / distance * self.speed;
        }

        StepOutcome::Traveling
    }

    /// Subtracts health and reports whether this call defeated the monster.
    ///
    /// Damage applied after defeat is ignored, so the transition is reported
    /// exactly once.
    pub(crate) fn apply_damage(&mut self, amount: u32) -> bool {
        if self.defeated {
            return false;
        }

        self.health = self.health.saturating_sub(amount);
        if self.health.is_depleted() {
            self.defeated = true;
            self.freeze_remaining = 0;
            self.burn = Burn::default();
            return true;
        }
        false
    }

    /// Holds the monster in place for `ticks` ticks.
    ///
    /// A shorter freeze never cuts a longer one short.
    pub(crate) fn apply_freeze(&mut self, ticks: u32) {
        if self.defeated {
            return;
        }
        self.freeze_remaining = self.freeze_remaining.max(ticks);
    }

    /// Burns the monster for `ticks` ticks.
    ///
    /// Re-application refreshes the remaining duration; tick damage does not
    /// stack.
    pub(crate) fn apply_burn(&mut self, ticks: u32, tick_damage: u32) {
        if self.defeated {
            return;
        }
        self.burn = Burn {
            remaining: ticks,
            tick_damage,
        };
    }

    /// Applies the direct damage and status effect of a projectile.
    pub(crate) fn apply_hit(&mut self, kind: TowerKind) -> bool {
        let defeated = self.apply_damage(kind.direct_damage());
        match kind.status_effect() {
            Some(StatusEffect::Freeze { ticks }) => self.apply_freeze(ticks),
            Some(StatusEffect::Burn { ticks, tick_damage }) => self.apply_burn(ticks, tick_damage),
            None => {}
        }
        defeated
    }

    /// Depletes the monster's health outright.
    pub(crate) fn defeat(&mut self) -> bool {
        self.apply_damage(u32::MAX)
    }

    pub(crate) fn snapshot(&self) -> MonsterSnapshot {
        MonsterSnapshot {
            id: self.id,
            position: to_position(self.position),
            route_index: self.route_index,
            health: self.health,
            speed: self.current_speed(),
            frozen: self.freeze_remaining > 0,
            burning: self.burn.remaining > 0,
            defeated: self.defeated,
        }
    }
}
