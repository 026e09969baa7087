#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-timestep driver that runs the world and its systems in tick order.
//!
//! Every tick first lets towers cool down and fire, then evaluates waves,
//! then walks monsters and finally resolves projectiles. Hosts call
//! [`Simulation::tick`] once per `1 / TICKS_PER_SECOND` seconds and read the
//! state back through [`Simulation::hud`] and the world queries.

use std::fmt;

use lane_defence_core::{
    Command, Event, GridCell, PlacementError, PurchaseError, Rules, RulesError, TowerId, TowerKind,
    TowerTarget,
};
use lane_defence_system_tower_combat::TowerCombat;
use lane_defence_system_tower_targeting::TowerTargeting;
use lane_defence_system_waves::{Config as WavesConfig, Waves};
use lane_defence_world::{self as world, query, World};
use serde::Serialize;
use tracing::trace;

/// Scalars a host displays next to the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct HudSnapshot {
    /// Indicates whether the session is running.
    pub started: bool,
    /// Gold available to the player.
    pub gold: u32,
    /// Lives left before the session resets.
    pub lives: u32,
    /// Level of the most recent wave.
    pub level: u32,
    /// Whole seconds until the next wave is forced.
    pub next_wave_in: u32,
    /// Monsters defeated during the session.
    pub kills: u32,
}

impl fmt::Display for HudSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gold {} | lives {} | level {} | next wave in {}s | kills {}",
            self.gold, self.lives, self.level, self.next_wave_in, self.kills
        )
    }
}

/// Owns the world together with the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    targeting: TowerTargeting,
    combat: TowerCombat,
    waves: Waves,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    /// Creates an idle simulation after validating the rules.
    pub fn new(rules: Rules) -> Result<Self, RulesError> {
        rules.validate()?;
        let waves = Waves::new(WavesConfig::new(rules.wave_interval_ticks));

        Ok(Self {
            world: World::with_rules(rules),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            waves,
            targets: Vec::new(),
            commands: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Starts the session; waves begin on the next tick.
    pub fn start(&mut self) -> &[Event] {
        self.run_host(Command::StartSession)
    }

    /// Stops the session and restores the initial economy, towers and level.
    pub fn reset(&mut self) -> &[Event] {
        self.run_host(Command::ResetSession)
    }

    /// Advances the simulation by one fixed tick and reports what happened.
    pub fn tick(&mut self) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, Command::Tick, &mut self.events);

        let started = query::economy(&self.world).started;
        let rules = query::rules(&self.world);
        let (policy, radius) = (rules.targeting, rules.engagement_radius);

        let towers = query::tower_view(&self.world);
        let monsters = query::monster_view(&self.world);
        self.targeting
            .handle(policy, radius, &towers, &monsters, &mut self.targets);
        self.combat
            .handle(started, &towers, &self.targets, &mut self.commands);
        self.flush_commands();

        self.waves.handle(
            &self.events,
            started,
            query::active_monster_count(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        let settled = self.events.len();
        world::apply(&mut self.world, Command::StepMonsters, &mut self.events);
        world::apply(&mut self.world, Command::StepProjectiles, &mut self.events);
        self.waves.handle(
            &self.events[settled..],
            started,
            query::active_monster_count(&self.world),
            &mut self.commands,
        );

        trace!(
            tick = query::tick_index(&self.world),
            events = self.events.len(),
            "tick complete"
        );
        &self.events
    }

    /// Places a tower after checking bounds, the route, occupancy and gold.
    pub fn place_tower(&mut self, kind: TowerKind, cell: GridCell) -> Result<TowerId, PlacementError> {
        self.placement_check(cell)?;
        let _ = self.run_host(Command::PlaceTower { kind, cell });
        query::tower_at(&self.world, cell).ok_or(PlacementError::Occupied)
    }

    /// Reports whether a tower could be placed at the cell right now.
    pub fn placement_check(&self, cell: GridCell) -> Result<(), PlacementError> {
        query::placement_check(&self.world, cell)
    }

    /// Buys one life, returning the new life count.
    pub fn buy_life(&mut self) -> Result<u32, PurchaseError> {
        let outcome = self.run_host(Command::BuyLife).iter().find_map(|event| match event {
            Event::LifePurchased { lives } => Some(Ok(*lives)),
            Event::LifePurchaseRejected { reason } => Some(Err(*reason)),
            _ => None,
        });
        outcome.unwrap_or_else(|| Ok(query::economy(&self.world).lives))
    }

    /// Defeats every monster on the route, returning how many were defeated.
    pub fn defeat_all(&mut self) -> usize {
        self.run_host(Command::DefeatAllMonsters)
            .iter()
            .filter(|event| matches!(event, Event::MonsterDefeated { .. }))
            .count()
    }

    /// Captures the scalars a host displays.
    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        let economy = query::economy(&self.world);
        HudSnapshot {
            started: economy.started,
            gold: economy.gold,
            lives: economy.lives,
            level: self.waves.current_level(),
            next_wave_in: self.waves.seconds_until_next_wave(),
            kills: economy.kills,
        }
    }

    /// Read-only access to the world for rendering and queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn run_host(&mut self, command: Command) -> &[Event] {
        self.events.clear();
        world::apply(&mut self.world, command, &mut self.events);
        let started = query::economy(&self.world).started;
        self.waves.handle(
            &self.events,
            started,
            query::active_monster_count(&self.world),
            &mut self.commands,
        );
        &self.events
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
