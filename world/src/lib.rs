#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.
//!
//! The world owns the route, towers, monsters, projectiles and the economy.
//! It only changes through [`apply`], which executes one [`Command`] and
//! reports what happened as [`Event`] values. Collections are never shrunk
//! while they are being walked: entities are marked during a phase and
//! compacted once the phase ends.

mod monsters;
mod projectiles;
mod route;
mod towers;

use glam::Vec2;
use lane_defence_core::{
    Command, EconomySnapshot, Event, GridCell, Health, MonsterId, PlacementError, Position,
    ProjectileId, PurchaseError, ResetReason, Rules, TowerId, TowerKind,
};
use tracing::{debug, info, warn};

use self::{
    monsters::{Monster, StepOutcome},
    projectiles::{Flight, Projectile},
    route::Route,
    towers::TowerRegistry,
};

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    rules: Rules,
    route: Route,
    towers: TowerRegistry,
    monsters: Vec<Monster>,
    projectiles: Vec<Projectile>,
    economy: Economy,
    tick_index: u64,
    next_monster_id: MonsterId,
    next_projectile_id: ProjectileId,
}

impl World {
    /// Creates a new world that follows the provided rules.
    #[must_use]
    pub fn with_rules(rules: Rules) -> Self {
        let route = Route::from_waypoints(&rules.waypoints);
        let economy = Economy::new(&rules);
        Self {
            rules,
            route,
            towers: TowerRegistry::new(),
            monsters: Vec::new(),
            projectiles: Vec::new(),
            economy,
            tick_index: 0,
            next_monster_id: MonsterId::new(0),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    fn reset(&mut self, reason: ResetReason, out_events: &mut Vec<Event>) {
        self.economy = Economy::new(&self.rules);
        self.towers = TowerRegistry::new();
        self.monsters.clear();
        self.projectiles.clear();
        info!(?reason, "session reset");
        out_events.push(Event::SessionReset { reason });
    }

    fn allocate_monster_id(&mut self) -> MonsterId {
        let id = self.next_monster_id;
        self.next_monster_id = MonsterId::new(id.get().saturating_add(1));
        id
    }

    fn check_placement(&self, cell: GridCell) -> Result<(), PlacementError> {
        let inside = u32::try_from(cell.column()).map_or(false, |column| column < self.rules.columns)
            && u32::try_from(cell.row()).map_or(false, |row| row < self.rules.rows);
        if !inside {
            return Err(PlacementError::OutOfBounds);
        }

        if self.route.contains(cell) {
            return Err(PlacementError::OnPath);
        }

        if self.towers.at(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        if self.economy.gold < self.rules.tower_cost {
            return Err(PlacementError::InsufficientGold {
                required: self.rules.tower_cost,
                available: self.economy.gold,
            });
        }

        Ok(())
    }

    fn place_tower(&mut self, kind: TowerKind, cell: GridCell, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.check_placement(cell) {
            warn!(?kind, ?cell, %reason, "tower placement rejected");
            out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
            return;
        }

        self.economy.gold -= self.rules.tower_cost;
        let tower = self.towers.insert(kind, cell);
        debug!(tower = tower.get(), ?kind, ?cell, "tower placed");
        out_events.push(Event::TowerPlaced { tower, kind, cell });
    }

    fn fire_projectile(&mut self, tower: TowerId, target: MonsterId, out_events: &mut Vec<Event>) {
        let Some(index) = monster_index(&self.monsters, target) else {
            return;
        };
        let Some(tower_state) = self.towers.get_mut(tower) else {
            return;
        };

        let next_projectile_id = &mut self.next_projectile_id;
        let Some(projectile) = tower_state.try_fire(
            &self.monsters[index],
            self.rules.engagement_radius,
            self.rules.tower_cooldown_ticks,
            || allocate_projectile_id(next_projectile_id),
        ) else {
            return;
        };

        out_events.push(Event::ProjectileFired {
            projectile: projectile.id(),
            tower,
            target,
        });
        self.projectiles.push(projectile);
    }

    fn spawn_wave(&mut self, level: u32, count: u32, out_events: &mut Vec<Event>) {
        let health = Health::new(self.rules.monster_health);
        for _ in 0..count {
            let id = self.allocate_monster_id();
            let monster = Monster::spawn(id, &self.route, health, self.rules.monster_speed);
            out_events.push(Event::MonsterSpawned {
                monster: id,
                position: to_position(monster.position()),
            });
            self.monsters.push(monster);
        }

        info!(level, count, "wave spawned");
        out_events.push(Event::WaveSpawned { level, count });
    }

    fn step_monsters(&mut self, out_events: &mut Vec<Event>) {
        let mut escaped = 0_u32;

        for monster in &mut self.monsters {
            match monster.tick(&self.route) {
                StepOutcome::Escaped => {
                    escaped += 1;
                    debug!(monster = monster.id().get(), "monster escaped");
                    out_events.push(Event::MonsterEscaped {
                        monster: monster.id(),
                    });
                }
                StepOutcome::Burned => {
                    self.economy
                        .record_kill(monster.id(), self.rules.kill_reward, out_events);
                }
                StepOutcome::Traveling | StepOutcome::Inert => {}
            }
        }

        self.monsters.retain(Monster::is_active);

        for _ in 0..escaped {
            self.economy.lives = self.economy.lives.saturating_sub(1);
            out_events.push(Event::LifeLost {
                lives_remaining: self.economy.lives,
            });

            if self.economy.lives == 0 {
                info!("no lives left");
                self.reset(ResetReason::GameOver, out_events);
                break;
            }
        }
    }

    fn step_projectiles(&mut self, out_events: &mut Vec<Event>) {
        let speed = self.rules.projectile_speed;
        let impact_radius = self.rules.impact_radius;

        for projectile in &mut self.projectiles {
            let target = monster_index(&self.monsters, projectile.target())
                .filter(|&index| self.monsters[index].is_active());
            let goal = target.map(|index| self.monsters[index].position());

            match projectile.advance(goal, speed, impact_radius) {
                Flight::Flying => {}
                Flight::TargetGone => {
                    projectile.spend();
                    out_events.push(Event::ProjectileDiscarded {
                        projectile: projectile.id(),
                    });
                }
                Flight::Hit => {
                    projectile.spend();
                    out_events.push(Event::ProjectileHit {
                        projectile: projectile.id(),
                        monster: projectile.target(),
                        kind: projectile.kind(),
                    });

                    if let Some(index) = target {
                        let monster = &mut self.monsters[index];
                        if monster.apply_hit(projectile.kind()) {
                            self.economy.record_kill(
                                monster.id(),
                                self.rules.kill_reward,
                                out_events,
                            );
                        }
                    }
                }
            }
        }

        self.projectiles.retain(|projectile| !projectile.is_spent());
        self.monsters.retain(Monster::is_active);
    }

    fn defeat_all(&mut self, out_events: &mut Vec<Event>) {
        for monster in &mut self.monsters {
            if monster.defeat() {
                self.economy
                    .record_kill(monster.id(), self.rules.kill_reward, out_events);
            }
        }
        self.monsters.retain(Monster::is_active);
    }

    fn buy_life(&mut self, out_events: &mut Vec<Event>) {
        let cost = self.rules.life_cost;
        if self.economy.gold < cost {
            warn!(cost, gold = self.economy.gold, "life purchase rejected");
            out_events.push(Event::LifePurchaseRejected {
                reason: PurchaseError::InsufficientGold {
                    required: cost,
                    available: self.economy.gold,
                },
            });
            return;
        }

        self.economy.gold -= cost;
        self.economy.lives = self.economy.lives.saturating_add(1);
        out_events.push(Event::LifePurchased {
            lives: self.economy.lives,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => {
            if !world.economy.started {
                world.economy.started = true;
                info!("session started");
                out_events.push(Event::SessionStarted);
            }
        }
        Command::ResetSession => world.reset(ResetReason::Requested, out_events),
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            for tower in world.towers.iter_mut() {
                tower.cool_down();
            }
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });
        }
        Command::FireProjectile { tower, target } => {
            world.fire_projectile(tower, target, out_events);
        }
        Command::SpawnWave { level, count } => world.spawn_wave(level, count, out_events),
        Command::StepMonsters => world.step_monsters(out_events),
        Command::StepProjectiles => world.step_projectiles(out_events),
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::BuyLife => world.buy_life(out_events),
        Command::DefeatAllMonsters => world.defeat_all(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use lane_defence_core::{
        EconomySnapshot, GridCell, MonsterView, PlacementError, ProjectileView, Rules, TowerId,
        TowerView,
    };

    use super::World;

    /// Rules the world was created with.
    #[must_use]
    pub fn rules(world: &World) -> &Rules {
        &world.rules
    }

    /// Rasterised route cells in traversal order.
    #[must_use]
    pub fn route_cells(world: &World) -> &[GridCell] {
        world.route.cells()
    }

    /// Reports whether the cell belongs to the monster route.
    #[must_use]
    pub fn is_on_path(world: &World, cell: GridCell) -> bool {
        world.route.contains(cell)
    }

    /// Validates a tower placement without mutating the world.
    pub fn placement_check(world: &World, cell: GridCell) -> Result<(), PlacementError> {
        world.check_placement(cell)
    }

    /// Tower occupying the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: GridCell) -> Option<TowerId> {
        world.towers.at(cell)
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of monsters still on the route.
    #[must_use]
    pub fn active_monster_count(world: &World) -> usize {
        world.monsters.len()
    }

    /// Gold, lives, kills and the running flag.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.economy.snapshot()
    }

    /// Captures a read-only view of the monsters on the route.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(world.monsters.iter().map(|monster| monster.snapshot()).collect())
    }

    /// Captures a read-only view of the placed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| projectile.snapshot())
                .collect(),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Economy {
    started: bool,
    gold: u32,
    lives: u32,
    kills: u32,
}

impl Economy {
    fn new(rules: &Rules) -> Self {
        Self {
            started: false,
            gold: rules.starting_gold,
            lives: rules.starting_lives,
            kills: 0,
        }
    }

    fn record_kill(&mut self, monster: MonsterId, reward: u32, out_events: &mut Vec<Event>) {
        self.gold = self.gold.saturating_add(reward);
        self.kills = self.kills.saturating_add(1);
        debug!(monster = monster.get(), reward, "monster defeated");
        out_events.push(Event::MonsterDefeated { monster, reward });
    }

    fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            started: self.started,
            gold: self.gold,
            lives: self.lives,
            kills: self.kills,
        }
    }
}

fn allocate_projectile_id(next: &mut ProjectileId) -> ProjectileId {
    let id = *next;
    *next = ProjectileId::new(id.get().saturating_add(1));
    id
}

/// Monsters are stored in spawn order, so identifiers are sorted.
fn monster_index(monsters: &[Monster], id: MonsterId) -> Option<usize> {
    monsters.binary_search_by_key(&id, Monster::id).ok()
}

pub(crate) fn to_vec2(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

pub(crate) fn to_position(vector: Vec2) -> Position {
    Position::new(vector.x, vector.y)
}
