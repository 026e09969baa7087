use std::collections::BTreeMap;

use lane_defence_core::{
    Event, GridCell, MonsterId, PlacementError, PurchaseError, ResetReason, Rules, TowerId,
    TowerKind,
};
use lane_defence_simulation::{HudSnapshot, Simulation};
use lane_defence_world::query;

fn lane(length: i32) -> Rules {
    Rules {
        waypoints: vec![GridCell::new(0, 0), GridCell::new(length - 1, 0)],
        columns: 20,
        rows: 6,
        ..Rules::default()
    }
}

fn simulation(rules: Rules) -> Simulation {
    Simulation::new(rules).expect("test rules are valid")
}

/// Runs `ticks` ticks and returns every event tagged with its tick number.
fn run(simulation: &mut Simulation, ticks: u64) -> Vec<(u64, Event)> {
    let mut log = Vec::new();
    for _ in 0..ticks {
        let events = simulation.tick().to_vec();
        let tick = query::tick_index(simulation.world());
        log.extend(events.into_iter().map(|event| (tick, event)));
    }
    log
}

#[test]
fn first_running_tick_spawns_opening_wave() {
    let mut simulation = simulation(lane(20));
    let started = simulation.start().to_vec();
    assert_eq!(started, vec![Event::SessionStarted]);

    let events = simulation.tick().to_vec();
    assert!(events.contains(&Event::WaveSpawned { level: 1, count: 2 }));
    assert_eq!(query::active_monster_count(simulation.world()), 2);

    let hud = simulation.hud();
    assert!(hud.started);
    assert_eq!(hud.level, 1);
    assert_eq!(hud.next_wave_in, 5);
}

#[test]
fn unit_speed_monster_escapes_after_walking_five_cell_route() {
    let mut simulation = simulation(Rules {
        monster_speed: 1.0,
        ..lane(5)
    });
    let _ = simulation.start();

    let log = run(&mut simulation, 5);
    let escapes: Vec<u64> = log
        .iter()
        .filter(|(_, event)| matches!(event, Event::MonsterEscaped { .. }))
        .map(|(tick, _)| *tick)
        .collect();

    assert_eq!(escapes, vec![5, 5], "both monsters leave on the fifth tick");
    assert_eq!(simulation.hud().lives, 1, "each escape costs exactly one life");
}

#[test]
fn tower_waits_full_cooldown_between_shots() {
    let mut simulation = simulation(Rules {
        monster_health: 10_000,
        monster_speed: 0.01,
        tower_cooldown_ticks: 10,
        ..lane(20)
    });
    let tower = simulation
        .place_tower(TowerKind::Regular, GridCell::new(0, 1))
        .expect("cell is free");
    let _ = simulation.start();

    let log = run(&mut simulation, 35);
    let shots: Vec<u64> = log
        .iter()
        .filter(|(_, event)| {
            matches!(event, Event::ProjectileFired { tower: fired, .. } if *fired == tower)
        })
        .map(|(tick, _)| *tick)
        .collect();

    assert_eq!(shots, vec![2, 12, 22, 32]);
}

#[test]
fn every_tower_kind_earns_the_same_kill_reward() {
    for kind in TowerKind::ALL {
        let mut simulation = simulation(Rules {
            monster_health: 10,
            monster_speed: 0.01,
            ..lane(20)
        });
        let _ = simulation
            .place_tower(kind, GridCell::new(0, 1))
            .expect("cell is free");
        let _ = simulation.start();
        let _ = run(&mut simulation, 240);

        let hud = simulation.hud();
        assert!(hud.kills > 0, "{kind:?} tower never scored");
        assert_eq!(
            hud.gold,
            10_000 - 50 + 10 * hud.kills,
            "{kind:?} kills must pay the fixed reward"
        );
    }
}

#[test]
fn defeated_monsters_are_reported_once() {
    let mut simulation = simulation(Rules {
        monster_speed: 0.02,
        ..lane(20)
    });
    for column in 0..4 {
        let kind = TowerKind::ALL[column as usize % TowerKind::ALL.len()];
        let _ = simulation
            .place_tower(kind, GridCell::new(column, 1))
            .expect("cell is free");
    }
    let _ = simulation.start();

    let mut defeats: BTreeMap<MonsterId, u32> = BTreeMap::new();
    for (_, event) in run(&mut simulation, 600) {
        if let Event::MonsterDefeated { monster, .. } = event {
            *defeats.entry(monster).or_default() += 1;
        }
    }

    assert!(!defeats.is_empty(), "towers should defeat monsters");
    assert!(defeats.values().all(|count| *count == 1));
    assert_eq!(
        u32::try_from(defeats.len()).expect("small count"),
        simulation.hud().kills
    );
}

#[test]
fn ice_hit_freezes_the_target() {
    let mut simulation = simulation(Rules {
        monster_speed: 0.01,
        ..lane(20)
    });
    let _ = simulation
        .place_tower(TowerKind::Ice, GridCell::new(0, 1))
        .expect("cell is free");
    let _ = simulation.start();

    let log = run(&mut simulation, 10);
    let hit = log.iter().find_map(|(_, event)| match event {
        Event::ProjectileHit { monster, kind, .. } => Some((*monster, *kind)),
        _ => None,
    });
    let (monster, kind) = hit.expect("ice projectile should land");
    assert_eq!(kind, TowerKind::Ice);

    let view = query::monster_view(simulation.world());
    let snapshot = view
        .iter()
        .find(|snapshot| snapshot.id == monster)
        .expect("monster survives a single ice hit");
    assert!(snapshot.frozen);
    assert_eq!(snapshot.speed, 0.0);
    assert_eq!(snapshot.health.get(), 100 - TowerKind::Ice.direct_damage());
}

#[test]
fn losing_the_last_life_restores_initial_state() {
    let rules = Rules {
        monster_speed: 1.0,
        starting_lives: 1,
        ..lane(3)
    };
    let mut simulation = simulation(rules);
    let initial = simulation.hud();
    let _ = simulation
        .place_tower(TowerKind::Fire, GridCell::new(5, 5))
        .expect("cell is free");
    let _ = simulation.start();

    let log = run(&mut simulation, 3);
    assert!(log.iter().any(|(_, event)| {
        *event
            == Event::SessionReset {
                reason: ResetReason::GameOver,
            }
    }));

    assert_eq!(
        simulation.hud(),
        HudSnapshot {
            started: false,
            ..initial
        }
    );
    assert_eq!(query::tower_view(simulation.world()).iter().count(), 0);
    assert_eq!(query::active_monster_count(simulation.world()), 0);

    let idle = run(&mut simulation, 5);
    assert!(
        idle.iter()
            .all(|(_, event)| matches!(event, Event::TimeAdvanced { .. })),
        "reset session stays idle until started again"
    );
}

#[test]
fn single_waypoint_route_drains_lives_until_game_over() {
    let mut simulation = simulation(Rules {
        waypoints: vec![GridCell::new(0, 0)],
        ..lane(20)
    });
    assert!(query::route_cells(simulation.world()).is_empty());
    let _ = simulation.start();

    let log = run(&mut simulation, 2);
    let escapes: Vec<u64> = log
        .iter()
        .filter(|(_, event)| matches!(event, Event::MonsterEscaped { .. }))
        .map(|(tick, _)| *tick)
        .collect();
    assert_eq!(&escapes[..2], &[1, 1], "opening wave escapes on its first tick");

    let lives: Vec<u32> = log
        .iter()
        .filter_map(|(_, event)| match event {
            Event::LifeLost { lives_remaining } => Some(*lives_remaining),
            _ => None,
        })
        .collect();
    assert_eq!(lives, vec![2, 1, 0]);

    let resets: Vec<u64> = log
        .iter()
        .filter(|(_, event)| {
            *event
                == Event::SessionReset {
                    reason: ResetReason::GameOver,
                }
        })
        .map(|(tick, _)| *tick)
        .collect();
    assert_eq!(resets, vec![2]);

    let hud = simulation.hud();
    assert!(!hud.started);
    assert_eq!(hud.lives, 3);
    assert_eq!(hud.level, 1);
}

#[test]
fn placement_rules_are_enforced() {
    let mut simulation = simulation(Rules {
        starting_gold: 60,
        ..lane(10)
    });

    assert_eq!(
        simulation.place_tower(TowerKind::Regular, GridCell::new(3, 0)),
        Err(PlacementError::OnPath)
    );
    assert_eq!(
        simulation.place_tower(TowerKind::Regular, GridCell::new(20, 1)),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(
        simulation.place_tower(TowerKind::Regular, GridCell::new(3, 1)),
        Ok(TowerId::new(0))
    );
    assert_eq!(
        simulation.placement_check(GridCell::new(3, 1)),
        Err(PlacementError::Occupied)
    );
    assert_eq!(
        simulation.place_tower(TowerKind::Regular, GridCell::new(4, 1)),
        Err(PlacementError::InsufficientGold {
            required: 50,
            available: 10,
        })
    );
    assert_eq!(simulation.hud().gold, 10);
}

#[test]
fn buying_lives_and_clearing_the_field() {
    let mut simulation = simulation(Rules {
        starting_gold: 150,
        ..lane(20)
    });
    assert_eq!(simulation.buy_life(), Ok(4));
    assert_eq!(
        simulation.buy_life(),
        Err(PurchaseError::InsufficientGold {
            required: 100,
            available: 50,
        })
    );

    let _ = simulation.start();
    let _ = simulation.tick();
    assert_eq!(simulation.defeat_all(), 2);
    let hud = simulation.hud();
    assert_eq!(hud.kills, 2);
    assert_eq!(hud.gold, 50 + 20);

    let events = simulation.tick().to_vec();
    assert!(
        events.contains(&Event::WaveSpawned { level: 2, count: 4 }),
        "cleared field launches the next level"
    );
}

#[test]
fn requested_reset_restarts_from_level_one() {
    let mut simulation = simulation(lane(20));
    let _ = simulation.start();
    let _ = simulation.tick();
    let _ = simulation.defeat_all();
    let _ = simulation.tick();
    assert_eq!(simulation.hud().level, 2);

    let events = simulation.reset().to_vec();
    assert_eq!(
        events,
        vec![Event::SessionReset {
            reason: ResetReason::Requested,
        }]
    );
    assert_eq!(simulation.hud().level, 1);
    assert_eq!(simulation.hud().kills, 0);

    let _ = simulation.start();
    let events = simulation.tick().to_vec();
    assert!(events.contains(&Event::WaveSpawned { level: 1, count: 2 }));
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    fn session() -> (Vec<(u64, Event)>, HudSnapshot) {
        let mut simulation = simulation(Rules::default());
        for (column, row) in [(2, 3), (4, 7), (8, 5)] {
            let _ = simulation
                .place_tower(TowerKind::Fire, GridCell::new(column, row))
                .expect("cell is free");
        }
        let _ = simulation.start();
        let log = run(&mut simulation, 1_200);
        (log, simulation.hud())
    }

    let (first_log, first_hud) = session();
    let (second_log, second_hud) = session();

    assert_eq!(first_log, second_log, "replay diverged between runs");
    assert_eq!(first_hud, second_hud);
}
