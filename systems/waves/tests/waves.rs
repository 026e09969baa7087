use lane_defence_core::{Command, Event, GridCell, Rules};
use lane_defence_system_waves::{Config, Waves};
use lane_defence_world::{self as world, query, World};

fn rules() -> Rules {
    Rules {
        waypoints: vec![GridCell::new(0, 0), GridCell::new(2, 0)],
        columns: 4,
        rows: 2,
        monster_speed: 1.0,
        wave_interval_ticks: 50,
        starting_lives: 100,
        ..Rules::default()
    }
}

/// Ticks the world and lets the controller react, returning the spawn log.
fn replay(ticks: usize) -> (Vec<(u32, u32)>, Waves) {
    let rules = rules();
    let mut waves = Waves::new(Config::new(rules.wave_interval_ticks));
    let mut world = World::with_rules(rules);
    let mut log = Vec::new();

    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);

    for _ in 0..ticks {
        events.clear();
        world::apply(&mut world, Command::Tick, &mut events);

        let mut commands = Vec::new();
        waves.handle(
            &events,
            query::economy(&world).started,
            query::active_monster_count(&world),
            &mut commands,
        );

        for command in commands {
            if let Command::SpawnWave { level, count } = command {
                log.push((level, count));
            }
            world::apply(&mut world, command, &mut events);
        }
        world::apply(&mut world, Command::StepMonsters, &mut events);
    }

    (log, waves)
}

#[test]
fn waves_grow_by_two_monsters_per_level() {
    let (log, waves) = replay(20);

    assert!(log.len() >= 3, "expected several waves, got {log:?}");
    for (index, (level, count)) in log.iter().enumerate() {
        let expected_level = u32::try_from(index).expect("small index") + 1;
        assert_eq!(*level, expected_level);
        assert_eq!(*count, expected_level * 2);
    }
    assert_eq!(waves.current_level(), log.last().map_or(1, |entry| entry.0));
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let (first, _) = replay(20);
    let (second, _) = replay(20);

    assert_eq!(first, second, "replay diverged between runs");
}

#[test]
fn spawned_monsters_match_requested_count() {
    let rules = rules();
    let mut waves = Waves::new(Config::new(rules.wave_interval_ticks));
    let mut world = World::with_rules(rules);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);
    world::apply(&mut world, Command::Tick, &mut events);

    let mut commands = Vec::new();
    waves.handle(&events, true, 0, &mut commands);
    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let spawned = events
        .iter()
        .filter(|event| matches!(event, Event::MonsterSpawned { .. }))
        .count();
    assert_eq!(spawned, 2);
    assert_eq!(query::active_monster_count(&world), 2);
    assert_eq!(query::monster_view(&world).len(), 2);
}
