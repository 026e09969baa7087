#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Lane Defence session.

mod config;
mod layout;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lane_defence_core::{Event, TargetingPolicy, TICKS_PER_SECOND};
use lane_defence_simulation::Simulation;
use lane_defence_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::layout::{TowerLayout, TowerPlacement};

/// Runs a Lane Defence session without a renderer and prints the HUD.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", version)]
struct Cli {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = u64::from(TICKS_PER_SECOND) * 60)]
    ticks: u64,

    /// Print the HUD every N ticks; 0 only prints the final line.
    #[arg(long, default_value_t = u64::from(TICKS_PER_SECOND))]
    report_every: u64,

    /// Overrides the targeting policy from the rules file.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// TOML file with rule overrides.
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Layout string printed by a previous run, e.g. `lane:v1:ice@4,7`.
    #[arg(long)]
    layout: Option<TowerLayout>,

    /// Tower placed before the session starts, e.g. `fire@2,3`. Repeatable.
    #[arg(long = "tower")]
    towers: Vec<TowerPlacement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Earliest spawned monster in range.
    FirstMatch,
    /// Closest monster in range.
    Nearest,
}

impl From<PolicyArg> for TargetingPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::FirstMatch => Self::FirstMatch,
            PolicyArg::Nearest => Self::Nearest,
        }
    }
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut rules = config::load_rules(cli.rules.as_deref())?;
    if let Some(policy) = cli.policy {
        rules.targeting = policy.into();
    }
    let mut simulation = Simulation::new(rules).context("rules describe an unplayable session")?;

    let placements = cli
        .layout
        .into_iter()
        .flat_map(|layout| layout.towers)
        .chain(cli.towers);
    for placement in placements {
        match simulation.place_tower(placement.kind, placement.cell) {
            Ok(tower) => info!(tower = tower.get(), %placement, "tower placed"),
            Err(error) => warn!(%placement, %error, "skipping tower"),
        }
    }

    let layout = TowerLayout::capture(&query::tower_view(simulation.world()));
    let _ = simulation.start();

    for _ in 0..cli.ticks {
        let game_over = simulation
            .tick()
            .iter()
            .any(|event| matches!(event, Event::SessionReset { .. }));
        let tick = query::tick_index(simulation.world());

        if game_over {
            println!("tick {tick}: game over | {}", simulation.hud());
            break;
        }

        if cli.report_every > 0 && tick % cli.report_every == 0 {
            println!("tick {tick}: {}", simulation.hud());
        }
    }

    println!("final: {}", simulation.hud());
    println!("layout: {}", layout.encode());
    Ok(())
}
