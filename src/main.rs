//! Headless skirmish runner

use std::path::PathBuf;

use clap::Parser;
use skirmish::prelude::*;

#[derive(Parser)]
#[command(name = "skirmish", about = "Run a headless unit skirmish")]
struct Args {
    /// Skirmish description (.ron or .json); a built-in duel when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of steps, overriding the configuration
    #[arg(long)]
    frames: Option<u64>,

    /// Seconds per step, overriding the configuration
    #[arg(long)]
    dt: Option<f32>,
}

fn describe(sim: &Simulation, entity: Entity) -> String {
    sim.world()
        .get::<Name>(entity)
        .map(|name| name.0.clone())
        .unwrap_or_else(|_| format!("{entity:?}"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SkirmishConfig::load(path)?,
        None => SkirmishConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.frames = frames;
    }
    if let Some(dt) = args.dt {
        config.fixed_dt = dt;
    }
    config.validate()?;

    let mut sim = Simulation::from_config(&config)?;

    while sim.frame() < config.frames && sim.winner().is_none() {
        sim.step();

        let events: Vec<UnitEvent> = sim.drain_events().collect();
        for event in &events {
            match event {
                UnitEvent::StateChanged { entity, from, to } => {
                    log::debug!("[{:.2}s] {}: {from} -> {to}", sim.now(), describe(&sim, *entity));
                }
                UnitEvent::UnitDestroyed { entity, destroyer } => {
                    log::info!(
                        "[{:.2}s] {:?} destroyed by {}",
                        sim.now(),
                        entity,
                        describe(&sim, *destroyer)
                    );
                }
                _ => log::trace!("{event:?}"),
            }
        }
    }

    match sim.winner() {
        Some(team) => log::info!(
            "'{}' won by team {} after {:.2}s ({} units left)",
            config.name,
            team.0,
            sim.now(),
            sim.unit_count()
        ),
        None => log::info!(
            "'{}' undecided after {} steps ({} units left)",
            config.name,
            sim.frame(),
            sim.unit_count()
        ),
    }

    Ok(())
}
