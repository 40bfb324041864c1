use crate::cli::RunArgs;
use crate::config::{ProtocolFile, Stage};
use crate::error::Result;
use crate::progress::CliProgressHandler;
use polymelt::core::models::bounds::SimBox;
use polymelt::core::models::configuration::ParticleConfiguration;
use polymelt::core::models::particle::Particle;
use polymelt::engine::dryrun::DryRunEngine;
use polymelt::engine::traits::MdEngine;
use polymelt::engine::progress::ProgressReporter;
use polymelt::engine::recorder::{MemoryFrameStore, TrajectoryWriter};
use polymelt::protocols::{RunOutcome, Simulation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let file = ProtocolFile::load(&args.protocol)?;
    let stages = file.to_stages()?;
    let params = file.simulation.to_params()?;

    info!(
        particles = file.system.particles,
        stages = stages.len(),
        "setting up dry-run engine"
    );
    let config = scatter_particles(&file.system.bounds, file.system.particles, file.system.seed);
    let engine = DryRunEngine::new(config);
    let mut sim: Simulation<DryRunEngine, MemoryFrameStore> = Simulation::new(engine, params)?;

    if let Some(target) = file.simulation.target_box {
        sim.set_target_box(SimBox::orthorhombic(target[0], target[1], target[2]));
    }
    if let Some(trajectory) = &file.trajectory {
        let writer = TrajectoryWriter::open(MemoryFrameStore::new(), trajectory.n_rigid)
            .map_err(polymelt::engine::error::ProtocolError::from)?;
        sim.attach_recorder(writer, trajectory.period);
    }

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Executing {} stage(s) against the dry-run engine...", stages.len());
    for (i, stage) in stages.iter().enumerate() {
        info!(stage = stage.name(), index = i, "executing stage");
        match stage {
            Stage::Shrink(config) => {
                sim.shrink(config, &reporter)?;
                println!("  [{}] shrink: box reached target", i + 1);
            }
            Stage::Quench(config) => {
                let outcome = sim.quench(config, &reporter)?;
                println!("  [{}] quench: {}", i + 1, describe(outcome));
            }
            Stage::Anneal(config) => {
                sim.anneal(config, &reporter)?;
                println!(
                    "  [{}] anneal: {} stage(s) completed",
                    i + 1,
                    config.schedule.stages().len()
                );
            }
            Stage::Tensile(config) => {
                let outcome = sim.tensile(config, &reporter)?;
                println!("  [{}] tensile: {}", i + 1, describe(outcome));
            }
        }
    }

    let frames = sim
        .detach_recorder()
        .map(|writer| writer.close().frames().len())
        .unwrap_or(0);
    let engine = sim.into_engine();
    println!(
        "Dry run finished at timestep {} with {} checkpoint(s) and {} trajectory frame(s).",
        engine.timestep(),
        engine.checkpoint_writes(),
        frames
    );

    if args.show_events {
        for event in engine.history() {
            println!("  {:?}", event);
        }
    }
    Ok(())
}

fn describe(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::Completed => "completed".to_string(),
        RunOutcome::BudgetExhausted { completed_steps } => {
            format!("stopped early on wall-time budget after {} steps", completed_steps)
        }
    }
}

/// Scatters `n` unit-mass particles uniformly through the box.
fn scatter_particles(bounds: &[f64; 3], n: usize, seed: u64) -> ParticleConfiguration {
    let mut config =
        ParticleConfiguration::new(SimBox::orthorhombic(bounds[0], bounds[1], bounds[2]));
    let type_id = config.type_id("A");
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..n {
        let position = nalgebra::Point3::new(
            rng.random_range(-bounds[0] / 2.0..bounds[0] / 2.0),
            rng.random_range(-bounds[1] / 2.0..bounds[1] / 2.0),
            rng.random_range(-bounds[2] / 2.0..bounds[2] / 2.0),
        );
        config.particles.push(Particle::new(type_id, 1.0, position));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_stays_inside_the_box() {
        let config = scatter_particles(&[10.0, 8.0, 6.0], 200, 7);
        assert_eq!(config.len(), 200);
        for p in &config.particles {
            assert!(p.position.x.abs() <= 5.0);
            assert!(p.position.y.abs() <= 4.0);
            assert!(p.position.z.abs() <= 3.0);
        }
    }

    #[test]
    fn scatter_is_deterministic_per_seed() {
        let a = scatter_particles(&[10.0, 10.0, 10.0], 20, 3);
        let b = scatter_particles(&[10.0, 10.0, 10.0], 20, 3);
        assert_eq!(a, b);
    }
}
