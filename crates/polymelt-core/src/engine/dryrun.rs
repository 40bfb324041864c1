use super::error::EngineError;
use super::method::{IntegratorMethod, ParticleGroup};
use super::traits::{MdEngine, RigidKinematics};
use super::walls::WallPair;
use crate::core::models::bounds::SimBox;
use crate::core::models::configuration::ParticleConfiguration;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::trace;

/// One call the dry-run backend received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    MethodSet { name: &'static str },
    Thermalized { kt: f64, group_size: Option<usize> },
    Ran { steps: u64 },
    BoundsSet { bounds: SimBox },
    SnapshotReplaced,
    WallsAttached,
    WallsDetached,
    CheckpointWritten { path: PathBuf },
}

#[derive(Serialize)]
struct CheckpointPayload<'a> {
    timestep: u64,
    configuration: &'a ParticleConfiguration,
}

/// An [`MdEngine`] that performs no physics.
///
/// It advances the step counter, tracks box/method/wall state, accumulates a
/// configurable synthetic wall clock, writes checkpoints, and records every
/// call in an event history. Particle positions never move. Useful for
/// validating a protocol schedule end to end before committing real engine
/// time, and as the backend of the test suite.
#[derive(Debug)]
pub struct DryRunEngine {
    config: ParticleConfiguration,
    timestep: u64,
    method: Option<IntegratorMethod>,
    walls: Option<WallPair>,
    walltime: Duration,
    walltime_per_step: Duration,
    history: Vec<EngineEvent>,
}

impl DryRunEngine {
    pub fn new(config: ParticleConfiguration) -> Self {
        Self {
            config,
            timestep: 0,
            method: None,
            walls: None,
            walltime: Duration::ZERO,
            walltime_per_step: Duration::ZERO,
            history: Vec::new(),
        }
    }

    /// Sets the synthetic wall-clock cost per integration step.
    pub fn with_walltime_per_step(mut self, per_step: Duration) -> Self {
        self.walltime_per_step = per_step;
        self
    }

    pub fn method(&self) -> Option<&IntegratorMethod> {
        self.method.as_ref()
    }

    pub fn walls(&self) -> Option<&WallPair> {
        self.walls.as_ref()
    }

    /// Every call received so far, in order.
    pub fn history(&self) -> &[EngineEvent] {
        &self.history
    }

    /// Number of checkpoints written so far.
    pub fn checkpoint_writes(&self) -> usize {
        self.history
            .iter()
            .filter(|e| matches!(e, EngineEvent::CheckpointWritten { .. }))
            .count()
    }
}

impl MdEngine for DryRunEngine {
    fn timestep(&self) -> u64 {
        self.timestep
    }

    fn bounds(&self) -> SimBox {
        self.config.bounds
    }

    fn set_bounds(&mut self, bounds: SimBox) -> Result<(), EngineError> {
        self.config.bounds = bounds;
        self.history.push(EngineEvent::BoundsSet { bounds });
        Ok(())
    }

    fn snapshot(&self) -> ParticleConfiguration {
        self.config.clone()
    }

    fn set_snapshot(&mut self, config: ParticleConfiguration) -> Result<(), EngineError> {
        self.config = config;
        self.history.push(EngineEvent::SnapshotReplaced);
        Ok(())
    }

    fn run(&mut self, steps: u64) -> Result<(), EngineError> {
        if self.method.is_none() {
            return Err(EngineError::Backend(
                "run called with no integrator method set".to_string(),
            ));
        }
        self.timestep += steps;
        self.walltime += self.walltime_per_step * steps as u32;
        self.history.push(EngineEvent::Ran { steps });
        trace!(steps, timestep = self.timestep, "dry-run chunk");
        Ok(())
    }

    fn set_method(&mut self, method: IntegratorMethod) -> Result<(), EngineError> {
        self.history.push(EngineEvent::MethodSet {
            name: method.name(),
        });
        self.method = Some(method);
        Ok(())
    }

    fn thermalize(&mut self, group: &ParticleGroup, kt: f64) -> Result<(), EngineError> {
        self.history.push(EngineEvent::Thermalized {
            kt,
            group_size: group.len(),
        });
        Ok(())
    }

    fn attach_walls(&mut self, walls: WallPair) -> Result<(), EngineError> {
        if self.walls.is_some() {
            return Err(EngineError::Backend(
                "a wall pair is already attached".to_string(),
            ));
        }
        self.walls = Some(walls);
        self.history.push(EngineEvent::WallsAttached);
        Ok(())
    }

    fn detach_walls(&mut self) -> Result<Option<WallPair>, EngineError> {
        let detached = self.walls.take();
        if detached.is_some() {
            self.history.push(EngineEvent::WallsDetached);
        }
        Ok(detached)
    }

    fn rigid_kinematics(&self, n: usize) -> RigidKinematics {
        let head = &self.config.particles[..n.min(self.config.particles.len())];
        RigidKinematics {
            positions: head
                .iter()
                .map(|p| [p.position.x, p.position.y, p.position.z])
                .collect(),
            orientations: head
                .iter()
                .map(|p| {
                    let q = p.orientation.quaternion();
                    [q.w, q.i, q.j, q.k]
                })
                .collect(),
            net_forces: vec![[0.0; 3]; head.len()],
            net_torques: vec![[0.0; 3]; head.len()],
        }
    }

    fn walltime(&self) -> Duration {
        self.walltime
    }

    fn write_checkpoint(&mut self, path: &Path) -> Result<(), EngineError> {
        let payload = CheckpointPayload {
            timestep: self.timestep,
            configuration: &self.config,
        };
        let body = toml::to_string(&payload)
            .map_err(|e| EngineError::Backend(format!("checkpoint serialization: {}", e)))?;
        std::fs::write(path, body)?;
        self.history.push(EngineEvent::CheckpointWritten {
            path: path.to_path_buf(),
        });
        Ok(())
    }
}
