use super::error::EngineError;
use super::method::{IntegratorMethod, ParticleGroup};
use super::walls::WallPair;
use crate::core::models::bounds::SimBox;
use crate::core::models::configuration::ParticleConfiguration;
use std::path::Path;
use std::time::Duration;

/// Kinematic state of the leading rigid-body slots, as captured for trajectory
/// frames: positions, orientations, net forces, and net torques, index-aligned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RigidKinematics {
    pub positions: Vec<[f64; 3]>,
    pub orientations: Vec<[f64; 4]>,
    pub net_forces: Vec<[f64; 3]>,
    pub net_torques: Vec<[f64; 3]>,
}

impl RigidKinematics {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// The narrow seam to the external MD engine.
///
/// Everything the protocol layer requires of a backend: state access, chunked
/// integration, method swapping, velocity re-randomization, wall-pair
/// attachment, and checkpoint writing. Force evaluation, neighbor lists, and
/// parallel dispatch are entirely the backend's business and never surface
/// here. Implementations are driven from a single thread.
pub trait MdEngine {
    /// Current integration step counter.
    fn timestep(&self) -> u64;

    /// Current simulation box.
    fn bounds(&self) -> SimBox;

    /// Replaces the simulation box, rescaling backend state as needed.
    fn set_bounds(&mut self, bounds: SimBox) -> Result<(), EngineError>;

    /// Captures the current particle configuration.
    fn snapshot(&self) -> ParticleConfiguration;

    /// Replaces the particle configuration wholesale.
    fn set_snapshot(&mut self, config: ParticleConfiguration) -> Result<(), EngineError>;

    /// Integrates `steps` further steps with the active method.
    fn run(&mut self, steps: u64) -> Result<(), EngineError>;

    /// Installs `method` as the single active integrator method.
    fn set_method(&mut self, method: IntegratorMethod) -> Result<(), EngineError>;

    /// Re-randomizes the velocities of `group` at temperature `kt`.
    fn thermalize(&mut self, group: &ParticleGroup, kt: f64) -> Result<(), EngineError>;

    /// Attaches a wall pair to the active force list.
    fn attach_walls(&mut self, walls: WallPair) -> Result<(), EngineError>;

    /// Detaches the active wall pair, returning it if one was attached.
    fn detach_walls(&mut self) -> Result<Option<WallPair>, EngineError>;

    /// Kinematics of the first `n` particles in the current ordering.
    fn rigid_kinematics(&self, n: usize) -> RigidKinematics;

    /// Wall-clock time this engine has spent integrating.
    fn walltime(&self) -> Duration;

    /// Writes a full-state restart snapshot to `path`.
    fn write_checkpoint(&mut self, path: &Path) -> Result<(), EngineError>;
}
