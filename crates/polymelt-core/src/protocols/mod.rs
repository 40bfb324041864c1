//! # Protocols Module
//!
//! This module is the public API of polymelt: the staged simulation protocols
//! that drive an MD engine through a polymer workflow.
//!
//! ## Overview
//!
//! A [`Simulation`] is built once around an engine backend and then driven
//! through explicit protocol invocations — the protocols never chain
//! automatically, and exactly one is active at a time:
//!
//! - **Shrink** ([`shrink`]) - Compress the box to a target volume under a
//!   temperature ramp, rebuilding wall potentials as the geometry changes
//! - **Quench** ([`quench`]) - Constant-setpoint NVT or NPT run with a
//!   wall-clock budget
//! - **Anneal** ([`anneal`]) - An ordered multi-stage temperature schedule
//! - **Tensile** ([`tensile`]) - Strain the box along one axis with fixed
//!   boundary slabs and a free interior
//!
//! ## Key Capabilities
//!
//! - **Chunked execution** with an advisory wall-clock budget polled between
//!   chunks; an in-flight chunk always completes, and an early stop is a
//!   normal, reported outcome
//! - **Unconditional checkpointing** on every protocol exit path — normal
//!   completion, early stop, or propagated failure — so a restart can always
//!   resume from the last persisted state
//! - **Trajectory observation** of rigid-body kinematics at a fixed cadence
//! - **Progress reporting** through the callback reporter

pub mod anneal;
pub mod quench;
pub mod shrink;
pub mod tensile;

use crate::core::models::bounds::SimBox;
use crate::engine::config::SimulationParams;
use crate::engine::error::ProtocolError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::recorder::{FrameStore, MemoryFrameStore, TrajectoryWriter};
use crate::engine::traits::MdEngine;
use crate::engine::walls::WallPotentialManager;
use tracing::info;

/// Steps integrated per chunk between budget/recorder polls.
///
/// This is the cancellation resolution: a chunk in flight always completes
/// before the wall-clock budget is consulted.
pub const RUN_CHUNK: u64 = 10_000;

/// Component-wise tolerance used to validate the post-shrink box.
pub(crate) const BOX_TOLERANCE: f64 = 1e-9;

/// How a bounded protocol run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All requested steps were integrated.
    Completed,
    /// The wall-clock budget ran out between chunks; the run stopped early
    /// after `completed_steps` of the requested steps.
    BudgetExhausted { completed_steps: u64 },
}

struct RecorderSlot<S: FrameStore> {
    writer: TrajectoryWriter<S>,
    period: u64,
    last_record: Option<u64>,
}

/// The staged-protocol driver: one simulated system plus its engine backend.
///
/// Owns the engine exclusively; all state mutation flows through protocol
/// invocations on a single thread.
pub struct Simulation<E: MdEngine, S: FrameStore = MemoryFrameStore> {
    engine: E,
    params: SimulationParams,
    target_box: Option<SimBox>,
    wall_manager: Option<WallPotentialManager>,
    recorder: Option<RecorderSlot<S>>,
}

impl<E: MdEngine, S: FrameStore> Simulation<E, S> {
    /// Wraps `engine` with the given parameters.
    ///
    /// When a wall axis is configured, the initial wall pair is built from the
    /// engine's current box and attached immediately.
    pub fn new(engine: E, params: SimulationParams) -> Result<Self, ProtocolError> {
        let mut sim = Self {
            engine,
            params,
            target_box: None,
            wall_manager: None,
            recorder: None,
        };
        if let Some(axis) = sim.params.wall_axis {
            let manager = WallPotentialManager::new(axis);
            let pair = manager.build(&sim.engine.bounds());
            sim.engine.attach_walls(pair).map_err(ProtocolError::from)?;
            sim.wall_manager = Some(manager);
            info!(%axis, "attached initial wall pair");
        }
        Ok(sim)
    }

    /// Sets the box the shrink protocol compresses toward.
    pub fn set_target_box(&mut self, target: SimBox) {
        self.target_box = Some(target);
    }

    /// Sets the shrink target box, builder style.
    pub fn with_target_box(mut self, target: SimBox) -> Self {
        self.set_target_box(target);
        self
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Starts observing rigid-body kinematics every `period` steps.
    ///
    /// Cadence is resolved at chunk boundaries: a frame lands on the first
    /// chunk boundary at or past each period mark.
    pub fn attach_recorder(&mut self, writer: TrajectoryWriter<S>, period: u64) {
        self.recorder = Some(RecorderSlot {
            writer,
            period: period.max(1),
            last_record: None,
        });
    }

    /// Stops recording and hands the writer back, still open.
    pub fn detach_recorder(&mut self) -> Option<TrajectoryWriter<S>> {
        self.recorder.take().map(|slot| slot.writer)
    }

    pub(crate) fn wall_manager(&self) -> Option<WallPotentialManager> {
        self.wall_manager
    }

    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Records a frame if the recording period has elapsed.
    pub(crate) fn maybe_record(&mut self) -> Result<(), ProtocolError> {
        let Some(slot) = self.recorder.as_mut() else {
            return Ok(());
        };
        let timestep = self.engine.timestep();
        let due = match slot.last_record {
            None => true,
            Some(last) => timestep >= last + slot.period,
        };
        if due {
            let kinematics = self.engine.rigid_kinematics(slot.writer.n_rigid());
            slot.writer.record(timestep, kinematics)?;
            slot.last_record = Some(timestep);
        }
        Ok(())
    }

    /// Whether the advisory wall-clock budget has run out.
    pub(crate) fn budget_exhausted(&self) -> bool {
        match self.params.wall_time_limit {
            Some(limit) => self.engine.walltime() >= limit,
            None => false,
        }
    }

    /// Writes the restart checkpoint to the configured path.
    ///
    /// Called unconditionally on every protocol exit path.
    pub(crate) fn write_restart(&mut self) -> Result<(), ProtocolError> {
        let path = self.params.checkpoint_path.clone();
        self.engine.write_checkpoint(&path)?;
        info!(path = %path.display(), "wrote restart checkpoint");
        Ok(())
    }

    /// Integrates `n_steps` in bounded chunks, polling the recorder and
    /// (optionally) the wall-clock budget between chunks.
    pub(crate) fn run_chunked(
        &mut self,
        n_steps: u64,
        enforce_budget: bool,
        reporter: &ProgressReporter,
    ) -> Result<RunOutcome, ProtocolError> {
        let end = self.engine.timestep() + n_steps;
        let mut completed = 0;
        while self.engine.timestep() < end {
            let chunk = RUN_CHUNK.min(end - self.engine.timestep());
            self.engine.run(chunk)?;
            completed += chunk;
            reporter.report(Progress::StepsCompleted {
                done: completed,
                total: n_steps,
            });
            self.maybe_record()?;
            if enforce_budget && self.budget_exhausted() {
                info!(
                    completed,
                    requested = n_steps,
                    "wall-clock budget exhausted; stopping early"
                );
                reporter.report(Progress::Message(format!(
                    "Wall-time budget exhausted after {} of {} steps.",
                    completed, n_steps
                )));
                return Ok(RunOutcome::BudgetExhausted {
                    completed_steps: completed,
                });
            }
        }
        Ok(RunOutcome::Completed)
    }
}
