use super::{RunOutcome, Simulation};
use crate::core::models::bounds::Axis;
use crate::core::models::configuration::ParticleConfiguration;
use crate::engine::config::{ConfigError, TensileConfig};
use crate::engine::error::ProtocolError;
use crate::engine::method::{IntegratorMethod, ParticleGroup, Setpoint};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::recorder::FrameStore;
use crate::engine::traits::MdEngine;
use tracing::{info, instrument};

/// The three disjoint particle groups of a tensile test.
///
/// `left`, `right`, and `free` cover every particle index exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensilePartition {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
    pub free: Vec<usize>,
}

/// Partitions particles along `axis` into boundary slabs and the free middle.
///
/// `fix_ratio` is the total fixed fraction of the axis length; half of it is
/// clamped on each side, so with a box of length L the slabs are
/// `coordinate < -L/2 + (fix_ratio/2)·L` and the mirror image.
pub fn partition_along_axis(
    config: &ParticleConfiguration,
    axis: Axis,
    fix_ratio: f64,
) -> TensilePartition {
    let length = config.bounds.length(axis);
    let box_max = length / 2.0;
    let box_min = -box_max;
    let fix_length = length * fix_ratio / 2.0;

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut free = Vec::new();
    for (i, particle) in config.particles.iter().enumerate() {
        let coordinate = particle.position[axis.index()];
        if coordinate < box_min + fix_length {
            left.push(i);
        } else if coordinate > box_max - fix_length {
            right.push(i);
        } else {
            free.push(i);
        }
    }
    TensilePartition { left, right, free }
}

impl<E: MdEngine, S: FrameStore> Simulation<E, S> {
    /// Performs a tensile test: strains the box along one axis while two
    /// boundary slabs of particles ride outward with the walls of the box and
    /// only the middle region integrates.
    ///
    /// The free group runs non-thermostatted (NVE) after a single
    /// thermalization at `kt`. Every `expand_period` steps the axis length
    /// ramps toward `initial · (1 + strain)` and each fixed slab translates by
    /// half the length change, keeping it centered on its moving boundary. The
    /// loop honors the wall-clock budget between ticks; a restart checkpoint
    /// is written on every exit path.
    #[instrument(skip_all, name = "tensile_protocol")]
    pub fn tensile(
        &mut self,
        config: &TensileConfig,
        reporter: &ProgressReporter,
    ) -> Result<RunOutcome, ProtocolError> {
        if config.expand_period == 0 {
            return Err(ConfigError::MissingParameter("expand_period").into());
        }

        reporter.report(Progress::ProtocolStart { name: "Tensile" });
        info!(
            kt = config.kt,
            strain = config.strain,
            n_steps = config.n_steps,
            axis = %config.axis,
            "starting tensile test"
        );

        let result = self.tensile_body(config, reporter);
        let checkpoint = self.write_restart();
        let outcome = result?;
        checkpoint?;

        reporter.report(Progress::ProtocolFinish);
        Ok(outcome)
    }

    fn tensile_body(
        &mut self,
        config: &TensileConfig,
        reporter: &ProgressReporter,
    ) -> Result<RunOutcome, ProtocolError> {
        let axis = config.axis;
        let init_box = self.engine_mut().bounds();
        let init_length = init_box.length(axis);
        let target_length = init_length * (1.0 + config.strain);
        let mut target_box = init_box;
        target_box.set_length(axis, target_length);

        let partition = partition_along_axis(&self.engine_mut().snapshot(), axis, config.fix_ratio);
        info!(
            left = partition.left.len(),
            right = partition.right.len(),
            free = partition.free.len(),
            "fixed boundary slabs selected"
        );

        let free_group = ParticleGroup::Tags(partition.free.clone());
        self.engine_mut()
            .set_method(IntegratorMethod::Nve {
                filter: free_group.clone(),
            })?;
        self.engine_mut().thermalize(&free_group, config.kt)?;

        let t_start = self.engine_mut().timestep();
        let end = t_start + config.n_steps;
        let ramp = Setpoint::Ramp {
            a: 0.0,
            b: 1.0,
            t_start,
            t_ramp: config.n_steps,
        };
        let shift = axis.unit_vector();
        let mut last_length = init_length;
        let mut completed = 0;

        while self.engine_mut().timestep() < end {
            let chunk = config.expand_period.min(end - self.engine_mut().timestep());
            self.engine_mut().run(chunk)?;
            completed += chunk;

            let fraction = ramp.value_at(self.engine_mut().timestep());
            let resized = init_box.lerp(&target_box, fraction);
            self.engine_mut().set_bounds(resized)?;

            let current_length = resized.length(axis);
            let delta = current_length - last_length;
            if delta != 0.0 {
                let mut snap = self.engine_mut().snapshot();
                for &i in &partition.left {
                    snap.particles[i].position -= shift * (delta / 2.0);
                }
                for &i in &partition.right {
                    snap.particles[i].position += shift * (delta / 2.0);
                }
                self.engine_mut().set_snapshot(snap)?;
            }
            last_length = current_length;

            self.maybe_record()?;
            reporter.report(Progress::StepsCompleted {
                done: completed,
                total: config.n_steps,
            });
            if self.budget_exhausted() {
                info!(completed, "wall-clock budget exhausted during tensile test");
                return Ok(RunOutcome::BudgetExhausted {
                    completed_steps: completed,
                });
            }
        }
        Ok(RunOutcome::Completed)
    }
}
