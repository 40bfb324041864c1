use super::{BOX_TOLERANCE, Simulation};
use crate::core::models::bounds::SimBox;
use crate::engine::config::{ConfigError, ShrinkConfig};
use crate::engine::error::ProtocolError;
use crate::engine::method::{IntegratorMethod, ParticleGroup, Setpoint};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::recorder::FrameStore;
use crate::engine::traits::MdEngine;
use tracing::{info, instrument};

impl<E: MdEngine, S: FrameStore> Simulation<E, S> {
    /// Shrinks the box to the configured target volume under a temperature
    /// ramp from `kt_init` to `kt_final`.
    ///
    /// The box follows a normalized [0, 1] resize ramp applied every
    /// `period` steps; active wall potentials are rebuilt after every resize
    /// tick because the geometry changed under them. Call this before
    /// [`quench`](Self::quench) or [`anneal`](Self::anneal) when the initial
    /// configuration is at a lower density than the target.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingParameter`] when no target box was set, before
    /// any engine state mutates. [`ProtocolError::BoxMismatch`] when the final
    /// box does not match the target — that is an engine/protocol
    /// desynchronization, not a user error, and is never retried.
    #[instrument(skip_all, name = "shrink_protocol")]
    pub fn shrink(
        &mut self,
        config: &ShrinkConfig,
        reporter: &ProgressReporter,
    ) -> Result<(), ProtocolError> {
        let target = self
            .target_box
            .ok_or(ConfigError::MissingParameter("target_box"))?;
        if config.period == 0 {
            return Err(ConfigError::MissingParameter("period").into());
        }
        if config.n_steps == 0 {
            return Err(ConfigError::MissingParameter("n_steps").into());
        }

        reporter.report(Progress::ProtocolStart { name: "Shrink" });
        info!(
            n_steps = config.n_steps,
            kt_init = config.kt_init,
            kt_final = config.kt_final,
            "starting shrink"
        );

        let result = self.shrink_body(config, &target, reporter);
        let checkpoint = self.write_restart();
        result?;
        checkpoint?;

        reporter.report(Progress::ProtocolFinish);
        Ok(())
    }

    fn shrink_body(
        &mut self,
        config: &ShrinkConfig,
        target: &SimBox,
        reporter: &ProgressReporter,
    ) -> Result<(), ProtocolError> {
        let t_start = self.engine_mut().timestep();
        let kt_ramp = Setpoint::Ramp {
            a: config.kt_init,
            b: config.kt_final,
            t_start,
            t_ramp: config.n_steps,
        };
        let tau = self.params().tau_kt;
        self.engine_mut().set_method(IntegratorMethod::Nvt {
            filter: ParticleGroup::All,
            kt: kt_ramp,
            tau,
        })?;
        self.engine_mut()
            .thermalize(&ParticleGroup::All, config.kt_init)?;

        let initial = self.engine_mut().bounds();
        let resize_ramp = Setpoint::Ramp {
            a: 0.0,
            b: 1.0,
            t_start,
            t_ramp: config.n_steps,
        };
        let end = t_start + config.n_steps;

        while self.engine_mut().timestep() < end {
            let chunk = config.period.min(end - self.engine_mut().timestep());
            self.engine_mut().run(chunk)?;

            let timestep = self.engine_mut().timestep();
            let fraction = resize_ramp.value_at(timestep);
            let resized = initial.lerp(target, fraction);
            self.engine_mut().set_bounds(resized)?;

            // Walls sit on the box faces, so every resize invalidates them.
            if let Some(manager) = self.wall_manager() {
                manager.refresh(self.engine_mut())?;
            }

            self.maybe_record()?;
            reporter.report(Progress::StepsCompleted {
                done: timestep - t_start,
                total: config.n_steps,
            });
        }

        let actual = self.engine_mut().bounds();
        if !actual.approx_eq(target, BOX_TOLERANCE) {
            return Err(ProtocolError::BoxMismatch {
                expected: *target,
                actual,
            });
        }
        info!(?actual, "shrink reached the target box");
        Ok(())
    }
}
