use super::{RunOutcome, Simulation};
use crate::engine::config::AnnealConfig;
use crate::engine::error::ProtocolError;
use crate::engine::method::ParticleGroup;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::recorder::FrameStore;
use crate::engine::traits::MdEngine;
use tracing::{info, instrument};

impl<E: MdEngine, S: FrameStore> Simulation<E, S> {
    /// Runs a series of temperature stages in NVT, or NPT at a single
    /// pressure.
    ///
    /// Stages execute strictly in schedule order. Each stage installs its
    /// setpoint, re-randomizes particle velocities at the new temperature, and
    /// integrates its step count. One restart checkpoint is written at the end
    /// of the whole schedule, on every exit path — not per stage.
    ///
    /// # Errors
    ///
    /// [`crate::engine::config::ConfigError::WallsWithPressure`] under the same
    /// walls/pressure exclusion as [`quench`](Self::quench), raised before any
    /// engine call.
    #[instrument(skip_all, name = "anneal_protocol")]
    pub fn anneal(
        &mut self,
        config: &AnnealConfig,
        reporter: &ProgressReporter,
    ) -> Result<(), ProtocolError> {
        // Validate the ensemble choice against the first stage before touching
        // the engine; the per-stage methods below reuse the same check.
        let first = config.schedule.stages()[0];
        self.constant_setpoint_method(first.kt, config.pressure)?;

        reporter.report(Progress::ProtocolStart { name: "Anneal" });
        info!(
            stages = config.schedule.stages().len(),
            total_steps = config.schedule.total_steps(),
            pressure = ?config.pressure,
            "starting anneal"
        );

        let result = self.anneal_body(config, reporter);
        let checkpoint = self.write_restart();
        result?;
        checkpoint?;

        reporter.report(Progress::ProtocolFinish);
        Ok(())
    }

    fn anneal_body(
        &mut self,
        config: &AnnealConfig,
        reporter: &ProgressReporter,
    ) -> Result<(), ProtocolError> {
        for stage in config.schedule.stages() {
            reporter.report(Progress::StageStart {
                label: format!("kT {:.1} for {} steps", stage.kt, stage.steps),
            });
            info!(kt = stage.kt, steps = stage.steps, "anneal stage");

            let method = self.constant_setpoint_method(stage.kt, config.pressure)?;
            self.engine_mut().set_method(method)?;
            self.engine_mut()
                .thermalize(&ParticleGroup::All, stage.kt)?;

            let outcome = self.run_chunked(stage.steps, false, reporter)?;
            debug_assert_eq!(outcome, RunOutcome::Completed);
        }
        Ok(())
    }
}
