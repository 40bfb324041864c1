use super::{RunOutcome, Simulation};
use crate::engine::config::{ConfigError, QuenchConfig};
use crate::engine::error::ProtocolError;
use crate::engine::method::{IntegratorMethod, ParticleGroup, Setpoint};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::recorder::FrameStore;
use crate::engine::traits::MdEngine;
use tracing::{info, instrument};

impl<E: MdEngine, S: FrameStore> Simulation<E, S> {
    /// Runs at a single temperature in NVT, or a single temperature and
    /// pressure in NPT.
    ///
    /// The run proceeds in bounded chunks, polling the wall-clock budget
    /// between them; exhausting the budget stops early with
    /// [`RunOutcome::BudgetExhausted`], which is a normal outcome. A restart
    /// checkpoint is written on every exit path.
    ///
    /// # Errors
    ///
    /// [`ConfigError::WallsWithPressure`] when both a pressure and a wall axis
    /// are configured — boundary walls assume a fixed box, NPT fluctuates it.
    /// Validation happens before any engine call.
    #[instrument(skip_all, name = "quench_protocol")]
    pub fn quench(
        &mut self,
        config: &QuenchConfig,
        reporter: &ProgressReporter,
    ) -> Result<RunOutcome, ProtocolError> {
        let method = self.constant_setpoint_method(config.kt, config.pressure)?;

        reporter.report(Progress::ProtocolStart { name: "Quench" });
        info!(
            n_steps = config.n_steps,
            kt = config.kt,
            pressure = ?config.pressure,
            ensemble = method.name(),
            "starting quench"
        );

        let result = self.quench_body(config, method, reporter);
        let checkpoint = self.write_restart();
        let outcome = result?;
        checkpoint?;

        reporter.report(Progress::ProtocolFinish);
        Ok(outcome)
    }

    fn quench_body(
        &mut self,
        config: &QuenchConfig,
        method: IntegratorMethod,
        reporter: &ProgressReporter,
    ) -> Result<RunOutcome, ProtocolError> {
        self.engine_mut().set_method(method)?;
        self.engine_mut()
            .thermalize(&ParticleGroup::All, config.kt)?;
        self.run_chunked(config.n_steps, true, reporter)
    }

    /// Builds the constant-setpoint NVT or NPT method for quench and anneal
    /// stages, enforcing the walls/pressure exclusion first.
    pub(crate) fn constant_setpoint_method(
        &self,
        kt: f64,
        pressure: Option<f64>,
    ) -> Result<IntegratorMethod, ProtocolError> {
        if pressure.is_some() && self.params().wall_axis.is_some() {
            return Err(ConfigError::WallsWithPressure.into());
        }
        match pressure {
            Some(pressure) => {
                let tau_p = self
                    .params()
                    .tau_p
                    .ok_or(ConfigError::MissingParameter("tau_p"))?;
                Ok(IntegratorMethod::Npt {
                    filter: ParticleGroup::All,
                    kt: Setpoint::Constant(kt),
                    tau: self.params().tau_kt,
                    pressure,
                    tau_p,
                })
            }
            None => Ok(IntegratorMethod::Nvt {
                filter: ParticleGroup::All,
                kt: Setpoint::Constant(kt),
                tau: self.params().tau_kt,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bounds::{Axis, SimBox};
    use crate::core::models::configuration::ParticleConfiguration;
    use crate::core::models::particle::Particle;
    use crate::engine::config::{SimulationParams, SimulationParamsBuilder};
    use crate::engine::dryrun::{DryRunEngine, EngineEvent};
    use crate::engine::recorder::{MemoryFrameStore, TrajectoryWriter};
    use nalgebra::Point3;
    use std::time::Duration;

    fn engine() -> DryRunEngine {
        let mut config = ParticleConfiguration::new(SimBox::orthorhombic(10.0, 10.0, 10.0));
        let t = config.type_id("A");
        config
            .particles
            .push(Particle::new(t, 1.0, Point3::origin()));
        DryRunEngine::new(config)
    }

    fn params(name: &str) -> SimulationParamsBuilder {
        SimulationParamsBuilder::new()
            .checkpoint_path(std::env::temp_dir().join(format!("polymelt-{}.ckpt", name)))
    }

    fn simulation(p: SimulationParams) -> Simulation<DryRunEngine, MemoryFrameStore> {
        Simulation::new(engine(), p).unwrap()
    }

    #[test]
    fn quench_nvt_runs_to_completion() {
        let mut sim = simulation(params("quench-nvt").build());
        let outcome = sim
            .quench(&QuenchConfig::new(25_000, 2.0), &ProgressReporter::new())
            .unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(sim.engine().timestep(), 25_000);
        // 10k + 10k + 5k chunks.
        let runs: Vec<u64> = sim
            .engine()
            .history()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Ran { steps } => Some(*steps),
                _ => None,
            })
            .collect();
        assert_eq!(runs, vec![10_000, 10_000, 5_000]);
    }

    #[test]
    fn quench_with_pressure_selects_npt() {
        let mut sim = simulation(params("quench-npt").tau_p(0.5).build());
        sim.quench(
            &QuenchConfig::new(100, 2.0).with_pressure(0.1),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert_eq!(
            sim.engine().history()[0],
            EngineEvent::MethodSet { name: "NPT" }
        );
    }

    #[test]
    fn pressure_with_walls_fails_before_any_engine_call() {
        let mut sim = simulation(params("quench-walls").wall_axis(Axis::X).tau_p(0.5).build());
        let calls_before = sim.engine().history().len();
        let err = sim
            .quench(
                &QuenchConfig::new(100, 2.0).with_pressure(0.1),
                &ProgressReporter::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Config(ConfigError::WallsWithPressure)
        ));
        // Only the wall attachment from construction; nothing from quench.
        assert_eq!(sim.engine().history().len(), calls_before);
        assert_eq!(sim.engine().checkpoint_writes(), 0);
    }

    #[test]
    fn npt_without_tau_p_is_rejected() {
        let mut sim = simulation(params("quench-no-taup").build());
        let err = sim
            .quench(
                &QuenchConfig::new(100, 2.0).with_pressure(0.1),
                &ProgressReporter::new(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Config(ConfigError::MissingParameter("tau_p"))
        ));
    }

    #[test]
    fn budget_exhaustion_stops_early_and_still_checkpoints() {
        let e = engine().with_walltime_per_step(Duration::from_millis(1));
        let p = params("quench-budget")
            .wall_time_limit(Duration::from_secs(10))
            .build();
        let mut sim: Simulation<DryRunEngine, MemoryFrameStore> = Simulation::new(e, p).unwrap();
        let outcome = sim
            .quench(&QuenchConfig::new(100_000, 2.0), &ProgressReporter::new())
            .unwrap();
        assert_eq!(
            outcome,
            RunOutcome::BudgetExhausted {
                completed_steps: 10_000
            }
        );
        assert_eq!(sim.engine().checkpoint_writes(), 1);
    }

    #[test]
    fn quench_checkpoints_exactly_once_on_success() {
        let mut sim = simulation(params("quench-ckpt").build());
        sim.quench(&QuenchConfig::new(500, 1.0), &ProgressReporter::new())
            .unwrap();
        assert_eq!(sim.engine().checkpoint_writes(), 1);
    }

    /// Delegates to a dry-run engine but fails every `run` call once the
    /// timestep passes a threshold, to exercise the mid-run failure path.
    struct FailingEngine {
        inner: DryRunEngine,
        fail_after: u64,
    }

    impl crate::engine::traits::MdEngine for FailingEngine {
        fn timestep(&self) -> u64 {
            self.inner.timestep()
        }
        fn bounds(&self) -> SimBox {
            self.inner.bounds()
        }
        fn set_bounds(&mut self, bounds: SimBox) -> Result<(), crate::engine::error::EngineError> {
            self.inner.set_bounds(bounds)
        }
        fn snapshot(&self) -> ParticleConfiguration {
            self.inner.snapshot()
        }
        fn set_snapshot(
            &mut self,
            config: ParticleConfiguration,
        ) -> Result<(), crate::engine::error::EngineError> {
            self.inner.set_snapshot(config)
        }
        fn run(&mut self, steps: u64) -> Result<(), crate::engine::error::EngineError> {
            if self.inner.timestep() >= self.fail_after {
                return Err(crate::engine::error::EngineError::Backend(
                    "particles flew apart".to_string(),
                ));
            }
            self.inner.run(steps)
        }
        fn set_method(
            &mut self,
            method: crate::engine::method::IntegratorMethod,
        ) -> Result<(), crate::engine::error::EngineError> {
            self.inner.set_method(method)
        }
        fn thermalize(
            &mut self,
            group: &ParticleGroup,
            kt: f64,
        ) -> Result<(), crate::engine::error::EngineError> {
            self.inner.thermalize(group, kt)
        }
        fn attach_walls(
            &mut self,
            walls: crate::engine::walls::WallPair,
        ) -> Result<(), crate::engine::error::EngineError> {
            self.inner.attach_walls(walls)
        }
        fn detach_walls(
            &mut self,
        ) -> Result<Option<crate::engine::walls::WallPair>, crate::engine::error::EngineError>
        {
            self.inner.detach_walls()
        }
        fn rigid_kinematics(&self, n: usize) -> crate::engine::traits::RigidKinematics {
            self.inner.rigid_kinematics(n)
        }
        fn walltime(&self) -> Duration {
            self.inner.walltime()
        }
        fn write_checkpoint(
            &mut self,
            path: &std::path::Path,
        ) -> Result<(), crate::engine::error::EngineError> {
            self.inner.write_checkpoint(path)
        }
    }

    #[test]
    fn a_mid_run_failure_still_writes_the_checkpoint() {
        let failing = FailingEngine {
            inner: engine(),
            fail_after: 10_000,
        };
        let p = params("quench-fail").build();
        let mut sim: Simulation<FailingEngine, MemoryFrameStore> =
            Simulation::new(failing, p).unwrap();
        let err = sim
            .quench(&QuenchConfig::new(50_000, 2.0), &ProgressReporter::new())
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Engine(_)));
        assert_eq!(sim.engine().inner.checkpoint_writes(), 1);
    }

    #[test]
    fn recorder_observes_frames_during_the_run() {
        let mut sim = simulation(params("quench-recorder").build());
        let writer = TrajectoryWriter::open(MemoryFrameStore::new(), 1).unwrap();
        sim.attach_recorder(writer, 10_000);
        sim.quench(&QuenchConfig::new(30_000, 2.0), &ProgressReporter::new())
            .unwrap();
        let store = sim.detach_recorder().unwrap().close();
        assert_eq!(store.frame_keys(), vec![1, 2, 3]);
        assert_eq!(store.frames()[&1].timestep, 10_000);
        assert_eq!(store.frames()[&3].timestep, 30_000);
    }
}
