use crate::core::models::bounds::Axis;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Wall potentials can only be used with the NVT ensemble; unset pressure or the wall axis")]
    WallsWithPressure,

    #[error("Annealing schedule has no stages")]
    EmptySchedule,
}

/// Simulation-wide parameters, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationParams {
    /// Integration timestep size, in reduced time units.
    pub dt: f64,
    /// Thermostat coupling period.
    pub tau_kt: f64,
    /// Barostat coupling period; required before any NPT run.
    pub tau_p: Option<f64>,
    /// Pair-potential cutoff radius.
    pub r_cut: f64,
    /// Seed forwarded to the engine for velocity randomization.
    pub seed: u64,
    /// Axis the confinement walls are normal to, when walls are wanted.
    pub wall_axis: Option<Axis>,
    /// Advisory wall-clock budget; polled between run chunks.
    pub wall_time_limit: Option<Duration>,
    /// Where restart checkpoints are written.
    pub checkpoint_path: PathBuf,
}

/// Builder with the conventional defaults for polymer melt runs.
#[derive(Debug, Clone)]
pub struct SimulationParamsBuilder {
    dt: f64,
    tau_kt: f64,
    tau_p: Option<f64>,
    r_cut: f64,
    seed: u64,
    wall_axis: Option<Axis>,
    wall_time_limit: Option<Duration>,
    checkpoint_path: PathBuf,
}

impl Default for SimulationParamsBuilder {
    fn default() -> Self {
        Self {
            dt: 0.0003,
            tau_kt: 0.1,
            tau_p: None,
            r_cut: 2.5,
            seed: 42,
            wall_axis: None,
            wall_time_limit: None,
            checkpoint_path: PathBuf::from("restart.ckpt"),
        }
    }
}

impl SimulationParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }
    pub fn tau_kt(mut self, tau: f64) -> Self {
        self.tau_kt = tau;
        self
    }
    pub fn tau_p(mut self, tau: f64) -> Self {
        self.tau_p = Some(tau);
        self
    }
    pub fn r_cut(mut self, r_cut: f64) -> Self {
        self.r_cut = r_cut;
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
    pub fn wall_axis(mut self, axis: Axis) -> Self {
        self.wall_axis = Some(axis);
        self
    }
    pub fn wall_time_limit(mut self, limit: Duration) -> Self {
        self.wall_time_limit = Some(limit);
        self
    }
    pub fn checkpoint_path(mut self, path: PathBuf) -> Self {
        self.checkpoint_path = path;
        self
    }

    pub fn build(self) -> SimulationParams {
        SimulationParams {
            dt: self.dt,
            tau_kt: self.tau_kt,
            tau_p: self.tau_p,
            r_cut: self.r_cut,
            seed: self.seed,
            wall_axis: self.wall_axis,
            wall_time_limit: self.wall_time_limit,
            checkpoint_path: self.checkpoint_path,
        }
    }
}

/// Parameters for the volume-shrinking protocol.
#[derive(Debug, Clone, PartialEq)]
pub struct ShrinkConfig {
    pub n_steps: u64,
    pub kt_init: f64,
    pub kt_final: f64,
    /// Steps between box-resize ticks.
    pub period: u64,
}

impl ShrinkConfig {
    pub fn new(n_steps: u64, kt_init: f64, kt_final: f64) -> Self {
        Self {
            n_steps,
            kt_init,
            kt_final,
            period: 10,
        }
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period;
        self
    }
}

/// Parameters for a constant-setpoint quench run.
#[derive(Debug, Clone, PartialEq)]
pub struct QuenchConfig {
    pub n_steps: u64,
    pub kt: f64,
    /// NPT when set, NVT otherwise.
    pub pressure: Option<f64>,
}

impl QuenchConfig {
    pub fn new(n_steps: u64, kt: f64) -> Self {
        Self {
            n_steps,
            kt,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

/// One annealing stage: hold `kt` for `steps` integration steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealStage {
    pub kt: f64,
    pub steps: u64,
}

/// An ordered sequence of annealing stages.
///
/// Stages execute in insertion order and duplicate setpoints are preserved; the
/// schedule is deliberately not keyed by temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealSchedule {
    stages: Vec<AnnealStage>,
}

impl AnnealSchedule {
    /// Builds a schedule from explicit stages.
    pub fn from_stages(stages: Vec<AnnealStage>) -> Result<Self, ConfigError> {
        if stages.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        Ok(Self { stages })
    }

    /// Builds a schedule by linear interpolation from `kt_init` to `kt_final`
    /// across `step_sequence`, with each sampled setpoint rounded to one
    /// decimal.
    pub fn linear(kt_init: f64, kt_final: f64, step_sequence: &[u64]) -> Result<Self, ConfigError> {
        if step_sequence.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        let n = step_sequence.len();
        let stages = step_sequence
            .iter()
            .enumerate()
            .map(|(i, &steps)| {
                let kt = if n == 1 {
                    kt_init
                } else {
                    kt_init + (kt_final - kt_init) * i as f64 / (n - 1) as f64
                };
                AnnealStage {
                    kt: (kt * 10.0).round() / 10.0,
                    steps,
                }
            })
            .collect();
        Ok(Self { stages })
    }

    pub fn stages(&self) -> &[AnnealStage] {
        &self.stages
    }

    /// Total steps across all stages.
    pub fn total_steps(&self) -> u64 {
        self.stages.iter().map(|s| s.steps).sum()
    }
}

/// Parameters for a multi-stage anneal.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealConfig {
    pub schedule: AnnealSchedule,
    /// NPT when set, NVT otherwise.
    pub pressure: Option<f64>,
}

impl AnnealConfig {
    pub fn new(schedule: AnnealSchedule) -> Self {
        Self {
            schedule,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = Some(pressure);
        self
    }
}

/// Parameters for a tensile test.
///
/// `fix_ratio` is the fraction of the initial axis length held fixed in total;
/// half of it is clamped on each side of the box.
#[derive(Debug, Clone, PartialEq)]
pub struct TensileConfig {
    pub kt: f64,
    /// Target strain as a fraction of the initial axis length.
    pub strain: f64,
    pub n_steps: u64,
    /// Steps between box-expansion ticks.
    pub expand_period: u64,
    pub axis: Axis,
    pub fix_ratio: f64,
}

impl TensileConfig {
    pub fn new(kt: f64, strain: f64, n_steps: u64, expand_period: u64) -> Self {
        Self {
            kt,
            strain,
            n_steps,
            expand_period,
            axis: Axis::X,
            fix_ratio: 0.05,
        }
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_fix_ratio(mut self, fix_ratio: f64) -> Self {
        self.fix_ratio = fix_ratio;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_conventions() {
        let p = SimulationParamsBuilder::new().build();
        assert_eq!(p.dt, 0.0003);
        assert_eq!(p.tau_kt, 0.1);
        assert_eq!(p.tau_p, None);
        assert_eq!(p.r_cut, 2.5);
        assert_eq!(p.seed, 42);
        assert_eq!(p.wall_axis, None);
        assert_eq!(p.wall_time_limit, None);
        assert_eq!(p.checkpoint_path, PathBuf::from("restart.ckpt"));
    }

    #[test]
    fn builder_overrides_stick() {
        let p = SimulationParamsBuilder::new()
            .dt(0.001)
            .tau_p(0.5)
            .wall_axis(Axis::Y)
            .wall_time_limit(Duration::from_secs(60))
            .build();
        assert_eq!(p.dt, 0.001);
        assert_eq!(p.tau_p, Some(0.5));
        assert_eq!(p.wall_axis, Some(Axis::Y));
        assert_eq!(p.wall_time_limit, Some(Duration::from_secs(60)));
    }

    #[test]
    fn linear_schedule_interpolates_and_rounds() {
        let s = AnnealSchedule::linear(4.0, 2.0, &[100, 200, 300]).unwrap();
        let stages = s.stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0], AnnealStage { kt: 4.0, steps: 100 });
        assert_eq!(stages[1], AnnealStage { kt: 3.0, steps: 200 });
        assert_eq!(stages[2], AnnealStage { kt: 2.0, steps: 300 });
    }

    #[test]
    fn linear_schedule_rounds_to_one_decimal() {
        let s = AnnealSchedule::linear(1.0, 2.0, &[10, 10, 10]).unwrap();
        assert_eq!(s.stages()[1].kt, 1.5);
        let s = AnnealSchedule::linear(1.0, 1.23, &[10, 10]).unwrap();
        assert_eq!(s.stages()[1].kt, 1.2);
    }

    #[test]
    fn linear_schedule_preserves_duplicate_rounded_setpoints() {
        // Sampled setpoints 2.0, 1.96, 1.92 round to 2.0, 2.0, 1.9; all three
        // stages must survive, in order.
        let s = AnnealSchedule::linear(2.0, 1.92, &[50, 60, 70]).unwrap();
        let stages = s.stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].kt, 2.0);
        assert_eq!(stages[1].kt, 2.0);
        assert_eq!(stages[2].kt, 1.9);
        assert_eq!(s.total_steps(), 180);
    }

    #[test]
    fn single_entry_schedule_uses_initial_temperature() {
        let s = AnnealSchedule::linear(3.0, 1.0, &[500]).unwrap();
        assert_eq!(s.stages(), &[AnnealStage { kt: 3.0, steps: 500 }]);
    }

    #[test]
    fn empty_schedules_are_rejected() {
        assert_eq!(
            AnnealSchedule::linear(3.0, 1.0, &[]).unwrap_err(),
            ConfigError::EmptySchedule
        );
        assert_eq!(
            AnnealSchedule::from_stages(vec![]).unwrap_err(),
            ConfigError::EmptySchedule
        );
    }

    #[test]
    fn tensile_defaults_follow_convention() {
        let t = TensileConfig::new(2.0, 0.25, 1_000, 10);
        assert_eq!(t.axis, Axis::X);
        assert_eq!(t.fix_ratio, 0.05);
    }
}
