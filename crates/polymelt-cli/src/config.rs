use crate::error::{CliError, Result};
use polymelt::core::models::bounds::Axis;
use polymelt::engine::config::{
    AnnealConfig, AnnealSchedule, AnnealStage, QuenchConfig, ShrinkConfig, SimulationParams,
    SimulationParamsBuilder, TensileConfig,
};
use polymelt::engine::error::ProtocolError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// A parsed protocol file: the system to fabricate, simulation-wide
/// parameters, and the ordered list of stages to execute.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProtocolFile {
    pub system: SystemSpec,
    #[serde(default)]
    pub simulation: SimulationSpec,
    #[serde(default, rename = "stage")]
    pub stages: Vec<StageSpec>,
    pub trajectory: Option<TrajectorySpec>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SystemSpec {
    /// Box edge lengths, in reduced units.
    #[serde(rename = "box")]
    pub bounds: [f64; 3],
    /// Number of particles to scatter through the box.
    pub particles: usize,
    /// Seed for the scatter.
    #[serde(default = "default_system_seed")]
    pub seed: u64,
}

fn default_system_seed() -> u64 {
    7
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct SimulationSpec {
    pub dt: Option<f64>,
    pub tau_kt: Option<f64>,
    pub tau_p: Option<f64>,
    pub r_cut: Option<f64>,
    pub seed: Option<u64>,
    pub wall_axis: Option<String>,
    pub wall_time_limit_secs: Option<u64>,
    pub checkpoint: Option<PathBuf>,
    pub target_box: Option<[f64; 3]>,
}

impl SimulationSpec {
    pub fn to_params(&self) -> Result<SimulationParams> {
        let mut builder = SimulationParamsBuilder::new();
        if let Some(dt) = self.dt {
            builder = builder.dt(dt);
        }
        if let Some(tau) = self.tau_kt {
            builder = builder.tau_kt(tau);
        }
        if let Some(tau) = self.tau_p {
            builder = builder.tau_p(tau);
        }
        if let Some(r_cut) = self.r_cut {
            builder = builder.r_cut(r_cut);
        }
        if let Some(seed) = self.seed {
            builder = builder.seed(seed);
        }
        if let Some(axis) = &self.wall_axis {
            let axis: Axis = axis
                .parse()
                .map_err(|_| CliError::Config(format!("unknown wall axis '{}'", axis)))?;
            builder = builder.wall_axis(axis);
        }
        if let Some(secs) = self.wall_time_limit_secs {
            builder = builder.wall_time_limit(Duration::from_secs(secs));
        }
        if let Some(path) = &self.checkpoint {
            builder = builder.checkpoint_path(path.clone());
        }
        Ok(builder.build())
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TrajectorySpec {
    /// Steps between recorded frames.
    pub period: u64,
    /// Number of leading rigid-body slots to capture per frame.
    pub n_rigid: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AnnealStageSpec {
    pub kt: f64,
    pub steps: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StageSpec {
    Shrink {
        n_steps: u64,
        kt_init: f64,
        kt_final: f64,
        #[serde(default = "default_shrink_period")]
        period: u64,
    },
    Quench {
        n_steps: u64,
        kt: f64,
        pressure: Option<f64>,
    },
    Anneal {
        kt_init: Option<f64>,
        kt_final: Option<f64>,
        step_sequence: Option<Vec<u64>>,
        stages: Option<Vec<AnnealStageSpec>>,
        pressure: Option<f64>,
    },
    Tensile {
        kt: f64,
        strain: f64,
        n_steps: u64,
        expand_period: u64,
        axis: Option<String>,
        fix_ratio: Option<f64>,
    },
}

fn default_shrink_period() -> u64 {
    10
}

/// A stage converted to its core configuration record.
#[derive(Debug, Clone)]
pub enum Stage {
    Shrink(ShrinkConfig),
    Quench(QuenchConfig),
    Anneal(AnnealConfig),
    Tensile(TensileConfig),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Shrink(_) => "shrink",
            Stage::Quench(_) => "quench",
            Stage::Anneal(_) => "anneal",
            Stage::Tensile(_) => "tensile",
        }
    }
}

impl StageSpec {
    pub fn to_stage(&self) -> Result<Stage> {
        match self {
            StageSpec::Shrink {
                n_steps,
                kt_init,
                kt_final,
                period,
            } => Ok(Stage::Shrink(
                ShrinkConfig::new(*n_steps, *kt_init, *kt_final).with_period(*period),
            )),
            StageSpec::Quench {
                n_steps,
                kt,
                pressure,
            } => {
                let mut config = QuenchConfig::new(*n_steps, *kt);
                if let Some(p) = pressure {
                    config = config.with_pressure(*p);
                }
                Ok(Stage::Quench(config))
            }
            StageSpec::Anneal {
                kt_init,
                kt_final,
                step_sequence,
                stages,
                pressure,
            } => {
                let schedule = match (stages, kt_init, kt_final, step_sequence) {
                    (Some(stages), None, None, None) => AnnealSchedule::from_stages(
                        stages
                            .iter()
                            .map(|s| AnnealStage {
                                kt: s.kt,
                                steps: s.steps,
                            })
                            .collect(),
                    )
                    .map_err(ProtocolError::from)?,
                    (None, Some(kt_init), Some(kt_final), Some(sequence)) => {
                        AnnealSchedule::linear(*kt_init, *kt_final, sequence)
                            .map_err(ProtocolError::from)?
                    }
                    _ => {
                        return Err(CliError::Config(
                            "anneal stage needs either explicit `stages` or all of \
                             `kt_init`, `kt_final`, and `step_sequence`"
                                .to_string(),
                        ));
                    }
                };
                let mut config = AnnealConfig::new(schedule);
                if let Some(p) = pressure {
                    config = config.with_pressure(*p);
                }
                Ok(Stage::Anneal(config))
            }
            StageSpec::Tensile {
                kt,
                strain,
                n_steps,
                expand_period,
                axis,
                fix_ratio,
            } => {
                let mut config = TensileConfig::new(*kt, *strain, *n_steps, *expand_period);
                if let Some(axis) = axis {
                    let axis: Axis = axis
                        .parse()
                        .map_err(|_| CliError::Config(format!("unknown tensile axis '{}'", axis)))?;
                    config = config.with_axis(axis);
                }
                if let Some(ratio) = fix_ratio {
                    config = config.with_fix_ratio(*ratio);
                }
                Ok(Stage::Tensile(config))
            }
        }
    }
}

impl ProtocolFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(CliError::Io)?;
        let file: ProtocolFile = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: anyhow::Error::new(e),
        })?;
        debug!(stages = file.stages.len(), "parsed protocol file");
        Ok(file)
    }

    /// Converts every stage, failing fast on the first invalid one.
    pub fn to_stages(&self) -> Result<Vec<Stage>> {
        self.stages.iter().map(StageSpec::to_stage).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [system]
        box = [20.0, 20.0, 20.0]
        particles = 50

        [simulation]
        dt = 0.001
        tau_p = 0.5
        wall_time_limit_secs = 120
        target_box = [10.0, 10.0, 10.0]

        [[stage]]
        kind = "shrink"
        n_steps = 1000
        kt_init = 5.0
        kt_final = 2.0

        [[stage]]
        kind = "quench"
        n_steps = 5000
        kt = 2.0
        pressure = 0.1

        [[stage]]
        kind = "anneal"
        kt_init = 4.0
        kt_final = 2.0
        step_sequence = [500, 500, 500]

        [[stage]]
        kind = "tensile"
        kt = 2.0
        strain = 0.25
        n_steps = 1000
        expand_period = 10
        axis = "y"
    "#;

    #[test]
    fn sample_protocol_parses_and_converts() {
        let file: ProtocolFile = toml::from_str(SAMPLE).unwrap();
        assert_eq!(file.system.particles, 50);
        assert_eq!(file.simulation.target_box, Some([10.0, 10.0, 10.0]));

        let stages = file.to_stages().unwrap();
        assert_eq!(stages.len(), 4);
        assert_eq!(stages[0].name(), "shrink");
        match &stages[3] {
            Stage::Tensile(t) => assert_eq!(t.axis, Axis::Y),
            other => panic!("expected tensile, got {:?}", other),
        }
    }

    #[test]
    fn to_params_applies_overrides_over_defaults() {
        let file: ProtocolFile = toml::from_str(SAMPLE).unwrap();
        let params = file.simulation.to_params().unwrap();
        assert_eq!(params.dt, 0.001);
        assert_eq!(params.tau_kt, 0.1);
        assert_eq!(params.tau_p, Some(0.5));
        assert_eq!(params.wall_time_limit, Some(Duration::from_secs(120)));
    }

    #[test]
    fn anneal_with_explicit_stages_parses() {
        let text = r#"
            [system]
            box = [10.0, 10.0, 10.0]
            particles = 10

            [[stage]]
            kind = "anneal"
            stages = [{ kt = 2.0, steps = 100 }, { kt = 2.0, steps = 100 }]
        "#;
        let file: ProtocolFile = toml::from_str(text).unwrap();
        let stages = file.to_stages().unwrap();
        match &stages[0] {
            Stage::Anneal(a) => assert_eq!(a.schedule.stages().len(), 2),
            other => panic!("expected anneal, got {:?}", other),
        }
    }

    #[test]
    fn anneal_without_schedule_inputs_is_rejected() {
        let text = r#"
            [system]
            box = [10.0, 10.0, 10.0]
            particles = 10

            [[stage]]
            kind = "anneal"
            kt_init = 4.0
        "#;
        let file: ProtocolFile = toml::from_str(text).unwrap();
        assert!(file.to_stages().is_err());
    }

    #[test]
    fn unknown_wall_axis_is_rejected() {
        let spec = SimulationSpec {
            wall_axis: Some("w".to_string()),
            ..Default::default()
        };
        assert!(spec.to_params().is_err());
    }
}
