use serde::{Deserialize, Serialize};

/// A scalar external parameter: either constant or a linear ramp.
///
/// The ramp re-evaluates on every query, interpolating from `a` to `b` over
/// `t_ramp` steps starting at `t_start` and holding `b` afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Setpoint {
    Constant(f64),
    Ramp {
        a: f64,
        b: f64,
        t_start: u64,
        t_ramp: u64,
    },
}

impl Setpoint {
    /// Evaluates the setpoint at `timestep`.
    pub fn value_at(&self, timestep: u64) -> f64 {
        match *self {
            Setpoint::Constant(v) => v,
            Setpoint::Ramp {
                a,
                b,
                t_start,
                t_ramp,
            } => {
                if timestep <= t_start || t_ramp == 0 {
                    a
                } else {
                    let f = ((timestep - t_start) as f64 / t_ramp as f64).min(1.0);
                    a + (b - a) * f
                }
            }
        }
    }

    /// The value the setpoint starts from.
    pub fn initial(&self) -> f64 {
        match *self {
            Setpoint::Constant(v) => v,
            Setpoint::Ramp { a, .. } => a,
        }
    }
}

/// The subset of particles an integrator method acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticleGroup {
    All,
    /// Explicit particle indices, in ascending order.
    Tags(Vec<usize>),
}

impl ParticleGroup {
    /// Number of selected particles, or `None` for the whole system.
    pub fn len(&self) -> Option<usize> {
        match self {
            ParticleGroup::All => None,
            ParticleGroup::Tags(tags) => Some(tags.len()),
        }
    }
}

/// An ensemble/integrator method the engine integrates with.
///
/// Exactly one method is active at a time; protocols swap methods explicitly.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegratorMethod {
    Nvt {
        filter: ParticleGroup,
        kt: Setpoint,
        tau: f64,
    },
    Npt {
        filter: ParticleGroup,
        kt: Setpoint,
        tau: f64,
        pressure: f64,
        tau_p: f64,
    },
    Nve {
        filter: ParticleGroup,
    },
}

impl IntegratorMethod {
    pub fn name(&self) -> &'static str {
        match self {
            IntegratorMethod::Nvt { .. } => "NVT",
            IntegratorMethod::Npt { .. } => "NPT",
            IntegratorMethod::Nve { .. } => "NVE",
        }
    }
}
