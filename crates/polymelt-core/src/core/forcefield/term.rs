use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lennard-Jones pair coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairCoeffs {
    pub epsilon: f64,
    pub sigma: f64,
    pub r_cut: f64,
}

impl PairCoeffs {
    /// The neutral record a silenced pair is set to.
    pub fn zeroed() -> Self {
        Self {
            epsilon: 0.0,
            sigma: 0.0,
            r_cut: 0.0,
        }
    }
}

/// Harmonic bond coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BondCoeffs {
    pub k: f64,
    pub r0: f64,
}

/// Harmonic angle coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleCoeffs {
    pub k: f64,
    pub t0: f64,
}

/// Harmonic dihedral coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DihedralCoeffs {
    pub k: f64,
    pub d: i32,
    pub n: i32,
    pub phi0: f64,
}

/// A force term: an explicit kind tag plus its coefficient registry.
///
/// Pair registries are keyed by a sorted type-name pair (see
/// [`pair_key`]); bonded registries by the conventional dash-joined type tuple
/// (e.g. `"ca-ca-ca"` for an angle).
#[derive(Debug, Clone, PartialEq)]
pub enum ForceTerm {
    Pair(HashMap<(String, String), PairCoeffs>),
    Bond(HashMap<String, BondCoeffs>),
    Angle(HashMap<String, AngleCoeffs>),
    Dihedral(HashMap<String, DihedralCoeffs>),
}

impl ForceTerm {
    /// Short human-readable kind tag, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ForceTerm::Pair(_) => "pair",
            ForceTerm::Bond(_) => "bond",
            ForceTerm::Angle(_) => "angle",
            ForceTerm::Dihedral(_) => "dihedral",
        }
    }
}

/// Canonical registry key for an unordered type pair.
pub fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}
