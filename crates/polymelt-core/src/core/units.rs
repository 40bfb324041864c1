//! Reduced-unit reference scales.
//!
//! Every physical quantity handed to the MD engine is expressed in a
//! self-consistent reduced-unit system derived from reference mass, energy,
//! and distance scales. The references are fixed once, before any protocol
//! runs, and used for the whole simulation lifetime.

use crate::core::forcefield::term::ForceTerm;
use crate::core::models::configuration::ParticleConfiguration;
use crate::core::models::bounds::SimBox;
use thiserror::Error;
use tracing::info;

/// Angstroms per nanometer; target boxes arrive in nm from the builder side.
const ANGSTROM_PER_NM: f64 = 10.0;

#[derive(Debug, Error, PartialEq)]
pub enum UnitsError {
    #[error(
        "reference {0} cannot be auto-derived for this system; supply explicit reference values"
    )]
    Underivable(&'static str),
}

/// Reference mass, energy, and distance scales.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefValues {
    pub mass: f64,
    pub energy: f64,
    pub distance: f64,
}

impl RefValues {
    /// Auto-derives reference scales from the largest values in the system:
    /// the heaviest particle, and the largest pair epsilon and sigma.
    ///
    /// # Errors
    ///
    /// [`UnitsError::Underivable`] when the configuration has no particles or
    /// the force terms carry no analytic pair coefficients to scale by —
    /// tabulated-only (coarse-grained) systems must supply explicit references.
    pub fn derive(
        config: &ParticleConfiguration,
        terms: &[ForceTerm],
    ) -> Result<Self, UnitsError> {
        let mass = config
            .particles
            .iter()
            .map(|p| p.mass)
            .fold(f64::NEG_INFINITY, f64::max);
        if !mass.is_finite() || mass <= 0.0 {
            return Err(UnitsError::Underivable("mass"));
        }

        let mut energy = f64::NEG_INFINITY;
        let mut distance = f64::NEG_INFINITY;
        for term in terms {
            if let ForceTerm::Pair(params) = term {
                for coeffs in params.values() {
                    energy = energy.max(coeffs.epsilon);
                    distance = distance.max(coeffs.sigma);
                }
            }
        }
        if !energy.is_finite() || energy <= 0.0 {
            return Err(UnitsError::Underivable("energy"));
        }
        if !distance.is_finite() || distance <= 0.0 {
            return Err(UnitsError::Underivable("distance"));
        }

        let refs = Self {
            mass,
            energy,
            distance,
        };
        info!(?refs, "auto-derived reference scales");
        Ok(refs)
    }

    /// Converts a length given in nanometers to reduced units.
    pub fn reduce_length_nm(&self, nm: f64) -> f64 {
        nm * ANGSTROM_PER_NM / self.distance
    }

    /// Converts a target box given in nanometers to reduced units.
    pub fn reduce_box_nm(&self, nm: [f64; 3]) -> SimBox {
        SimBox::orthorhombic(
            self.reduce_length_nm(nm[0]),
            self.reduce_length_nm(nm[1]),
            self.reduce_length_nm(nm[2]),
        )
    }
}
