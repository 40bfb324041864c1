use super::term::{ForceTerm, PairCoeffs, pair_key};
use tracing::debug;

/// Bond/angle/dihedral type tuples known to be internal to rigid bodies.
///
/// Constituents of a rigid body interact through the rigid constraint, not
/// through their bonded terms, so the caller names the tuples to neutralize.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SilenceList {
    pub bonds: Vec<String>,
    pub angles: Vec<String>,
    pub dihedrals: Vec<String>,
}

/// Zeroes every pair interaction between a rigid-body type and every type.
///
/// Reduced bodies must not interact pairwise with anything: their constituents
/// carry the physics. Each (rigid, other) key is written with the neutral
/// record, inserting it when the registry has no entry yet. Idempotent.
pub fn silence_rigid_pairs(terms: &mut [ForceTerm], rigid_types: &[String], all_types: &[String]) {
    for term in terms.iter_mut() {
        if let ForceTerm::Pair(params) = term {
            for rigid in rigid_types {
                for other in all_types {
                    params.insert(pair_key(rigid, other), PairCoeffs::zeroed());
                }
            }
            debug!(
                rigid_types = rigid_types.len(),
                types = all_types.len(),
                "silenced rigid pair interactions"
            );
        }
    }
}

/// Zeroes the caller-named bonded type tuples.
///
/// Tuples absent from a registry are skipped; silencing never fails. Idempotent.
pub fn silence_internal_terms(terms: &mut [ForceTerm], list: &SilenceList) {
    for term in terms.iter_mut() {
        match term {
            ForceTerm::Bond(params) => {
                for tuple in &list.bonds {
                    if let Some(coeffs) = params.get_mut(tuple) {
                        coeffs.k = 0.0;
                        coeffs.r0 = 0.0;
                    }
                }
            }
            ForceTerm::Angle(params) => {
                for tuple in &list.angles {
                    if let Some(coeffs) = params.get_mut(tuple) {
                        coeffs.k = 0.0;
                        coeffs.t0 = 0.0;
                    }
                }
            }
            ForceTerm::Dihedral(params) => {
                for tuple in &list.dihedrals {
                    if let Some(coeffs) = params.get_mut(tuple) {
                        coeffs.k = 0.0;
                        coeffs.d = 0;
                        coeffs.n = 0;
                        coeffs.phi0 = 0.0;
                    }
                }
            }
            ForceTerm::Pair(_) => {}
        }
    }
}
