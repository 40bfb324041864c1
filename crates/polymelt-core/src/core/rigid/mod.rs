//! # Rigid-Body Reduction Module
//!
//! This module reduces atomistic sub-structures into rigid composite bodies:
//! one reduced "parent" particle per rigid group, carrying the group's aggregate
//! mass, center of mass, and moment-of-inertia tensor, plus a constituent
//! template that records every member particle relative to the body frame.
//!
//! ## Key Components
//!
//! - [`body`] - The reduced [`body::RigidBody`] record and its constituents
//! - [`reducer`] - The reduction algorithm itself
//!
//! The reduction is a pure transformation over a
//! [`crate::core::models::configuration::ParticleConfiguration`]; it mutates no
//! engine state and may be applied before the engine is ever constructed.

pub mod body;
pub mod reducer;

use crate::core::forcefield::adjust::{self, SilenceList};
use crate::core::forcefield::term::ForceTerm;
use crate::core::models::configuration::ParticleConfiguration;
use body::RigidBody;
use reducer::ReductionError;

/// Reduces the rigid groups of `config` and silences the force-field terms the
/// reduction makes redundant.
///
/// Every pair interaction involving a reduced-body type is zeroed (constituents
/// interact through the rigid constraint, not pairwise), and the caller-named
/// bonded tuples internal to the bodies are zeroed too. The force terms are
/// adjusted in place; the returned configuration and bodies come straight from
/// [`reducer::reduce`].
pub fn prepare_rigid_system(
    config: &ParticleConfiguration,
    terms: &mut [ForceTerm],
    internal: &SilenceList,
) -> Result<(ParticleConfiguration, Vec<RigidBody>), ReductionError> {
    let (reduced, bodies) = reducer::reduce(config)?;
    if bodies.is_empty() {
        return Ok((reduced, bodies));
    }

    let mut rigid_types: Vec<String> = bodies
        .iter()
        .filter_map(|b| reduced.type_name(b.type_id).map(str::to_string))
        .collect();
    rigid_types.sort_unstable();
    rigid_types.dedup();

    adjust::silence_rigid_pairs(terms, &rigid_types, &reduced.types);
    adjust::silence_internal_terms(terms, internal);
    Ok((reduced, bodies))
}
