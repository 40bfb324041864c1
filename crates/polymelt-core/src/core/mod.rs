//! # Core Module
//!
//! This module provides the fundamental building blocks for staged polymer MD
//! orchestration in polymelt, serving as the stateless computational core of the
//! library.
//!
//! ## Overview
//!
//! The core module implements the data structures and pure transformations the
//! protocol layer is built on: particle configurations and their simulation box,
//! the geometric reduction of atomistic sub-structures into rigid composite
//! bodies, force-field term registries with the adjustments made necessary by
//! that reduction, and the reduced-unit system all physical quantities are
//! expressed in.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Particles, the particle
//!   configuration, and the simulation box
//! - **Rigid-Body Reduction** ([`rigid`]) - Center-of-mass, inertia tensor, and
//!   constituent bookkeeping for rigid composite bodies
//! - **Force Field** ([`forcefield`]) - Tagged interaction terms, post-reduction
//!   silencing, and tabulated coarse-grained potentials
//! - **Reduced Units** ([`units`]) - Reference mass/energy/distance scales
//!
//! Everything in this module is a pure, stateless transformation with no shared
//! mutable state; nothing here touches the MD engine.

pub mod forcefield;
pub mod models;
pub mod rigid;
pub mod units;
