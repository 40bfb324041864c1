//! # Engine Module
//!
//! This module is the stateful orchestration layer of polymelt: everything the
//! protocol drivers need between the pure core transformations and the external
//! MD engine.
//!
//! ## Architecture
//!
//! - **Engine Seam** ([`traits`]) - The narrow [`traits::MdEngine`] interface the
//!   external engine is driven through
//! - **Integration Methods** ([`method`]) - NVT/NPT/NVE method descriptions,
//!   particle groups, and linear ramp variants
//! - **Wall Potentials** ([`walls`]) - Planar confinement pair lifecycle
//!   management
//! - **Configuration** ([`config`]) - Simulation parameters and per-protocol
//!   configuration records with validation
//! - **Trajectory Recording** ([`recorder`]) - Append-only rigid-body kinematic
//!   frames with versioned store metadata
//! - **Progress Monitoring** ([`progress`]) - Progress reporting callbacks
//! - **Dry-Run Backend** ([`dryrun`]) - An engine implementation with no physics,
//!   for protocol validation and tests
//! - **Error Handling** ([`error`]) - The error taxonomy shared by the protocol
//!   layer

pub mod config;
pub mod dryrun;
pub mod error;
pub mod method;
pub mod progress;
pub mod recorder;
pub mod traits;
pub mod walls;
