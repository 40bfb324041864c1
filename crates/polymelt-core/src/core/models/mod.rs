//! # Core Models Module
//!
//! This module contains the fundamental data structures used to represent a
//! particle system in polymelt, providing the foundation for rigid-body reduction
//! and protocol execution.
//!
//! ## Key Components
//!
//! - [`particle`] - Individual particle representation: position, mass, type,
//!   charge, orientation, diameter, and rigid-group membership
//! - [`configuration`] - The ordered particle configuration with its type-name
//!   registry and simulation box
//! - [`bounds`] - The triclinic simulation box and per-axis geometry

pub mod bounds;
pub mod configuration;
pub mod particle;
