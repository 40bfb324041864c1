use thiserror::Error;

use super::config::ConfigError;
use super::recorder::FormatError;
use crate::core::forcefield::tables::TableError;
use crate::core::models::bounds::SimBox;
use crate::core::rigid::reducer::ReductionError;
use crate::core::units::UnitsError;

/// A failure reported by the MD engine backend.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine backend error: {0}")]
    Backend(String),

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The error taxonomy of the protocol layer.
///
/// Validation errors are raised before any engine state mutates. Wall-time
/// exhaustion is deliberately NOT represented here: an early stop is a normal
/// outcome, reported through `RunOutcome`, with the checkpoint still written.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    MissingResource(#[from] TableError),

    #[error(transparent)]
    Degenerate(#[from] ReductionError),

    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(
        "box after shrink does not match target (expected {expected:?}, got {actual:?}); \
         engine and protocol have desynchronized"
    )]
    BoxMismatch { expected: SimBox, actual: SimBox },
}
