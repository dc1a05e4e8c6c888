//! Error types for mesh building.

use crate::geometry::{Axis, CellPosition};
use glam::Vec3A;
use thiserror::Error;

/// Errors that abort a build.
#[derive(Error, Debug)]
pub enum ContourError {
    /// The requested change point selection mode is not known.
    #[error("unsupported change point selection mode: {0}")]
    UnsupportedChangePointMode(String),

    /// Builder options are out of range.
    #[error("invalid builder options: {0}")]
    InvalidOptions(String),

    /// Builder options could not be parsed.
    #[error("failed to parse builder options: {0}")]
    Config(#[from] toml::de::Error),

    /// The worker pool could not be started.
    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Best point selection scanned an edge with differing endpoint signs
    /// without finding the crossing.
    #[error("no sign change found along {axis:?} edge from {from} to {to}")]
    ChangePointNotFound { axis: Axis, from: Vec3A, to: Vec3A },

    /// A vertex was requested for a cell with no sign-changing edge.
    #[error("cell {0:?} has no sign-changing edge")]
    InactiveCell(CellPosition),
}

/// Result type for mesh building.
pub type Result<T> = std::result::Result<T, ContourError>;
