//! Error types for spaceship generation
//!
//! Configuration problems are caught before the first mesh mutation. Mesh
//! errors describe contract violations (a retired face handed back to an
//! operation) and are fatal for the run that raised them.

use std::path::PathBuf;

use crate::mesh::FaceId;

/// Rejected generation or movie configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}: min ({min}) must not exceed max ({max})")]
    InvertedRange { name: &'static str, min: u32, max: u32 },

    #[error("{name}: max must be at least 1")]
    EmptyRange { name: &'static str },

    #[error("{name} must be positive and finite (got {value})")]
    NotPositive { name: &'static str, value: f32 },

    #[error("Failed to read config {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Mesh operation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("Face {0:?} was retired by an earlier operation")]
    RetiredFace(FaceId),

    #[error("Face {0:?} does not exist in this mesh")]
    UnknownFace(FaceId),

    #[error("Face {face:?} has {count} vertices, operation needs at least {needed}")]
    TooFewVertices {
        face: FaceId,
        count: usize,
        needed: usize,
    },
}

/// Failure of a whole generation run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Failure while writing generated assets to disk
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode camera track: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of a movie run
#[derive(Debug, thiserror::Error)]
pub enum MovieError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
