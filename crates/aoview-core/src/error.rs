//! Error types for mesh loading.

use thiserror::Error;

/// Errors produced while loading a mesh file.
///
/// Every variant is recoverable from the viewer's point of view: the caller
/// degrades to an empty model and keeps running.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The file could not be opened.
    #[error("failed to open mesh file: {0}")]
    Open(#[from] std::io::Error),

    /// The file opened but its header or body is not valid PLY.
    #[error("failed to parse mesh file: {0}")]
    Parse(String),

    /// The file parsed but held less data than its header declared,
    /// or a face was not a triangle.
    #[error("mesh file truncated or malformed: expected {expected}, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// A specialized Result type for mesh loading.
pub type Result<T> = std::result::Result<T, MeshError>;
