//! Core types for aoview.
//!
//! This crate holds everything the renderer depends on that does not touch
//! the GPU:
//! - [`transform`]: view/projection/model matrix constructors
//! - [`loader`] / [`mesh`]: PLY ingest and mesh preprocessing
//! - [`settings`]: mutable viewer state (ambient occlusion toggle, light
//!   and material constants)

// Internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod error;
pub mod loader;
pub mod mesh;
pub mod settings;
pub mod transform;

pub use error::{MeshError, Result};
pub use loader::load_ply;
pub use mesh::{MeshBuffer, RawMesh, Vertex};
pub use settings::{AoSettings, Light, Material, ViewerSettings};

// Re-export glam types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};
