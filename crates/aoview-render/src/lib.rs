//! wgpu rendering engine for aoview.
//!
//! A frame runs along one of two paths decided by the viewer settings:
//! - direct: one Phong pass straight to the swapchain
//! - deferred: Phong into color/normal/depth targets, then a screen-space
//!   occlusion estimate, then a blur that composites occlusion with color

// Internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod ao_pass;
pub mod camera;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod targets;

pub use camera::Camera;
pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use frame::{FramePath, PassKind};
