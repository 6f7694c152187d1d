//! # Orbit Engine
//!
//! A multi-buffered instanced rendering pipeline with explicit CPU/GPU
//! frame pacing.
//!
//! The engine renders a population of animated geometry instances, preparing
//! frame `N + k` on the CPU while the GPU is still consuming earlier frames.
//! Per-frame mutable data (instance transforms, camera state) lives in a
//! small pool of parallel buffer generations cycled round-robin, and a
//! counting gate bounds how many frames may be in flight at once. This is
//! what makes concurrent CPU writes safe: a slot is only ever rewritten
//! after the completion of the GPU work that last read it has been observed.
//!
//! ## Architecture
//!
//! - [`foundation`]: math types and logging utilities
//! - [`gpu`]: the trait seam for the external device/surface capabilities,
//!   plus a software implementation for headless execution and tests
//! - [`render`]: the frame pipeline itself (slot pool, frame pacer,
//!   pipeline objects, argument table, frame composer)
//!
//! ## Quick Start
//!
//! ```rust
//! use orbit_engine::gpu::software::{SoftwareDevice, SoftwareSurface};
//! use orbit_engine::render::{Renderer, RendererConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     orbit_engine::foundation::logging::init();
//!
//!     let device = SoftwareDevice::new();
//!     let surface = SoftwareSurface::new();
//!     let mut renderer = Renderer::new(device.clone(), RendererConfig::default())?;
//!
//!     renderer.render_frame(&surface)?;
//!     assert!(device.complete_oldest_submission().is_some());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod gpu;
pub mod render;

// Re-export the types most applications touch
pub use render::{RenderError, RenderResult, Renderer, RendererConfig};
