//! # Frame Rendering Pipeline
//!
//! The per-frame machinery: a pool of multi-buffered frame slots, a
//! counting gate bounding frames in flight, immutable pipeline objects
//! built once at startup, an optional indirect resource table, and the
//! frame composer that drives one frame from gated entry to asynchronous
//! completion.
//!
//! ## Organization
//!
//! - [`data`]: GPU-visible instance and camera records
//! - [`animation`]: the per-renderer angle accumulator and its wrap policy
//! - [`instances`]: per-instance transform and color composition
//! - [`geometry`]: immutable cube geometry, uploaded once
//! - [`frame_pacer`]: the counting gate
//! - [`frame_slots`]: the pool of per-frame buffer generations
//! - [`pipeline`]: pipeline-state and depth-state construction
//! - [`argument_table`]: indirect resource table encoding
//! - [`renderer`]: the frame composer / draw orchestrator

use thiserror::Error;

use crate::gpu::GpuError;

pub mod animation;
pub mod argument_table;
pub mod data;
pub mod frame_pacer;
pub mod frame_slots;
pub mod geometry;
pub mod instances;
pub mod pipeline;
pub mod renderer;

pub use renderer::Renderer;

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors produced while constructing or driving the frame pipeline.
///
/// Everything here is fatal: construction failures indicate an
/// unrecoverable environment problem, and the steady-state frame path only
/// fails at the surface seam.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A device or surface operation failed
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// The renderer configuration is unusable
    #[error("invalid renderer configuration: {0}")]
    InvalidConfiguration(String),
}

/// How the draw reaches the immutable geometry sub-resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingMode {
    /// Bind each geometry buffer to its own vertex-stage slot
    #[default]
    Direct,
    /// Bind one encoded indirect resource table and declare explicit read
    /// usage of every buffer it references
    ArgumentTable,
}

/// Construction-time renderer parameters.
///
/// Instance population and frames-in-flight are fixed for the renderer's
/// lifetime; this struct is the single source of truth for both.
#[derive(Debug, Clone, Copy)]
pub struct RendererConfig {
    /// Number of geometry instances drawn per frame
    pub instance_count: usize,
    /// Maximum frames in flight; also the number of buffer generations per
    /// frame slot
    pub frames_in_flight: usize,
    /// Geometry binding strategy
    pub binding_mode: BindingMode,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            instance_count: 512,
            frames_in_flight: 3,
            binding_mode: BindingMode::Direct,
        }
    }
}

impl RendererConfig {
    pub(crate) fn validate(&self) -> RenderResult<()> {
        if self.instance_count == 0 {
            return Err(RenderError::InvalidConfiguration(
                "instance_count must be at least 1".into(),
            ));
        }
        if self.frames_in_flight == 0 {
            return Err(RenderError::InvalidConfiguration(
                "frames_in_flight must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RendererConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.instance_count, 512);
        assert_eq!(config.frames_in_flight, 3);
    }

    #[test]
    fn test_zero_population_is_rejected() {
        let config = RendererConfig {
            instance_count: 0,
            ..RendererConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_frames_in_flight_is_rejected() {
        let config = RendererConfig {
            frames_in_flight: 0,
            ..RendererConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
