//! Indirect resource table encoding
//!
//! Encodes the resolved addresses of the immutable geometry sub-resources
//! (positions, per-vertex colors) into one small buffer the vertex stage
//! dereferences through a single indirection, instead of binding each
//! resource to its own slot.
//!
//! The table is built once after geometry upload and never rebuilt: the
//! buffers it references are immutable and never reallocated. Draws that
//! bind the table must still declare read usage of every referenced buffer,
//! because the GPU scheduler cannot infer indirect dependencies.

use crate::gpu::{ArgumentEncoder, Device, GpuBuffer, GpuResult, StorageMode};
use crate::render::geometry::GeometryBuffers;

/// Table entry index of the vertex position buffer
pub const POSITIONS_ENTRY: u32 = 0;
/// Table entry index of the per-vertex color buffer
pub const COLORS_ENTRY: u32 = 1;

/// The encoded indirect resource table
pub struct ArgumentTable<D: Device> {
    buffer: D::Buffer,
}

impl<D: Device> ArgumentTable<D> {
    /// Encode the geometry's positions and colors into a fresh table
    /// buffer, sized by the encoder's own length query.
    pub fn build(
        device: &D,
        pipeline: &D::Pipeline,
        geometry: &GeometryBuffers<D>,
    ) -> GpuResult<Self> {
        let mut encoder = device.argument_encoder(pipeline, 0)?;
        let buffer = device.new_buffer(encoder.encoded_length(), StorageMode::Managed)?;

        encoder.set_argument_buffer(&buffer, 0);
        encoder.set_buffer(geometry.positions(), 0, POSITIONS_ENTRY);
        encoder.set_buffer(geometry.colors(), 0, COLORS_ENTRY);
        buffer.mark_modified(0..buffer.len());

        log::debug!("encoded argument table ({} bytes)", buffer.len());

        Ok(Self { buffer })
    }

    /// The encoded table buffer, bound at vertex slot 0 by the draw
    pub fn buffer(&self) -> &D::Buffer {
        &self.buffer
    }
}
