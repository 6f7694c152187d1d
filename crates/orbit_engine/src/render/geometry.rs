//! Immutable cube geometry
//!
//! Vertex positions, per-vertex colors, and the index list are uploaded
//! once at construction and never mutated afterwards. The draw orchestrator
//! owns these buffers for the renderer's whole lifetime.

use crate::gpu::{Device, GpuBuffer, GpuResult, StorageMode};

const S: f32 = 0.5;

/// Corner positions of a unit cube centered on the origin
pub const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-S, -S, S],
    [S, -S, S],
    [S, S, S],
    [-S, S, S],
    [-S, -S, -S],
    [-S, S, -S],
    [S, S, -S],
    [S, -S, -S],
];

/// Per-vertex colors, one per corner (position shifted into [0, 1])
pub const CUBE_COLORS: [[f32; 3]; 8] = [
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
];

/// Triangle indices, two per face, counter-clockwise front winding
pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 2, 3, 0, // front
    1, 7, 6, 6, 2, 1, // right
    7, 4, 5, 5, 6, 7, // back
    4, 0, 3, 3, 5, 4, // left
    3, 2, 6, 6, 5, 3, // top
    4, 7, 1, 1, 0, 4, // bottom
];

/// The uploaded, immutable geometry buffers
pub struct GeometryBuffers<D: Device> {
    positions: D::Buffer,
    colors: D::Buffer,
    indices: D::Buffer,
    index_count: u32,
}

impl<D: Device> GeometryBuffers<D> {
    /// Upload the cube to managed device buffers.
    ///
    /// Allocation failure here is fatal for the renderer being built.
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(device: &D) -> GpuResult<Self> {
        let positions = upload(device, bytemuck::cast_slice(&CUBE_POSITIONS))?;
        let colors = upload(device, bytemuck::cast_slice(&CUBE_COLORS))?;
        let indices = upload(device, bytemuck::cast_slice(&CUBE_INDICES))?;

        log::debug!(
            "uploaded cube geometry: {} vertices, {} indices",
            CUBE_POSITIONS.len(),
            CUBE_INDICES.len()
        );

        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            positions,
            colors,
            indices,
            index_count: CUBE_INDICES.len() as u32,
        })
    }

    /// Vertex position buffer
    pub fn positions(&self) -> &D::Buffer {
        &self.positions
    }

    /// Per-vertex color buffer
    pub fn colors(&self) -> &D::Buffer {
        &self.colors
    }

    /// Index buffer (16-bit indices)
    pub fn indices(&self) -> &D::Buffer {
        &self.indices
    }

    /// Number of indices to draw
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

fn upload<D: Device>(device: &D, bytes: &[u8]) -> GpuResult<D::Buffer> {
    let buffer = device.new_buffer(bytes.len(), StorageMode::Managed)?;
    buffer.write(0, bytes);
    buffer.mark_modified(0..bytes.len());
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::software::SoftwareDevice;

    #[test]
    fn test_indices_reference_valid_vertices() {
        for &index in &CUBE_INDICES {
            assert!((index as usize) < CUBE_POSITIONS.len());
        }
    }

    #[test]
    fn test_every_vertex_is_referenced() {
        for vertex in 0..CUBE_POSITIONS.len() as u16 {
            assert!(CUBE_INDICES.contains(&vertex), "vertex {vertex} unused");
        }
    }

    #[test]
    fn test_upload_is_coherent_after_construction() {
        let device = SoftwareDevice::new();
        let geometry = GeometryBuffers::new(&device).expect("upload");

        // The GPU copies must already match the source data; no further
        // mark_modified is required before the first draw.
        assert_eq!(
            geometry.positions().gpu_contents(),
            bytemuck::cast_slice::<_, u8>(&CUBE_POSITIONS).to_vec()
        );
        assert_eq!(
            geometry.indices().gpu_contents(),
            bytemuck::cast_slice::<_, u8>(&CUBE_INDICES).to_vec()
        );
        assert_eq!(geometry.index_count(), 36);
    }
}
