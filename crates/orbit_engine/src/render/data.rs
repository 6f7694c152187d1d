//! GPU-visible per-frame data records
//!
//! These structs are written byte-for-byte into the frame slot buffers and
//! read by the vertex stage, so their layout is `repr(C)` and they carry
//! `bytemuck` POD impls for safe byte casting.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Vec4};

/// Per-instance data for one drawn copy of the shared geometry.
///
/// One array of these exists per in-flight frame slot, rewritten in full
/// every frame by the frame composer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    /// Object-to-world transform for this instance
    pub transform: Mat4,
    /// RGBA instance color
    pub color: Vec4,
}

/// Camera state for one frame.
///
/// One instance per in-flight frame slot, same lifecycle as the instance
/// array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraData {
    /// Projection matrix
    pub perspective: Mat4,
    /// World/view matrix
    pub world: Mat4,
}

impl Default for InstanceData {
    fn default() -> Self {
        Self {
            transform: Mat4::identity(),
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        }
    }
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            perspective: Mat4::identity(),
            world: Mat4::identity(),
        }
    }
}
