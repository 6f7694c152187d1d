//! Frame slot pool - multi-buffered per-frame resources
//!
//! Owns `N` parallel generations of each per-frame mutable buffer (the
//! instance-transform array and the camera record) and hands out the one
//! for the current slot index. Cycling is round-robin with period `N`; the
//! frame pacer guarantees a slot's previous generation has completed on
//! the GPU before the composer writes into it again.
//!
//! All buffers are fixed-size and allocated once at construction; nothing
//! here allocates per frame.

use std::mem;

use crate::gpu::{Device, GpuResult, StorageMode};
use crate::render::data::{CameraData, InstanceData};

/// One generation of per-frame mutable buffers
pub struct FrameSlot<D: Device> {
    instance_buffer: D::Buffer,
    camera_buffer: D::Buffer,
}

impl<D: Device> FrameSlot<D> {
    /// Instance-record array buffer for this generation
    pub fn instance_buffer(&self) -> &D::Buffer {
        &self.instance_buffer
    }

    /// Camera-record buffer for this generation
    pub fn camera_buffer(&self) -> &D::Buffer {
        &self.camera_buffer
    }
}

/// The pool of `N` frame slots, cycled by a wrapping counter
pub struct FrameSlots<D: Device> {
    slots: Vec<FrameSlot<D>>,
    cursor: usize,
}

impl<D: Device> FrameSlots<D> {
    /// Allocate `frames_in_flight` generations of the per-frame buffers.
    ///
    /// Each instance buffer holds exactly `instance_count` records;
    /// allocation failure is fatal and propagates to the caller.
    pub fn new(device: &D, frames_in_flight: usize, instance_count: usize) -> GpuResult<Self> {
        let instance_len = instance_count * mem::size_of::<InstanceData>();
        let camera_len = mem::size_of::<CameraData>();

        let mut slots = Vec::with_capacity(frames_in_flight);
        for _ in 0..frames_in_flight {
            slots.push(FrameSlot {
                instance_buffer: device.new_buffer(instance_len, StorageMode::Managed)?,
                camera_buffer: device.new_buffer(camera_len, StorageMode::Managed)?,
            });
        }

        log::debug!(
            "allocated {frames_in_flight} frame slots ({instance_len} + {camera_len} bytes each)"
        );

        Ok(Self { slots, cursor: 0 })
    }

    /// Index of the slot the next frame will be composed into
    #[must_use]
    pub fn slot_index(&self) -> usize {
        self.cursor
    }

    /// The current slot's buffers
    #[must_use]
    pub fn current(&self) -> &FrameSlot<D> {
        &self.slots[self.cursor]
    }

    /// Advance the cursor for the next frame, wrapping at `N`
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// Number of slots in the pool
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool is empty (never true for a validated config)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
