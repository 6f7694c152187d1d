//! # GPU Interface Layer
//!
//! The frame pipeline treats the device, command queue, and display surface
//! as external collaborators. This module defines the trait seam those
//! collaborators must implement, so the renderer core stays independent of
//! any particular graphics API.
//!
//! ## Organization
//!
//! - [`Device`]: buffer allocation, pipeline/depth-state compilation,
//!   command-queue and argument-encoder creation
//! - [`GpuBuffer`]: a GPU-visible allocation with explicit coherence marking
//! - [`CommandQueue`] / [`CommandBuffer`] / [`RenderEncoder`]: command
//!   recording, submission, and asynchronous completion notification
//! - [`ArgumentEncoder`]: encodes resolved buffer addresses into an
//!   indirect resource table
//! - [`RenderSurface`]: pull-based access to the current drawable and
//!   render-target descriptor
//! - [`software`]: a complete in-process implementation used by the
//!   headless demo application and the test suite
//!
//! ## Completion model
//!
//! Completion handlers registered through [`CommandBuffer::on_completed`]
//! fire exactly once per committed command buffer, on an
//! implementation-defined thread that is *not* the submitting thread.
//! Implementations must therefore accept `Send` handlers.

use std::ops::Range;

use thiserror::Error;

pub mod software;

/// Result type for device-level operations
pub type GpuResult<T> = Result<T, GpuError>;

/// Errors reported by the device/surface seam.
///
/// Every variant is fatal at construction time: shader, pipeline, and
/// allocation failures indicate an unrecoverable environment problem and
/// are reported, not retried.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Shader source failed to compile
    #[error("shader compilation failed: {0}")]
    ShaderCompilation(String),

    /// Pipeline-state object creation failed
    #[error("pipeline state creation failed: {0}")]
    PipelineCreation(String),

    /// Depth-stencil state creation failed
    #[error("depth-stencil state creation failed: {0}")]
    DepthStateCreation(String),

    /// Buffer allocation failed
    #[error("buffer allocation of {size} bytes failed: {reason}")]
    BufferAllocation {
        /// Requested allocation size in bytes
        size: usize,
        /// Device-specific failure description
        reason: String,
    },

    /// The pipeline declares no argument table at the requested slot
    #[error("no argument table declared at buffer index {0}")]
    NoArgumentTable(u32),

    /// The surface could not produce a drawable or pass descriptor
    #[error("surface unavailable: {0}")]
    SurfaceUnavailable(String),
}

/// Storage mode for buffer allocations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// CPU writes require an explicit [`GpuBuffer::mark_modified`] call
    /// before the GPU copy is guaranteed coherent
    Managed,
    /// CPU writes are immediately visible to the GPU
    Shared,
}

/// Color render-target pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit BGRA with sRGB encoding
    Bgra8UnormSrgb,
}

/// Depth render-target format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFormat {
    /// 16-bit normalized depth
    Depth16Unorm,
}

/// Depth-test compare function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunction {
    /// Pass fragments closer than the stored depth
    Less,
    /// Always pass (depth test disabled)
    Always,
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull back-facing triangles
    Back,
}

/// Front-facing winding order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Counter-clockwise triangles are front-facing
    CounterClockwise,
    /// Clockwise triangles are front-facing
    Clockwise,
}

/// Index element type for indexed draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

/// Usage a draw declares for a resource reached only through an indirect
/// resource table. The GPU scheduler cannot infer these dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceUsage {
    /// The resource is read by the shader stage
    Read,
}

/// Layout of an indirect resource table, as declared by the shader's
/// expected argument structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentTableLayout {
    /// Vertex-stage buffer slot the encoded table is bound to
    pub buffer_index: u32,
    /// Number of buffer entries in the table
    pub entries: u32,
}

/// Everything the device needs to compile an immutable pipeline-state
/// object: shader stages by entry point, plus fixed-function formats.
#[derive(Debug, Clone)]
pub struct PipelineDescriptor {
    /// Human-readable label used in error messages and logs
    pub label: &'static str,
    /// Shader source text, compiled opaquely by the device
    pub shader_source: &'static str,
    /// Vertex stage entry point
    pub vertex_entry: &'static str,
    /// Fragment stage entry point
    pub fragment_entry: &'static str,
    /// Color attachment format
    pub color_format: PixelFormat,
    /// Depth attachment format, if the pipeline writes depth
    pub depth_format: Option<DepthFormat>,
    /// Argument table declared by the vertex stage, if any
    pub vertex_arguments: Option<ArgumentTableLayout>,
}

/// Fixed-function depth-stencil state description
#[derive(Debug, Clone, Copy)]
pub struct DepthStencilDescriptor {
    /// Depth compare function
    pub compare: CompareFunction,
    /// Whether fragments that pass write their depth
    pub write_enabled: bool,
}

/// A GPU-visible buffer allocation.
///
/// Writes take `&self`: the buffer is shared between the pool that owns it
/// and the command stream that reads it, and the frame pacer (not the
/// borrow checker) establishes the happens-before edge that keeps CPU
/// writes and GPU reads from overlapping.
pub trait GpuBuffer: Clone {
    /// Allocation length in bytes
    fn len(&self) -> usize;

    /// Whether the allocation is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `bytes` into the buffer at `offset`.
    ///
    /// # Panics
    /// Panics if `offset + bytes.len()` exceeds the allocation.
    fn write(&self, offset: usize, bytes: &[u8]);

    /// Mark a byte range as modified so the GPU copy is coherent before the
    /// next use. Required for [`StorageMode::Managed`] allocations.
    fn mark_modified(&self, range: Range<usize>);

    /// Resolved GPU address of the allocation, as encoded into indirect
    /// resource tables.
    fn gpu_address(&self) -> u64;
}

/// Encodes resolved buffer addresses into an indirect resource table.
///
/// Obtained from [`Device::argument_encoder`] for a pipeline that declares
/// a table; the encoder knows the table's binding layout and its exact
/// encoded size.
pub trait ArgumentEncoder {
    /// Buffer type the encoder writes into and references
    type Buffer: GpuBuffer;

    /// Number of bytes the encoded table occupies
    fn encoded_length(&self) -> usize;

    /// Select the destination buffer the table is encoded into
    fn set_argument_buffer(&mut self, buffer: &Self::Buffer, offset: usize);

    /// Encode `buffer`'s resolved address at table entry `index`
    fn set_buffer(&mut self, buffer: &Self::Buffer, offset: usize, index: u32);
}

/// Records draw state and commands for one render pass
pub trait RenderEncoder {
    /// Device family this encoder belongs to
    type Device: Device;

    /// Bind the immutable pipeline-state object
    fn set_pipeline(&mut self, pipeline: &<Self::Device as Device>::Pipeline);

    /// Bind the depth-stencil state object
    fn set_depth_state(&mut self, state: &<Self::Device as Device>::DepthState);

    /// Bind a buffer to a vertex-stage slot
    fn set_vertex_buffer(&mut self, buffer: &<Self::Device as Device>::Buffer, offset: usize, slot: u32);

    /// Declare usage of a resource reachable only through an indirect
    /// resource table bound with [`Self::set_vertex_buffer`]
    fn use_resource(&mut self, buffer: &<Self::Device as Device>::Buffer, usage: ResourceUsage);

    /// Set the face culling mode
    fn set_cull_mode(&mut self, mode: CullMode);

    /// Set the front-facing winding order
    fn set_front_facing_winding(&mut self, winding: Winding);

    /// Issue one indexed, instanced draw
    fn draw_indexed(
        &mut self,
        index_count: u32,
        index_type: IndexType,
        index_buffer: &<Self::Device as Device>::Buffer,
        index_offset: usize,
        instance_count: u32,
    );

    /// Finish recording the pass
    fn end_encoding(self);
}

/// One recording of GPU work, committed for asynchronous execution
pub trait CommandBuffer {
    /// Device family this command buffer belongs to
    type Device: Device;
    /// Encoder type produced for render passes
    type Encoder: RenderEncoder<Device = Self::Device>;

    /// Register a completion handler.
    ///
    /// The handler fires exactly once after the GPU finishes executing this
    /// command buffer, on a thread that is not the submitting thread.
    fn on_completed(&mut self, handler: Box<dyn FnOnce() + Send + 'static>);

    /// Begin a render pass against the given render-target descriptor
    fn render_encoder(
        &mut self,
        pass: &<Self::Device as Device>::PassDescriptor,
    ) -> GpuResult<Self::Encoder>;

    /// Request presentation of a drawable once execution completes
    fn present(&mut self, drawable: <Self::Device as Device>::Drawable);

    /// Commit the recording for asynchronous execution
    fn commit(self);
}

/// Produces command buffers for one stream of GPU submissions
pub trait CommandQueue {
    /// Device family this queue belongs to
    type Device: Device;
    /// Command buffer type produced by [`Self::command_buffer`]
    type CommandBuffer: CommandBuffer<Device = Self::Device>;

    /// Begin a new command recording
    fn command_buffer(&self) -> Self::CommandBuffer;
}

/// The device/adapter capability the renderer core is constructed against
pub trait Device: Sized {
    /// Buffer allocation handle
    type Buffer: GpuBuffer;
    /// Immutable compiled pipeline-state object
    type Pipeline: Clone;
    /// Immutable depth-stencil state object
    type DepthState: Clone;
    /// Command queue type
    type Queue: CommandQueue<Device = Self>;
    /// Argument encoder type for indirect resource tables
    type ArgEncoder: ArgumentEncoder<Buffer = Self::Buffer>;
    /// Per-frame render-target descriptor, produced by a surface
    type PassDescriptor;
    /// Presentable drawable, produced by a surface
    type Drawable;

    /// Create a command queue
    fn new_queue(&self) -> GpuResult<Self::Queue>;

    /// Allocate a buffer of `len` bytes
    fn new_buffer(&self, len: usize, mode: StorageMode) -> GpuResult<Self::Buffer>;

    /// Compile a pipeline-state object from shader source and
    /// fixed-function state
    fn new_pipeline(&self, descriptor: &PipelineDescriptor) -> GpuResult<Self::Pipeline>;

    /// Create a depth-stencil state object
    fn new_depth_state(&self, descriptor: &DepthStencilDescriptor) -> GpuResult<Self::DepthState>;

    /// Create an argument encoder for the table `pipeline` declares at
    /// vertex-stage `buffer_index`
    fn argument_encoder(
        &self,
        pipeline: &Self::Pipeline,
        buffer_index: u32,
    ) -> GpuResult<Self::ArgEncoder>;
}

/// The display-surface capability, queried once per frame
pub trait RenderSurface {
    /// Device family this surface presents for
    type Device: Device;

    /// Current render-target descriptor
    fn pass_descriptor(&self) -> GpuResult<<Self::Device as Device>::PassDescriptor>;

    /// Current drawable
    fn drawable(&self) -> GpuResult<<Self::Device as Device>::Drawable>;
}
