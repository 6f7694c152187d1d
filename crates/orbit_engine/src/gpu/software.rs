//! # Software Device
//!
//! A complete in-process implementation of the [`gpu`](crate::gpu) trait
//! seam. Buffers are byte vectors with separate CPU and GPU copies so the
//! managed-storage coherence contract ([`GpuBuffer::mark_modified`]) is
//! actually exercised, and committed command buffers queue up as pending
//! submissions until something drives their completion.
//!
//! The headless demo application and the test suite both run against this
//! device. Completion handlers run on whichever thread calls
//! [`SoftwareDevice::complete_oldest_submission`]; drive completion from a
//! thread other than the submitting one to reproduce the asynchronous
//! callback model of a real device.
//!
//! The device also performs a safety audit no real GPU offers: writing a
//! buffer while a committed submission still reads it is recorded as a
//! violation, retrievable through [`SoftwareDevice::violations`].

use std::collections::{HashMap, VecDeque};
use std::ops::Range;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use super::{
    ArgumentEncoder, ArgumentTableLayout, CommandBuffer, CommandQueue, CullMode, DepthStencilDescriptor,
    Device, GpuBuffer, GpuError, GpuResult, IndexType, PipelineDescriptor, RenderEncoder, RenderSurface,
    ResourceUsage, StorageMode, Winding,
};

/// Addresses start away from zero so an unencoded table entry is
/// distinguishable from a real one.
const ADDRESS_BASE: u64 = 0x1000;

#[derive(Default)]
struct Diagnostics {
    violations: Mutex<Vec<String>>,
}

impl Diagnostics {
    fn record(&self, message: String) {
        log::error!("software device: {message}");
        self.violations.lock().expect("lock poisoned").push(message);
    }
}

struct BufferState {
    address: u64,
    len: usize,
    mode: StorageMode,
    /// CPU-side contents, updated by every write
    cpu: Mutex<Vec<u8>>,
    /// GPU-side copy; for managed storage it only advances on `mark_modified`
    gpu: Mutex<Vec<u8>>,
    /// Committed submissions currently reading this buffer
    pending_reads: AtomicUsize,
    diagnostics: Arc<Diagnostics>,
}

/// Buffer allocation handle of the [`SoftwareDevice`]
#[derive(Clone)]
pub struct SoftwareBuffer {
    state: Arc<BufferState>,
}

impl SoftwareBuffer {
    /// Snapshot of the GPU-visible copy (what a draw would read)
    #[must_use]
    pub fn gpu_contents(&self) -> Vec<u8> {
        self.state.gpu.lock().expect("lock poisoned").clone()
    }

    /// Snapshot of the CPU-side contents (what has been written, whether or
    /// not it was marked modified yet)
    #[must_use]
    pub fn cpu_contents(&self) -> Vec<u8> {
        self.state.cpu.lock().expect("lock poisoned").clone()
    }
}

impl GpuBuffer for SoftwareBuffer {
    fn len(&self) -> usize {
        self.state.len
    }

    fn write(&self, offset: usize, bytes: &[u8]) {
        assert!(
            offset + bytes.len() <= self.state.len,
            "write of {} bytes at offset {offset} exceeds buffer length {}",
            bytes.len(),
            self.state.len
        );
        if self.state.pending_reads.load(Ordering::Acquire) > 0 {
            self.state.diagnostics.record(format!(
                "buffer {:#x} written while a committed submission still reads it",
                self.state.address
            ));
        }
        let mut cpu = self.state.cpu.lock().expect("lock poisoned");
        cpu[offset..offset + bytes.len()].copy_from_slice(bytes);
        if self.state.mode == StorageMode::Shared {
            let mut gpu = self.state.gpu.lock().expect("lock poisoned");
            gpu[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
    }

    fn mark_modified(&self, range: Range<usize>) {
        assert!(
            range.end <= self.state.len,
            "modified range {range:?} exceeds buffer length {}",
            self.state.len
        );
        let cpu = self.state.cpu.lock().expect("lock poisoned");
        let mut gpu = self.state.gpu.lock().expect("lock poisoned");
        gpu[range.clone()].copy_from_slice(&cpu[range]);
    }

    fn gpu_address(&self) -> u64 {
        self.state.address
    }
}

struct PipelineState {
    label: &'static str,
    vertex_arguments: Option<ArgumentTableLayout>,
}

/// Compiled pipeline-state object of the [`SoftwareDevice`]
#[derive(Clone)]
pub struct SoftwarePipeline {
    state: Arc<PipelineState>,
}

impl SoftwarePipeline {
    /// Label the pipeline was compiled with
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.state.label
    }
}

/// Depth-stencil state object of the [`SoftwareDevice`]
#[derive(Clone)]
pub struct SoftwareDepthState {
    descriptor: DepthStencilDescriptor,
}

impl SoftwareDepthState {
    /// The descriptor this state was created from
    #[must_use]
    pub fn descriptor(&self) -> DepthStencilDescriptor {
        self.descriptor
    }
}

/// Argument encoder of the [`SoftwareDevice`].
///
/// Encodes each table entry as the referenced buffer's resolved address in
/// eight little-endian bytes.
pub struct SoftwareArgumentEncoder {
    layout: ArgumentTableLayout,
    target: Option<(SoftwareBuffer, usize)>,
}

/// Bytes one encoded table entry occupies
pub const ARGUMENT_ENTRY_SIZE: usize = 8;

impl ArgumentEncoder for SoftwareArgumentEncoder {
    type Buffer = SoftwareBuffer;

    fn encoded_length(&self) -> usize {
        self.layout.entries as usize * ARGUMENT_ENTRY_SIZE
    }

    fn set_argument_buffer(&mut self, buffer: &SoftwareBuffer, offset: usize) {
        self.target = Some((buffer.clone(), offset));
    }

    fn set_buffer(&mut self, buffer: &SoftwareBuffer, offset: usize, index: u32) {
        assert!(index < self.layout.entries, "table entry {index} out of range");
        let (target, base) = self
            .target
            .as_ref()
            .expect("set_argument_buffer must be called before encoding entries");
        let address = buffer.gpu_address() + offset as u64;
        target.write(base + index as usize * ARGUMENT_ENTRY_SIZE, &address.to_le_bytes());
    }
}

/// One draw recorded by a render encoder
#[derive(Debug, Clone)]
pub struct DrawRecord {
    /// Vertex-stage buffer bindings as (slot, address) pairs
    pub vertex_buffers: Vec<(u32, u64)>,
    /// Addresses declared through `use_resource`
    pub used_resources: Vec<u64>,
    /// Index buffer address
    pub index_buffer: u64,
    /// Number of indices drawn
    pub index_count: u32,
    /// Index element type
    pub index_type: IndexType,
    /// Number of instances drawn
    pub instance_count: u32,
    /// Cull mode in effect, if set
    pub cull_mode: Option<CullMode>,
    /// Winding order in effect, if set
    pub winding: Option<Winding>,
    /// Label of the bound pipeline
    pub pipeline: &'static str,
}

/// Everything one completed submission did, for inspection by tests
pub struct SubmissionRecord {
    /// Draws recorded across all passes
    pub draws: Vec<DrawRecord>,
    /// Whether a drawable presentation was scheduled
    pub presented: bool,
    /// GPU-visible contents of every referenced buffer, captured at commit
    /// time and keyed by address
    pub buffer_snapshots: HashMap<u64, Vec<u8>>,
}

struct Submission {
    record: SubmissionRecord,
    read_buffers: Vec<Arc<BufferState>>,
    handlers: Vec<Box<dyn FnOnce() + Send>>,
}

struct QueueState {
    pending: Mutex<VecDeque<Submission>>,
}

/// Command queue of the [`SoftwareDevice`]
#[derive(Clone)]
pub struct SoftwareQueue {
    state: Arc<QueueState>,
}

impl SoftwareQueue {
    fn pending_count(&self) -> usize {
        self.state.pending.lock().expect("lock poisoned").len()
    }

    fn complete_oldest(&self) -> Option<SubmissionRecord> {
        let submission = self.state.pending.lock().expect("lock poisoned").pop_front()?;
        // Clear pending reads before running handlers: a handler may wake a
        // waiter that immediately rewrites one of these buffers.
        for buffer in &submission.read_buffers {
            buffer.pending_reads.fetch_sub(1, Ordering::AcqRel);
        }
        for handler in submission.handlers {
            handler();
        }
        Some(submission.record)
    }
}

struct PassRecord {
    draws: Vec<DrawRecord>,
    referenced: Vec<SoftwareBuffer>,
}

/// Render encoder of the [`SoftwareDevice`]
pub struct SoftwareRenderEncoder {
    sink: Arc<Mutex<Vec<PassRecord>>>,
    pipeline: Option<&'static str>,
    vertex_buffers: Vec<(u32, u64)>,
    used_resources: Vec<u64>,
    cull_mode: Option<CullMode>,
    winding: Option<Winding>,
    draws: Vec<DrawRecord>,
    referenced: Vec<SoftwareBuffer>,
}

impl SoftwareRenderEncoder {
    fn reference(&mut self, buffer: &SoftwareBuffer) {
        if !self
            .referenced
            .iter()
            .any(|b| b.gpu_address() == buffer.gpu_address())
        {
            self.referenced.push(buffer.clone());
        }
    }
}

impl RenderEncoder for SoftwareRenderEncoder {
    type Device = SoftwareDevice;

    fn set_pipeline(&mut self, pipeline: &SoftwarePipeline) {
        self.pipeline = Some(pipeline.state.label);
    }

    fn set_depth_state(&mut self, _state: &SoftwareDepthState) {}

    fn set_vertex_buffer(&mut self, buffer: &SoftwareBuffer, offset: usize, slot: u32) {
        self.vertex_buffers.retain(|(s, _)| *s != slot);
        self.vertex_buffers.push((slot, buffer.gpu_address() + offset as u64));
        self.reference(buffer);
    }

    fn use_resource(&mut self, buffer: &SoftwareBuffer, _usage: ResourceUsage) {
        self.used_resources.push(buffer.gpu_address());
        self.reference(buffer);
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = Some(mode);
    }

    fn set_front_facing_winding(&mut self, winding: Winding) {
        self.winding = Some(winding);
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        index_type: IndexType,
        index_buffer: &SoftwareBuffer,
        index_offset: usize,
        instance_count: u32,
    ) {
        self.reference(index_buffer);
        self.draws.push(DrawRecord {
            vertex_buffers: self.vertex_buffers.clone(),
            used_resources: self.used_resources.clone(),
            index_buffer: index_buffer.gpu_address() + index_offset as u64,
            index_count,
            index_type,
            instance_count,
            cull_mode: self.cull_mode,
            winding: self.winding,
            pipeline: self.pipeline.unwrap_or("<none>"),
        });
    }

    fn end_encoding(self) {
        self.sink.lock().expect("lock poisoned").push(PassRecord {
            draws: self.draws,
            referenced: self.referenced,
        });
    }
}

/// Command buffer of the [`SoftwareDevice`]
pub struct SoftwareCommandBuffer {
    queue: Arc<QueueState>,
    passes: Arc<Mutex<Vec<PassRecord>>>,
    handlers: Vec<Box<dyn FnOnce() + Send>>,
    drawable: Option<SoftwareDrawable>,
}

impl CommandBuffer for SoftwareCommandBuffer {
    type Device = SoftwareDevice;
    type Encoder = SoftwareRenderEncoder;

    fn on_completed(&mut self, handler: Box<dyn FnOnce() + Send + 'static>) {
        self.handlers.push(handler);
    }

    fn render_encoder(&mut self, _pass: &SoftwarePassDescriptor) -> GpuResult<SoftwareRenderEncoder> {
        Ok(SoftwareRenderEncoder {
            sink: Arc::clone(&self.passes),
            pipeline: None,
            vertex_buffers: Vec::new(),
            used_resources: Vec::new(),
            cull_mode: None,
            winding: None,
            draws: Vec::new(),
            referenced: Vec::new(),
        })
    }

    fn present(&mut self, drawable: SoftwareDrawable) {
        self.drawable = Some(drawable);
    }

    fn commit(self) {
        let passes = std::mem::take(&mut *self.passes.lock().expect("lock poisoned"));

        let mut draws = Vec::new();
        let mut read_buffers: Vec<Arc<BufferState>> = Vec::new();
        let mut buffer_snapshots = HashMap::new();
        for pass in passes {
            draws.extend(pass.draws);
            for buffer in pass.referenced {
                if buffer_snapshots.contains_key(&buffer.gpu_address()) {
                    continue;
                }
                buffer_snapshots.insert(buffer.gpu_address(), buffer.gpu_contents());
                buffer.state.pending_reads.fetch_add(1, Ordering::AcqRel);
                read_buffers.push(Arc::clone(&buffer.state));
            }
        }

        let presented = self.drawable.is_some();
        if let Some(drawable) = self.drawable {
            drawable.surface.presents.fetch_add(1, Ordering::AcqRel);
        }

        self.queue.pending.lock().expect("lock poisoned").push_back(Submission {
            record: SubmissionRecord {
                draws,
                presented,
                buffer_snapshots,
            },
            read_buffers,
            handlers: self.handlers,
        });
    }
}

impl CommandQueue for SoftwareQueue {
    type Device = SoftwareDevice;
    type CommandBuffer = SoftwareCommandBuffer;

    fn command_buffer(&self) -> SoftwareCommandBuffer {
        SoftwareCommandBuffer {
            queue: Arc::clone(&self.state),
            passes: Arc::new(Mutex::new(Vec::new())),
            handlers: Vec::new(),
            drawable: None,
        }
    }
}

struct DeviceState {
    next_address: AtomicU64,
    buffers: Mutex<HashMap<u64, Weak<BufferState>>>,
    queues: Mutex<Vec<SoftwareQueue>>,
    diagnostics: Arc<Diagnostics>,
}

/// The in-process device implementation
#[derive(Clone)]
pub struct SoftwareDevice {
    state: Arc<DeviceState>,
}

impl Default for SoftwareDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareDevice {
    /// Create a fresh device with no allocations or queues
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(DeviceState {
                next_address: AtomicU64::new(ADDRESS_BASE),
                buffers: Mutex::new(HashMap::new()),
                queues: Mutex::new(Vec::new()),
                diagnostics: Arc::new(Diagnostics::default()),
            }),
        }
    }

    /// Resolve a GPU address back to its buffer, as an indirect table
    /// consumer would
    #[must_use]
    pub fn resolve_buffer(&self, address: u64) -> Option<SoftwareBuffer> {
        let buffers = self.state.buffers.lock().expect("lock poisoned");
        buffers
            .get(&address)
            .and_then(Weak::upgrade)
            .map(|state| SoftwareBuffer { state })
    }

    /// Number of committed submissions whose completion has not fired yet,
    /// across all queues of this device
    #[must_use]
    pub fn pending_submissions(&self) -> usize {
        let queues = self.state.queues.lock().expect("lock poisoned");
        queues.iter().map(SoftwareQueue::pending_count).sum()
    }

    /// Fire the completion of the oldest pending submission.
    ///
    /// Clears the submission's buffer reads, then runs its completion
    /// handlers on the calling thread. Returns what the submission did, or
    /// `None` if nothing is pending.
    pub fn complete_oldest_submission(&self) -> Option<SubmissionRecord> {
        let queues = self.state.queues.lock().expect("lock poisoned").clone();
        queues.iter().find_map(|queue| queue.complete_oldest())
    }

    /// Complete every pending submission in order
    pub fn drain_submissions(&self) -> Vec<SubmissionRecord> {
        let mut records = Vec::new();
        while let Some(record) = self.complete_oldest_submission() {
            records.push(record);
        }
        records
    }

    /// Safety violations observed so far (writes to buffers with pending
    /// GPU reads)
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        self.state.diagnostics.violations.lock().expect("lock poisoned").clone()
    }
}

impl Device for SoftwareDevice {
    type Buffer = SoftwareBuffer;
    type Pipeline = SoftwarePipeline;
    type DepthState = SoftwareDepthState;
    type Queue = SoftwareQueue;
    type ArgEncoder = SoftwareArgumentEncoder;
    type PassDescriptor = SoftwarePassDescriptor;
    type Drawable = SoftwareDrawable;

    fn new_queue(&self) -> GpuResult<SoftwareQueue> {
        let queue = SoftwareQueue {
            state: Arc::new(QueueState {
                pending: Mutex::new(VecDeque::new()),
            }),
        };
        self.state.queues.lock().expect("lock poisoned").push(queue.clone());
        Ok(queue)
    }

    fn new_buffer(&self, len: usize, mode: StorageMode) -> GpuResult<SoftwareBuffer> {
        if len == 0 {
            return Err(GpuError::BufferAllocation {
                size: 0,
                reason: "zero-length allocation".into(),
            });
        }
        let address = self.state.next_address.fetch_add(0x100, Ordering::AcqRel);
        let state = Arc::new(BufferState {
            address,
            len,
            mode,
            cpu: Mutex::new(vec![0; len]),
            gpu: Mutex::new(vec![0; len]),
            pending_reads: AtomicUsize::new(0),
            diagnostics: Arc::clone(&self.state.diagnostics),
        });
        self.state
            .buffers
            .lock()
            .expect("lock poisoned")
            .insert(address, Arc::downgrade(&state));
        Ok(SoftwareBuffer { state })
    }

    fn new_pipeline(&self, descriptor: &PipelineDescriptor) -> GpuResult<SoftwarePipeline> {
        if descriptor.shader_source.trim().is_empty() {
            return Err(GpuError::ShaderCompilation(format!(
                "{}: empty shader source",
                descriptor.label
            )));
        }
        for entry in [descriptor.vertex_entry, descriptor.fragment_entry] {
            if !descriptor.shader_source.contains(entry) {
                return Err(GpuError::ShaderCompilation(format!(
                    "{}: entry point `{entry}` not found in shader source",
                    descriptor.label
                )));
            }
        }
        Ok(SoftwarePipeline {
            state: Arc::new(PipelineState {
                label: descriptor.label,
                vertex_arguments: descriptor.vertex_arguments,
            }),
        })
    }

    fn new_depth_state(&self, descriptor: &DepthStencilDescriptor) -> GpuResult<SoftwareDepthState> {
        Ok(SoftwareDepthState {
            descriptor: *descriptor,
        })
    }

    fn argument_encoder(
        &self,
        pipeline: &SoftwarePipeline,
        buffer_index: u32,
    ) -> GpuResult<SoftwareArgumentEncoder> {
        let layout = pipeline
            .state
            .vertex_arguments
            .filter(|layout| layout.buffer_index == buffer_index)
            .ok_or(GpuError::NoArgumentTable(buffer_index))?;
        Ok(SoftwareArgumentEncoder {
            layout,
            target: None,
        })
    }
}

/// Render-target descriptor handed out by [`SoftwareSurface`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwarePassDescriptor {}

struct SurfaceState {
    presents: AtomicUsize,
}

/// Presentable drawable handed out by [`SoftwareSurface`]
pub struct SoftwareDrawable {
    surface: Arc<SurfaceState>,
}

/// A headless display surface counting presented frames
#[derive(Clone)]
pub struct SoftwareSurface {
    state: Arc<SurfaceState>,
}

impl Default for SoftwareSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareSurface {
    /// Create a surface with zero presented frames
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(SurfaceState {
                presents: AtomicUsize::new(0),
            }),
        }
    }

    /// Number of drawables presented so far
    #[must_use]
    pub fn presented_frames(&self) -> usize {
        self.state.presents.load(Ordering::Acquire)
    }
}

impl RenderSurface for SoftwareSurface {
    type Device = SoftwareDevice;

    fn pass_descriptor(&self) -> GpuResult<SoftwarePassDescriptor> {
        Ok(SoftwarePassDescriptor {})
    }

    fn drawable(&self) -> GpuResult<SoftwareDrawable> {
        Ok(SoftwareDrawable {
            surface: Arc::clone(&self.state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{CompareFunction, PixelFormat};

    fn test_pipeline_descriptor() -> PipelineDescriptor {
        PipelineDescriptor {
            label: "test",
            shader_source: "fn vertex_main() {} fn fragment_main() {}",
            vertex_entry: "vertex_main",
            fragment_entry: "fragment_main",
            color_format: PixelFormat::Bgra8UnormSrgb,
            depth_format: None,
            vertex_arguments: Some(ArgumentTableLayout {
                buffer_index: 0,
                entries: 2,
            }),
        }
    }

    #[test]
    fn test_managed_buffer_requires_mark_modified() {
        let device = SoftwareDevice::new();
        let buffer = device.new_buffer(4, StorageMode::Managed).expect("alloc");

        buffer.write(0, &[1, 2, 3, 4]);
        assert_eq!(buffer.gpu_contents(), vec![0, 0, 0, 0]);

        buffer.mark_modified(0..4);
        assert_eq!(buffer.gpu_contents(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_shared_buffer_is_immediately_coherent() {
        let device = SoftwareDevice::new();
        let buffer = device.new_buffer(2, StorageMode::Shared).expect("alloc");
        buffer.write(0, &[9, 8]);
        assert_eq!(buffer.gpu_contents(), vec![9, 8]);
    }

    #[test]
    fn test_zero_length_allocation_fails() {
        let device = SoftwareDevice::new();
        assert!(device.new_buffer(0, StorageMode::Managed).is_err());
    }

    #[test]
    fn test_address_resolution_round_trip() {
        let device = SoftwareDevice::new();
        let buffer = device.new_buffer(8, StorageMode::Shared).expect("alloc");
        buffer.write(0, &[7; 8]);

        let resolved = device.resolve_buffer(buffer.gpu_address()).expect("resolve");
        assert_eq!(resolved.gpu_contents(), vec![7; 8]);
    }

    #[test]
    fn test_pipeline_compilation_rejects_missing_entry_point() {
        let device = SoftwareDevice::new();
        let mut descriptor = test_pipeline_descriptor();
        descriptor.vertex_entry = "missing_main";
        let result = device.new_pipeline(&descriptor);
        assert!(matches!(result, Err(GpuError::ShaderCompilation(_))));
    }

    #[test]
    fn test_argument_encoder_requires_declared_table() {
        let device = SoftwareDevice::new();
        let mut descriptor = test_pipeline_descriptor();
        descriptor.vertex_arguments = None;
        let pipeline = device.new_pipeline(&descriptor).expect("pipeline");
        assert!(matches!(
            device.argument_encoder(&pipeline, 0),
            Err(GpuError::NoArgumentTable(0))
        ));
    }

    #[test]
    fn test_completion_clears_pending_reads_before_handlers() {
        let device = SoftwareDevice::new();
        let queue = device.new_queue().expect("queue");
        let buffer = device.new_buffer(4, StorageMode::Shared).expect("alloc");
        let depth = device
            .new_depth_state(&DepthStencilDescriptor {
                compare: CompareFunction::Less,
                write_enabled: true,
            })
            .expect("depth state");
        let pipeline = device.new_pipeline(&test_pipeline_descriptor()).expect("pipeline");

        let mut cmd = queue.command_buffer();
        let probe = buffer.clone();
        cmd.on_completed(Box::new(move || {
            // By the time the handler fires the buffer must be writable again
            probe.write(0, &[1]);
        }));
        let mut encoder = cmd.render_encoder(&SoftwarePassDescriptor {}).expect("encoder");
        encoder.set_pipeline(&pipeline);
        encoder.set_depth_state(&depth);
        encoder.set_vertex_buffer(&buffer, 0, 0);
        encoder.draw_indexed(3, IndexType::U16, &buffer, 0, 1);
        encoder.end_encoding();
        cmd.commit();

        assert_eq!(device.pending_submissions(), 1);
        let record = device.complete_oldest_submission().expect("submission");
        assert_eq!(record.draws.len(), 1);
        assert_eq!(record.draws[0].instance_count, 1);
        assert!(device.violations().is_empty());
    }

    #[test]
    fn test_write_during_pending_read_is_a_violation() {
        let device = SoftwareDevice::new();
        let queue = device.new_queue().expect("queue");
        let buffer = device.new_buffer(4, StorageMode::Shared).expect("alloc");
        let pipeline = device.new_pipeline(&test_pipeline_descriptor()).expect("pipeline");

        let mut cmd = queue.command_buffer();
        let mut encoder = cmd.render_encoder(&SoftwarePassDescriptor {}).expect("encoder");
        encoder.set_pipeline(&pipeline);
        encoder.set_vertex_buffer(&buffer, 0, 0);
        encoder.draw_indexed(3, IndexType::U16, &buffer, 0, 1);
        encoder.end_encoding();
        cmd.commit();

        buffer.write(0, &[0xff]);
        assert_eq!(device.violations().len(), 1);

        device.drain_submissions();
        buffer.write(0, &[0xfe]);
        assert_eq!(device.violations().len(), 1);
    }
}
