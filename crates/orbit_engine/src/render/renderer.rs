//! Frame composer / draw orchestrator
//!
//! The per-frame driver. Each call to [`Renderer::render_frame`] walks one
//! frame through its states:
//!
//! ```text
//! Gated -> Preparing -> Submitted -> Completed
//! ```
//!
//! Gated: the frame pacer admits the frame once fewer than `N` frames are
//! in flight. Preparing: the animation state advances and the full instance
//! array plus camera record are written into the current frame slot.
//! Submitted: a command buffer binds the immutable pipeline objects and the
//! slot's buffers, issues one instanced indexed draw, schedules
//! presentation, and commits. Completed: the GPU-driven completion callback
//! releases the pacer from a thread that is not the submitting one.

use std::sync::Arc;

use crate::foundation::math::{identity, perspective};
use crate::gpu::{
    CommandBuffer, CommandQueue, CullMode, Device, GpuBuffer, IndexType, RenderEncoder,
    RenderSurface, ResourceUsage, Winding,
};
use crate::render::animation::AnimationState;
use crate::render::argument_table::ArgumentTable;
use crate::render::data::{CameraData, InstanceData};
use crate::render::frame_pacer::FramePacer;
use crate::render::frame_slots::FrameSlots;
use crate::render::geometry::GeometryBuffers;
use crate::render::instances::InstanceComposer;
use crate::render::pipeline::PipelineObjects;
use crate::render::{BindingMode, RenderResult, RendererConfig};

/// Vertical field of view of the fixed camera, in degrees
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
/// Fixed aspect ratio
pub const CAMERA_ASPECT: f32 = 1.0;
/// Near clip plane
pub const CAMERA_NEAR: f32 = 0.03;
/// Far clip plane
pub const CAMERA_FAR: f32 = 500.0;

/// Vertex-stage slot of the geometry (or argument table) binding
const SLOT_GEOMETRY: u32 = 0;
/// Vertex-stage slot of the per-frame instance array
const SLOT_INSTANCES: u32 = 1;
/// Vertex-stage slot of the per-frame camera record
const SLOT_CAMERA: u32 = 2;

/// The renderer: owns the immutable pipeline objects and geometry for its
/// whole lifetime, plus the frame slot pool and pacing gate that make
/// concurrent CPU preparation safe.
pub struct Renderer<D: Device> {
    queue: D::Queue,
    pipeline: PipelineObjects<D>,
    geometry: GeometryBuffers<D>,
    argument_table: Option<ArgumentTable<D>>,
    slots: FrameSlots<D>,
    pacer: Arc<FramePacer>,
    animation: AnimationState,
    scratch: Vec<InstanceData>,
    binding_mode: BindingMode,
}

/// Returns acquired pacer capacity if frame composition bails out before
/// commit. Once the command buffer is committed the completion handler owns
/// the release and the guard is disarmed.
struct PacerGuard {
    pacer: Arc<FramePacer>,
    armed: bool,
}

impl PacerGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PacerGuard {
    fn drop(&mut self) {
        if self.armed {
            self.pacer.release();
        }
    }
}

impl<D: Device> Renderer<D> {
    /// Build the complete pipeline: compile shaders, upload geometry,
    /// encode the argument table (in that binding mode), and allocate the
    /// frame slot pool.
    ///
    /// # Errors
    /// Any device failure here is fatal; nothing is retried.
    pub fn new(device: D, config: RendererConfig) -> RenderResult<Self> {
        config.validate()?;

        let queue = device.new_queue()?;
        let pipeline = PipelineObjects::build(&device, config.binding_mode)?;
        let geometry = GeometryBuffers::new(&device)?;
        let argument_table = match config.binding_mode {
            BindingMode::Direct => None,
            BindingMode::ArgumentTable => {
                Some(ArgumentTable::build(&device, pipeline.pipeline(), &geometry)?)
            }
        };
        let slots = FrameSlots::new(&device, config.frames_in_flight, config.instance_count)?;

        log::info!(
            "renderer ready: {} instances, {} frames in flight, {:?} binding",
            config.instance_count,
            config.frames_in_flight,
            config.binding_mode
        );

        Ok(Self {
            queue,
            pipeline,
            geometry,
            argument_table,
            slots,
            pacer: Arc::new(FramePacer::new(config.frames_in_flight)),
            animation: AnimationState::new(),
            scratch: vec![InstanceData::default(); config.instance_count],
            binding_mode: config.binding_mode,
        })
    }

    /// Number of instances drawn per frame
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.scratch.len()
    }

    /// Maximum frames in flight
    #[must_use]
    pub fn frames_in_flight(&self) -> usize {
        self.pacer.capacity()
    }

    /// Compose, submit, and present one frame.
    ///
    /// Blocks while `frames_in_flight` frames are already outstanding;
    /// this is the pipeline's only backpressure point. Returns once the
    /// frame is committed; GPU execution and the completion callback run
    /// asynchronously.
    ///
    /// # Errors
    /// Fails only at the surface/encoder seam (for example when the
    /// surface cannot produce a drawable).
    pub fn render_frame<S>(&mut self, surface: &S) -> RenderResult<()>
    where
        S: RenderSurface<Device = D>,
    {
        // Gated -> Preparing
        self.pacer.acquire();
        let guard = PacerGuard {
            pacer: Arc::clone(&self.pacer),
            armed: true,
        };
        let slot_index = self.slots.slot_index();
        let instance_buffer = self.slots.current().instance_buffer().clone();
        let camera_buffer = self.slots.current().camera_buffer().clone();
        self.slots.advance();

        // Preparing: overwrite this slot's generation in place
        let angles = self.animation.advance();
        let composer = InstanceComposer::new(self.scratch.len(), angles);
        for (index, record) in self.scratch.iter_mut().enumerate() {
            *record = composer.record(index);
        }
        instance_buffer.write(0, bytemuck::cast_slice(&self.scratch));
        instance_buffer.mark_modified(0..instance_buffer.len());

        let camera = CameraData {
            perspective: perspective(
                CAMERA_FOV_DEGREES.to_radians(),
                CAMERA_ASPECT,
                CAMERA_NEAR,
                CAMERA_FAR,
            ),
            world: identity(),
        };
        camera_buffer.write(0, bytemuck::bytes_of(&camera));
        camera_buffer.mark_modified(0..camera_buffer.len());

        log::trace!("composed frame into slot {slot_index} (spin {:.4})", angles.spin);

        // Preparing -> Submitted
        let mut cmd = self.queue.command_buffer();
        let pacer = Arc::clone(&self.pacer);
        cmd.on_completed(Box::new(move || pacer.release()));

        let pass = surface.pass_descriptor()?;
        let mut encoder = cmd.render_encoder(&pass)?;
        encoder.set_pipeline(self.pipeline.pipeline());
        encoder.set_depth_state(self.pipeline.depth_state());

        match (self.binding_mode, self.argument_table.as_ref()) {
            (BindingMode::ArgumentTable, Some(table)) => {
                encoder.set_vertex_buffer(table.buffer(), 0, SLOT_GEOMETRY);
                // Resources reached only through the table must be declared
                encoder.use_resource(self.geometry.positions(), ResourceUsage::Read);
                encoder.use_resource(self.geometry.colors(), ResourceUsage::Read);
            }
            _ => {
                encoder.set_vertex_buffer(self.geometry.positions(), 0, SLOT_GEOMETRY);
            }
        }
        encoder.set_vertex_buffer(&instance_buffer, 0, SLOT_INSTANCES);
        encoder.set_vertex_buffer(&camera_buffer, 0, SLOT_CAMERA);

        encoder.set_cull_mode(CullMode::Back);
        encoder.set_front_facing_winding(Winding::CounterClockwise);

        #[allow(clippy::cast_possible_truncation)]
        encoder.draw_indexed(
            self.geometry.index_count(),
            IndexType::U16,
            self.geometry.indices(),
            0,
            self.scratch.len() as u32,
        );
        encoder.end_encoding();

        cmd.present(surface.drawable()?);
        cmd.commit();
        guard.disarm();

        Ok(())
    }
}
