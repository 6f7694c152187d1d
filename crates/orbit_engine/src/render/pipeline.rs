//! Pipeline object construction
//!
//! Compiles the shader program into one immutable pipeline-state object and
//! builds the depth-stencil state, once, at renderer construction. There is
//! no runtime fallback shader: any failure here halts startup with a
//! descriptive error.

use crate::gpu::{
    ArgumentTableLayout, CompareFunction, DepthFormat, DepthStencilDescriptor, Device, GpuResult,
    PipelineDescriptor, PixelFormat,
};
use crate::render::BindingMode;

/// Shader program for the direct-binding variant: positions at slot 0,
/// instance records at slot 1, camera record at slot 2.
const INSTANCED_SHADER: &str = r"
struct InstanceData {
    transform: mat4x4<f32>,
    color: vec4<f32>,
};

struct CameraData {
    perspective: mat4x4<f32>,
    world: mat4x4<f32>,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@group(0) @binding(0) var<storage, read> positions: array<vec3<f32>>;
@group(0) @binding(1) var<storage, read> instances: array<InstanceData>;
@group(0) @binding(2) var<uniform> camera: CameraData;

@vertex
fn vertex_main(@builtin(vertex_index) vertex_id: u32,
               @builtin(instance_index) instance_id: u32) -> VertexOut {
    var out: VertexOut;
    var pos = vec4<f32>(positions[vertex_id], 1.0);
    pos = instances[instance_id].transform * pos;
    out.position = camera.perspective * camera.world * pos;
    out.color = instances[instance_id].color.rgb;
    return out;
}

@fragment
fn fragment_main(in: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
";

/// Shader program for the argument-table variant: the vertex stage reaches
/// positions and per-vertex colors through one table at slot 0.
const ARGUMENT_TABLE_SHADER: &str = r"
struct InstanceData {
    transform: mat4x4<f32>,
    color: vec4<f32>,
};

struct CameraData {
    perspective: mat4x4<f32>,
    world: mat4x4<f32>,
};

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

// Table entry 0: positions, entry 1: per-vertex colors
@group(0) @binding(0) var<storage, read> positions: array<vec3<f32>>;
@group(0) @binding(1) var<storage, read> vertex_colors: array<vec3<f32>>;
@group(1) @binding(0) var<storage, read> instances: array<InstanceData>;
@group(1) @binding(1) var<uniform> camera: CameraData;

@vertex
fn vertex_main(@builtin(vertex_index) vertex_id: u32,
               @builtin(instance_index) instance_id: u32) -> VertexOut {
    var out: VertexOut;
    var pos = vec4<f32>(positions[vertex_id], 1.0);
    pos = instances[instance_id].transform * pos;
    out.position = camera.perspective * camera.world * pos;
    out.color = instances[instance_id].color.rgb * vertex_colors[vertex_id];
    return out;
}

@fragment
fn fragment_main(in: VertexOut) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
";

/// Number of entries in the argument-table variant's table
pub const ARGUMENT_TABLE_ENTRIES: u32 = 2;

/// The immutable pipeline objects, built once and shared read-only across
/// all frames
pub struct PipelineObjects<D: Device> {
    pipeline: D::Pipeline,
    depth_state: D::DepthState,
}

impl<D: Device> PipelineObjects<D> {
    /// Compile the shader program and fixed-function state for the given
    /// binding mode.
    ///
    /// # Errors
    /// Returns the device's compilation error verbatim; callers treat this
    /// as fatal.
    pub fn build(device: &D, mode: BindingMode) -> GpuResult<Self> {
        let descriptor = match mode {
            BindingMode::Direct => PipelineDescriptor {
                label: "instanced-forward",
                shader_source: INSTANCED_SHADER,
                vertex_entry: "vertex_main",
                fragment_entry: "fragment_main",
                color_format: PixelFormat::Bgra8UnormSrgb,
                depth_format: Some(DepthFormat::Depth16Unorm),
                vertex_arguments: None,
            },
            BindingMode::ArgumentTable => PipelineDescriptor {
                label: "instanced-forward-argtable",
                shader_source: ARGUMENT_TABLE_SHADER,
                vertex_entry: "vertex_main",
                fragment_entry: "fragment_main",
                color_format: PixelFormat::Bgra8UnormSrgb,
                depth_format: Some(DepthFormat::Depth16Unorm),
                vertex_arguments: Some(ArgumentTableLayout {
                    buffer_index: 0,
                    entries: ARGUMENT_TABLE_ENTRIES,
                }),
            },
        };

        let pipeline = device.new_pipeline(&descriptor)?;
        let depth_state = device.new_depth_state(&DepthStencilDescriptor {
            compare: CompareFunction::Less,
            write_enabled: true,
        })?;

        log::info!("compiled pipeline `{}`", descriptor.label);

        Ok(Self {
            pipeline,
            depth_state,
        })
    }

    /// The compiled pipeline-state object
    pub fn pipeline(&self) -> &D::Pipeline {
        &self.pipeline
    }

    /// The depth-stencil state object (compare Less, writes enabled)
    pub fn depth_state(&self) -> &D::DepthState {
        &self.depth_state
    }
}
