//! # Program and Bind Group Builders
//!
//! Fluent wrappers that collect the pieces of a [`ProgramDescriptor`] or a
//! bind group layout and hand them to wgpu in one call.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let layout = BindGroupLayoutBuilder::new(&device)
//!     .with_label("Texture Bind Group Layout")
//!     .with_texture(0, wgpu::ShaderStages::FRAGMENT)
//!     .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
//!     .build();
//!
//! let program = ProgramBuilder::new(&device, surface_format)
//!     .with_label("Textured Quad")
//!     .with_shaders(VERTEX_SHADER, FRAGMENT_SHADER)
//!     .with_vertex_buffer(QuadPosition::desc())
//!     .with_vertex_buffer(QuadTexCoord::desc())
//!     .with_bind_group_layout(&layout)
//!     .with_topology(wgpu::PrimitiveTopology::TriangleStrip)
//!     .build()?;
//! ```

use wgpu::util::DeviceExt;

use crate::error::RenderResult;
use crate::renderer::loader::{self, Program, ProgramDescriptor};

/// Builder for [`Program`]s.
///
/// ## Default Configuration
///
/// - Blend state: `REPLACE` (no blending)
/// - Cull mode: none, both windings are drawn
/// - Primitive topology: `TriangleList`
pub struct ProgramBuilder<'a> {
    device: &'a wgpu::Device,
    target_format: wgpu::TextureFormat,
    label: &'a str,
    vertex_source: &'a str,
    fragment_source: &'a str,
    vertex_buffers: Vec<wgpu::VertexBufferLayout<'a>>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayout>,
    topology: wgpu::PrimitiveTopology,
    blend_state: Option<wgpu::BlendState>,
    cull_mode: Option<wgpu::Face>,
}

impl<'a> ProgramBuilder<'a> {
    /// Create a new builder rendering into targets of `target_format`.
    pub fn new(device: &'a wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        Self {
            device,
            target_format,
            label: "program",
            vertex_source: "",
            fragment_source: "",
            vertex_buffers: Vec::new(),
            bind_group_layouts: Vec::new(),
            topology: wgpu::PrimitiveTopology::TriangleList,
            blend_state: Some(wgpu::BlendState::REPLACE),
            cull_mode: None,
        }
    }

    /// Set the label used for the pipeline and its layout, and in link errors.
    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    /// Set the WGSL sources of the vertex and fragment stages.
    ///
    /// The vertex source must define `vs_main`, the fragment source `fs_main`.
    pub fn with_shaders(mut self, vertex: &'a str, fragment: &'a str) -> Self {
        self.vertex_source = vertex;
        self.fragment_source = fragment;
        self
    }

    /// Add a vertex buffer layout. Slot numbers follow call order.
    pub fn with_vertex_buffer(mut self, layout: wgpu::VertexBufferLayout<'a>) -> Self {
        self.vertex_buffers.push(layout);
        self
    }

    /// Add a bind group layout. Group numbers follow call order.
    pub fn with_bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayout) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    pub fn with_topology(mut self, topology: wgpu::PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Enable standard alpha blending.
    pub fn with_alpha_blending(mut self) -> Self {
        self.blend_state = Some(wgpu::BlendState::ALPHA_BLENDING);
        self
    }

    /// Compile and link the program. See [`loader::load_program`].
    pub fn build(self) -> RenderResult<Program> {
        loader::load_program(
            self.device,
            &ProgramDescriptor {
                label: self.label,
                vertex_source: self.vertex_source,
                fragment_source: self.fragment_source,
                vertex_buffers: &self.vertex_buffers,
                bind_group_layouts: &self.bind_group_layouts,
                topology: self.topology,
                target_format: self.target_format,
                blend: self.blend_state,
                cull_mode: self.cull_mode,
            },
        )
    }
}

/// Builder for creating bind group layouts with common resource patterns.
///
/// ## Supported Resource Types
///
/// - 2D textures with float sampling
/// - Filtering samplers
/// - Uniform buffers
pub struct BindGroupLayoutBuilder<'a> {
    device: &'a wgpu::Device,
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    label: Option<&'a str>,
}

impl<'a> BindGroupLayoutBuilder<'a> {
    pub fn new(device: &'a wgpu::Device) -> Self {
        Self {
            device,
            entries: Vec::new(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a filterable 2D texture binding.
    ///
    /// In WGSL: `@group(N) @binding(B) var t: texture_2d<f32>;`
    pub fn with_texture(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        });
        self
    }

    /// Add a filtering sampler binding.
    ///
    /// In WGSL: `@group(N) @binding(B) var s: sampler;`
    pub fn with_sampler(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        self
    }

    /// Add a uniform buffer binding.
    ///
    /// In WGSL: `@group(N) @binding(B) var<uniform> u: MyUniforms;`
    pub fn with_uniform_buffer(mut self, binding: u32, visibility: wgpu::ShaderStages) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        });
        self
    }

    pub fn build(self) -> wgpu::BindGroupLayout {
        self.device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &self.entries,
                label: self.label,
            })
    }
}

/// Helper for creating vertex buffers from a slice of `Pod` vertices
pub fn create_vertex_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    vertices: &[T],
    label: &str,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::cast_slice(vertices),
        usage: wgpu::BufferUsages::VERTEX,
    })
}

/// Helper for creating uniform buffers that can be rewritten each frame
pub fn create_uniform_buffer<T: bytemuck::Pod>(
    device: &wgpu::Device,
    data: &T,
    label: &str,
) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(data),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}
