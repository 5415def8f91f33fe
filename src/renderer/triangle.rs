//! Flat-coloured triangle.
//!
//! The three vertices are already in clip space, so by default the transform
//! uniform is the identity. With `perspective` enabled the triangle is viewed
//! through a camera placed on the +Z axis instead.

use crate::config::TriangleConfig;
use crate::error::RenderResult;
use crate::math::{Mat4, Vec3};
use crate::renderer::gpu::Gpu;
use crate::renderer::loader::Program;
use crate::renderer::pipeline_builder::{
    BindGroupLayoutBuilder, ProgramBuilder, create_uniform_buffer, create_vertex_buffer,
};
use crate::renderer::uniform::TriangleUniforms;
use crate::renderer::vertex::{TRIANGLE_VERTICES, TriangleVertex};
use crate::renderer::{Frame, SurfaceRenderer};

const VERTEX_SHADER: &str = include_str!("shaders/triangle.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/triangle.frag.wgsl");

const EYE_DISTANCE: f32 = 7.0;
const NEAR: f32 = 3.0;
const FAR: f32 = 9.0;

/// Perspective camera for a `width x height` viewport: projection * view.
pub fn camera(width: u32, height: u32) -> Mat4 {
    let ratio = width as f32 / height.max(1) as f32;
    let projection = Mat4::frustum(-ratio, ratio, -1.0, 1.0, NEAR, FAR);
    let view = Mat4::look_at(
        Vec3::new(0.0, 0.0, EYE_DISTANCE),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    );
    projection.multiply(&view)
}

struct Resources {
    program: Option<Program>,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct TriangleRenderer {
    settings: TriangleConfig,
    clear_color: [f32; 4],
    uniforms: TriangleUniforms,
    resources: Option<Resources>,
}

impl TriangleRenderer {
    pub fn new(settings: TriangleConfig, clear_color: [f32; 4]) -> Self {
        Self {
            uniforms: TriangleUniforms::new(settings.color),
            settings,
            clear_color,
            resources: None,
        }
    }

    /// Transform for a `width x height` viewport: the camera when
    /// perspective is on, identity otherwise.
    fn mvp_for(&self, width: u32, height: u32) -> Mat4 {
        if self.settings.perspective {
            camera(width, height)
        } else {
            Mat4::identity()
        }
    }
}

impl SurfaceRenderer for TriangleRenderer {
    fn surface_created(&mut self, gpu: &Gpu, format: wgpu::TextureFormat) -> RenderResult<()> {
        let device = &gpu.device;
        let vertex_buffer = create_vertex_buffer(device, &TRIANGLE_VERTICES, "Triangle Vertices");
        let uniform_buffer = create_uniform_buffer(device, &self.uniforms, "Triangle Uniforms");

        let layout = BindGroupLayoutBuilder::new(device)
            .with_label("Triangle Bind Group Layout")
            .with_uniform_buffer(0, wgpu::ShaderStages::VERTEX_FRAGMENT)
            .build();
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Triangle Bind Group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let program = ProgramBuilder::new(device, format)
            .with_label("Triangle")
            .with_shaders(VERTEX_SHADER, FRAGMENT_SHADER)
            .with_vertex_buffer(TriangleVertex::desc())
            .with_bind_group_layout(&layout)
            .build();

        let (program, result) = match program {
            Ok(program) => (Some(program), Ok(())),
            Err(err) => (None, Err(err)),
        };
        self.resources = Some(Resources {
            program,
            vertex_buffer,
            uniform_buffer,
            bind_group,
        });
        result
    }

    fn surface_changed(&mut self, _gpu: &Gpu, width: u32, height: u32) {
        self.uniforms.mvp = self.mvp_for(width, height);
        log::debug!("Triangle viewport {width}x{height}");
    }

    fn draw_frame(&mut self, gpu: &Gpu, frame: &mut Frame<'_>) {
        let mut pass = frame.begin_clear_pass("Triangle Pass", self.clear_color);

        let Some(res) = &self.resources else {
            return;
        };
        let Some(program) = &res.program else {
            return;
        };

        gpu.queue
            .write_buffer(&res.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        pass.set_pipeline(program.pipeline());
        pass.set_bind_group(0, &res.bind_group, &[]);
        pass.set_vertex_buffer(0, res.vertex_buffer.slice(..));
        pass.draw(0..TRIANGLE_VERTICES.len() as u32, 0..1);
    }
}
