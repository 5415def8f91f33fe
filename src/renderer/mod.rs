//! Rendering: GPU setup, the loading utilities and the two demo scenes.
//!
//! Every scene implements [`SurfaceRenderer`], the three callbacks the host
//! window drives:
//!
//! 1. [`SurfaceRenderer::surface_created`] once a surface exists (and again after it was lost)
//! 2. [`SurfaceRenderer::surface_changed`] whenever the surface size changes
//! 3. [`SurfaceRenderer::draw_frame`] for every frame that has to be presented
//!
//! All three run synchronously on the event loop thread.

/// Device, queue and window surface setup.
pub mod gpu;
/// Shader compilation, program linking and texture upload.
pub mod loader;
/// Builders for programs and bind group layouts.
pub mod pipeline_builder;
/// Image-on-a-quad scene.
pub mod texture;
/// Flat-coloured triangle scene.
pub mod triangle;
/// Uniform block layouts.
pub mod uniform;
/// Vertex layouts and the fixed scene geometry.
pub mod vertex;

use crate::error::RenderResult;
use gpu::Gpu;

pub use texture::TextureRenderer;
pub use triangle::TriangleRenderer;

/// Where a frame is recorded: the command encoder and the colour target.
pub struct Frame<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
}

impl Frame<'_> {
    /// Begins the frame's render pass, clearing the target to `color`.
    pub fn begin_clear_pass(&mut self, label: &str, color: [f32; 4]) -> wgpu::RenderPass<'_> {
        self.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color[0] as f64,
                        g: color[1] as f64,
                        b: color[2] as f64,
                        a: color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        })
    }
}

/// Lifecycle callbacks of a scene attached to a window surface.
///
/// `surface_created` may fail (for example when a shader does not compile).
/// The caller logs the error and keeps calling the other callbacks; a scene
/// without a program only clears the frame.
pub trait SurfaceRenderer {
    /// Allocates GPU resources for targets of `format`.
    fn surface_created(&mut self, gpu: &Gpu, format: wgpu::TextureFormat) -> RenderResult<()>;

    /// Records the new surface size and recomputes the camera.
    fn surface_changed(&mut self, gpu: &Gpu, width: u32, height: u32);

    /// Records the commands for one frame.
    fn draw_frame(&mut self, gpu: &Gpu, frame: &mut Frame<'_>);
}

/// Offscreen colour target for GPU-backed scene tests.
#[cfg(test)]
pub(crate) fn test_target(gpu: &Gpu, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("test target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TEST_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
pub(crate) const TEST_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Records one frame of `renderer` into an offscreen target and submits it.
#[cfg(test)]
pub(crate) fn draw_offscreen(gpu: &Gpu, renderer: &mut dyn SurfaceRenderer, width: u32, height: u32) {
    let (_texture, view) = test_target(gpu, width, height);
    let mut encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });
    {
        let mut frame = Frame {
            encoder: &mut encoder,
            view: &view,
        };
        renderer.draw_frame(gpu, &mut frame);
    }
    gpu.queue.submit(std::iter::once(encoder.finish()));
    let _ = gpu.device.poll(wgpu::Maintain::Wait);
}
