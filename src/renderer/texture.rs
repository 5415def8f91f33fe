//! Image drawn on a quad.
//!
//! The quad covers `[-1, 1]` on both axes and is viewed through an
//! orthographic camera whose extents come from [`fit_ortho`], so the image
//! keeps its aspect ratio whatever the window shape.
//!
//! The texture is uploaded lazily from `draw_frame`. The first upload creates
//! it; a later [`TextureRenderer::set_image`] with the same dimensions updates
//! it in place, while different dimensions drop it so the next upload
//! recreates it.

use image::RgbaImage;

use crate::error::RenderResult;
use crate::math::{FitMode, Mat4, Vec3, fit_ortho};
use crate::renderer::gpu::Gpu;
use crate::renderer::loader::{self, Program, Texture2d, TextureUpload};
use crate::renderer::pipeline_builder::{
    BindGroupLayoutBuilder, ProgramBuilder, create_uniform_buffer, create_vertex_buffer,
};
use crate::renderer::uniform::TextureUniforms;
use crate::renderer::vertex::{QUAD_POSITIONS, QUAD_TEX_COORDS, QuadPosition, QuadTexCoord};
use crate::renderer::{Frame, SurfaceRenderer};

const VERTEX_SHADER: &str = include_str!("shaders/texture.vert.wgsl");
const FRAGMENT_SHADER: &str = include_str!("shaders/texture.frag.wgsl");

const EYE_DISTANCE: f32 = 5.0;
const NEAR: f32 = 3.0;
const FAR: f32 = 7.0;

/// Orthographic camera fitting an `image` into a `viewport`: projection * view.
pub fn camera(image: (u32, u32), viewport: (u32, u32), fit: FitMode) -> Mat4 {
    let projection = fit_ortho(image, viewport, fit).projection(NEAR, FAR);
    let view = Mat4::look_at(
        Vec3::new(0.0, 0.0, EYE_DISTANCE),
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    );
    projection.multiply(&view)
}

struct Resources {
    program: Option<Program>,
    positions: wgpu::Buffer,
    tex_coords: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    texture_layout: wgpu::BindGroupLayout,
    texture: Option<Texture2d>,
    texture_bind_group: Option<wgpu::BindGroup>,
}

impl Resources {
    fn drop_texture(&mut self) {
        self.texture = None;
        self.texture_bind_group = None;
    }
}

pub struct TextureRenderer {
    fit: FitMode,
    clear_color: [f32; 4],
    image: Option<RgbaImage>,
    image_dirty: bool,
    viewport: (u32, u32),
    uniforms: TextureUniforms,
    resources: Option<Resources>,
}

impl TextureRenderer {
    pub fn new(fit: FitMode, clear_color: [f32; 4]) -> Self {
        Self {
            fit,
            clear_color,
            image: None,
            image_dirty: false,
            viewport: (0, 0),
            uniforms: TextureUniforms::default(),
            resources: None,
        }
    }

    /// Sets the image to show. It is uploaded on the next frame.
    pub fn set_image(&mut self, image: RgbaImage) {
        log::debug!("Image set: {}x{}", image.width(), image.height());

        let dimensions = image.dimensions();
        if let Some(res) = &mut self.resources {
            if res.texture.as_ref().map(Texture2d::size) != Some(dimensions) {
                res.drop_texture();
            }
        }

        self.image = Some(image);
        self.image_dirty = true;
        self.update_camera();
    }

    fn image_size(&self) -> (u32, u32) {
        self.image
            .as_ref()
            .map(RgbaImage::dimensions)
            .unwrap_or((1, 1))
    }

    fn update_camera(&mut self) {
        self.uniforms.mvp = camera(self.image_size(), self.viewport, self.fit);
    }

    fn upload_if_dirty(&mut self, gpu: &Gpu) {
        if !self.image_dirty {
            return;
        }
        let (Some(image), Some(res)) = (&self.image, &mut self.resources) else {
            return;
        };
        self.image_dirty = false;

        match loader::load_texture(&gpu.device, &gpu.queue, image, &mut res.texture) {
            Ok(TextureUpload::Created) => {
                let Some(texture) = &res.texture else {
                    return;
                };
                res.texture_bind_group =
                    Some(gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Texture Bind Group"),
                        layout: &res.texture_layout,
                        entries: &[
                            wgpu::BindGroupEntry {
                                binding: 0,
                                resource: wgpu::BindingResource::TextureView(texture.view()),
                            },
                            wgpu::BindGroupEntry {
                                binding: 1,
                                resource: wgpu::BindingResource::Sampler(texture.sampler()),
                            },
                        ],
                    }));
            }
            Ok(TextureUpload::Updated) => {}
            Err(err) => log::error!("Failed to upload image: {err}"),
        }
    }
}

impl SurfaceRenderer for TextureRenderer {
    fn surface_created(&mut self, gpu: &Gpu, format: wgpu::TextureFormat) -> RenderResult<()> {
        let device = &gpu.device;
        let positions = create_vertex_buffer(device, &QUAD_POSITIONS, "Quad Positions");
        let tex_coords = create_vertex_buffer(device, &QUAD_TEX_COORDS, "Quad Texture Coordinates");
        let uniform_buffer = create_uniform_buffer(device, &self.uniforms, "Texture Uniforms");

        let uniform_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Texture Uniform Layout")
            .with_uniform_buffer(0, wgpu::ShaderStages::VERTEX)
            .build();
        let texture_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Texture Sampler Layout")
            .with_texture(0, wgpu::ShaderStages::FRAGMENT)
            .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
            .build();

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Uniform Bind Group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let program = ProgramBuilder::new(device, format)
            .with_label("Textured Quad")
            .with_shaders(VERTEX_SHADER, FRAGMENT_SHADER)
            .with_vertex_buffer(QuadPosition::desc())
            .with_vertex_buffer(QuadTexCoord::desc())
            .with_bind_group_layout(&uniform_layout)
            .with_bind_group_layout(&texture_layout)
            .with_topology(wgpu::PrimitiveTopology::TriangleStrip)
            .with_alpha_blending()
            .build();

        let (program, result) = match program {
            Ok(program) => (Some(program), Ok(())),
            Err(err) => (None, Err(err)),
        };
        self.resources = Some(Resources {
            program,
            positions,
            tex_coords,
            uniform_buffer,
            uniform_bind_group,
            texture_layout,
            texture: None,
            texture_bind_group: None,
        });
        // A new surface means a new texture.
        self.image_dirty = self.image.is_some();
        result
    }

    fn surface_changed(&mut self, _gpu: &Gpu, width: u32, height: u32) {
        self.viewport = (width, height);
        self.update_camera();
        log::debug!("Texture viewport {width}x{height}");
    }

    fn draw_frame(&mut self, gpu: &Gpu, frame: &mut Frame<'_>) {
        self.upload_if_dirty(gpu);

        let mut pass = frame.begin_clear_pass("Texture Pass", self.clear_color);

        let Some(res) = &self.resources else {
            return;
        };
        let (Some(program), Some(texture_bind_group)) = (&res.program, &res.texture_bind_group)
        else {
            return;
        };

        gpu.queue
            .write_buffer(&res.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        pass.set_pipeline(program.pipeline());
        pass.set_bind_group(0, &res.uniform_bind_group, &[]);
        pass.set_bind_group(1, texture_bind_group, &[]);
        pass.set_vertex_buffer(0, res.positions.slice(..));
        pass.set_vertex_buffer(1, res.tex_coords.slice(..));
        pass.draw(0..QUAD_POSITIONS.len() as u32, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::gpu::test_gpu;
    use crate::renderer::{TEST_FORMAT, draw_offscreen};
    use approx::assert_relative_eq;

    fn texture_size(renderer: &TextureRenderer) -> Option<(u32, u32)> {
        renderer
            .resources
            .as_ref()
            .and_then(|res| res.texture.as_ref())
            .map(Texture2d::size)
    }

    #[test]
    fn camera_fits_quad_to_viewport_width_for_wide_images() {
        let mvp = camera((400, 100), (200, 200), FitMode::Contain);

        let top_right = mvp.transform([1.0, 1.0, 0.0, 1.0]);
        assert_relative_eq!(top_right[0] / top_right[3], 1.0, epsilon = 1e-6);
        assert_relative_eq!(top_right[1] / top_right[3], 0.25, epsilon = 1e-6);

        let depth = top_right[2] / top_right[3];
        assert!(depth > 0.0 && depth < 1.0);
    }

    #[test]
    fn changing_viewport_updates_camera() {
        let Some(gpu) = test_gpu() else { return };
        let mut renderer = TextureRenderer::new(FitMode::Contain, [0.0; 4]);
        renderer.set_image(RgbaImage::new(100, 100));

        renderer.surface_changed(&gpu, 200, 100);
        assert_eq!(
            renderer.uniforms.mvp,
            camera((100, 100), (200, 100), FitMode::Contain)
        );
    }

    #[test]
    fn no_image_draws_nothing_but_clear() {
        let Some(gpu) = test_gpu() else { return };
        let mut renderer = TextureRenderer::new(FitMode::Contain, [0.0; 4]);
        renderer.surface_created(&gpu, TEST_FORMAT).unwrap();
        renderer.surface_changed(&gpu, 32, 32);
        draw_offscreen(&gpu, &mut renderer, 32, 32);
        assert_eq!(texture_size(&renderer), None);
    }

    #[test]
    fn texture_is_created_once_then_updated_in_place() {
        let Some(gpu) = test_gpu() else { return };
        let mut renderer = TextureRenderer::new(FitMode::Contain, [0.0; 4]);
        renderer.set_image(RgbaImage::new(8, 4));
        renderer.surface_created(&gpu, TEST_FORMAT).unwrap();
        renderer.surface_changed(&gpu, 32, 32);

        draw_offscreen(&gpu, &mut renderer, 32, 32);
        assert_eq!(texture_size(&renderer), Some((8, 4)));
        assert!(!renderer.image_dirty);

        // Same size: kept and updated in place.
        renderer.set_image(RgbaImage::from_pixel(8, 4, image::Rgba([9, 9, 9, 255])));
        assert_eq!(texture_size(&renderer), Some((8, 4)));
        draw_offscreen(&gpu, &mut renderer, 32, 32);
        assert_eq!(texture_size(&renderer), Some((8, 4)));

        // New size: dropped and recreated on the next frame.
        renderer.set_image(RgbaImage::new(16, 16));
        assert_eq!(texture_size(&renderer), None);
        draw_offscreen(&gpu, &mut renderer, 32, 32);
        assert_eq!(texture_size(&renderer), Some((16, 16)));
    }

    #[test]
    fn recreated_surface_reuploads_image() {
        let Some(gpu) = test_gpu() else { return };
        let mut renderer = TextureRenderer::new(FitMode::Cover, [0.0; 4]);
        renderer.set_image(RgbaImage::new(4, 4));
        renderer.surface_created(&gpu, TEST_FORMAT).unwrap();
        draw_offscreen(&gpu, &mut renderer, 8, 8);

        renderer.surface_created(&gpu, TEST_FORMAT).unwrap();
        assert_eq!(texture_size(&renderer), None);
        assert!(renderer.image_dirty);
        draw_offscreen(&gpu, &mut renderer, 8, 8);
        assert_eq!(texture_size(&renderer), Some((4, 4)));
    }

    #[test]
    fn image_beyond_device_limit_only_clears() {
        let Some(gpu) = test_gpu() else { return };
        let max = gpu.device.limits().max_texture_dimension_2d;
        let mut renderer = TextureRenderer::new(FitMode::Contain, [0.0; 4]);
        renderer.set_image(RgbaImage::new(max + 1, 1));
        renderer.surface_created(&gpu, TEST_FORMAT).unwrap();
        renderer.surface_changed(&gpu, 16, 16);

        draw_offscreen(&gpu, &mut renderer, 16, 16);
        assert_eq!(texture_size(&renderer), None);
        assert!(!renderer.image_dirty);
    }
}
