//! Shader, program and texture loading.
//!
//! Thin synchronous wrappers over the wgpu calls the scenes need:
//!
//! - [`load_shader`] compiles one WGSL stage and reports the compiler log on failure
//! - [`load_program`] compiles both stages and links them into a render pipeline
//! - [`load_texture`] / [`load_texture_from_bytes`] upload RGBA8 pixels, creating the
//!   texture on first use and updating it in place afterwards
//!
//! Compile and link status are read back immediately through a validation
//! error scope, so a failure is known (and logged) before the call returns.

use std::fmt;

use crate::error::{RenderError, RenderResult};

/// Entry point every vertex shader must define.
pub const VERTEX_ENTRY: &str = "vs_main";
/// Entry point every fragment shader must define.
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Pixel format of uploaded textures.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

const BYTES_PER_TEXEL: u32 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn entry_point(self) -> &'static str {
        match self {
            ShaderStage::Vertex => VERTEX_ENTRY,
            ShaderStage::Fragment => FRAGMENT_ENTRY,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A compiled shader stage.
pub struct Shader {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
}

/// Runs `create` inside a validation error scope and returns what it produced
/// together with the first validation error raised, if any.
fn with_validation<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> (T, Option<wgpu::Error>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error)
}

/// Compiles a single WGSL shader stage.
///
/// On failure the compiler output is logged and returned in
/// [`RenderError::ShaderCompile`].
pub fn load_shader(device: &wgpu::Device, source: &str, stage: ShaderStage) -> RenderResult<Shader> {
    let label = format!("{stage} shader");
    let (module, error) = with_validation(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });

    if let Some(error) = error {
        let err = RenderError::ShaderCompile {
            stage,
            log: error.to_string(),
        };
        log::error!("{err}");
        return Err(err);
    }

    Ok(Shader { module, stage })
}

/// Everything needed to compile and link a program.
pub struct ProgramDescriptor<'a> {
    pub label: &'a str,
    pub vertex_source: &'a str,
    pub fragment_source: &'a str,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub topology: wgpu::PrimitiveTopology,
    pub target_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub cull_mode: Option<wgpu::Face>,
}

/// A linked vertex + fragment pipeline.
pub struct Program {
    pipeline: wgpu::RenderPipeline,
    label: String,
}

impl Program {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Compiles both stages of `desc` and links them into a [`Program`].
///
/// Returns the first compile error if either stage fails; the fragment stage is
/// not compiled when the vertex stage already failed.
pub fn load_program(device: &wgpu::Device, desc: &ProgramDescriptor<'_>) -> RenderResult<Program> {
    let vertex = load_shader(device, desc.vertex_source, ShaderStage::Vertex)?;
    let fragment = load_shader(device, desc.fragment_source, ShaderStage::Fragment)?;

    let (pipeline, error) = with_validation(device, || {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(desc.label),
            bind_group_layouts: desc.bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(desc.label),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(vertex.stage.entry_point()),
                buffers: desc.vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: Some(fragment.stage.entry_point()),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.target_format,
                    blend: desc.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: desc.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: desc.cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    });

    if let Some(error) = error {
        let err = RenderError::ProgramLink {
            label: desc.label.to_string(),
            log: error.to_string(),
        };
        log::error!("{err}");
        return Err(err);
    }

    log::debug!("Linked program `{}`", desc.label);
    Ok(Program {
        pipeline,
        label: desc.label.to_string(),
    })
}

/// A sampled 2D texture with linear filtering and clamp-to-edge wrapping.
pub struct Texture2d {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    width: u32,
    height: u32,
}

impl Texture2d {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("lumen texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("lumen sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            width,
            height,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

/// What a texture load did with its slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureUpload {
    /// The slot was empty; a texture was created and fully uploaded.
    Created,
    /// The slot held a texture; its top-left region was overwritten.
    Updated,
}

/// Validates an upload of `len` bytes at `width x height` against the texture
/// already in the slot, if any, and decides between creation and update.
///
/// `max_dimension` is the device's `max_texture_dimension_2d`.
pub fn plan_upload(
    existing: Option<(u32, u32)>,
    width: u32,
    height: u32,
    len: usize,
    max_dimension: u32,
) -> RenderResult<TextureUpload> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyTexture { width, height });
    }
    if width > max_dimension || height > max_dimension {
        return Err(RenderError::TextureTooLarge {
            width,
            height,
            max: max_dimension,
        });
    }

    let expected = width as usize * height as usize * BYTES_PER_TEXEL as usize;
    if len != expected {
        return Err(RenderError::PixelDataLength {
            expected,
            actual: len,
        });
    }

    match existing {
        None => Ok(TextureUpload::Created),
        Some((texture_width, texture_height))
            if width <= texture_width && height <= texture_height =>
        {
            Ok(TextureUpload::Updated)
        }
        Some((texture_width, texture_height)) => Err(RenderError::TextureTooSmall {
            width,
            height,
            texture_width,
            texture_height,
        }),
    }
}

/// Uploads tightly packed RGBA8 `pixels` into the texture held by `slot`.
///
/// An empty slot receives a new `width x height` texture. An occupied slot is
/// updated in place starting at texel `(0, 0)`. Sizes beyond the device
/// limit are rejected before any wgpu call; the slot is left untouched when
/// validation fails.
pub fn load_texture_from_bytes(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pixels: &[u8],
    width: u32,
    height: u32,
    slot: &mut Option<Texture2d>,
) -> RenderResult<TextureUpload> {
    let upload = plan_upload(
        slot.as_ref().map(Texture2d::size),
        width,
        height,
        pixels.len(),
        device.limits().max_texture_dimension_2d,
    )?;
    let texture = slot.get_or_insert_with(|| Texture2d::new(device, width, height));

    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(BYTES_PER_TEXEL * width),
            rows_per_image: Some(height),
        },
        extent(width, height),
    );

    log::trace!("Texture upload {upload:?} {width}x{height}");
    Ok(upload)
}

/// Uploads a decoded image; see [`load_texture_from_bytes`].
pub fn load_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    image: &image::RgbaImage,
    slot: &mut Option<Texture2d>,
) -> RenderResult<TextureUpload> {
    load_texture_from_bytes(device, queue, image.as_raw(), image.width(), image.height(), slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::gpu::test_gpu;
    use std::sync::Mutex;

    const MAX: u32 = 8192;

    /// Keeps every error-level message logged by the process.
    struct ErrorLog(Mutex<Vec<String>>);

    impl log::Log for ErrorLog {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Error
        }

        fn log(&self, record: &log::Record<'_>) {
            if self.enabled(record.metadata()) {
                if let Ok(mut lines) = self.0.lock() {
                    lines.push(record.args().to_string());
                }
            }
        }

        fn flush(&self) {}
    }

    static ERROR_LOG: ErrorLog = ErrorLog(Mutex::new(Vec::new()));

    fn logged_errors() -> Vec<String> {
        ERROR_LOG.0.lock().map(|lines| lines.clone()).unwrap_or_default()
    }

    fn capture_error_log() {
        // Fails harmlessly when another test installed it first.
        let _ = log::set_logger(&ERROR_LOG);
        log::set_max_level(log::LevelFilter::Error);
    }

    const VERTEX_OK: &str = r#"
        struct VertexOutput {
            @builtin(position) position: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec2<f32>) -> VertexOutput {
            var out: VertexOutput;
            out.position = vec4<f32>(position, 0.0, 1.0);
            out.uv = position * 0.5 + 0.5;
            return out;
        }
    "#;

    const FRAGMENT_OK: &str = r#"
        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return vec4<f32>(uv, 0.0, 1.0);
        }
    "#;

    const VERTEX_NO_VARYING: &str = r#"
        @vertex
        fn vs_main(@location(0) position: vec2<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 0.0, 1.0);
        }
    "#;

    const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: 8,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
    };

    fn descriptor<'a>(vertex: &'a str, fragment: &'a str) -> ProgramDescriptor<'a> {
        ProgramDescriptor {
            label: "test program",
            vertex_source: vertex,
            fragment_source: fragment,
            vertex_buffers: std::slice::from_ref(&POSITION_LAYOUT),
            bind_group_layouts: &[],
            topology: wgpu::PrimitiveTopology::TriangleList,
            target_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            blend: None,
            cull_mode: None,
        }
    }

    #[test]
    fn plan_upload_creates_into_empty_slot() {
        assert_eq!(plan_upload(None, 2, 3, 24, MAX).unwrap(), TextureUpload::Created);
    }

    #[test]
    fn plan_upload_updates_when_sub_image_fits() {
        assert_eq!(
            plan_upload(Some((4, 4)), 4, 4, 64, MAX).unwrap(),
            TextureUpload::Updated
        );
        assert_eq!(
            plan_upload(Some((4, 4)), 2, 1, 8, MAX).unwrap(),
            TextureUpload::Updated
        );
    }

    #[test]
    fn plan_upload_rejects_bad_input() {
        assert!(matches!(
            plan_upload(None, 0, 4, 0, MAX),
            Err(RenderError::EmptyTexture { width: 0, height: 4 })
        ));
        assert!(matches!(
            plan_upload(None, 2, 2, 15, MAX),
            Err(RenderError::PixelDataLength {
                expected: 16,
                actual: 15
            })
        ));
        assert!(matches!(
            plan_upload(Some((2, 2)), 3, 2, 24, MAX),
            Err(RenderError::TextureTooSmall { .. })
        ));
    }

    #[test]
    fn plan_upload_rejects_textures_beyond_device_limit() {
        assert_eq!(plan_upload(None, 8, 8, 256, 8).unwrap(), TextureUpload::Created);
        assert!(matches!(
            plan_upload(None, 9, 1, 36, 8),
            Err(RenderError::TextureTooLarge {
                width: 9,
                height: 1,
                max: 8
            })
        ));
        assert!(matches!(
            plan_upload(None, 1, 9, 36, 8),
            Err(RenderError::TextureTooLarge { .. })
        ));
    }

    #[test]
    fn stage_entry_points() {
        assert_eq!(ShaderStage::Vertex.entry_point(), "vs_main");
        assert_eq!(ShaderStage::Fragment.entry_point(), "fs_main");
    }

    #[test]
    fn valid_shader_pair_links() {
        let Some(gpu) = test_gpu() else { return };
        let program = load_program(&gpu.device, &descriptor(VERTEX_OK, FRAGMENT_OK)).unwrap();
        assert_eq!(program.label(), "test program");
    }

    #[test]
    fn invalid_vertex_shader_fails_to_compile() {
        let Some(gpu) = test_gpu() else { return };
        let broken = "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return undefined_value; }";

        let err = load_shader(&gpu.device, broken, ShaderStage::Vertex).err().unwrap();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));

        let err = load_program(&gpu.device, &descriptor(broken, FRAGMENT_OK))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
    }

    #[test]
    fn invalid_fragment_shader_fails_to_compile() {
        let Some(gpu) = test_gpu() else { return };
        let err = load_program(&gpu.device, &descriptor(VERTEX_OK, "this is not wgsl"))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            RenderError::ShaderCompile {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    }

    #[test]
    fn mismatched_stage_interface_fails_to_link() {
        let Some(gpu) = test_gpu() else { return };
        let err = load_program(&gpu.device, &descriptor(VERTEX_NO_VARYING, FRAGMENT_OK))
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::ProgramLink { .. }));
    }

    #[test]
    fn second_upload_updates_existing_texture() {
        let Some(gpu) = test_gpu() else { return };
        let mut slot = None;
        let image = image::RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));

        let first = load_texture(&gpu.device, &gpu.queue, &image, &mut slot).unwrap();
        assert_eq!(first, TextureUpload::Created);
        assert_eq!(slot.as_ref().map(Texture2d::size), Some((4, 2)));

        let second = load_texture(&gpu.device, &gpu.queue, &image, &mut slot).unwrap();
        assert_eq!(second, TextureUpload::Updated);

        let patch = [0u8; 2 * 2 * 4];
        let third =
            load_texture_from_bytes(&gpu.device, &gpu.queue, &patch, 2, 2, &mut slot).unwrap();
        assert_eq!(third, TextureUpload::Updated);
        assert_eq!(slot.as_ref().map(Texture2d::size), Some((4, 2)));
    }

    #[test]
    fn oversize_update_leaves_slot_untouched() {
        let Some(gpu) = test_gpu() else { return };
        let mut slot = None;
        let small = [0u8; 2 * 2 * 4];
        load_texture_from_bytes(&gpu.device, &gpu.queue, &small, 2, 2, &mut slot).unwrap();

        let large = [0u8; 4 * 4 * 4];
        let err = load_texture_from_bytes(&gpu.device, &gpu.queue, &large, 4, 4, &mut slot)
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::TextureTooSmall { .. }));
        assert_eq!(slot.as_ref().map(Texture2d::size), Some((2, 2)));
    }

    #[test]
    fn texture_beyond_device_limit_is_rejected() {
        let Some(gpu) = test_gpu() else { return };
        let max = gpu.device.limits().max_texture_dimension_2d;
        let width = max + 1;
        let pixels = vec![0u8; width as usize * 4];
        let mut slot = None;

        let err = load_texture_from_bytes(&gpu.device, &gpu.queue, &pixels, width, 1, &mut slot)
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::TextureTooLarge { max: m, .. } if m == max));
        assert!(slot.is_none());
    }

    #[test]
    fn compile_and_link_failures_are_logged() {
        let Some(gpu) = test_gpu() else { return };
        capture_error_log();

        let compile = load_program(&gpu.device, &descriptor(VERTEX_OK, "fn fs_main( {"))
            .err()
            .unwrap();
        let link = load_program(&gpu.device, &descriptor(VERTEX_NO_VARYING, FRAGMENT_OK))
            .err()
            .unwrap();

        let lines = logged_errors();
        let compile_line = compile.to_string();
        assert!(compile_line.starts_with("compile fragment shader error: "));
        assert!(lines.contains(&compile_line), "missing {compile_line:?} in {lines:?}");
        let link_line = link.to_string();
        assert!(link_line.starts_with("link program `test program` error: "));
        assert!(lines.contains(&link_line), "missing {link_line:?} in {lines:?}");
    }
}
