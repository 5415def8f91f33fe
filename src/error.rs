//! Error types shared by the loader, the scenes and the host glue.

use thiserror::Error;

use crate::renderer::loader::ShaderStage;

/// Errors raised while creating GPU resources or presenting frames.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The shader source failed to compile for the given stage.
    #[error("compile {stage} shader error: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// Both shaders compiled but could not be linked into a pipeline.
    #[error("link program `{label}` error: {log}")]
    ProgramLink { label: String, log: String },

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("pixel data has {actual} bytes, expected {expected}")]
    PixelDataLength { expected: usize, actual: usize },

    /// Textures must be at least one texel in each dimension.
    #[error("cannot upload an empty {width}x{height} texture")]
    EmptyTexture { width: u32, height: u32 },

    /// A sub-image update does not fit inside the existing texture.
    #[error("sub-image {width}x{height} does not fit texture {texture_width}x{texture_height}")]
    TextureTooSmall {
        width: u32,
        height: u32,
        texture_width: u32,
        texture_height: u32,
    },

    /// The texture would exceed the device's 2D texture size limit.
    #[error("texture {width}x{height} exceeds the device limit of {max} texels per side")]
    TextureTooLarge { width: u32, height: u32, max: u32 },

    #[error("no suitable graphics adapter found")]
    NoAdapter,

    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The adapter reports no texture format for the surface.
    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convenience alias used across the renderer.
pub type RenderResult<T> = Result<T, RenderError>;
