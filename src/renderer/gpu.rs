//! GPU device and presentation surface setup.
//!
//! [`Gpu`] owns the device and queue and outlives any particular surface.
//! [`SurfaceContext`] owns the window surface and its configuration; it is
//! dropped when the platform takes the surface away and rebuilt when it comes
//! back.

use crate::error::{RenderError, RenderResult};

/// Device and queue used by every renderer.
pub struct Gpu {
    /// The WGPU device for resource creation.
    pub device: wgpu::Device,
    /// The WGPU queue for submitting commands.
    pub queue: wgpu::Queue,
    adapter: wgpu::Adapter,
}

impl Gpu {
    /// Creates a device able to present to `surface`.
    pub async fn for_surface(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> RenderResult<Self> {
        let adapter = Self::create_adapter(instance, Some(surface)).await?;
        Self::from_adapter(adapter).await
    }

    /// Creates a device without any surface, for offscreen work.
    pub async fn headless(instance: &wgpu::Instance) -> RenderResult<Self> {
        let adapter = Self::create_adapter(instance, None).await?;
        Self::from_adapter(adapter).await
    }

    async fn from_adapter(adapter: wgpu::Adapter) -> RenderResult<Self> {
        let info = adapter.get_info();
        log::info!(
            "Using adapter {} ({:?}, {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("lumen device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self {
            device,
            queue,
            adapter,
        })
    }

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'static>>,
    ) -> RenderResult<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: surface,
            })
            .await
            .ok_or(RenderError::NoAdapter)
    }
}

/// A configured window surface.
pub struct SurfaceContext {
    /// The WGPU surface for presenting rendered frames.
    pub surface: wgpu::Surface<'static>,
    /// The surface configuration (format, size, etc.).
    pub config: wgpu::SurfaceConfiguration,
}

impl SurfaceContext {
    /// Picks a format for `surface` and configures it at the given size.
    pub fn new(
        gpu: &Gpu,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> RenderResult<Self> {
        let capabilities = surface.get_capabilities(&gpu.adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&gpu.device, &config);
        log::debug!("Configured surface {format:?} {}x{}", config.width, config.height);

        Ok(Self { surface, config })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigures the surface. Zero-sized requests are ignored.
    pub fn resize(&mut self, gpu: &Gpu, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&gpu.device, &self.config);
        true
    }

    pub fn reconfigure(&self, gpu: &Gpu) {
        self.surface.configure(&gpu.device, &self.config);
    }

    /// Acquires the next frame and a view onto it.
    pub fn acquire(&self) -> RenderResult<(wgpu::SurfaceTexture, wgpu::TextureView)> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok((surface_texture, view))
    }
}

/// Headless device for GPU-backed tests; `None` when the machine has no adapter.
#[cfg(test)]
pub(crate) fn test_gpu() -> Option<Gpu> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    match pollster::block_on(Gpu::headless(&instance)) {
        Ok(gpu) => Some(gpu),
        Err(err) => {
            eprintln!("skipping GPU test: {err}");
            None
        }
    }
}
