//! AppState module.
//!
//! This module defines the [`AppState`] struct, which ties the GPU device,
//! the current window surface and the active scene together, and drives the
//! scene's surface callbacks.

use crate::error::RenderResult;
use crate::renderer::gpu::{Gpu, SurfaceContext};
use crate::renderer::{Frame, SurfaceRenderer};

/// Holds all state required while the window is running.
///
/// The device and the scene live as long as the application. The surface
/// comes and goes with the platform's suspend/resume cycle.
pub struct AppState {
    /// Device and queue shared by every surface.
    pub gpu: Gpu,
    /// The configured window surface, `None` while suspended.
    pub surface: Option<SurfaceContext>,
    /// The scene attached to the window.
    pub renderer: Box<dyn SurfaceRenderer>,
}

impl AppState {
    pub fn new(gpu: Gpu, renderer: Box<dyn SurfaceRenderer>) -> Self {
        Self {
            gpu,
            surface: None,
            renderer,
        }
    }

    /// Configures `surface` and runs the created and changed callbacks.
    ///
    /// A scene that fails to build its program is kept; the error is logged
    /// and the scene only clears from then on.
    pub fn attach_surface(
        &mut self,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> RenderResult<()> {
        let context = SurfaceContext::new(&self.gpu, surface, width, height)?;
        let format = context.format();
        let (width, height) = context.size();
        self.surface = Some(context);

        if let Err(err) = self.renderer.surface_created(&self.gpu, format) {
            log::error!("Scene setup failed, drawing clear colour only: {err}");
        }
        self.renderer.surface_changed(&self.gpu, width, height);
        Ok(())
    }

    /// Drops the surface; the scene's resources stay until the next attach.
    pub fn detach_surface(&mut self) {
        if self.surface.take().is_some() {
            log::info!("Surface released");
        }
    }

    /// Applies a new window size. Returns `false` for zero sizes or when no surface exists.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let Some(surface) = &mut self.surface else {
            return false;
        };
        if !surface.resize(&self.gpu, width, height) {
            return false;
        }
        self.renderer.surface_changed(&self.gpu, width, height);
        true
    }

    /// Reconfigures a lost or outdated surface at its current size.
    pub fn reconfigure_surface(&mut self) {
        if let Some(surface) = &self.surface {
            log::warn!("Reconfiguring surface");
            surface.reconfigure(&self.gpu);
        }
    }

    /// Draws and presents one frame. Does nothing while suspended.
    pub fn render(&mut self) -> RenderResult<()> {
        let Some(surface) = &self.surface else {
            return Ok(());
        };
        let (surface_texture, view) = surface.acquire()?;

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        {
            let mut frame = Frame {
                encoder: &mut encoder,
                view: &view,
            };
            self.renderer.draw_frame(&self.gpu, &mut frame);
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Waits for submitted work before the device is dropped.
    pub fn shutdown(&mut self) {
        let _ = self.gpu.device.poll(wgpu::Maintain::Wait);
        self.detach_surface();
    }
}
