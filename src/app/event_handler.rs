//! Event handler module.
//!
//! Contains the [`App`] struct and its winit event handling.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

use crate::app::app_state::AppState;
use crate::assets;
use crate::config::{DemoConfig, RenderMode, SceneKind};
use crate::error::{RenderError, RenderResult};
use crate::renderer::gpu::Gpu;
use crate::renderer::{SurfaceRenderer, TextureRenderer, TriangleRenderer};

/// Builds the scene selected by `config`.
pub fn build_renderer(config: &DemoConfig) -> Box<dyn SurfaceRenderer> {
    match config.scene {
        SceneKind::Triangle => Box::new(TriangleRenderer::new(
            config.triangle.clone(),
            config.clear_color,
        )),
        SceneKind::Texture => {
            let mut renderer = TextureRenderer::new(config.texture.fit, config.clear_color);
            renderer.set_image(assets::image_or_checkerboard(
                config.texture.image.as_deref(),
            ));
            Box::new(renderer)
        }
    }
}

/// Main application struct that manages the window lifecycle and event handling.
///
/// # Lifecycle
/// 1. Created with [`App::new`], which only creates the WGPU instance
/// 2. `resumed` creates the window (once) and a surface, then the device (once)
/// 3. `suspended` drops the surface; the next `resumed` recreates it
/// 4. The application runs until the window is closed
pub struct App {
    /// The WGPU instance for graphics operations.
    pub instance: wgpu::Instance,
    config: DemoConfig,
    /// Device, surface and scene; `None` until the first resume.
    pub state: Option<AppState>,
    /// The application window, `None` until the first resume.
    pub window: Option<Arc<Window>>,
}

impl App {
    pub fn new(config: DemoConfig) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            config,
            state: None,
            window: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> RenderResult<Arc<Window>> {
        if let Some(window) = &self.window {
            return Ok(window.clone());
        }
        let attributes = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attributes)?);
        self.window = Some(window.clone());
        Ok(window)
    }

    /// Creates a surface for the window and hands it to the scene.
    fn set_window(&mut self, event_loop: &ActiveEventLoop) -> RenderResult<()> {
        let window = self.create_window(event_loop)?;
        let surface = self.instance.create_surface(window.clone())?;

        if self.state.is_none() {
            let gpu = pollster::block_on(Gpu::for_surface(&self.instance, &surface))?;
            self.state = Some(AppState::new(gpu, build_renderer(&self.config)));
        }
        let Some(state) = &mut self.state else {
            return Ok(());
        };

        let size = window.inner_size();
        state.attach_surface(surface, size.width, size.height)?;
        window.request_redraw();
        Ok(())
    }

    fn handle_resized(&mut self, width: u32, height: u32) {
        let Some(state) = &mut self.state else {
            log::warn!("Cannot resize surface without state initialized");
            return;
        };
        if state.resize(width, height) {
            log::debug!("Resized to {width}x{height}");
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }

    fn handle_redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };
        match state.render() {
            Ok(()) => {}
            Err(RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                state.reconfigure_surface();
            }
            Err(RenderError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                log::error!("Out of memory while acquiring a frame; stopping");
                event_loop.exit();
            }
            Err(err) => log::warn!("Skipping frame: {err}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.set_window(event_loop) {
            log::error!("Failed to initialise rendering: {err}");
            event_loop.exit();
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.detach_surface();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("The close button was pressed; stopping");
                if let Some(state) = &mut self.state {
                    state.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resized(new_size.width, new_size.height);
            }
            WindowEvent::RedrawRequested => self.handle_redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.config.render_mode == RenderMode::Continuous {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
    }
}
