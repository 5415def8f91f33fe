//! Lumen - a minimal wgpu demo
//!
//! Renders one of two scenes into a window: a flat-coloured triangle, or an
//! image drawn on a quad that keeps the image's aspect ratio. Scenes are
//! driven through three callbacks (surface created, surface changed, draw
//! frame) that the window's lifecycle events trigger.
//!
//! # Architecture
//! - `app/`: window lifecycle and event handling
//! - `renderer/`: GPU setup, shader/program/texture loading and the scenes
//! - `math/`: matrices, vectors and projection fitting
//! - `config`: TOML file and command line options
//!
//! # Usage
//! `lumen --scene texture --image photo.png --fit cover`

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod math;
pub mod renderer;

use std::process::ExitCode;

use clap::Parser;
use winit::event_loop::EventLoop;

use crate::config::{CliArgs, DemoConfig};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() -> ExitCode {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let args = CliArgs::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = match DemoConfig::resolve(&args) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::debug!("Configuration: {config:?}");

    run(config)
}

/// Creates the event loop and runs the app until the window closes.
fn run(config: DemoConfig) -> ExitCode {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Error creating event loop: {err}");
            return ExitCode::FAILURE;
        }
    };

    event_loop.set_control_flow(app::control_flow(config.render_mode));

    let mut app = app::App::new(config);
    match event_loop.run_app(&mut app) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Event loop failed: {err}");
            ExitCode::FAILURE
        }
    }
}
