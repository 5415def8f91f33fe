//! Application module.
//!
//! Hosts a scene in a winit window. [`App`] receives the platform's
//! lifecycle and window events and turns them into the scene's surface
//! callbacks through [`AppState`]:
//!
//! - resume: a surface is created, then `surface_created` and `surface_changed` run
//! - resize: the surface is reconfigured, then `surface_changed` runs
//! - redraw: `draw_frame` records into the acquired frame, which is presented
//! - suspend: the surface is dropped
//!
//! Everything runs on the event loop thread.

pub mod app_state;
pub mod event_handler;

pub use app_state::AppState;
pub use event_handler::App;

use winit::event_loop::ControlFlow;

use crate::config::RenderMode;

/// Event loop control flow for a render mode.
pub fn control_flow(mode: RenderMode) -> ControlFlow {
    match mode {
        RenderMode::WhenDirty => ControlFlow::Wait,
        RenderMode::Continuous => ControlFlow::Poll,
    }
}
