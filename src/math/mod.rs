//! Math utilities for the demo scenes.
//!
//! This module provides the small matrix and vector types the renderers need
//! to build their model-view-projection matrices. All types are `Pod` so they
//! can be copied straight into GPU uniform buffers.
//!
//! # Module Organization
//!
//! - [`vec`] contains [`Vec3`] and its operations
//! - [`mat`] contains [`Mat4`] and the projection/view constructors
//! - [`fit`] computes orthographic bounds that keep an image's aspect ratio

pub mod fit;
pub mod mat;
pub mod vec;

pub use fit::{FitMode, OrthoBounds, fit_ortho};
pub use mat::Mat4;
pub use vec::Vec3;
