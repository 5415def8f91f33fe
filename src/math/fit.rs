//! Orthographic bounds that fit a unit quad to a viewport.
//!
//! The textured quad always spans `[-1, 1]` on both axes. Instead of resizing
//! the geometry, the projection's extents are widened or narrowed so the quad
//! keeps the image's aspect ratio on screen.

use serde::{Deserialize, Serialize};

use crate::math::mat::Mat4;

/// How an image is fitted into a viewport with a different aspect ratio.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Whole image visible, empty bars on the short axis.
    #[default]
    Contain,
    /// Viewport fully covered, image cropped on the long axis.
    Cover,
    /// Image stretched to the viewport, aspect ratio ignored.
    Stretch,
}

/// Left/right/bottom/top extents of an orthographic projection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl OrthoBounds {
    fn symmetric(half_width: f32, half_height: f32) -> Self {
        Self {
            left: -half_width,
            right: half_width,
            bottom: -half_height,
            top: half_height,
        }
    }

    pub fn projection(&self, near: f32, far: f32) -> Mat4 {
        Mat4::ortho(self.left, self.right, self.bottom, self.top, near, far)
    }
}

fn ratio(width: u32, height: u32) -> Option<f32> {
    (width > 0 && height > 0).then(|| width as f32 / height as f32)
}

/// Computes the projection extents for an `image` shown in a `viewport`.
///
/// Both sizes are `(width, height)` in pixels. A zero-sized image or viewport
/// falls back to the unit box.
pub fn fit_ortho(image: (u32, u32), viewport: (u32, u32), mode: FitMode) -> OrthoBounds {
    let (Some(image_ratio), Some(view_ratio)) =
        (ratio(image.0, image.1), ratio(viewport.0, viewport.1))
    else {
        return OrthoBounds::symmetric(1.0, 1.0);
    };

    let image_is_wider = image_ratio > view_ratio;
    match (mode, image_is_wider) {
        (FitMode::Stretch, _) => OrthoBounds::symmetric(1.0, 1.0),
        (FitMode::Contain, true) | (FitMode::Cover, false) => {
            OrthoBounds::symmetric(1.0, image_ratio / view_ratio)
        }
        (FitMode::Contain, false) | (FitMode::Cover, true) => {
            OrthoBounds::symmetric(view_ratio / image_ratio, 1.0)
        }
    }
}
