//! # Assets Module
//!
//! Images shown by the texture scene: decoded from disk with the `image`
//! crate, or generated when nothing is configured.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::RenderResult;

/// Default checkerboard edge length in pixels.
pub const CHECKERBOARD_SIZE: u32 = 256;
/// Default checkerboard cell edge length in pixels.
pub const CHECKERBOARD_CELL: u32 = 32;

const LIGHT: Rgba<u8> = Rgba([230, 230, 230, 255]);
const DARK: Rgba<u8> = Rgba([40, 40, 48, 255]);

/// Decodes a PNG or JPEG file into RGBA8 pixels.
pub fn load_image(path: impl AsRef<Path>) -> RenderResult<RgbaImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgba8();
    log::info!(
        "Loaded image {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Square checkerboard of `size` pixels with `cell`-pixel squares, light in the top-left.
pub fn checkerboard(size: u32, cell: u32) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            LIGHT
        } else {
            DARK
        }
    })
}

/// The configured image, or the default checkerboard when there is none or it fails to load.
pub fn image_or_checkerboard(path: Option<&Path>) -> RgbaImage {
    match path.map(load_image) {
        Some(Ok(image)) => image,
        Some(Err(err)) => {
            log::error!("Failed to load image, showing checkerboard: {err}");
            checkerboard(CHECKERBOARD_SIZE, CHECKERBOARD_CELL)
        }
        None => checkerboard(CHECKERBOARD_SIZE, CHECKERBOARD_CELL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    #[test]
    fn checkerboard_alternates_cells() {
        let board = checkerboard(8, 2);
        assert_eq!(board.dimensions(), (8, 8));
        assert_eq!(*board.get_pixel(0, 0), LIGHT);
        assert_eq!(*board.get_pixel(1, 1), LIGHT);
        assert_eq!(*board.get_pixel(2, 0), DARK);
        assert_eq!(*board.get_pixel(0, 2), DARK);
        assert_eq!(*board.get_pixel(2, 2), LIGHT);
    }

    #[test]
    fn zero_cell_does_not_divide_by_zero() {
        let board = checkerboard(3, 0);
        assert_eq!(*board.get_pixel(1, 0), DARK);
    }

    #[test]
    fn png_file_loads_as_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.png");
        checkerboard(4, 2).save(&path).unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
        assert_eq!(*image.get_pixel(3, 0), DARK);
    }

    #[test]
    fn missing_file_is_an_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_image(dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, RenderError::Image(_)));
    }

    #[test]
    fn falls_back_to_checkerboard() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");

        let image = image_or_checkerboard(Some(&missing));
        assert_eq!(image.dimensions(), (CHECKERBOARD_SIZE, CHECKERBOARD_SIZE));
        let image = image_or_checkerboard(None);
        assert_eq!(image.dimensions(), (CHECKERBOARD_SIZE, CHECKERBOARD_SIZE));
    }
}
