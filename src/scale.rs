//! Scaling images onto the fixed set of square icon canvases.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;

/// Edge lengths of the frames packed into every icon, ascending.  The
/// set matches what Windows Explorer expects to find when it picks a
/// display size.
pub const ICON_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

/// Computes the dimensions of an image scaled to fit a square canvas
/// with the given edge length, preserving the aspect ratio: the longer
/// source edge maps exactly to `size`, the shorter one scales by the
/// same ratio, truncated, never below one pixel.
///
/// # Examples
/// ```
/// use icopack::scale::fit_dimensions;
/// assert_eq!(fit_dimensions(4000, 2000, 16), (16, 8));
/// assert_eq!(fit_dimensions(2000, 4000, 16), (8, 16));
/// assert_eq!(fit_dimensions(500, 500, 64), (64, 64));
/// ```
pub fn fit_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width > height {
        (size, scaled_edge(height, size, width))
    } else {
        (scaled_edge(width, size, height), size)
    }
}

fn scaled_edge(short: u32, size: u32, long: u32) -> u32 {
    let scaled = (f64::from(short) * f64::from(size) / f64::from(long)) as u32;
    scaled.max(1)
}

/// Scales the source image to fit a `size`x`size` canvas and centers
/// it on a fully transparent background.  Pixels are copied directly
/// onto the canvas, without alpha blending.
pub fn letterbox(source: &RgbaImage, size: u32) -> RgbaImage {
    let (width, height) = fit_dimensions(source.width(), source.height(), size);
    let scaled = imageops::resize(source, width, height, FilterType::Lanczos3);
    let mut canvas = RgbaImage::new(size, size);
    let x = (size - width) / 2;
    let y = (size - height) / 2;
    imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
    debug!("placed {}x{} image at ({}, {}) on a {}x{} canvas", width, height, x, y, size, size);
    canvas
}

/// Renders the source image onto one canvas per entry of
/// [`ICON_SIZES`], in that order.  Each size is rendered independently
/// from the original source image.
pub fn render_sizes(source: &RgbaImage) -> Vec<RgbaImage> {
    ICON_SIZES
        .iter()
        .map(|&size| letterbox(source, size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn opaque_white(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn fit_landscape() {
        assert_eq!(fit_dimensions(4000, 2000, 256), (256, 128));
    }

    #[test]
    fn fit_portrait() {
        assert_eq!(fit_dimensions(100, 400, 32), (8, 32));
    }

    #[test]
    fn fit_square() {
        assert_eq!(fit_dimensions(500, 500, 16), (16, 16));
    }

    #[test]
    fn fit_truncates_fractional_edges() {
        // 999 * 16 / 1000 = 15.984, which truncates to 15.
        assert_eq!(fit_dimensions(1000, 999, 16), (16, 15));
    }

    #[test]
    fn fit_never_collapses_an_edge() {
        assert_eq!(fit_dimensions(1000, 1, 16), (16, 1));
        assert_eq!(fit_dimensions(1, 1000, 16), (1, 16));
    }

    #[test]
    fn letterbox_centers_landscape_content() {
        let canvas = letterbox(&opaque_white(4, 2), 16);
        assert_eq!(canvas.dimensions(), (16, 16));
        // Scaled content is 16x8, so rows 4..12 are opaque and the
        // bands above and below stay transparent.
        assert_eq!(canvas.get_pixel(0, 3).0[3], 0);
        assert_eq!(canvas.get_pixel(0, 4).0[3], 255);
        assert_eq!(canvas.get_pixel(15, 11).0[3], 255);
        assert_eq!(canvas.get_pixel(15, 12).0[3], 0);
    }

    #[test]
    fn letterbox_centers_portrait_content() {
        let canvas = letterbox(&opaque_white(2, 4), 16);
        assert_eq!(canvas.get_pixel(3, 0).0[3], 0);
        assert_eq!(canvas.get_pixel(4, 0).0[3], 255);
        assert_eq!(canvas.get_pixel(11, 15).0[3], 255);
        assert_eq!(canvas.get_pixel(12, 15).0[3], 0);
    }

    #[test]
    fn letterbox_fills_canvas_for_square_input() {
        let canvas = letterbox(&opaque_white(500, 500), 64);
        for &(x, y) in &[(0, 0), (63, 0), (0, 63), (63, 63), (32, 32)] {
            assert_eq!(canvas.get_pixel(x, y).0[3], 255);
        }
    }

    #[test]
    fn letterbox_upscales_small_input() {
        let canvas = letterbox(&opaque_white(4, 4), 256);
        assert_eq!(canvas.dimensions(), (256, 256));
        assert_eq!(canvas.get_pixel(0, 0).0[3], 255);
        assert_eq!(canvas.get_pixel(255, 255).0[3], 255);
    }

    #[test]
    fn render_sizes_covers_the_whole_size_list() {
        let frames = render_sizes(&opaque_white(100, 50));
        assert_eq!(frames.len(), ICON_SIZES.len());
        for (frame, &size) in frames.iter().zip(ICON_SIZES.iter()) {
            assert_eq!(frame.dimensions(), (size, size));
        }
    }

    #[test]
    fn uneven_offset_truncates_toward_zero() {
        // 16x3 content on a 16-pixel canvas sits at y == (16 - 3) / 2.
        let canvas = letterbox(&opaque_white(32, 6), 16);
        assert_eq!(canvas.get_pixel(0, 5).0[3], 0);
        assert_eq!(canvas.get_pixel(0, 6).0[3], 255);
        assert_eq!(canvas.get_pixel(0, 8).0[3], 255);
        assert_eq!(canvas.get_pixel(0, 9).0[3], 0);
    }
}
