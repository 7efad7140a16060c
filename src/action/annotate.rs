use image::{Rgba, RgbaImage};

use crate::geometry::geometry_model::{Point, Size};

// ============================================================================
// Screenshot annotation primitives
// ============================================================================
//
// All coordinates here are screenshot pixel space; callers transform from
// global screen space first. Drawing is bounds-checked pixel by pixel, so a
// shape partially outside the capture renders its visible part and nothing
// panics.

const BOX_COLOR: Rgba<u8> = Rgba([255, 64, 64, 255]);
const MARKER_COLOR: Rgba<u8> = Rgba([255, 64, 64, 255]);
const RING_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

const BOX_THICKNESS: i64 = 3;
const MARKER_RADIUS: f64 = 12.0;
const RING_WIDTH: f64 = 3.0;

/// Pixel dimensions of a decoded image, as a geometry `Size`.
pub fn image_size(img: &RgbaImage) -> Size {
    Size {
        width: img.width() as f64,
        height: img.height() as f64,
    }
}

/// Draw a rectangle outline onto the image in place.
pub fn draw_box_outline(img: &mut RgbaImage, origin: Point, size: Size) {
    let w = img.width() as i64;
    let h = img.height() as i64;
    let x0 = origin.x.floor() as i64;
    let y0 = origin.y.floor() as i64;
    let x1 = (origin.x + size.width).ceil() as i64;
    let y1 = (origin.y + size.height).ceil() as i64;

    for t in 0..BOX_THICKNESS {
        for x in x0.max(0)..=x1.min(w - 1) {
            put_pixel_checked(img, x, y0 + t, BOX_COLOR);
            put_pixel_checked(img, x, y1 - t, BOX_COLOR);
        }
        for y in y0.max(0)..=y1.min(h - 1) {
            put_pixel_checked(img, x0 + t, y, BOX_COLOR);
            put_pixel_checked(img, x1 - t, y, BOX_COLOR);
        }
    }
}

/// Draw a filled disc with a white ring around it, centered at `center`.
/// The ring keeps the marker visible on backgrounds close to the fill color.
pub fn draw_click_marker(img: &mut RgbaImage, center: Point) {
    let w = img.width() as i64;
    let h = img.height() as i64;
    let outer = MARKER_RADIUS + RING_WIDTH;
    let x_min = ((center.x - outer).floor() as i64).max(0);
    let x_max = ((center.x + outer).ceil() as i64).min(w - 1);
    let y_min = ((center.y - outer).floor() as i64).max(0);
    let y_max = ((center.y + outer).ceil() as i64).min(h - 1);

    for y in y_min..=y_max {
        for x in x_min..=x_max {
            let dx = x as f64 - center.x;
            let dy = y as f64 - center.y;
            let dist_sq = dx * dx + dy * dy;
            if dist_sq <= MARKER_RADIUS * MARKER_RADIUS {
                put_pixel_checked(img, x, y, MARKER_COLOR);
            } else if dist_sq <= outer * outer {
                put_pixel_checked(img, x, y, RING_COLOR);
            }
        }
    }
}

fn put_pixel_checked(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}
