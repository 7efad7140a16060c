use crate::geometry::geometry_model::{Point, Rect, Size};

// ============================================================================
// Coordinate space transforms
// ============================================================================
//
// Screenshots of a window are often captured at a higher pixel density than
// the window's logical size (retina), so each axis gets its own scale factor
// derived from the actual decoded image dimensions. Click coordinates are the
// one exception to all of this: they stay in raw global screen space and are
// handed to the extractor untransformed.

/// Map a point from global screen space into a window screenshot's pixel
/// space: subtract the window origin, scale per axis by screenshot/window,
/// clamp into the image.
///
/// Panics if the window rect has a non-positive span. A degenerate window
/// rect means the extraction itself went wrong; callers must not reach this
/// point with one.
pub fn to_screenshot_space(point: Point, window: &Rect, screenshot: Size) -> Point {
    assert!(
        window.width > 0.0 && window.height > 0.0,
        "window rect must have positive spans, got {}x{}",
        window.width,
        window.height
    );
    let x = (point.x - window.x) * (screenshot.width / window.width);
    let y = (point.y - window.y) * (screenshot.height / window.height);
    Point {
        x: x.clamp(0.0, screenshot.width),
        y: y.clamp(0.0, screenshot.height),
    }
}

/// Scale a size from global screen units into screenshot pixels. No clamping:
/// a size only gets bounded meaningfully together with its origin, and that
/// is the caller's concern.
pub fn size_to_screenshot_space(size: Size, window: &Rect, screenshot: Size) -> Size {
    assert!(
        window.width > 0.0 && window.height > 0.0,
        "window rect must have positive spans, got {}x{}",
        window.width,
        window.height
    );
    Size {
        width: size.width * (screenshot.width / window.width),
        height: size.height * (screenshot.height / window.height),
    }
}

/// Map a point from global screen space into a display capture's pixel space.
/// Displays and windows share the global origin, so this is the window
/// transform applied against the display bounds.
pub fn to_display_space(point: Point, display: &Rect, screenshot: Size) -> Point {
    to_screenshot_space(point, display, screenshot)
}

/// Degraded display rect for when no capture of the monitor actually showing
/// a rect could be obtained: the primary display's origin combined with the
/// rect's own dimensions. Annotations placed against it can land off target,
/// which is accepted over failing the whole operation.
pub fn fallback_display_rect(primary: &Rect, rect: &Rect) -> Rect {
    Rect {
        x: primary.x,
        y: primary.y,
        width: rect.width,
        height: rect.height,
    }
}
