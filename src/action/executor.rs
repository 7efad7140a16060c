use std::fs;
use std::path::{Path, PathBuf};

use crate::action::annotate;
use crate::geometry::geometry_model::{Point, Rect, Size};
use crate::geometry::transform::{size_to_screenshot_space, to_display_space, to_screenshot_space};
use crate::session::error::ProbeError;
use crate::session::session::ExtractorSession;
use crate::tree::addressing::resolve_node;
use crate::tree::tree_model::AccessibilityNode;

// ============================================================================
// Click execution
// ============================================================================

/// Inputs for the optional click diagnostics.
#[derive(Debug, Clone)]
pub struct ClickDiagnostics {
    /// A previously captured window screenshot (PNG on disk) to draw the
    /// target's bounding box onto. Skipped when absent.
    pub window_screenshot: Option<PathBuf>,

    /// Directory receiving the annotated images.
    pub output_dir: PathBuf,
}

/// Outcome of a successful click.
#[derive(Debug, Clone)]
pub struct ClickOutcome {
    pub node_id: String,

    /// The point that was clicked, global screen space.
    pub center: Point,

    /// Annotated diagnostic images written, possibly fewer than requested.
    pub annotated: Vec<PathBuf>,
}

/// Click the node addressed by `node_id` in the window whose bounds are
/// `window_rect`.
///
/// The click target is the node's center in raw global screen coordinates;
/// the extractor owns monitor resolution and any Y-axis flip, so no transform
/// is applied to the point it receives. Diagnostics are best-effort: a failed
/// annotation logs a warning and is skipped, while a failed click is an
/// error.
pub fn click_node(
    session: &ExtractorSession,
    tree: &AccessibilityNode,
    window_rect: &Rect,
    node_id: &str,
    diagnostics: Option<&ClickDiagnostics>,
) -> Result<ClickOutcome, ProbeError> {
    let node = resolve_node(tree, node_id).ok_or_else(|| ProbeError::NodeNotFound {
        node_id: node_id.to_string(),
    })?;

    let (position, size) = match (node.position, node.size) {
        (Some(p), Some(s)) => (Point::from(p), Size::from(s)),
        _ => {
            return Err(ProbeError::NotClickable {
                node_id: node_id.to_string(),
                reason: "node reports no position/size".to_string(),
            });
        }
    };

    let center = Point::new(position.x + size.width / 2.0, position.y + size.height / 2.0);

    let mut annotated = Vec::new();
    if let Some(diag) = diagnostics {
        annotated = render_diagnostics(session, window_rect, position, size, center, diag);
    }

    session.click_absolute(center)?;

    Ok(ClickOutcome {
        node_id: node_id.to_string(),
        center,
        annotated,
    })
}

// ============================================================================
// Diagnostics rendering (best-effort)
// ============================================================================

/// Render the bounding-box and click-marker images. Nothing here may abort
/// the click, so every step degrades to a stderr warning.
fn render_diagnostics(
    session: &ExtractorSession,
    window_rect: &Rect,
    position: Point,
    size: Size,
    center: Point,
    diag: &ClickDiagnostics,
) -> Vec<PathBuf> {
    let mut written = Vec::new();

    if let Err(e) = fs::create_dir_all(&diag.output_dir) {
        eprintln!(
            "Warning: cannot create '{}' ({}); click diagnostics skipped",
            diag.output_dir.display(),
            e
        );
        return written;
    }

    if let Some(screenshot_path) = &diag.window_screenshot {
        match annotate_window_screenshot(screenshot_path, window_rect, position, size, &diag.output_dir) {
            Ok(path) => written.push(path),
            Err(reason) => eprintln!("Warning: bounding-box annotation skipped: {}", reason),
        }
    }

    match annotate_display_capture(session, window_rect, center, &diag.output_dir) {
        Ok(path) => written.push(path),
        Err(reason) => eprintln!("Warning: click-marker annotation skipped: {}", reason),
    }

    written
}

/// Draw the target's bounding box onto the prior window screenshot. Scale
/// factors come from the decoded image dimensions, so a density-scaled
/// capture lands the box correctly.
fn annotate_window_screenshot(
    screenshot_path: &Path,
    window_rect: &Rect,
    position: Point,
    size: Size,
    output_dir: &Path,
) -> Result<PathBuf, String> {
    if window_rect.width <= 0.0 || window_rect.height <= 0.0 {
        return Err("window rect has no area".to_string());
    }

    let mut img = image::open(screenshot_path)
        .map_err(|e| format!("cannot open '{}': {}", screenshot_path.display(), e))?
        .to_rgba8();

    let shot_size = annotate::image_size(&img);
    let origin = to_screenshot_space(position, window_rect, shot_size);
    let box_size = size_to_screenshot_space(size, window_rect, shot_size);
    annotate::draw_box_outline(&mut img, origin, box_size);

    let out = output_dir.join("click-target.png");
    img.save(&out)
        .map_err(|e| format!("cannot write '{}': {}", out.display(), e))?;
    Ok(out)
}

/// Capture the display showing the window and mark the click point on it.
fn annotate_display_capture(
    session: &ExtractorSession,
    window_rect: &Rect,
    center: Point,
    output_dir: &Path,
) -> Result<PathBuf, String> {
    let capture = session
        .capture_display(Some(window_rect))
        .map_err(|e| e.to_string())?;

    if capture.display.width <= 0.0 || capture.display.height <= 0.0 {
        return Err("display rect has no area".to_string());
    }

    let mut img = image::load_from_memory(&capture.screenshot)
        .map_err(|e| format!("cannot decode display capture: {}", e))?
        .to_rgba8();

    let marker = to_display_space(center, &capture.display, annotate::image_size(&img));
    annotate::draw_click_marker(&mut img, marker);

    let out = output_dir.join("click-context.png");
    img.save(&out)
        .map_err(|e| format!("cannot write '{}': {}", out.display(), e))?;
    Ok(out)
}
