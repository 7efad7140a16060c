use std::path::Path;

use serde::Serialize;

use crate::action::executor::{ClickDiagnostics, click_node};
use crate::extract_by_query;
use crate::geometry::geometry_model::Rect;
use crate::session::protocol::WindowTarget;
use crate::session::session::{ExtractionResult, ExtractorSession};
use crate::tree::tree_model::AccessibilityNode;
use crate::window::resolver;

// ============================================================================
// list subcommand
// ============================================================================

pub fn cmd_list(session: &ExtractorSession) -> Result<(), Box<dyn std::error::Error>> {
    let windows = session.list()?;

    if windows.is_empty() {
        println!("No windows visible to the extractor.");
        return Ok(());
    }

    println!("{} windows:", windows.len());
    for w in &windows {
        println!("  [{}] {}: {}", w.identity(), w.app, w.title);
    }
    Ok(())
}

// ============================================================================
// extract subcommand
// ============================================================================

/// On-disk summary written next to the screenshot. The image itself is
/// referenced by path; raw bytes never land in the JSON.
#[derive(Serialize)]
struct ExtractSummary<'a> {
    window: &'a Rect,
    fingerprint: &'a str,
    screenshot: &'a str,
    tree: &'a AccessibilityNode,
}

pub fn cmd_extract(
    session: &ExtractorSession,
    query: Option<&str>,
    window_id: Option<&str>,
    out_dir: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = extract_target(session, query, window_id, verbose)?;
    let written = write_extraction(&result, out_dir)?;

    println!(
        "Extracted {} nodes ({} clickable) into {}/",
        result.tree.node_count(),
        result.tree.geometry_count(),
        out_dir
    );
    if verbose > 0 {
        for path in &written {
            eprintln!("  Wrote: {}", path);
        }
    }
    Ok(())
}

// ============================================================================
// click subcommand
// ============================================================================

pub fn cmd_click(
    session: &ExtractorSession,
    query: &str,
    node_id: &str,
    annotate: bool,
    out_dir: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = extract_by_query(session, query)?;

    let diagnostics = if annotate {
        // The window screenshot goes to disk first so the bounding-box
        // annotation has an image to draw on.
        let written = write_extraction(&result, out_dir)?;
        if verbose > 0 {
            for path in &written {
                eprintln!("  Wrote: {}", path);
            }
        }
        Some(ClickDiagnostics {
            window_screenshot: Some(Path::new(out_dir).join("window.png")),
            output_dir: Path::new(out_dir).to_path_buf(),
        })
    } else {
        None
    };

    let outcome = click_node(
        session,
        &result.tree,
        &result.window,
        node_id,
        diagnostics.as_ref(),
    )?;

    println!(
        "Clicked node {} at ({:.0}, {:.0})",
        outcome.node_id, outcome.center.x, outcome.center.y
    );
    for path in &outcome.annotated {
        println!("  Annotated: {}", path.display());
    }
    Ok(())
}

// ============================================================================
// focus subcommand
// ============================================================================

pub fn cmd_focus(
    session: &ExtractorSession,
    query: Option<&str>,
    window_id: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let target = match (window_id, query) {
        (Some(id), _) => WindowTarget::Id(id.to_string()),
        (None, Some(q)) => match resolver::resolve_best(q, &session.list()?) {
            Some(window) => WindowTarget::Id(window.identity()),
            // Let the extractor try its own title matching
            None => WindowTarget::Query(q.to_string()),
        },
        (None, None) => return Err("focus needs --query or --window-id".into()),
    };

    if session.focus(&target) {
        println!("Focused.");
    } else {
        println!("Focus request was not honored.");
    }
    Ok(())
}

// ============================================================================
// capture subcommand
// ============================================================================

pub fn cmd_capture(
    session: &ExtractorSession,
    query: Option<&str>,
    out_dir: &str,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    // Picking the right display needs the window's bounds, which only an
    // extraction provides.
    let for_rect = match query {
        Some(q) => Some(extract_by_query(session, q)?.window),
        None => None,
    };

    let capture = session.capture_display(for_rect.as_ref())?;

    std::fs::create_dir_all(out_dir)?;
    let path = Path::new(out_dir).join("display.png");
    std::fs::write(&path, &capture.screenshot)?;

    println!(
        "Captured display at ({}, {}) {}x{} into {}",
        capture.display.x,
        capture.display.y,
        capture.display.width,
        capture.display.height,
        path.display()
    );
    if verbose > 0 {
        eprintln!("  {} bytes", capture.screenshot.len());
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn extract_target(
    session: &ExtractorSession,
    query: Option<&str>,
    window_id: Option<&str>,
    verbose: u8,
) -> Result<ExtractionResult, Box<dyn std::error::Error>> {
    match (window_id, query) {
        (Some(id), _) => Ok(session.extract(&WindowTarget::Id(id.to_string()))?),
        (None, Some(q)) => {
            if verbose > 0 {
                eprintln!("Resolving query '{}'...", q);
            }
            Ok(extract_by_query(session, q)?)
        }
        (None, None) => Err("extract needs --query or --window-id".into()),
    }
}

/// Write window.png and tree.json for an extraction. Returns the paths
/// written, relative to the caller's working directory.
fn write_extraction(
    result: &ExtractionResult,
    out_dir: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(out_dir)?;

    let image_path = Path::new(out_dir).join("window.png");
    std::fs::write(&image_path, &result.screenshot)?;

    let summary = ExtractSummary {
        window: &result.window,
        fingerprint: &result.fingerprint,
        screenshot: "window.png",
        tree: &result.tree,
    };
    let json_path = Path::new(out_dir).join("tree.json");
    std::fs::write(&json_path, serde_json::to_string_pretty(&summary)?)?;

    Ok(vec![
        image_path.display().to_string(),
        json_path.display().to_string(),
    ])
}
