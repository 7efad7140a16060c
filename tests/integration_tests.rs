#![cfg(unix)]

mod common;

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use window_probe::geometry::geometry_model::Rect;
use window_probe::session::error::ProbeError;
use window_probe::session::session::ExtractorSession;
use window_probe::{click_by_query, extract_by_query};

use common::fake_extractor;

// ============================================================================
// Fixtures
// ============================================================================

/// Fake extractor covering the whole query-to-click flow: a two-window list,
/// one extractable window, and a click endpoint that logs its argv. The
/// extraction branch also checks that the id the resolver synthesized is the
/// one that arrives on the command line.
fn flow_script(dir: &Path, click_log: &Path) -> PathBuf {
    let list = serde_json::json!({
        "availableWindows": [
            {"app": "Safari", "title": "Apple – Home"},
            {"app": "Finder", "title": "Documents"},
        ]
    })
    .to_string();
    let extraction = serde_json::json!({
        "window": {"x": 10.0, "y": 20.0, "width": 400.0, "height": 300.0},
        "a11y": {
            "role": "AXWindow",
            "title": "Apple – Home",
            "children": [
                {"role": "AXButton", "title": "Send", "position": [110.0, 210.0], "size": [40.0, 20.0]}
            ]
        },
        "screenshot": "cG5nLWJ5dGVz",
    })
    .to_string();

    let body = format!(
        r#"case "$1" in
--list) printf '%s' '{list}'; exit 0 ;;
--window-id) [ "$2" = "safari-applehome" ] || {{ printf '%s' '{{"error":"unexpected window id"}}'; exit 1; }}; printf '%s' '{extraction}'; exit 0 ;;
--click-absolute) echo "$@" >> "{log}"; printf '%s' '{{"success":true}}'; exit 0 ;;
*) printf '%s' '{{"error":"unexpected request"}}'; exit 1 ;;
esac"#,
        list = list,
        extraction = extraction,
        log = click_log.display()
    );
    fake_extractor(dir, &body)
}

// ============================================================================
// Query-to-extraction flow
// ============================================================================

#[test]
fn extract_by_query_resolves_then_extracts() {
    let dir = TempDir::new().unwrap();
    let click_log = dir.path().join("clicks");
    let session = ExtractorSession::new(flow_script(dir.path(), &click_log));

    let result = extract_by_query(&session, "safari").unwrap();

    assert_eq!(result.window, Rect::new(10.0, 20.0, 400.0, 300.0));
    assert_eq!(result.tree.id.as_deref(), Some("1."));
    assert_eq!(result.tree.children[0].id.as_deref(), Some("1.1"));
    assert_eq!(result.screenshot, b"png-bytes");
    assert_eq!(result.fingerprint.len(), 40);
}

#[test]
fn extract_by_query_unmatched_carries_window_list() {
    let dir = TempDir::new().unwrap();
    let click_log = dir.path().join("clicks");
    let session = ExtractorSession::new(flow_script(dir.path(), &click_log));

    let err = extract_by_query(&session, "xyzzy").unwrap_err();
    match err {
        ProbeError::WindowNotFound { query, available } => {
            assert_eq!(query, "xyzzy");
            assert_eq!(available.len(), 2);
            assert_eq!(available[0].app, "Safari");
            assert_eq!(available[1].app, "Finder");
        }
        other => panic!("Expected WindowNotFound, got {:?}", other),
    }
}

// ============================================================================
// Query-to-click flow
// ============================================================================

#[test]
fn click_by_query_end_to_end() {
    let dir = TempDir::new().unwrap();
    let click_log = dir.path().join("clicks");
    let session = ExtractorSession::new(flow_script(dir.path(), &click_log));

    let outcome = click_by_query(&session, "safari", "1.1").unwrap();

    assert_eq!(outcome.node_id, "1.1");
    assert_eq!(outcome.center.x, 130.0);
    assert_eq!(outcome.center.y, 220.0);

    // The click went out in raw global coordinates.
    let logged = std::fs::read_to_string(&click_log).unwrap();
    assert_eq!(logged.trim(), "--click-absolute 130 220");
}

#[test]
fn click_by_query_unknown_node() {
    let dir = TempDir::new().unwrap();
    let click_log = dir.path().join("clicks");
    let session = ExtractorSession::new(flow_script(dir.path(), &click_log));

    let err = click_by_query(&session, "safari", "1.7").unwrap_err();
    assert!(matches!(err, ProbeError::NodeNotFound { .. }));
    assert!(!click_log.exists(), "no click may be dispatched");
}
