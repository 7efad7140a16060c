#![cfg(unix)]

mod common;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;
use window_probe::geometry::geometry_model::{Point, Rect};
use window_probe::session::error::ProbeError;
use window_probe::session::protocol::WindowTarget;
use window_probe::session::session::{
    ExtractorSession, NonInteractivePrompt, PermissionPrompt, ensure_extractor,
};
use window_probe::trace::logger::TraceLogger;

use common::{fake_extractor, respond_with};

// ============================================================================
// Test doubles
// ============================================================================

/// Prompt that records how often it was asked and answers a fixed way.
struct RecordingPrompt {
    calls: Arc<AtomicUsize>,
    answer: bool,
}

impl PermissionPrompt for RecordingPrompt {
    fn confirm(&self, _message: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn session_with_prompt(
    executable: impl Into<std::path::PathBuf>,
    answer: bool,
) -> (ExtractorSession, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let session = ExtractorSession::new(executable).with_prompt(Box::new(RecordingPrompt {
        calls: Arc::clone(&calls),
        answer,
    }));
    (session, calls)
}

/// Script body that appends one line to `count_file` per invocation, then
/// runs `rest`.
fn counting(count_file: &Path, rest: &str) -> String {
    format!("echo run >> \"{}\"\n{}", count_file.display(), rest)
}

fn run_count(count_file: &Path) -> usize {
    match std::fs::read_to_string(count_file) {
        Ok(content) => content.lines().count(),
        Err(_) => 0,
    }
}

// ============================================================================
// Listing and extraction
// ============================================================================

#[test]
fn list_parses_window_descriptors() {
    let dir = TempDir::new().unwrap();
    let script = fake_extractor(
        dir.path(),
        &respond_with(
            r#"{"availableWindows":[{"app":"Safari","title":"Apple","id":"w1"},{"app":"Finder","title":"Documents"}]}"#,
            0,
        ),
    );

    let windows = ExtractorSession::new(script).list().unwrap();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].app, "Safari");
    assert_eq!(windows[0].id.as_deref(), Some("w1"));
    assert_eq!(windows[1].identity(), "finder-documents");
}

#[test]
fn list_without_window_field_is_malformed() {
    let dir = TempDir::new().unwrap();
    let script = fake_extractor(dir.path(), &respond_with(r#"{"success":true}"#, 0));

    let err = ExtractorSession::new(script).list().unwrap_err();
    match err {
        ProbeError::MalformedResponse { context, detail } => {
            assert_eq!(context, "list");
            assert!(detail.contains("availableWindows"));
        }
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
}

#[test]
fn extract_addresses_tree_and_decodes_screenshot() {
    let dir = TempDir::new().unwrap();
    // "cG5nLWJ5dGVz" is base64 for "png-bytes"
    let body = r#"{"window":{"x":100,"y":50,"width":800,"height":600},"a11y":{"role":"AXWindow","children":[{"role":"AXButton","title":"Close","position":[105,55],"size":[20,20]}]},"screenshot":"cG5nLWJ5dGVz"}"#;
    let script = fake_extractor(dir.path(), &respond_with(body, 0));

    let result = ExtractorSession::new(script)
        .extract(&WindowTarget::Id("w1".into()))
        .unwrap();

    assert_eq!(result.window, Rect::new(100.0, 50.0, 800.0, 600.0));
    assert_eq!(result.screenshot, b"png-bytes");

    assert_eq!(result.tree.id.as_deref(), Some("1."));
    assert_eq!(result.tree.children[0].id.as_deref(), Some("1.1"));
    assert_eq!(result.tree.children[0].title.as_deref(), Some("Close"));

    assert_eq!(result.fingerprint.len(), 40, "sha1 hex digest");
    assert!(result.fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn extract_missing_tree_is_malformed() {
    let dir = TempDir::new().unwrap();
    let body = r#"{"window":{"x":0,"y":0,"width":10,"height":10},"screenshot":"aGVsbG8="}"#;
    let script = fake_extractor(dir.path(), &respond_with(body, 0));

    let err = ExtractorSession::new(script)
        .extract(&WindowTarget::Query("anything".into()))
        .unwrap_err();
    match err {
        ProbeError::MalformedResponse { detail, .. } => assert!(detail.contains("a11y")),
        other => panic!("Expected MalformedResponse, got {:?}", other),
    }
}

#[test]
fn extract_not_found_carries_available_windows() {
    let dir = TempDir::new().unwrap();
    let body = r#"{"error":"Window not found","availableWindows":[{"app":"Safari","title":"Apple"}]}"#;
    let script = fake_extractor(dir.path(), &respond_with(body, 1));

    let err = ExtractorSession::new(script)
        .extract(&WindowTarget::Query("Slack".into()))
        .unwrap_err();
    match err {
        ProbeError::WindowNotFound { query, available } => {
            assert_eq!(query, "Slack");
            assert_eq!(available.len(), 1);
            assert_eq!(available[0].app, "Safari");
        }
        other => panic!("Expected WindowNotFound, got {:?}", other),
    }
}

// ============================================================================
// Permission retry
// ============================================================================

#[test]
fn permission_failure_prompts_then_retries_once() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("granted");
    // Fails with a permission error on the first run, succeeds after.
    let body = format!(
        r#"if [ -f "{marker}" ]; then
printf '%s' '{{"availableWindows":[]}}'
exit 0
else
touch "{marker}"
printf '%s' '{{"error":"denied","needsPermission":true}}'
exit 1
fi"#,
        marker = marker.display()
    );
    let script = fake_extractor(dir.path(), &body);

    let (session, calls) = session_with_prompt(script, true);
    let windows = session.list().unwrap();

    assert!(windows.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1, "prompt shown exactly once");
}

#[test]
fn declined_prompt_is_terminal() {
    let dir = TempDir::new().unwrap();
    let count = dir.path().join("runs");
    let body = counting(
        &count,
        &respond_with(r#"{"error":"denied","needsPermission":true}"#, 1),
    );
    let script = fake_extractor(dir.path(), &body);

    let session = ExtractorSession::new(script).with_prompt(Box::new(NonInteractivePrompt));
    let err = session.list().unwrap_err();

    match err {
        ProbeError::PermissionDenied { retried, .. } => assert!(!retried),
        other => panic!("Expected PermissionDenied, got {:?}", other),
    }
    assert_eq!(run_count(&count), 1, "declining must not redispatch");
}

#[test]
fn failing_retry_wraps_the_retry_reason() {
    let dir = TempDir::new().unwrap();
    let count = dir.path().join("runs");
    // Permission failure on every run: the retry fails again.
    let body = counting(
        &count,
        &respond_with(r#"{"error":"still denied","needsPermission":true}"#, 1),
    );
    let script = fake_extractor(dir.path(), &body);

    let (session, calls) = session_with_prompt(script, true);
    let err = session.list().unwrap_err();

    match err {
        ProbeError::PermissionDenied { message, retried } => {
            assert!(retried, "second failure is the terminal one");
            assert!(message.contains("still denied"), "wraps the retry's reason: {}", message);
        }
        other => panic!("Expected PermissionDenied, got {:?}", other),
    }
    assert_eq!(run_count(&count), 2, "exactly one redispatch");
    assert_eq!(calls.load(Ordering::SeqCst), 1, "the retry itself never re-prompts");
}

#[test]
fn disabled_auto_retry_never_prompts() {
    let dir = TempDir::new().unwrap();
    let count = dir.path().join("runs");
    let body = counting(
        &count,
        &respond_with(r#"{"error":"denied","needsPermission":true}"#, 1),
    );
    let script = fake_extractor(dir.path(), &body);

    let (session, calls) = session_with_prompt(script, true);
    let err = session.with_auto_retry(false).list().unwrap_err();

    assert!(matches!(err, ProbeError::PermissionDenied { retried: false, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(run_count(&count), 1);
}

// ============================================================================
// Focus (best-effort)
// ============================================================================

#[test]
fn focus_reports_success_flag() {
    let dir = TempDir::new().unwrap();
    let body = r#"case "$1" in
--focus-id) printf '%s' '{"success":true}'; exit 0 ;;
--focus) printf '%s' '{"success":false}'; exit 0 ;;
esac"#;
    let script = fake_extractor(dir.path(), body);
    let session = ExtractorSession::new(script);

    assert!(session.focus(&WindowTarget::Id("w1".into())));
    assert!(!session.focus(&WindowTarget::Query("Documents".into())));
}

#[test]
fn focus_swallows_process_failures() {
    let dir = TempDir::new().unwrap();
    let script = fake_extractor(dir.path(), "echo boom >&2\nexit 3");

    let session = ExtractorSession::new(script).with_prompt(Box::new(NonInteractivePrompt));
    assert!(!session.focus(&WindowTarget::Query("anything".into())));
}

// ============================================================================
// Clicking
// ============================================================================

#[test]
fn click_passes_raw_global_coordinates() {
    let dir = TempDir::new().unwrap();
    let args_file = dir.path().join("argv");
    let body = format!(
        "echo \"$@\" > \"{}\"\nprintf '%s' '{{\"success\":true}}'\nexit 0",
        args_file.display()
    );
    let script = fake_extractor(dir.path(), &body);

    ExtractorSession::new(script)
        .click_absolute(Point::new(125.0, 230.0))
        .unwrap();

    let argv = std::fs::read_to_string(&args_file).unwrap();
    assert_eq!(argv.trim(), "--click-absolute 125 230");
}

#[test]
fn unconfirmed_click_is_an_error() {
    let dir = TempDir::new().unwrap();
    let script = fake_extractor(dir.path(), &respond_with(r#"{"success":false}"#, 0));

    let err = ExtractorSession::new(script)
        .click_absolute(Point::new(10.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, ProbeError::MalformedResponse { .. }));
}

#[test]
fn failed_click_process_is_an_error() {
    let dir = TempDir::new().unwrap();
    let script = fake_extractor(dir.path(), &respond_with(r#"{"success":false}"#, 1));

    let err = ExtractorSession::new(script)
        .click_absolute(Point::new(10.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, ProbeError::ProcessFailure { .. }));
}

// ============================================================================
// Display capture
// ============================================================================

#[test]
fn capture_primary_display() {
    let dir = TempDir::new().unwrap();
    let body = r#"{"display":{"x":0,"y":0,"width":1920,"height":1080},"screenshot":"aGVsbG8="}"#;
    let script = fake_extractor(dir.path(), &respond_with(body, 0));

    let capture = ExtractorSession::new(script).capture_display(None).unwrap();
    assert_eq!(capture.display, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    assert_eq!(capture.screenshot, b"hello");
}

#[test]
fn capture_for_rect_falls_back_to_primary_with_degraded_rect() {
    let dir = TempDir::new().unwrap();
    let body = r#"case "$1" in
--full-screenshot-for-rect) printf '%s' '{"error":"no display for rect"}'; exit 1 ;;
--full-screenshot) printf '%s' '{"display":{"x":0,"y":0,"width":1920,"height":1080},"screenshot":"aGVsbG8="}'; exit 0 ;;
esac"#;
    let script = fake_extractor(dir.path(), body);

    let offscreen = Rect::new(5000.0, 100.0, 800.0, 600.0);
    let capture = ExtractorSession::new(script)
        .capture_display(Some(&offscreen))
        .unwrap();

    // Primary origin with the requested rect's dimensions
    assert_eq!(capture.display, Rect::new(0.0, 0.0, 800.0, 600.0));
    assert_eq!(capture.screenshot, b"hello");
}

// ============================================================================
// Spawning and trace
// ============================================================================

#[test]
fn missing_executable_is_a_spawn_error() {
    let err = ExtractorSession::new("/nonexistent/window-probe-extractor")
        .list()
        .unwrap_err();
    match err {
        ProbeError::Spawn { executable, .. } => {
            assert!(executable.contains("window-probe-extractor"));
        }
        other => panic!("Expected Spawn, got {:?}", other),
    }
}

#[test]
fn ensure_extractor_checks_existence() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("extractor");
    assert!(ensure_extractor(&missing).is_err());

    std::fs::write(&missing, "#!/bin/sh\n").unwrap();
    let found = ensure_extractor(&missing).unwrap();
    assert_eq!(found, missing);
}

#[test]
fn trace_records_one_line_per_invocation() {
    let dir = TempDir::new().unwrap();
    let trace_path = dir.path().join("trace.jsonl");
    let script = fake_extractor(
        dir.path(),
        &respond_with(r#"{"availableWindows":[]}"#, 0),
    );

    let session = ExtractorSession::new(script).with_trace(TraceLogger::new(&trace_path));
    session.list().unwrap();
    session.list().unwrap();

    let content = std::fs::read_to_string(&trace_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let event: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(event["operation"], "list");
    assert_eq!(event["outcome"], "ok");
    assert_eq!(event["args"][0], "--list");
    assert_eq!(event["exit_status"], 0);
}
