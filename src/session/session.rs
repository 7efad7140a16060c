use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use crate::geometry::geometry_model::{Point, Rect};
use crate::geometry::transform::fallback_display_rect;
use crate::session::error::ProbeError;
use crate::session::protocol::{self, ExtractorRequest, ResponseEnvelope, WindowTarget};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;
use crate::tree::addressing::assign_node_ids;
use crate::tree::fingerprint::tree_fingerprint;
use crate::tree::tree_model::AccessibilityNode;
use crate::window::window_model::WindowDescriptor;

// ============================================================================
// Permission prompt seam
// ============================================================================

/// Blocking acknowledgment before the single permission retry. The console
/// implementation waits for Enter; unattended embedders install
/// `NonInteractivePrompt` so a permission failure stays terminal.
pub trait PermissionPrompt {
    /// Returns true once the user indicates access has been granted.
    fn confirm(&self, message: &str) -> bool;
}

/// Prompts on stderr and blocks until a line arrives on stdin.
pub struct ConsolePrompt;

impl PermissionPrompt for ConsolePrompt {
    fn confirm(&self, message: &str) -> bool {
        eprintln!("{}", message);
        eprintln!("Grant access in System Settings, then press Enter to retry (Ctrl-C aborts)...");
        let mut line = String::new();
        io::stdin().read_line(&mut line).is_ok()
    }
}

/// Never confirms, so permission failures surface immediately.
pub struct NonInteractivePrompt;

impl PermissionPrompt for NonInteractivePrompt {
    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

// ============================================================================
// Extraction results
// ============================================================================

/// Everything one extraction yields: geometry, addressed tree, screenshot.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Window bounds in global screen space at capture time.
    pub window: Rect,

    /// Accessibility tree with hierarchical node ids assigned.
    pub tree: AccessibilityNode,

    /// PNG bytes; pixel dimensions may exceed `window` on high-density
    /// displays.
    pub screenshot: Vec<u8>,

    /// Digest of the snapshot; changes when re-extraction reshapes the tree.
    pub fingerprint: String,
}

/// A whole-display capture.
#[derive(Debug, Clone)]
pub struct FullScreenshotResult {
    /// Bounds of the captured display in global screen space.
    pub display: Rect,

    /// PNG bytes of the display capture.
    pub screenshot: Vec<u8>,
}

// ============================================================================
// Session
// ============================================================================

/// Drives the external extractor: one short-lived child process per
/// operation, full output collected before parsing, envelope classification,
/// and the single allowed permission retry.
pub struct ExtractorSession {
    executable: PathBuf,
    prompt: Box<dyn PermissionPrompt>,
    auto_retry: bool,
    trace: Option<TraceLogger>,
    verbose: u8,
}

impl ExtractorSession {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            prompt: Box::new(ConsolePrompt),
            auto_retry: true,
            trace: None,
            verbose: 0,
        }
    }

    /// Replace the permission prompt, e.g. with `NonInteractivePrompt` for
    /// unattended use.
    pub fn with_prompt(mut self, prompt: Box<dyn PermissionPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Enable or disable the automatic permission retry.
    pub fn with_auto_retry(mut self, auto_retry: bool) -> Self {
        self.auto_retry = auto_retry;
        self
    }

    /// Attach a JSONL trace of extractor invocations.
    pub fn with_trace(mut self, trace: TraceLogger) -> Self {
        self.trace = Some(trace);
        self
    }

    pub fn with_verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Enumerate the windows the extractor can see.
    pub fn list(&self) -> Result<Vec<WindowDescriptor>, ProbeError> {
        let envelope = self.dispatch_with_retry(&ExtractorRequest::List)?;
        envelope
            .available_windows
            .ok_or_else(|| missing_field("list", "availableWindows"))
    }

    /// Extract geometry, accessibility tree, and screenshot for one window.
    /// The tree comes back addressed; raw extractor output never carries ids.
    pub fn extract(&self, target: &WindowTarget) -> Result<ExtractionResult, ProbeError> {
        let request = ExtractorRequest::Extract {
            target: target.clone(),
        };
        let envelope = self.dispatch_with_retry(&request)?;

        let window = envelope
            .window
            .ok_or_else(|| missing_field("extract", "window"))?;
        let raw_tree = envelope
            .a11y
            .ok_or_else(|| missing_field("extract", "a11y"))?;
        let encoded = envelope
            .screenshot
            .as_deref()
            .ok_or_else(|| missing_field("extract", "screenshot"))?;
        let screenshot = protocol::decode_screenshot(encoded)?;

        let tree = assign_node_ids(&raw_tree);
        let fingerprint = tree_fingerprint(&tree);

        Ok(ExtractionResult {
            window,
            tree,
            screenshot,
            fingerprint,
        })
    }

    /// Raise a window. Best-effort by contract: failures come back as
    /// `false`, never as an error.
    pub fn focus(&self, target: &WindowTarget) -> bool {
        let request = ExtractorRequest::Focus {
            target: target.clone(),
        };
        match self.dispatch_with_retry(&request) {
            Ok(envelope) => envelope.success == Some(true),
            Err(e) => {
                if self.verbose > 0 {
                    eprintln!("Focus failed: {}", e);
                }
                false
            }
        }
    }

    /// Capture the display showing `for_rect`, or the primary display when no
    /// rect is given. When the targeted capture fails, fall back to the
    /// primary display and report its image under a degraded display rect
    /// rather than failing the operation.
    pub fn capture_display(&self, for_rect: Option<&Rect>) -> Result<FullScreenshotResult, ProbeError> {
        let rect = match for_rect {
            Some(r) => r,
            None => return self.capture_primary(),
        };

        let request = ExtractorRequest::FullScreenshotForRect { rect: *rect };
        match self.dispatch_with_retry(&request) {
            Ok(envelope) => screenshot_result("full-screenshot-for-rect", envelope),
            Err(e) => {
                eprintln!(
                    "Warning: display capture for rect failed ({}); falling back to primary display",
                    e
                );
                let primary = self.capture_primary()?;
                Ok(FullScreenshotResult {
                    display: fallback_display_rect(&primary.display, rect),
                    screenshot: primary.screenshot,
                })
            }
        }
    }

    /// Synthesize a left click at global screen coordinates. The extractor
    /// owns monitor resolution and any Y-axis flip the event system needs; no
    /// coordinate transform is applied on this side.
    pub fn click_absolute(&self, point: Point) -> Result<(), ProbeError> {
        let request = ExtractorRequest::ClickAbsolute {
            x: point.x,
            y: point.y,
        };
        let envelope = self.dispatch_with_retry(&request)?;
        if envelope.success == Some(true) {
            Ok(())
        } else {
            Err(ProbeError::MalformedResponse {
                context: "click-absolute".to_string(),
                detail: "extractor did not confirm the click".to_string(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn capture_primary(&self) -> Result<FullScreenshotResult, ProbeError> {
        let envelope = self.dispatch_with_retry(&ExtractorRequest::FullScreenshot)?;
        screenshot_result("full-screenshot", envelope)
    }

    /// Run one invocation, allowing at most one permission retry. The retry
    /// redispatches with retrying disabled, so a second permission failure,
    /// or any other failure, is terminal and wraps the retry's reason.
    fn dispatch_with_retry(&self, request: &ExtractorRequest) -> Result<ResponseEnvelope, ProbeError> {
        let message = match self.dispatch(request) {
            Err(ProbeError::PermissionDenied { message, retried: false }) if self.auto_retry => {
                message
            }
            other => return other,
        };

        if !self.prompt.confirm(&message) {
            return Err(ProbeError::PermissionDenied {
                message,
                retried: false,
            });
        }

        self.dispatch(request)
            .map_err(|retry_err| ProbeError::PermissionDenied {
                message: retry_err.to_string(),
                retried: true,
            })
    }

    /// Spawn the extractor, block until exit, classify the result. There is
    /// no streaming path; output is collected whole.
    fn dispatch(&self, request: &ExtractorRequest) -> Result<ResponseEnvelope, ProbeError> {
        let args = request.to_args();
        if self.verbose > 1 {
            eprintln!("Running extractor: {} {}", self.executable.display(), args.join(" "));
        }

        let started = Instant::now();
        let output = Command::new(&self.executable)
            .args(&args)
            .output()
            .map_err(|e| ProbeError::Spawn {
                executable: self.executable.display().to_string(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let result = protocol::classify_output(
            request,
            output.status.success(),
            output.status.code(),
            &stdout,
            &stderr,
        );

        self.log_dispatch(
            request,
            &args,
            output.status.code(),
            &result,
            started.elapsed().as_millis() as u64,
        );
        result
    }

    fn log_dispatch(
        &self,
        request: &ExtractorRequest,
        args: &[String],
        status: Option<i32>,
        result: &Result<ResponseEnvelope, ProbeError>,
        duration_ms: u64,
    ) {
        let trace = match &self.trace {
            Some(t) => t,
            None => return, // tracing disabled
        };

        let event = TraceEvent::now(request.name())
            .with_args(args)
            .with_status(status)
            .with_duration(duration_ms);
        let event = match result {
            Ok(_) => event.with_outcome("ok"),
            Err(e) => event.with_outcome("error").with_detail(e.to_string()),
        };
        trace.log(&event);
    }
}

/// Confirm the extractor executable exists before a session starts. Building
/// or refreshing the binary is whoever produces it; a session only ever sees
/// a ready path.
pub fn ensure_extractor(path: &Path) -> Result<PathBuf, ProbeError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ProbeError::Spawn {
            executable: path.display().to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "extractor executable not found"),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn screenshot_result(
    context: &str,
    envelope: ResponseEnvelope,
) -> Result<FullScreenshotResult, ProbeError> {
    let display = envelope
        .display
        .ok_or_else(|| missing_field(context, "display"))?;
    let encoded = envelope
        .screenshot
        .as_deref()
        .ok_or_else(|| missing_field(context, "screenshot"))?;
    Ok(FullScreenshotResult {
        display,
        screenshot: protocol::decode_screenshot(encoded)?,
    })
}

fn missing_field(context: &str, field: &str) -> ProbeError {
    ProbeError::MalformedResponse {
        context: context.to_string(),
        detail: format!("response carried no '{}' field", field),
    }
}
