use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;

use crate::geometry::geometry_model::Rect;
use crate::session::error::ProbeError;
use crate::tree::tree_model::AccessibilityNode;
use crate::window::window_model::WindowDescriptor;

// ============================================================================
// Requests: argv construction for extractor invocations
// ============================================================================

/// How a window is addressed in an extraction or focus call.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowTarget {
    /// Free text forwarded to the extractor's own matching.
    Query(String),
    /// An identifier previously obtained from a window list.
    Id(String),
}

/// One invocation of the extractor. The process takes a single operation per
/// run and reports one JSON document on stdout.
#[derive(Debug, Clone)]
pub enum ExtractorRequest {
    List,
    Extract { target: WindowTarget },
    Focus { target: WindowTarget },
    FullScreenshot,
    FullScreenshotForRect { rect: Rect },
    ClickAbsolute { x: f64, y: f64 },
}

impl ExtractorRequest {
    /// Render the argv for this invocation.
    pub fn to_args(&self) -> Vec<String> {
        match self {
            ExtractorRequest::List => vec!["--list".into()],
            ExtractorRequest::Extract { target } => match target {
                WindowTarget::Query(query) => vec![query.clone()],
                WindowTarget::Id(id) => vec!["--window-id".into(), id.clone()],
            },
            ExtractorRequest::Focus { target } => match target {
                WindowTarget::Query(title) => vec!["--focus".into(), title.clone()],
                WindowTarget::Id(id) => vec!["--focus-id".into(), id.clone()],
            },
            ExtractorRequest::FullScreenshot => vec!["--full-screenshot".into()],
            ExtractorRequest::FullScreenshotForRect { rect } => vec![
                "--full-screenshot-for-rect".into(),
                format_coord(rect.x),
                format_coord(rect.y),
                format_coord(rect.width),
                format_coord(rect.height),
            ],
            ExtractorRequest::ClickAbsolute { x, y } => vec![
                "--click-absolute".into(),
                format_coord(*x),
                format_coord(*y),
            ],
        }
    }

    /// Short operation name for traces and error context.
    pub fn name(&self) -> &'static str {
        match self {
            ExtractorRequest::List => "list",
            ExtractorRequest::Extract { .. } => "extract",
            ExtractorRequest::Focus { .. } => "focus",
            ExtractorRequest::FullScreenshot => "full-screenshot",
            ExtractorRequest::FullScreenshotForRect { .. } => "full-screenshot-for-rect",
            ExtractorRequest::ClickAbsolute { .. } => "click-absolute",
        }
    }

    /// The query or id text this request addresses a window by, if any.
    pub fn target_text(&self) -> Option<&str> {
        match self {
            ExtractorRequest::Extract { target } | ExtractorRequest::Focus { target } => {
                match target {
                    WindowTarget::Query(text) | WindowTarget::Id(text) => Some(text),
                }
            }
            _ => None,
        }
    }
}

/// Integral coordinates render without a trailing ".0" so they stay integral
/// on the command line.
fn format_coord(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

// ============================================================================
// Response envelope
// ============================================================================

/// Raw response document. Fields appear and disappear depending on the
/// operation and the error kind; classification into `ProbeError` happens
/// here at the protocol boundary and nowhere else.
#[derive(Debug, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub error: Option<String>,

    #[serde(default, rename = "needsPermission")]
    pub needs_permission: Option<bool>,

    #[serde(default, rename = "availableWindows")]
    pub available_windows: Option<Vec<WindowDescriptor>>,

    #[serde(default)]
    pub success: Option<bool>,

    /// Window bounds in global screen space (extraction responses).
    #[serde(default)]
    pub window: Option<Rect>,

    /// Raw accessibility tree, ids not yet assigned.
    #[serde(default)]
    pub a11y: Option<AccessibilityNode>,

    /// Display bounds in global screen space (full-screenshot responses).
    #[serde(default)]
    pub display: Option<Rect>,

    /// Base64-encoded PNG.
    #[serde(default)]
    pub screenshot: Option<String>,
}

/// Interpret a finished invocation. A non-zero exit is not the only failure
/// signal: a clean exit whose body is unparseable, or parseable but naming an
/// error, fails too. Error bodies are classified by their fields: a
/// permission flag beats a window list beats a bare message.
pub fn classify_output(
    request: &ExtractorRequest,
    succeeded: bool,
    status: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<ResponseEnvelope, ProbeError> {
    let parsed: Result<ResponseEnvelope, _> = serde_json::from_str(stdout.trim());

    let envelope = match parsed {
        Ok(envelope) => envelope,
        Err(parse_err) => {
            if succeeded {
                return Err(ProbeError::MalformedResponse {
                    context: request.name().to_string(),
                    detail: format!("{} (stdout: {})", parse_err, excerpt(stdout)),
                });
            }
            return Err(ProbeError::ProcessFailure {
                status,
                detail: combined_output(stdout, stderr),
            });
        }
    };

    if envelope.needs_permission == Some(true) {
        return Err(ProbeError::PermissionDenied {
            message: envelope
                .error
                .unwrap_or_else(|| "accessibility access not granted".to_string()),
            retried: false,
        });
    }

    if let Some(message) = &envelope.error {
        if let Some(windows) = &envelope.available_windows {
            return Err(ProbeError::WindowNotFound {
                query: request.target_text().unwrap_or_default().to_string(),
                available: windows.clone(),
            });
        }
        if succeeded {
            return Err(ProbeError::MalformedResponse {
                context: request.name().to_string(),
                detail: message.clone(),
            });
        }
        return Err(ProbeError::ProcessFailure {
            status,
            detail: message.clone(),
        });
    }

    if !succeeded {
        return Err(ProbeError::ProcessFailure {
            status,
            detail: combined_output(stdout, stderr),
        });
    }

    Ok(envelope)
}

/// Decode a base64 screenshot payload. The bytes are passed through as-is;
/// image decoding happens only where pixels are actually needed.
pub fn decode_screenshot(encoded: &str) -> Result<Vec<u8>, ProbeError> {
    BASE64
        .decode(encoded.trim())
        .map_err(|e| ProbeError::MalformedResponse {
            context: "screenshot".to_string(),
            detail: format!("invalid base64: {}", e),
        })
}

// ============================================================================
// Helpers
// ============================================================================

const EXCERPT_LEN: usize = 300;

/// Bounded excerpt for error messages; raw extractor output can be huge.
fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= EXCERPT_LEN {
        return trimmed.to_string();
    }
    let mut end = EXCERPT_LEN;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}

fn combined_output(stdout: &str, stderr: &str) -> String {
    match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
        (true, true) => "no output".to_string(),
        (false, true) => excerpt(stdout),
        (true, false) => excerpt(stderr),
        (false, false) => format!("{} / {}", excerpt(stdout), excerpt(stderr)),
    }
}
