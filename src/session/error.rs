use std::fmt;

use crate::window::window_model::WindowDescriptor;

/// Failure taxonomy for the extraction and click pipeline.
///
/// Resolution and addressing never raise these; they return empty or absent
/// results and leave the decision to fail to the session and executor layers,
/// which is where the context for a useful message lives.
#[derive(Debug)]
pub enum ProbeError {
    /// The extractor binary could not be started at all
    Spawn {
        executable: String,
        source: std::io::Error,
    },

    /// No window matched; carries the known windows as a recovery aid
    WindowNotFound {
        query: String,
        available: Vec<WindowDescriptor>,
    },

    /// OS accessibility / screen-recording permission is missing. `retried`
    /// records whether the single allowed retry was already spent.
    PermissionDenied { message: String, retried: bool },

    /// Non-zero exit without a usable error envelope
    ProcessFailure {
        status: Option<i32>,
        detail: String,
    },

    /// Clean exit but the body was not valid JSON, was missing required
    /// fields, or named an error anyway
    MalformedResponse { context: String, detail: String },

    /// A node identifier did not resolve against the current snapshot
    /// (commonly: the tree was re-extracted and identifiers shifted)
    NodeNotFound { node_id: String },

    /// The resolved node carries no usable click geometry
    NotClickable { node_id: String, reason: String },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Spawn { executable, source } => {
                write!(f, "Failed to spawn extractor '{}': {}", executable, source)
            }
            ProbeError::WindowNotFound { query, available } => {
                write!(
                    f,
                    "No window matched '{}' ({} windows available)",
                    query,
                    available.len()
                )
            }
            ProbeError::PermissionDenied { message, retried } => {
                if *retried {
                    write!(f, "Permission retry failed: {}", message)
                } else {
                    write!(f, "Accessibility permission needed: {}", message)
                }
            }
            ProbeError::ProcessFailure { status, detail } => match status {
                Some(code) => write!(f, "Extractor exited with status {}: {}", code, detail),
                None => write!(f, "Extractor was terminated by a signal: {}", detail),
            },
            ProbeError::MalformedResponse { context, detail } => {
                write!(f, "Malformed extractor response ({}): {}", context, detail)
            }
            ProbeError::NodeNotFound { node_id } => {
                write!(
                    f,
                    "Node '{}' not found in the current tree (was the window re-extracted?)",
                    node_id
                )
            }
            ProbeError::NotClickable { node_id, reason } => {
                write!(f, "Node '{}' is not clickable: {}", node_id, reason)
            }
        }
    }
}

impl std::error::Error for ProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProbeError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
