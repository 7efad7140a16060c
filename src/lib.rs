use crate::{
    action::executor::{ClickOutcome, click_node},
    session::{
        error::ProbeError,
        protocol::WindowTarget,
        session::{ExtractionResult, ExtractorSession},
    },
    window::resolver,
};

pub mod action;
pub mod cli;
pub mod geometry;
pub mod session;
pub mod trace;
pub mod tree;
pub mod window;

// ============================================================================
// High-level flows
// ============================================================================

/// Resolve a fuzzy query against the extractor's window list and extract the
/// best match. When nothing matches, the error carries the full window list
/// so callers can present suggestions.
pub fn extract_by_query(
    session: &ExtractorSession,
    query: &str,
) -> Result<ExtractionResult, ProbeError> {
    let windows = session.list()?;
    match resolver::resolve_best(query, &windows) {
        Some(window) => session.extract(&WindowTarget::Id(window.identity())),
        None => Err(ProbeError::WindowNotFound {
            query: query.to_string(),
            available: windows,
        }),
    }
}

/// Resolve, extract, and click one node in a single flow. No diagnostics;
/// embedders wanting annotated screenshots call `click_node` directly.
pub fn click_by_query(
    session: &ExtractorSession,
    query: &str,
    node_id: &str,
) -> Result<ClickOutcome, ProbeError> {
    let result = extract_by_query(session, query)?;
    click_node(session, &result.tree, &result.window, node_id, None)
}
