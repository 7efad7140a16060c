use serde::{Deserialize, Serialize};

// ============================================================================
// Window descriptors
// ============================================================================

/// A window the extractor can see. Several windows may share a title (think
/// two browser windows on the same page); the identifier is the authoritative
/// key once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowDescriptor {
    /// Owning application name, e.g. "Safari".
    pub app: String,

    /// Window title as the window manager reports it.
    pub title: String,

    /// Identifier assigned by the extractor, when it provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl WindowDescriptor {
    pub fn new(app: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            title: title.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The authoritative key for this window: the extractor-assigned id, or a
    /// deterministic one synthesized from (app, title) when it gave none.
    pub fn identity(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => synthesized_window_id(&self.app, &self.title),
        }
    }
}

/// Derive a deterministic identifier from an (app, title) pair: lowercase,
/// alphanumerics only, first 10 chars of the app and first 15 of the title,
/// joined with "-". Both sides of the protocol compute the same derivation,
/// so a synthesized id round-trips through `--window-id`.
pub fn synthesized_window_id(app: &str, title: &str) -> String {
    format!("{}-{}", alnum_prefix(app, 10), alnum_prefix(title, 15))
}

fn alnum_prefix(text: &str, limit: usize) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(limit)
        .collect()
}
