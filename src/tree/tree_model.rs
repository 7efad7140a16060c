use serde::{Deserialize, Serialize};

// ============================================================================
// Accessibility tree snapshot
// ============================================================================

/// One node of the accessibility tree the extractor reports for a window.
///
/// The raw wire tree never carries `id`; identifiers are assigned afterwards
/// by `tree::addressing` and derive from tree shape alone. A snapshot is
/// immutable once addressed; re-extraction produces a new tree, never an
/// in-place update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AccessibilityNode {
    /// Hierarchical address ("1.", "1.2.1", ...). Absent on the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Platform role, e.g. "AXWindow", "AXButton".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Human-readable role label ("button", "text field").
    #[serde(rename = "roleDescription", skip_serializing_if = "Option::is_none")]
    pub role_description: Option<String>,

    /// Identifier the application itself set on the element, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub focused: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    /// `[x, y]` in global screen units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,

    /// `[width, height]` in global screen units.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<[f64; 2]>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AccessibilityNode>,
}

impl AccessibilityNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node carries enough geometry to be a click target.
    pub fn has_geometry(&self) -> bool {
        self.position.is_some() && self.size.is_some()
    }

    /// Copy of this node's own fields with no children attached.
    pub fn detached(&self) -> AccessibilityNode {
        AccessibilityNode {
            id: self.id.clone(),
            role: self.role.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            value: self.value.clone(),
            role_description: self.role_description.clone(),
            identifier: self.identifier.clone(),
            enabled: self.enabled,
            focused: self.focused,
            selected: self.selected,
            position: self.position,
            size: self.size,
            children: Vec::new(),
        }
    }

    /// Total node count of this subtree, including self. Iterative, so it is
    /// safe on trees of any depth.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// How many nodes in this subtree could be clicked (position and size
    /// both present).
    pub fn geometry_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.has_geometry() {
                count += 1;
            }
            stack.extend(node.children.iter());
        }
        count
    }
}
