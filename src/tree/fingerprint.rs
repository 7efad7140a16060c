use sha1::{Digest, Sha1};

use crate::tree::tree_model::AccessibilityNode;

/// Stable digest of a snapshot's shape and labels: preorder walk feeding
/// (role, title, child count) per node into SHA-1.
///
/// Two structurally identical snapshots fingerprint identically, so a changed
/// fingerprint after re-extraction tells the caller that node identifiers
/// issued against the old snapshot may no longer resolve.
pub fn tree_fingerprint(root: &AccessibilityNode) -> String {
    let mut hasher = Sha1::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        hasher.update(node.role.as_deref().unwrap_or("").as_bytes());
        hasher.update([0x1f]);
        hasher.update(node.title.as_deref().unwrap_or("").as_bytes());
        hasher.update([0x1f]);
        hasher.update((node.children.len() as u64).to_le_bytes());
        // Push in reverse so children pop in document order
        for child in node.children.iter().rev() {
            stack.push(child);
        }
    }
    format!("{:x}", hasher.finalize())
}
