use crate::tree::tree_model::AccessibilityNode;

// ============================================================================
// Hierarchical node addressing
// ============================================================================
//
// Identifiers derive from tree shape alone, so the same snapshot always gets
// the same ids and they survive serialization round-trips. The grammar:
//
//   - the root is walked with prefix "1"
//   - a node with children gets id `prefix + "."`; child i (0-based)
//     continues with `prefix + "." + (i+1)`
//   - a node without children gets the bare prefix as its id
//
// So a window holding one button addresses as "1." and "1.1", and a trailing
// dot always means "this node had children". Leaf and internal ids can never
// collide, which keeps the id space injective per snapshot.

/// Depth guard for tree walks. Extractors cap their own traversal well below
/// this; the guard keeps recursion bounded even if that stops being true.
pub const MAX_TREE_DEPTH: usize = 128;

/// Produce an addressed copy of a raw snapshot. Subtrees nested deeper than
/// `MAX_TREE_DEPTH` are dropped; a node whose children were dropped becomes a
/// leaf and is addressed as one.
pub fn assign_node_ids(root: &AccessibilityNode) -> AccessibilityNode {
    assign_with_prefix(root, "1", 0)
}

fn assign_with_prefix(node: &AccessibilityNode, prefix: &str, depth: usize) -> AccessibilityNode {
    let keep_children = !node.children.is_empty() && depth < MAX_TREE_DEPTH;

    let mut assigned = node.detached();
    if keep_children {
        assigned.id = Some(format!("{}.", prefix));
        assigned.children = node
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let child_prefix = format!("{}.{}", prefix, i + 1);
                assign_with_prefix(child, &child_prefix, depth + 1)
            })
            .collect();
    } else {
        assigned.id = Some(prefix.to_string());
    }
    assigned
}

/// Find the node carrying `id` in an addressed snapshot. Plain depth-first
/// scan; snapshots are small enough that an index would not pay for itself.
pub fn resolve_node<'a>(root: &'a AccessibilityNode, id: &str) -> Option<&'a AccessibilityNode> {
    resolve_at_depth(root, id, 0)
}

fn resolve_at_depth<'a>(
    node: &'a AccessibilityNode,
    id: &str,
    depth: usize,
) -> Option<&'a AccessibilityNode> {
    if node.id.as_deref() == Some(id) {
        return Some(node);
    }
    if depth >= MAX_TREE_DEPTH {
        return None;
    }
    for child in &node.children {
        if let Some(found) = resolve_at_depth(child, id, depth + 1) {
            return Some(found);
        }
    }
    None
}
