//! Null/empty-node garbage collection.
//!
//! The remote service never stores nulls: writing null deletes, and an
//! object that loses its last entry disappears with it. [`prune`] restores
//! those invariants after every mutation: it removes object entries whose
//! value is `Null` and detaches object subtrees that end up empty,
//! cascading bottom-up. The root is never detached, even when empty.
//!
//! Traversal is fully iterative over a growable work stack, so deep trees
//! cannot exhaust the native call stack. A caller-imposed depth bound
//! guards against adversarial nesting; when it trips, the tree has not
//! been touched.

use serde_json::Value;

use crate::resolve::lookup_mut;
use crate::TreeError;

/// Default bound on object-nesting depth. Generous on purpose; the bound
/// exists to cap resource use on adversarial input, not to constrain real
/// documents.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Remove null entries and collapse empty object subtrees, bottom-up.
///
/// Two phases: an immutable collection pass records the path of every
/// object node (and enforces `max_depth`); a sweep pass then visits those
/// paths deepest-first, dropping entries that are `Null` or empty objects.
/// Because every child object is swept before its parent, a subtree that
/// empties out is removed by its parent's sweep, cascading deletions all
/// the way to just below the root.
///
/// # Errors
///
/// [`TreeError::DepthExceeded`] if object nesting exceeds `max_depth`.
/// The collection pass fails before anything is mutated.
pub fn prune(root: &mut Value, max_depth: usize) -> Result<(), TreeError> {
    let object_paths = collect_object_paths(root, max_depth)?;

    // Parents precede their children in `object_paths`, so the reverse
    // walk sweeps every child before its parent.
    // A node that empties out is detached by its parent's sweep, which
    // runs after its own. The root has no parent, so it is never detached.
    for segments in object_paths.iter().rev() {
        if let Some(Value::Object(map)) = lookup_mut(root, segments) {
            map.retain(|_, value| !value.is_null() && !is_empty_object(value));
        }
    }
    Ok(())
}

/// Depth of object nesting in `value`: 0 for scalars and arrays, 1 for an
/// empty object, 2 for `{"a":{}}`, and so on. Iterative, like [`prune`].
pub fn object_depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(usize, &Value)> = vec![(0, value)];
    while let Some((depth, node)) = stack.pop() {
        if let Value::Object(map) = node {
            let below = depth + 1;
            if below > deepest {
                deepest = below;
            }
            for child in map.values() {
                stack.push((below, child));
            }
        }
    }
    deepest
}

/// Record the path of every object node, parents before children.
fn collect_object_paths(
    root: &Value,
    max_depth: usize,
) -> Result<Vec<Vec<String>>, TreeError> {
    let mut found = Vec::new();
    let mut stack: Vec<(Vec<String>, &Value)> = vec![(Vec::new(), root)];
    while let Some((segments, node)) = stack.pop() {
        if let Value::Object(map) = node {
            if segments.len() >= max_depth {
                return Err(TreeError::DepthExceeded { limit: max_depth });
            }
            for (key, child) in map {
                if child.is_object() {
                    let mut child_segments = segments.clone();
                    child_segments.push(key.clone());
                    stack.push((child_segments, child));
                }
            }
            found.push(segments);
        }
    }
    Ok(found)
}

fn is_empty_object(value: &Value) -> bool {
    matches!(value, Value::Object(map) if map.is_empty())
}
