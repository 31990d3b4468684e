//! Patch application: full replace and relative merge.
//!
//! Both operations mutate the tree in place and then run the pruner, so
//! observers only ever see trees with the null/empty invariants restored.
//! A depth-guard failure returns before anything is mutated.

use serde_json::Value;

use crate::prune::{object_depth, prune};
use crate::resolve::{resolve_slot, Resolution};
use crate::{path, TreeError};

/// Overwrite the value at `segments` with `new_value`, creating missing
/// intermediate objects, then prune.
///
/// The empty path replaces the root wholesale, since there is no parent
/// slot to splice into. Any existing value at the path is overwritten,
/// including across types.
///
/// # Errors
///
/// - [`TreeError::DepthExceeded`] if the tree or the mutation nests
///   objects past `max_depth`; the tree is untouched.
/// - [`TreeError::NotAnObject`] if an intermediate node exists but is not
///   an object; the tree is untouched (a scalar on the walk is always hit
///   before any intermediate is created past it).
pub fn replace(
    root: &mut Value,
    segments: &[String],
    new_value: Value,
    max_depth: usize,
) -> Result<(), TreeError> {
    // Guard before mutating: after the splice, the deepest object nesting
    // is bounded by the larger of the existing tree and the path plus the
    // incoming value. Checking both up front means the prune below cannot
    // trip mid-mutation.
    let incoming = segments.len().saturating_add(object_depth(&new_value));
    if incoming > max_depth || object_depth(root) > max_depth {
        return Err(TreeError::DepthExceeded { limit: max_depth });
    }

    if segments.is_empty() {
        // Root replacement: no parent slot to splice into.
        *root = new_value;
    } else {
        match resolve_slot(root, segments, true) {
            Resolution::Slot { parent, key } => {
                parent.insert(key.to_string(), new_value);
            }
            Resolution::Unresolvable => return Err(TreeError::NotAnObject),
            // Only returned for the empty path, handled above.
            Resolution::Root => {}
        }
    }

    prune(root, max_depth)
}

/// Apply a merge patch: each `(key, value)` entry of `patch` is an
/// independent [`replace`] at `segments`/`key`, in the patch object's
/// enumeration order. A later key colliding with an earlier key's subtree
/// wins. Keys are themselves path fragments: a key containing `/` nests.
///
/// The merge is atomic: entries are applied to a scratch copy that only
/// replaces the tree once every entry has succeeded, so a failing entry
/// leaves the tree exactly as it was. Observers never see a partially
/// merged state.
///
/// # Errors
///
/// [`TreeError::MergeNotAnObject`] if `patch` is not an object, plus
/// whatever the per-entry replaces can return.
pub fn merge(
    root: &mut Value,
    segments: &[String],
    patch: Value,
    max_depth: usize,
) -> Result<(), TreeError> {
    let Value::Object(entries) = patch else {
        return Err(TreeError::MergeNotAnObject);
    };
    let mut working = root.clone();
    for (key, value) in entries {
        let child_segments = path::child(segments, &key);
        replace(&mut working, &child_segments, value, max_depth)?;
    }
    *root = working;
    Ok(())
}
