//! Path resolution against the mirrored tree.
//!
//! Reads use [`lookup`]; mutations use [`resolve_slot`], which yields the
//! parent object map plus the final segment so the caller can overwrite or
//! detach the addressed entry. Intermediate nodes that exist but are not
//! objects fail the walk; a scalar is never coerced into an object.

use serde_json::{Map, Value};

/// Where a mutable path walk ended up.
pub enum Resolution<'a> {
    /// The empty path. There is no parent slot to splice into; callers
    /// must special-case root replacement.
    Root,
    /// The parent object map and the final segment addressing the slot.
    /// The slot itself may or may not currently hold a value.
    Slot {
        parent: &'a mut Map<String, Value>,
        key: &'a str,
    },
    /// An intermediate node is absent (and creation was not requested) or
    /// is not an object.
    Unresolvable,
}

/// Read-only walk. Returns `None` if any segment is missing or an
/// intermediate node is not an object. The empty path returns the root.
pub fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Mutable variant of [`lookup`].
pub fn lookup_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

/// Walk to the slot addressed by `segments`, optionally creating missing
/// intermediate objects.
///
/// With `create_missing`, an absent intermediate segment is filled with an
/// empty object and the walk continues through it. An intermediate that
/// exists as a non-object always fails the walk.
pub fn resolve_slot<'a>(
    root: &'a mut Value,
    segments: &'a [String],
    create_missing: bool,
) -> Resolution<'a> {
    let Some((last, intermediate)) = segments.split_last() else {
        return Resolution::Root;
    };

    let mut current = root;
    for segment in intermediate {
        let map = match current {
            Value::Object(map) => map,
            _ => return Resolution::Unresolvable,
        };
        current = if create_missing {
            map.entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()))
        } else {
            match map.get_mut(segment) {
                Some(node) => node,
                None => return Resolution::Unresolvable,
            }
        };
    }

    match current {
        Value::Object(parent) => Resolution::Slot { parent, key: last },
        _ => Resolution::Unresolvable,
    }
}
