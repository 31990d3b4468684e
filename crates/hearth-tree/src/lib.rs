//! Mirrored-tree primitives.
//!
//! The tree mirrored from a remote realtime-database service is a plain
//! [`serde_json::Value`] (built with `preserve_order`, so object keys keep
//! insertion order). This crate implements the operations the sync engine
//! needs on that tree:
//!
//! - [`path`] — slash-delimited path parsing and formatting,
//! - [`resolve`] — walking a path to a node or to its parent slot,
//! - [`apply`] — the two patch kinds, full replace and relative merge,
//! - [`prune`] — the invariant-restoring pass that removes null entries
//!   and collapses empty object subtrees after every mutation.
//!
//! # Example
//!
//! ```
//! use serde_json::{json, Value};
//! use hearth_tree::{apply, prune, path, resolve};
//!
//! let mut root = Value::Object(serde_json::Map::new());
//! let segments = path::parse("/a/foo");
//! apply::replace(&mut root, &segments, json!({"bar": 1}), prune::DEFAULT_MAX_DEPTH).unwrap();
//! let got = resolve::lookup(&root, &path::parse("/a/foo/bar"));
//! assert_eq!(got, Some(&json!(1)));
//! ```

use thiserror::Error;

pub mod apply;
pub mod path;
pub mod prune;
pub mod resolve;

pub use prune::DEFAULT_MAX_DEPTH;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The tree, or the mutation being applied, nests objects deeper than
    /// the caller-imposed bound. Nothing has been mutated when this is
    /// returned.
    #[error("maximum tree depth {limit} exceeded")]
    DepthExceeded { limit: usize },
    /// A path segment landed on a node that exists but is not an object.
    /// Scalars are never silently coerced into objects.
    #[error("path traverses a non-object node")]
    NotAnObject,
    /// A merge patch must be an object of relative-path entries.
    #[error("merge patch is not an object")]
    MergeNotAnObject,
}
