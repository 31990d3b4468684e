//! Slash-delimited path parsing and formatting.
//!
//! Paths address object keys relative to the root. Empty segments are
//! dropped, so leading, trailing, and doubled slashes are all tolerated:
//! `"/a//b/"` and `"a/b"` name the same node. The empty path (zero
//! segments) names the root.

/// Parse a path into its non-empty segments.
///
/// # Example
///
/// ```
/// use hearth_tree::path::parse;
///
/// assert_eq!(parse(""), Vec::<String>::new());
/// assert_eq!(parse("/"), Vec::<String>::new());
/// assert_eq!(parse("/a/foo"), vec!["a", "foo"]);
/// assert_eq!(parse("//a///foo/"), vec!["a", "foo"]);
/// ```
pub fn parse(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Format segments back into `/a/b` form. The root formats as `""`.
pub fn format(segments: &[String]) -> String {
    if segments.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

/// Extend `base` with the segments of `key`.
///
/// Merge patches carry relative keys that are themselves paths; a key
/// containing `/` nests further, exactly as if the strings had been
/// concatenated with a `/` and re-parsed.
pub fn child(base: &[String], key: &str) -> Vec<String> {
    let mut segments = base.to_vec();
    segments.extend(parse(key));
    segments
}
