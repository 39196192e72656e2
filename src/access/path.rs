//! Dotted path resolution.
//!
//! `a.b.c` names key `c` inside the object at `b` inside the object at `a`.
//! Empty segments never match anything, and an explicit `null` is treated the
//! same as an absent key.

use crate::error::{AccessError, Result};
use crate::node::{ConfigNode, Value};

/// Separates the segments of a path.
pub const PATH_SEPARATOR: char = '.';

/// Returns the value at `path`, or `None` if nothing (or only `null`) is stored there.
///
/// Descending through a value that is not an object also yields `None`; the typed
/// accessors report that case as a type mismatch instead.
pub fn value<'a>(path: &str, node: &'a ConfigNode) -> Option<&'a Value> {
    resolve(path, node).ok().flatten()
}

/// True when a non-null value is stored at `path`.
pub fn path_exists(path: &str, node: &ConfigNode) -> bool {
    value(path, node).is_some()
}

/// Walks `path` through `node`.
///
/// `Ok(None)` means the path is absent. An error means an intermediate segment
/// resolved to something other than an object.
pub(crate) fn resolve<'a>(path: &str, node: &'a ConfigNode) -> Result<Option<&'a Value>> {
    let mut segments = path.split(PATH_SEPARATOR);
    let mut consumed = 0;

    // split always yields at least one segment
    let first = segments.next().unwrap_or_default();
    let mut current = match lookup(node, first) {
        Some(v) => v,
        None => return Ok(None),
    };
    consumed += first.len();

    for segment in segments {
        let parent = current.as_object().ok_or_else(|| {
            AccessError::mismatch(&path[..consumed], "an object", current.kind())
        })?;

        current = match lookup(parent, segment) {
            Some(v) => v,
            None => return Ok(None),
        };
        consumed += segment.len() + PATH_SEPARATOR.len_utf8();
    }

    Ok(Some(current))
}

fn lookup<'a>(node: &'a ConfigNode, key: &str) -> Option<&'a Value> {
    if key.is_empty() {
        return None;
    }
    node.get(key).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ValueKind;

    fn make_node(json: &str) -> ConfigNode {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_nested_lookup() {
        let node = make_node(r#"{"a": {"b": {"c": "x"}}}"#);
        assert_eq!(value("a.b.c", &node), Some(&Value::from("x")));
        assert!(value("a.b", &node).unwrap().as_object().is_some());
        assert!(path_exists("a", &node));
    }

    #[test]
    fn test_missing_paths() {
        let node = make_node(r#"{"a": {"b": 1}}"#);
        for path in ["x", "a.x", "a.b.c.d", "", ".....", "a.", ".a", "a..b"] {
            assert!(!path_exists(path, &node), "{path} should be missing");
            assert_eq!(value(path, &node), None);
        }
    }

    #[test]
    fn test_null_is_absent() {
        let node = make_node(r#"{"a": null, "b": {"c": null}}"#);
        assert!(!path_exists("a", &node));
        assert!(!path_exists("b.c", &node));
        assert!(!path_exists("a.x", &node));
    }

    #[test]
    fn test_descent_through_scalar_is_an_error() {
        let node = make_node(r#"{"a": {"b": "text"}}"#);
        let err = resolve("a.b.c", &node).unwrap_err();
        assert!(matches!(
            err,
            AccessError::TypeMismatch { ref path, found: ValueKind::String, .. } if path == "a.b"
        ));
        assert_eq!(value("a.b.c", &node), None);
    }
}
