//! Type-checked accessors over a [`ConfigNode`].
//!
//! Conversions are deliberately narrow: a bool is only ever a bool literal, a
//! string is never parsed as a number, and numbers are not truthy. Because every
//! number is stored as `f64`, [`int_val`] truncates towards zero.

use super::path::resolve;
use crate::error::{AccessError, Result};
use crate::node::{ConfigNode, Value};

/// Resolves `path`, turning absence into a `MissingPath` error.
fn required<'a>(path: &str, node: &'a ConfigNode) -> Result<&'a Value> {
    resolve(path, node)?.ok_or_else(|| AccessError::missing(path))
}

/// Returns the string stored at `path`. Other shapes are not converted.
pub fn string_val<'a>(path: &str, node: &'a ConfigNode) -> Result<&'a str> {
    let v = required(path, node)?;
    v.as_str()
        .ok_or_else(|| AccessError::mismatch(path, "a string", v.kind()))
}

/// Returns the number at `path` as an integer.
///
/// The fractional part is discarded without error: `3.9` reads as `3`.
pub fn int_val(path: &str, node: &ConfigNode) -> Result<i64> {
    let v = required(path, node)?;
    v.as_f64()
        .map(|f| f as i64)
        .ok_or_else(|| AccessError::mismatch(path, "an int", v.kind()))
}

/// Returns the number at `path`. Integers and fractions both read as `f64`.
pub fn float64_val(path: &str, node: &ConfigNode) -> Result<f64> {
    let v = required(path, node)?;
    v.as_f64()
        .ok_or_else(|| AccessError::mismatch(path, "a float64", v.kind()))
}

/// Returns the bool at `path`. Only `true`/`false` literals are accepted, not `1`,
/// `"yes"` or other extended forms.
pub fn bool_val(path: &str, node: &ConfigNode) -> Result<bool> {
    let v = required(path, node)?;
    v.as_bool()
        .ok_or_else(|| AccessError::mismatch(path, "a bool", v.kind()))
}

/// Returns the object at `path`.
///
/// When the path is absent this is `Ok(None)`, unless `err_if_missing` is set.
/// Anything other than an object is a type mismatch.
pub fn object_val<'a>(
    path: &str,
    node: &'a ConfigNode,
    err_if_missing: bool,
) -> Result<Option<&'a ConfigNode>> {
    match resolve(path, node)? {
        None if err_if_missing => Err(AccessError::missing(path)),
        None => Ok(None),
        Some(Value::Object(o)) => Ok(Some(o)),
        Some(v) => Err(AccessError::mismatch(path, "an object", v.kind())),
    }
}

/// Returns the array at `path`, with the same missing-path rules as [`object_val`].
pub fn array<'a>(
    path: &str,
    node: &'a ConfigNode,
    err_if_missing: bool,
) -> Result<Option<&'a [Value]>> {
    match resolve(path, node)? {
        None if err_if_missing => Err(AccessError::missing(path)),
        None => Ok(None),
        Some(Value::Array(a)) => Ok(Some(a)),
        Some(v) => Err(AccessError::mismatch(path, "an array", v.kind())),
    }
}

/// Converts every element of the array at `path`, failing on the first element
/// that `convert` rejects. A missing path is always an error.
fn typed_array<T>(
    path: &str,
    node: &ConfigNode,
    expected: &'static str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Result<Vec<T>> {
    let items = array(path, node, true)?.unwrap_or_default();

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            convert(item).ok_or_else(|| AccessError::ElementMismatch {
                path: path.to_string(),
                index,
                expected,
                found: item.kind(),
            })
        })
        .collect()
}

/// Returns the array at `path` as strings, rejecting the first non-string element.
pub fn string_array(path: &str, node: &ConfigNode) -> Result<Vec<String>> {
    typed_array(path, node, "a string", |v| v.as_str().map(str::to_string))
}

/// Integer elements truncate the same way [`int_val`] does.
pub fn int_array(path: &str, node: &ConfigNode) -> Result<Vec<i64>> {
    typed_array(path, node, "an int", |v| v.as_f64().map(|f| f as i64))
}

/// Returns the array at `path` as numbers, rejecting the first non-number element.
pub fn float64_array(path: &str, node: &ConfigNode) -> Result<Vec<f64>> {
    typed_array(path, node, "a float64", Value::as_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ValueKind;

    fn make_node(json: &str) -> ConfigNode {
        serde_json::from_str(json).unwrap()
    }

    fn sample() -> ConfigNode {
        make_node(
            r#"{
                "simple": {
                    "String": "abc",
                    "Bool": true,
                    "Int": 32,
                    "Float": 32.22,
                    "Fraction": 3.9,
                    "Negative": -3.9,
                    "StringArray": ["a", "b", "c"],
                    "IntArray": [1, 2, 3],
                    "Mixed": ["a", 1],
                    "Empty": []
                }
            }"#,
        )
    }

    #[test]
    fn test_scalars() {
        let node = sample();
        assert_eq!(string_val("simple.String", &node).unwrap(), "abc");
        assert!(bool_val("simple.Bool", &node).unwrap());
        assert_eq!(int_val("simple.Int", &node).unwrap(), 32);
        assert_eq!(float64_val("simple.Float", &node).unwrap(), 32.22);
    }

    #[test]
    fn test_int_truncates() {
        let node = sample();
        assert_eq!(int_val("simple.Fraction", &node).unwrap(), 3);
        assert_eq!(int_val("simple.Negative", &node).unwrap(), -3);
    }

    #[test]
    fn test_wrong_types() {
        let node = sample();
        assert!(matches!(
            int_val("simple.String", &node),
            Err(AccessError::TypeMismatch { found: ValueKind::String, .. })
        ));
        assert!(bool_val("simple.String", &node).is_err());
        assert!(bool_val("simple.Int", &node).is_err());
        assert!(float64_val("simple.String", &node).is_err());
        assert!(string_val("simple.Bool", &node).is_err());
        assert!(string_val("simple.Int", &node).is_err());
    }

    #[test]
    fn test_missing_scalars() {
        let node = sample();
        assert!(string_val("missing.path", &node).unwrap_err().is_missing_path());
        assert!(bool_val("missing.path", &node).unwrap_err().is_missing_path());
        assert!(int_val("missing.path", &node).unwrap_err().is_missing_path());
        assert!(float64_val("missing.path", &node).unwrap_err().is_missing_path());
    }

    #[test]
    fn test_object_and_array() {
        let node = sample();

        assert!(object_val("simple", &node, false).unwrap().is_some());
        assert_eq!(object_val("nothing", &node, false).unwrap(), None);
        assert!(object_val("nothing", &node, true).unwrap_err().is_missing_path());
        assert!(matches!(
            object_val("simple.Bool", &node, false),
            Err(AccessError::TypeMismatch { .. })
        ));
        assert!(object_val("simple.StringArray", &node, false).is_err());

        let a = array("simple.StringArray", &node, false).unwrap().unwrap();
        assert_eq!(a[1], Value::from("b"));
        assert_eq!(array("simple.Nothing", &node, false).unwrap(), None);
        assert!(array("simple.Nothing", &node, true).unwrap_err().is_missing_path());
        assert!(array("simple.Bool", &node, false).is_err());
    }

    #[test]
    fn test_typed_arrays() {
        let node = sample();
        assert_eq!(string_array("simple.StringArray", &node).unwrap(), ["a", "b", "c"]);
        assert_eq!(int_array("simple.IntArray", &node).unwrap(), [1, 2, 3]);
        assert_eq!(float64_array("simple.IntArray", &node).unwrap(), [1.0, 2.0, 3.0]);
        assert!(string_array("simple.Empty", &node).unwrap().is_empty());

        assert!(string_array("missing.StringArray", &node).unwrap_err().is_missing_path());
        assert!(int_array("simple.StringArray", &node).is_err());
        assert!(float64_array("simple.StringArray", &node).is_err());
    }

    #[test]
    fn test_typed_array_reports_first_bad_index() {
        let node = sample();
        let err = string_array("simple.Mixed", &node).unwrap_err();
        assert!(matches!(
            err,
            AccessError::ElementMismatch { index: 1, found: ValueKind::Number, .. }
        ));
        assert_eq!(
            err.to_string(),
            "value at simple.Mixed[1] is a number and cannot be converted to a string"
        );
    }

    #[test]
    fn test_descending_through_scalar_is_a_mismatch() {
        let node = sample();
        assert!(matches!(
            string_val("simple.String.deeper", &node),
            Err(AccessError::TypeMismatch { .. })
        ));
    }
}
