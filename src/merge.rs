//! Deep merging of two documents.
//!
//! Objects present on both sides are merged recursively. Arrays on both sides
//! are concatenated when array merging is enabled. Every other conflict is won
//! by the additional document, so merging never fails.

use tracing::trace;

use crate::node::{ConfigNode, Value};

/// Merges `additional` into `base` in place and returns `base`.
///
/// With `merge_arrays` set, `{a: [1, 2]}` merged with `{a: [3]}` gives
/// `{a: [1, 2, 3]}`; otherwise `{a: [3]}`. Concatenation keeps duplicates, so
/// merging the same arrays twice is not idempotent.
pub fn merge(base: &mut ConfigNode, additional: ConfigNode, merge_arrays: bool) -> &mut ConfigNode {
    for (key, value) in additional {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(overlay)) => {
                merge(existing, overlay, merge_arrays);
            }
            (Some(Value::Array(existing)), Value::Array(overlay)) if merge_arrays => {
                existing.extend(overlay);
            }
            (existing, value) => {
                if let Some(old) = existing {
                    trace!(key = %key, from = %old.kind(), to = %value.kind(), "merge replaces value");
                }
                base.insert(key, value);
            }
        }
    }

    base
}

/// Concatenates two arrays, `a` first.
pub fn merge_arrays(mut a: Vec<Value>, b: Vec<Value>) -> Vec<Value> {
    a.extend(b);
    a
}

/// A strategy for combining a base document with additional configuration.
pub trait ConfigMerger {
    fn merge(&self, base: &mut ConfigNode, additional: ConfigNode);
}

/// [`ConfigMerger`] backed by [`merge`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeepMerger {
    pub merge_arrays: bool,
}

impl DeepMerger {
    pub fn new(merge_arrays: bool) -> Self {
        Self { merge_arrays }
    }
}

impl ConfigMerger for DeepMerger {
    fn merge(&self, base: &mut ConfigNode, additional: ConfigNode) {
        merge(base, additional, self.merge_arrays);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(json: &str) -> ConfigNode {
        serde_json::from_str(json).unwrap()
    }

    fn base() -> ConfigNode {
        make_node(
            r#"{
                "baseOnly": "def",
                "baseString": "abc",
                "baseNumber": 100,
                "baseBool": true,
                "baseArray": [1, 2],
                "baseObject": {"objectField1": "inBase"}
            }"#,
        )
    }

    fn additions() -> ConfigNode {
        make_node(
            r#"{
                "baseString": "xyz",
                "baseNumber": 200,
                "baseBool": false,
                "baseArray": [3, 4],
                "baseObject": {"objectField2": "inAdditions"},
                "addOnly": [true]
            }"#,
        )
    }

    #[test]
    fn test_merge_replacing_arrays() {
        let mut base = base();
        let result = merge(&mut base, additions(), false);

        assert_eq!(result["baseOnly"], Value::from("def"));
        assert_eq!(result["baseString"], Value::from("xyz"));
        assert_eq!(result["baseNumber"], Value::from(200));
        assert_eq!(result["baseBool"], Value::from(false));
        assert_eq!(result["baseArray"], Value::Array(vec![3.into(), 4.into()]));
        assert_eq!(result["addOnly"], Value::Array(vec![true.into()]));

        let object = result["baseObject"].as_object().unwrap();
        assert_eq!(object["objectField1"], Value::from("inBase"));
        assert_eq!(object["objectField2"], Value::from("inAdditions"));
    }

    #[test]
    fn test_merge_concatenating_arrays() {
        let mut base = base();
        merge(&mut base, additions(), true);

        assert_eq!(
            base["baseArray"],
            Value::Array(vec![1.into(), 2.into(), 3.into(), 4.into()])
        );
    }

    #[test]
    fn test_shape_conflicts_take_additional() {
        let mut base = make_node(r#"{"a": {"x": 1}, "b": [1], "c": "s"}"#);
        merge(&mut base, make_node(r#"{"a": 5, "b": {"y": 2}, "c": [1]}"#), true);

        assert_eq!(base, make_node(r#"{"a": 5, "b": {"y": 2}, "c": [1]}"#));
    }

    #[test]
    fn test_merge_is_idempotent_without_arrays() {
        let add = make_node(r#"{"a": {"y": 2, "z": {"q": true}}, "b": "s"}"#);

        let mut once = make_node(r#"{"a": {"x": 1}}"#);
        merge(&mut once, add.clone(), true);
        let mut twice = once.clone();
        merge(&mut twice, add, true);

        assert_eq!(once, twice);
        assert_eq!(once, make_node(r#"{"a": {"x": 1, "y": 2, "z": {"q": true}}, "b": "s"}"#));
    }

    #[test]
    fn test_array_concatenation_repeats_on_second_merge() {
        let add = make_node(r#"{"a": [1]}"#);
        let mut base = ConfigNode::new();
        merge(&mut base, add.clone(), true);
        merge(&mut base, add, true);
        assert_eq!(base["a"], Value::Array(vec![1.into(), 1.into()]));
    }

    #[test]
    fn test_merger_trait() {
        let merger: &dyn ConfigMerger = &DeepMerger::new(true);
        let mut base = make_node(r#"{"l": ["a"]}"#);
        merger.merge(&mut base, make_node(r#"{"l": ["b"]}"#));
        assert_eq!(base["l"], Value::Array(vec!["a".into(), "b".into()]));

        assert_eq!(
            merge_arrays(vec![1.into()], vec![1.into()]),
            vec![Value::from(1), Value::from(1)]
        );
    }
}
