//! Deferred-error access.
//!
//! Call sites that would rather not handle a `Result` for every lookup can wrap
//! a selector in a [`QuietSelector`]. Failures are passed to a handler and the
//! accessor returns the zero value for its type instead.

use std::fmt;

use tracing::debug;

use super::{DefaultSelector, Opts, Selector};
use crate::error::{AccessError, Result};
use crate::node::{ConfigNode, Value};

/// Wraps a [`Selector`], reporting failures to `handler` instead of returning them.
///
/// The zero values (`""`, `0`, `false`, `None`, an empty `Vec`) cannot be told
/// apart from real values, so callers that care must track whether the handler
/// ran.
///
/// ```
/// use std::cell::Cell;
/// use config_select::{DefaultSelector, QuietSelector};
///
/// let failures = Cell::new(0);
/// let quiet = QuietSelector::new(
///     DefaultSelector::from_path_values([("app.name", "demo")]),
///     |_path, _err| failures.set(failures.get() + 1),
/// );
///
/// assert_eq!(quiet.string_val("app.name"), "demo");
/// assert_eq!(quiet.int_val("app.port"), 0);
/// assert_eq!(failures.get(), 1);
/// ```
pub struct QuietSelector<S, F> {
    inner: S,
    handler: F,
}

impl<F> QuietSelector<DefaultSelector, F> {
    /// Builds a quiet selector over flat `"dotted.path" -> value` pairs.
    /// See [`DefaultSelector::from_path_values`].
    pub fn from_path_values<I, K, V>(values: I, handler: F) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
        F: Fn(&str, &AccessError),
    {
        Self::new(DefaultSelector::from_path_values(values), handler)
    }
}

impl<S, F> QuietSelector<S, F> {
    pub fn new(inner: S, handler: F) -> Self
    where
        S: Selector,
        F: Fn(&str, &AccessError),
    {
        Self { inner, handler }
    }
}

impl<S, F> QuietSelector<S, F>
where
    S: Selector,
    F: Fn(&str, &AccessError),
{
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Never reports to the handler.
    pub fn path_exists(&self, path: &str) -> bool {
        self.inner.path_exists(path)
    }

    /// Never reports to the handler.
    pub fn value(&self, path: &str) -> Option<Value> {
        self.inner.value(path)
    }

    pub fn object_val(&self, path: &str) -> Option<ConfigNode> {
        self.object_val_with(path, &Opts::default())
    }

    pub fn object_val_with(&self, path: &str, opts: &Opts<ConfigNode>) -> Option<ConfigNode> {
        self.quietly(path, self.inner.object_val_with(path, opts))
    }

    pub fn string_val(&self, path: &str) -> String {
        self.string_val_with(path, &Opts::default())
    }

    pub fn string_val_with(&self, path: &str, opts: &Opts<String>) -> String {
        self.quietly(path, self.inner.string_val_with(path, opts))
    }

    pub fn string_or_env(&self, path: &str) -> String {
        self.string_or_env_with(path, &Opts::default())
    }

    pub fn string_or_env_with(&self, path: &str, opts: &Opts<String>) -> String {
        self.quietly(path, self.inner.string_or_env_with(path, opts))
    }

    pub fn int_val(&self, path: &str) -> i64 {
        self.int_val_with(path, &Opts::default())
    }

    pub fn int_val_with(&self, path: &str, opts: &Opts<i64>) -> i64 {
        self.quietly(path, self.inner.int_val_with(path, opts))
    }

    pub fn float64_val(&self, path: &str) -> f64 {
        self.float64_val_with(path, &Opts::default())
    }

    pub fn float64_val_with(&self, path: &str, opts: &Opts<f64>) -> f64 {
        self.quietly(path, self.inner.float64_val_with(path, opts))
    }

    pub fn bool_val(&self, path: &str) -> bool {
        self.bool_val_with(path, &Opts::default())
    }

    pub fn bool_val_with(&self, path: &str, opts: &Opts<bool>) -> bool {
        self.quietly(path, self.inner.bool_val_with(path, opts))
    }

    pub fn array(&self, path: &str) -> Option<Vec<Value>> {
        self.array_with(path, &Opts::default())
    }

    pub fn array_with(&self, path: &str, opts: &Opts<Vec<Value>>) -> Option<Vec<Value>> {
        self.quietly(path, self.inner.array_with(path, opts))
    }

    pub fn string_array(&self, path: &str) -> Vec<String> {
        self.string_array_with(path, &Opts::default())
    }

    pub fn string_array_with(&self, path: &str, opts: &Opts<Vec<String>>) -> Vec<String> {
        self.quietly(path, self.inner.string_array_with(path, opts))
    }

    pub fn int_array(&self, path: &str) -> Vec<i64> {
        self.int_array_with(path, &Opts::default())
    }

    pub fn int_array_with(&self, path: &str, opts: &Opts<Vec<i64>>) -> Vec<i64> {
        self.quietly(path, self.inner.int_array_with(path, opts))
    }

    pub fn float64_array(&self, path: &str) -> Vec<f64> {
        self.float64_array_with(path, &Opts::default())
    }

    pub fn float64_array_with(&self, path: &str, opts: &Opts<Vec<f64>>) -> Vec<f64> {
        self.quietly(path, self.inner.float64_array_with(path, opts))
    }

    fn quietly<T: Default>(&self, path: &str, result: Result<T>) -> T {
        result.unwrap_or_else(|err| {
            debug!(path, error = %err, "deferring config access error to handler");
            (self.handler)(path, &err);
            T::default()
        })
    }
}

impl<S: fmt::Debug, F> fmt::Debug for QuietSelector<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuietSelector")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn make_selector() -> DefaultSelector {
        let node: ConfigNode = serde_json::from_str(
            r#"{
                "simple": {
                    "String": "abc",
                    "Bool": true,
                    "Int": 32,
                    "Float": 32.22,
                    "StringArray": ["a", "b", "c"],
                    "IntArray": [1, 2, 3],
                    "StringMap": {"k": "v"}
                }
            }"#,
        )
        .unwrap();
        DefaultSelector::new(node, true, true)
    }

    #[test]
    fn test_values_pass_through_without_invoking_handler() {
        let invoked = Cell::new(false);
        let quiet = QuietSelector::new(make_selector(), |_, _| invoked.set(true));

        assert!(quiet.path_exists("simple.String"));
        assert_eq!(quiet.string_val("simple.String"), "abc");
        assert!(quiet.bool_val("simple.Bool"));
        assert_eq!(quiet.int_val("simple.Int"), 32);
        assert_eq!(quiet.float64_val("simple.Float"), 32.22);
        assert!(quiet.object_val("simple.StringMap").is_some());
        assert_eq!(quiet.array("simple.StringArray").unwrap()[1], Value::from("b"));
        assert_eq!(quiet.string_array("simple.StringArray")[1], "b");
        assert_eq!(quiet.int_array("simple.IntArray")[1], 2);
        assert_eq!(quiet.float64_array("simple.IntArray"), [1.0, 2.0, 3.0]);
        assert!(quiet.value("simple.String").is_some());

        assert!(!invoked.get());
    }

    #[test]
    fn test_failures_yield_zero_values_and_report() {
        let reported = RefCell::new(Vec::new());
        let quiet = QuietSelector::new(make_selector(), |path, err: &AccessError| {
            reported.borrow_mut().push((path.to_string(), err.is_missing_path()));
        });

        assert_eq!(quiet.string_val("missing.String"), "");
        assert!(!quiet.bool_val("missing.Bool"));
        assert_eq!(quiet.int_val("missing.Int"), 0);
        assert_eq!(quiet.float64_val("missing.Float"), 0.0);
        assert_eq!(quiet.object_val("missing.StringMap"), None);
        assert_eq!(quiet.array("missing.StringArray"), None);
        assert!(quiet.string_array("missing.StringArray").is_empty());
        assert!(quiet.int_array("missing.IntArray").is_empty());
        assert!(quiet.float64_array("missing.FloatArray").is_empty());
        assert_eq!(quiet.int_val("simple.String"), 0);

        let reported = reported.borrow();
        assert_eq!(reported.len(), 10);
        assert_eq!(reported[0], ("missing.String".to_string(), true));
        assert_eq!(reported[9], ("simple.String".to_string(), false));
    }

    #[test]
    fn test_existence_checks_never_report() {
        let invoked = Cell::new(false);
        let quiet = QuietSelector::new(make_selector(), |_, _| invoked.set(true));

        assert!(!quiet.path_exists("missing"));
        assert_eq!(quiet.value("missing.String"), None);
        assert!(!invoked.get());
    }

    #[test]
    fn test_defaults_suppress_handler() {
        let invoked = Cell::new(false);
        let quiet = QuietSelector::new(make_selector(), |_, _| invoked.set(true));

        assert_eq!(quiet.int_val_with("missing", &Opts::new().on_missing(9)), 9);
        assert!(!invoked.get());
    }

    #[test]
    fn test_from_path_values() {
        let invoked = Cell::new(false);
        let quiet = QuietSelector::from_path_values([("a.b", 1.5)], |_, _| invoked.set(true));

        assert_eq!(quiet.float64_val("a.b"), 1.5);
        assert_eq!(quiet.string_val("a.b"), "");
        assert!(invoked.get());
    }
}
