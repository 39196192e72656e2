//! Stateful access to a bound document.
//!
//! A [`Selector`] forwards to the free functions in [`access`](crate::access),
//! adding per-call [`Opts`] (defaults for missing paths, environment-variable
//! indirection) and an explicit [`flush`](Selector::flush) that releases the
//! document.

mod env;
mod opts;
mod quiet;

use serde::de::DeserializeOwned;
use tracing::debug;

pub use opts::{EnvLookup, Opts, DEFAULT_ENV_PREFIX};
pub use quiet::QuietSelector;

use crate::access::{self, PATH_SEPARATOR};
use crate::error::{AccessError, Result};
use crate::node::{ConfigNode, Document, Value};
use crate::populate;

/// Typed, path-based access to one configuration document.
///
/// Every accessor comes in two forms: `string_val(path)` and
/// `string_val_with(path, &opts)`. The plain form behaves like the `_with` form
/// called with default options.
pub trait Selector {
    /// True when a non-null value is stored at `path`.
    fn path_exists(&self, path: &str) -> bool;

    /// A copy of the value at `path`, if any.
    fn value(&self, path: &str) -> Option<Value>;

    /// The object at `path`; missing handling follows the selector's object flag.
    fn object_val_with(&self, path: &str, opts: &Opts<ConfigNode>) -> Result<Option<ConfigNode>>;
    /// The string at `path`.
    fn string_val_with(&self, path: &str, opts: &Opts<String>) -> Result<String>;
    /// The number at `path`, truncated to an integer.
    fn int_val_with(&self, path: &str, opts: &Opts<i64>) -> Result<i64>;
    /// The number at `path`.
    fn float64_val_with(&self, path: &str, opts: &Opts<f64>) -> Result<f64>;
    /// The bool at `path`.
    fn bool_val_with(&self, path: &str, opts: &Opts<bool>) -> Result<bool>;
    /// The array at `path`; missing handling follows the selector's array flag.
    fn array_with(&self, path: &str, opts: &Opts<Vec<Value>>) -> Result<Option<Vec<Value>>>;
    /// The array at `path`, every element a string.
    fn string_array_with(&self, path: &str, opts: &Opts<Vec<String>>) -> Result<Vec<String>>;
    /// The array at `path`, every element a number truncated to an integer.
    fn int_array_with(&self, path: &str, opts: &Opts<Vec<i64>>) -> Result<Vec<i64>>;
    /// The array at `path`, every element a number.
    fn float64_array_with(&self, path: &str, opts: &Opts<Vec<f64>>) -> Result<Vec<f64>>;

    /// Reads a string, and if it starts with the environment prefix (`$` unless
    /// overridden) returns the named environment variable instead.
    ///
    /// An unset or empty variable is an [`AccessError::EnvVarUnset`].
    fn string_or_env_with(&self, path: &str, opts: &Opts<String>) -> Result<String>;

    /// Releases the bound document. Afterwards every path is missing.
    fn flush(&mut self);

    /// The bound document, sharing data with the caller's handle.
    fn config(&self) -> Result<Document>;

    fn object_val(&self, path: &str) -> Result<Option<ConfigNode>> {
        self.object_val_with(path, &Opts::default())
    }

    fn string_val(&self, path: &str) -> Result<String> {
        self.string_val_with(path, &Opts::default())
    }

    fn int_val(&self, path: &str) -> Result<i64> {
        self.int_val_with(path, &Opts::default())
    }

    fn float64_val(&self, path: &str) -> Result<f64> {
        self.float64_val_with(path, &Opts::default())
    }

    fn bool_val(&self, path: &str) -> Result<bool> {
        self.bool_val_with(path, &Opts::default())
    }

    fn array(&self, path: &str) -> Result<Option<Vec<Value>>> {
        self.array_with(path, &Opts::default())
    }

    fn string_array(&self, path: &str) -> Result<Vec<String>> {
        self.string_array_with(path, &Opts::default())
    }

    fn int_array(&self, path: &str) -> Result<Vec<i64>> {
        self.int_array_with(path, &Opts::default())
    }

    fn float64_array(&self, path: &str) -> Result<Vec<f64>> {
        self.float64_array_with(path, &Opts::default())
    }

    fn string_or_env(&self, path: &str) -> Result<String> {
        self.string_or_env_with(path, &Opts::default())
    }
}

static EMPTY: ConfigNode = ConfigNode::new();

/// The standard [`Selector`] over a shared [`Document`].
///
/// The selector holds the document handle, not a copy: changes made through any
/// other clone of the handle are visible on the next read.
#[derive(Debug, Clone)]
pub struct DefaultSelector {
    document: Option<Document>,
    error_on_missing_object: bool,
    error_on_missing_array: bool,
}

impl DefaultSelector {
    /// Binds a selector to `document`.
    ///
    /// The two flags decide whether [`Selector::object_val`] and
    /// [`Selector::array`] report a missing path as an error or as `Ok(None)`.
    pub fn new(
        document: impl Into<Document>,
        error_on_missing_object: bool,
        error_on_missing_array: bool,
    ) -> Self {
        Self {
            document: Some(document.into()),
            error_on_missing_object,
            error_on_missing_array,
        }
    }

    /// A selector whose object and array lookups never fail on a missing path.
    pub fn lenient(document: impl Into<Document>) -> Self {
        Self::new(document, false, false)
    }

    /// Builds a selector from flat `"dotted.path" -> value` pairs.
    ///
    /// Each key is exploded into nested objects. Blank keys are skipped. When one
    /// key is a prefix of another, the nested form wins over a scalar.
    pub fn from_path_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut root = ConfigNode::new();

        for (key, value) in values {
            let key = key.as_ref();
            if key.trim().is_empty() {
                continue;
            }
            let segments: Vec<&str> = key.split(PATH_SEPARATOR).collect();
            insert_at_path(&mut root, &segments, value.into());
        }

        Self::lenient(root)
    }

    /// Deserializes the object at `path` into `T`. See [`populate::populate`].
    pub fn populate<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.read(|node| populate::populate(path, node))
    }

    fn read<R>(&self, f: impl FnOnce(&ConfigNode) -> R) -> R {
        match &self.document {
            Some(doc) => f(&*doc.borrow()),
            None => f(&EMPTY),
        }
    }

    /// The supplied default, when there is one and `path` is absent. Descending
    /// through a scalar is still a type mismatch.
    fn default_for<T: Clone>(&self, path: &str, opts: &Opts<T>) -> Result<Option<T>> {
        let Some(default) = opts.on_missing.as_ref() else {
            return Ok(None);
        };
        if self.read(|node| access::resolve(path, node).map(|v| v.is_some()))? {
            return Ok(None);
        }
        debug!(path, "config path absent, using supplied default");
        Ok(Some(default.clone()))
    }
}

impl Selector for DefaultSelector {
    fn path_exists(&self, path: &str) -> bool {
        self.read(|node| access::path_exists(path, node))
    }

    fn value(&self, path: &str) -> Option<Value> {
        self.read(|node| access::value(path, node).cloned())
    }

    fn object_val_with(&self, path: &str, opts: &Opts<ConfigNode>) -> Result<Option<ConfigNode>> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(Some(default));
        }
        self.read(|node| {
            access::object_val(path, node, self.error_on_missing_object).map(|o| o.cloned())
        })
    }

    fn string_val_with(&self, path: &str, opts: &Opts<String>) -> Result<String> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::string_val(path, node).map(str::to_string))
    }

    fn int_val_with(&self, path: &str, opts: &Opts<i64>) -> Result<i64> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::int_val(path, node))
    }

    fn float64_val_with(&self, path: &str, opts: &Opts<f64>) -> Result<f64> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::float64_val(path, node))
    }

    fn bool_val_with(&self, path: &str, opts: &Opts<bool>) -> Result<bool> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::bool_val(path, node))
    }

    fn array_with(&self, path: &str, opts: &Opts<Vec<Value>>) -> Result<Option<Vec<Value>>> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(Some(default));
        }
        self.read(|node| {
            access::array(path, node, self.error_on_missing_array).map(|a| a.map(<[Value]>::to_vec))
        })
    }

    fn string_array_with(&self, path: &str, opts: &Opts<Vec<String>>) -> Result<Vec<String>> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::string_array(path, node))
    }

    fn int_array_with(&self, path: &str, opts: &Opts<Vec<i64>>) -> Result<Vec<i64>> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::int_array(path, node))
    }

    fn float64_array_with(&self, path: &str, opts: &Opts<Vec<f64>>) -> Result<Vec<f64>> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        self.read(|node| access::float64_array(path, node))
    }

    fn string_or_env_with(&self, path: &str, opts: &Opts<String>) -> Result<String> {
        if let Some(default) = self.default_for(path, opts)? {
            return Ok(default);
        }
        let raw = self.read(|node| access::string_val(path, node).map(str::to_string))?;
        env::expand(path, raw, opts)
    }

    fn flush(&mut self) {
        debug!("releasing selector document");
        self.document = None;
    }

    fn config(&self) -> Result<Document> {
        self.document.clone().ok_or(AccessError::NilDocument)
    }
}

/// Inserts `value` at the nested location named by `segments`, creating (or
/// replacing non-object values with) intermediate objects as needed.
fn insert_at_path(node: &mut ConfigNode, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        match (node.get_mut(*first), value) {
            (Some(Value::Object(existing)), Value::Object(overlay)) => {
                crate::merge::merge(existing, overlay, false);
            }
            // a nested form already here beats a scalar for the same prefix
            (Some(Value::Object(_)), _) => {}
            (_, value) => {
                node.insert(first.to_string(), value);
            }
        }
        return;
    }

    if !matches!(node.get(*first), Some(Value::Object(_))) {
        node.insert(first.to_string(), Value::Object(ConfigNode::new()));
    }

    if let Some(Value::Object(nested)) = node.get_mut(*first) {
        insert_at_path(nested, rest, value);
    }
}
