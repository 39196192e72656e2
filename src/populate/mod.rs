//! Copying a document subtree into a statically shaped record.
//!
//! Targets describe their shape through `serde::Deserialize`, so field
//! mappings are generated at compile time by `#[derive(Deserialize)]`:
//!
//! ```
//! use std::collections::HashMap;
//! use config_select::{populate, ConfigNode};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Server {
//!     host: String,
//!     port: u16,
//!     tags: Vec<String>,
//!     labels: HashMap<String, String>,
//! }
//!
//! let node: ConfigNode = serde_json::from_str(
//!     r#"{"server": {"host": "localhost", "port": 8080, "tags": ["a"], "labels": {"env": "dev"}}}"#,
//! ).unwrap();
//!
//! let server: Server = populate("server", &node)?;
//! assert_eq!(server.port, 8080);
//! assert_eq!(server.labels["env"], "dev");
//! # Ok::<(), config_select::AccessError>(())
//! ```
//!
//! Field conversions follow the accessor rules. Lists stored as values of a
//! map-shaped field must be non-empty lists of strings. Byte buffers, tuples and
//! tuple structs are not supported as field types.

mod de;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use self::de::ValueDeserializer;
use crate::access::object_val;
use crate::error::{AccessError, Result};
use crate::node::{ConfigNode, Value};

/// Builds a `T` from the object at `path`.
///
/// Fails with a missing-path error if nothing is stored there, and with a type
/// mismatch if the value is not an object. Either `T` is fully built or an error
/// is returned; there is no partial population.
pub fn populate<T: DeserializeOwned>(path: &str, node: &ConfigNode) -> Result<T> {
    debug!(path, record = std::any::type_name::<T>(), "populating from config");

    let object = object_val(path, node, true)?.ok_or_else(|| AccessError::missing(path))?;
    from_object(path, object)
}

/// Names the document root in errors about the record as a whole.
pub const ROOT_FIELD: &str = "root";

/// Like [`populate`], with the whole document as the source.
pub fn populate_from_root<T: DeserializeOwned>(node: &ConfigNode) -> Result<T> {
    debug!(record = std::any::type_name::<T>(), "populating from config root");
    from_object("", node)
}

/// Replaces `target` with the record built from `path`. On error `target` is
/// left untouched.
pub fn populate_into<T: DeserializeOwned>(path: &str, target: &mut T, node: &ConfigNode) -> Result<()> {
    *target = populate(path, node)?;
    Ok(())
}

/// Serializes `record` back into a document node.
///
/// The record must serialize to a map (a struct or a map type).
pub fn to_node<T: Serialize>(record: &T) -> Result<ConfigNode> {
    let name = std::any::type_name::<T>();
    let json = serde_json::to_value(record).map_err(|e| AccessError::UnserializableValue {
        path: name.to_string(),
        reason: e.to_string(),
    })?;

    match Value::from(json) {
        Value::Object(node) => Ok(node),
        other => Err(AccessError::mismatch(name, "an object", other.kind())),
    }
}

fn from_object<T: DeserializeOwned>(path: &str, object: &ConfigNode) -> Result<T> {
    for (key, value) in object {
        check_serializable(&join(path, key), value)?;
    }

    let root = Value::Object(object.clone());
    T::deserialize(ValueDeserializer::new(&root)).map_err(|err| match err {
        AccessError::UnsupportedField { field, shape } if field.is_empty() => {
            let field = if path.is_empty() { ROOT_FIELD } else { path };
            AccessError::UnsupportedField {
                field: field.to_string(),
                shape,
            }
        }
        other => other,
    })
}

/// Rejects values no interchange format can carry, such as NaN or infinities.
fn check_serializable(path: &str, value: &Value) -> Result<()> {
    match value {
        Value::Number(n) if !n.is_finite() => Err(AccessError::UnserializableValue {
            path: path.to_string(),
            reason: format!("{n} is not a finite number"),
        }),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, item)| check_serializable(&format!("{path}[{i}]"), item)),
        Value::Object(node) => node
            .iter()
            .try_for_each(|(key, item)| check_serializable(&join(path, key), item)),
        _ => Ok(()),
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}
