//! Typed, path-based access to configuration documents that have already been
//! decoded into a tree of maps and values.
//!
//! ```
//! use config_select::{ConfigNode, DefaultSelector, Selector};
//!
//! let node: ConfigNode = serde_json::from_str(r#"{"db": {"host": "localhost", "port": 5432}}"#)
//!     .expect("valid json");
//! let selector = DefaultSelector::new(node, false, false);
//!
//! assert_eq!(selector.string_val("db.host")?, "localhost");
//! assert_eq!(selector.int_val("db.port")?, 5432);
//! assert!(selector.string_val("db.user").unwrap_err().is_missing_path());
//! # Ok::<(), config_select::AccessError>(())
//! ```

pub mod access;
mod error;
pub mod merge;
mod node;
pub mod populate;
pub mod selector;

pub use error::{AccessError, MissingPathError, Result};
pub use merge::{merge, ConfigMerger, DeepMerger};
pub use node::{ConfigNode, Document, Value, ValueKind};
pub use populate::{populate, populate_from_root, populate_into, to_node};
pub use selector::{DefaultSelector, Opts, QuietSelector, Selector};
