use thiserror::Error;

use crate::node::ValueKind;

/// Returned when nothing is stored at the requested path.
///
/// Kept as its own type so callers can tell "absent" apart from
/// "present but the wrong shape".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MissingPathError {
    path: String,
    message: String,
}

impl MissingPathError {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            message: format!("no value found at {path}"),
            path,
        }
    }

    /// The path that failed to resolve.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Errors produced while reading values out of a configuration document.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AccessError {
    #[error(transparent)]
    MissingPath(#[from] MissingPathError),

    #[error("value at {path} is {found} and cannot be converted to {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: ValueKind,
    },

    #[error("value at {path}[{index}] is {found} and cannot be converted to {expected}")]
    ElementMismatch {
        path: String,
        index: usize,
        expected: &'static str,
        found: ValueKind,
    },

    #[error("the selector's document has been released")]
    NilDocument,

    #[error("target field {field} is not a supported type ({shape})")]
    UnsupportedField { field: String, shape: &'static str },

    #[error("cannot use an empty array as a value in a map (key {key})")]
    EmptyArrayInMap { key: String },

    #[error("cannot use an array of {element} as a value in a map (key {key})")]
    ArrayInMap { key: String, element: ValueKind },

    #[error("value at {path} cannot be serialized: {reason}")]
    UnserializableValue { path: String, reason: String },

    #[error("unable to populate target: {0}")]
    Populate(String),

    #[error("value at {path} names environment variable {var}, which is unset or empty")]
    EnvVarUnset { path: String, var: String },
}

impl AccessError {
    pub(crate) fn missing(path: &str) -> Self {
        Self::MissingPath(MissingPathError::new(path))
    }

    pub(crate) fn mismatch(path: &str, expected: &'static str, found: ValueKind) -> Self {
        Self::TypeMismatch {
            path: path.to_string(),
            expected,
            found,
        }
    }

    /// True when the error reports an absent path.
    pub fn is_missing_path(&self) -> bool {
        matches!(self, Self::MissingPath(_))
    }

    pub fn as_missing_path(&self) -> Option<&MissingPathError> {
        match self {
            Self::MissingPath(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T, E = AccessError> = std::result::Result<T, E>;
