//! Environment-variable indirection for string values.
//!
//! A string such as `"$DB_PASSWORD"` stands for the contents of the variable
//! `DB_PASSWORD`. Strings without the prefix are returned unchanged.

use tracing::debug;

use super::opts::Opts;
use crate::error::{AccessError, Result};

/// Expands `raw` (the string found at `path`) if it names an environment variable.
pub(crate) fn expand<T>(path: &str, raw: String, opts: &Opts<T>) -> Result<String> {
    let Some(var) = raw.strip_prefix(opts.prefix()) else {
        return Ok(raw);
    };

    debug!(path, var, "resolving config value from environment");

    let resolved = match &opts.env_lookup {
        Some(lookup) => lookup(var),
        None => platform_lookup(var),
    };

    match resolved {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(AccessError::EnvVarUnset {
            path: path.to_string(),
            var: var.to_string(),
        }),
    }
}

fn platform_lookup(var: &str) -> Option<String> {
    if var.is_empty() {
        return None;
    }
    std::env::var(var).ok()
}
