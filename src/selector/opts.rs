use std::fmt;
use std::rc::Rc;

/// Looks up an environment variable by name.
pub type EnvLookup = Rc<dyn Fn(&str) -> Option<String>>;

/// The character that marks a string as naming an environment variable.
pub const DEFAULT_ENV_PREFIX: char = '$';

/// Per-call options for selector accessors.
///
/// `T` is the accessor's result type, so a default supplied through
/// [`on_missing`](Self::on_missing) always has the right shape.
///
/// ```
/// use config_select::{ConfigNode, DefaultSelector, Opts, Selector};
///
/// let selector = DefaultSelector::new(ConfigNode::new(), false, false);
/// let port = selector.int_val_with("server.port", &Opts::new().on_missing(8080))?;
/// assert_eq!(port, 8080);
/// # Ok::<(), config_select::AccessError>(())
/// ```
#[must_use]
pub struct Opts<T> {
    pub(crate) on_missing: Option<T>,
    pub(crate) env_lookup: Option<EnvLookup>,
    pub(crate) env_prefix: Option<char>,
}

impl<T> Opts<T> {
    pub fn new() -> Self {
        Self {
            on_missing: None,
            env_lookup: None,
            env_prefix: None,
        }
    }

    /// Value returned, without error, when the requested path is absent.
    pub fn on_missing(mut self, default: T) -> Self {
        self.on_missing = Some(default);
        self
    }

    /// Replaces the platform environment lookup used by `string_or_env`.
    pub fn env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env_lookup = Some(Rc::new(lookup));
        self
    }

    /// Replaces the `$` prefix used by `string_or_env`.
    pub fn env_prefix(mut self, prefix: char) -> Self {
        self.env_prefix = Some(prefix);
        self
    }

    pub(crate) fn prefix(&self) -> char {
        self.env_prefix.unwrap_or(DEFAULT_ENV_PREFIX)
    }
}

impl<T> Default for Opts<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Opts<T> {
    fn clone(&self) -> Self {
        Self {
            on_missing: self.on_missing.clone(),
            env_lookup: self.env_lookup.clone(),
            env_prefix: self.env_prefix,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Opts<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opts")
            .field("on_missing", &self.on_missing)
            .field("env_lookup", &self.env_lookup.as_ref().map(|_| "<fn>"))
            .field("env_prefix", &self.env_prefix)
            .finish()
    }
}
