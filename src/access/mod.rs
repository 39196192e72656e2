//! Stateless path resolution and typed access over a borrowed [`ConfigNode`](crate::ConfigNode).

mod path;
mod typed;

pub(crate) use path::resolve;
pub use path::{path_exists, value, PATH_SEPARATOR};
pub use typed::{
    array, bool_val, float64_array, float64_val, int_array, int_val, object_val, string_array,
    string_val,
};
