//! Data Layer
//!
//! - [`path`] - pointer-style reads and writes into a JSON tree
//! - [`model`] - `DataModel`, the shared handle used by action execution

pub mod model;
pub mod path;

pub use model::DataModel;
pub use path::{get_by_path, is_root_path, set_by_path, split_path, MAX_ARRAY_PADDING};
