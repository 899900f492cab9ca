//! High-level operations.
//!
//! This module contains the implementation of the `smt` commands.

pub mod check;
pub mod generate;
pub mod package_id;
pub mod resolve;
pub mod tree;

pub use check::{check_history, check_recipe};
pub use generate::generate;
pub use package_id::package_id;
pub use resolve::resolve_recipe;
pub use tree::{encode_file, load_encoded, EncodedTree, Layout, OffsetWidth, TreeValue};
