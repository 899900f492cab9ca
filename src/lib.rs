//! small_memory_tree - compact read-only trees and the recipe that builds them
//!
//! The [`tree`] module holds the data structure: an n-ary tree stored as a
//! breadth-first value column plus a column of cumulative child counts, and
//! two alternatives: a bitmap layout for trees with many children per node
//! and a marker layout that fits the whole tree in one vector.
//!
//! The remaining modules manage the project's dependency recipe: its
//! revisions, version resolution with forced pins, validation, and the
//! CMake integration files the recipe generates.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod tree;
pub mod util;

#[cfg(test)]
pub mod test_support;

pub use crate::core::{PackageIndex, Profile, Recipe};
pub use resolver::Resolve;
pub use tree::{
    ApiError, ChildrenOffsetEnd, FlatTree, NaryTree, SmallMemoryTree,
    SmallMemoryTreeLotsOfChildren, TreeAdapter,
};
pub use util::context::GlobalContext;
