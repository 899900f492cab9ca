//! Shared fixtures for unit tests.

use std::path::Path;

use crate::core::index::PackageIndex;
use crate::core::recipe::Recipe;
use crate::tree::{NaryTree, Node};

/// The reference tree used throughout the tests:
///
/// ```text
///         0
///       /   \
///      1     2
///     / \   / \
///    3   4 5   6
///               \
///                7
/// ```
pub fn sample_tree() -> NaryTree<i32> {
    let mut root = Node::new(0);
    let one = root.push(1);
    one.push(3);
    one.push(4);
    let two = root.push(2);
    two.push(5);
    two.push(6).push(7);
    NaryTree::from_root(root)
}

/// A small recipe covering every section of the format.
pub const SAMPLE_RECIPE: &str = r#"
[recipe]
name = "sample"
revision = 1
settings = ["os", "compiler", "build_type", "arch"]
generators = ["CMakeToolchain", "CMakeDeps"]

[options.catch2]
with_main = true

[[requires]]
reference = "boost/1.83.0"
force = true

[[requires]]
reference = "catch2/2.13.7"
"#;

pub fn sample_recipe() -> Recipe {
    Recipe::parse(SAMPLE_RECIPE, Path::new("sample.toml")).unwrap()
}

/// An index with a transitive boost request from `confu_algorithm`.
pub const SAMPLE_INDEX: &str = r#"
[[package]]
name = "boost"
version = "1.83.0"

[[package]]
name = "boost"
version = "1.84.0"

[[package]]
name = "boost"
version = "1.85.0"

[[package]]
name = "catch2"
version = "2.13.7"

[[package]]
name = "confu_algorithm"
version = "1.0.0"

[package.dependencies]
boost = ">=1.83.0, <1.85.0"
"#;

pub fn sample_index() -> PackageIndex {
    PackageIndex::parse(SAMPLE_INDEX, Path::new("index.toml")).unwrap()
}
