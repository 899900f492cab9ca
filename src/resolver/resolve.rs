//! Resolve - the immutable dependency graph.
//!
//! A Resolve is built once by the resolver and only read afterwards.

use std::collections::HashMap;
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use semver::{Version, VersionReq};
use serde::Serialize;

/// A package at the version the resolver chose.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: Version,
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// A transitive request replaced by a forced requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForcedOverride {
    /// The forced package.
    pub package: String,
    /// `name/version` of the package whose request was replaced.
    pub requested_by: String,
    #[serde(serialize_with = "serialize_display")]
    pub requested: VersionReq,
    pub forced: Version,
}

fn serialize_display<S: serde::Serializer>(req: &VersionReq, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(req)
}

impl fmt::Display for ForcedOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requests {} {}, forced to {}",
            self.requested_by, self.package, self.requested, self.forced
        )
    }
}

/// The resolved dependency graph.
///
/// Edges point from a package to the packages it depends on.
#[derive(Debug, Clone, Default)]
pub struct Resolve {
    graph: DiGraph<ResolvedPackage, ()>,
    name_to_node: HashMap<String, NodeIndex>,
    root: Option<NodeIndex>,
    overrides: Vec<ForcedOverride>,
}

impl Resolve {
    /// Create a new empty Resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package; adding a name twice keeps the first version.
    pub fn add_package(&mut self, name: impl Into<String>, version: Version) -> NodeIndex {
        let name = name.into();
        if let Some(&node) = self.name_to_node.get(&name) {
            return node;
        }
        let node = self.graph.add_node(ResolvedPackage {
            name: name.clone(),
            version,
        });
        self.name_to_node.insert(name, node);
        node
    }

    /// Add the root package.
    pub fn add_root(&mut self, name: impl Into<String>, version: Version) -> NodeIndex {
        let node = self.add_package(name, version);
        self.root = Some(node);
        node
    }

    /// Add a dependency edge between packages already in the resolve.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        if let (Some(&from_node), Some(&to_node)) =
            (self.name_to_node.get(from), self.name_to_node.get(to))
        {
            if !self.graph.contains_edge(from_node, to_node) {
                self.graph.add_edge(from_node, to_node, ());
            }
        }
    }

    pub fn add_override(&mut self, forced: ForcedOverride) {
        self.overrides.push(forced);
    }

    pub fn root(&self) -> Option<&ResolvedPackage> {
        self.root.map(|node| &self.graph[node])
    }

    pub fn get(&self, name: &str) -> Option<&ResolvedPackage> {
        self.name_to_node.get(name).map(|&node| &self.graph[node])
    }

    pub fn version_of(&self, name: &str) -> Option<&Version> {
        self.get(name).map(|p| &p.version)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_node.contains_key(name)
    }

    /// Every package, root included, in insertion order.
    pub fn packages(&self) -> impl Iterator<Item = &ResolvedPackage> {
        self.graph.node_weights()
    }

    /// Every package except the root, sorted by name.
    pub fn dependencies(&self) -> Vec<&ResolvedPackage> {
        let mut packages: Vec<_> = self
            .graph
            .node_indices()
            .filter(|&node| Some(node) != self.root)
            .map(|node| &self.graph[node])
            .collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        packages
    }

    /// Direct dependencies of `name`, sorted by name.
    pub fn deps(&self, name: &str) -> Vec<&ResolvedPackage> {
        self.neighbors(name, Direction::Outgoing)
    }

    /// Packages that depend directly on `name`, sorted by name.
    pub fn dependents(&self, name: &str) -> Vec<&ResolvedPackage> {
        self.neighbors(name, Direction::Incoming)
    }

    fn neighbors(&self, name: &str, direction: Direction) -> Vec<&ResolvedPackage> {
        let Some(&node) = self.name_to_node.get(name) else {
            return Vec::new();
        };
        let mut packages: Vec<_> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| &self.graph[n])
            .collect();
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        packages
    }

    /// Transitive requests replaced by forced requirements.
    pub fn overrides(&self) -> &[ForcedOverride] {
        &self.overrides
    }

    /// Number of packages, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Resolve {
        let mut resolve = Resolve::new();
        resolve.add_root("app", Version::new(0, 0, 0));
        resolve.add_package("zlib", Version::new(1, 3, 0));
        resolve.add_package("boost", Version::new(1, 84, 0));
        resolve.add_edge("app", "zlib");
        resolve.add_edge("app", "boost");
        resolve.add_edge("boost", "zlib");
        resolve
    }

    #[test]
    fn test_resolve_basic() {
        let resolve = sample();

        assert_eq!(resolve.len(), 3);
        assert_eq!(resolve.root().unwrap().name, "app");
        assert_eq!(resolve.version_of("boost"), Some(&Version::new(1, 84, 0)));
        assert_eq!(resolve.version_of("openssl"), None);

        let deps: Vec<_> = resolve.deps("app").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(deps, vec!["boost", "zlib"]);

        let dependents: Vec<_> = resolve
            .dependents("zlib")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(dependents, vec!["app", "boost"]);
    }

    #[test]
    fn test_dependencies_exclude_root() {
        let resolve = sample();
        let names: Vec<_> = resolve
            .dependencies()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(names, vec!["boost/1.84.0", "zlib/1.3.0"]);
    }

    #[test]
    fn test_duplicate_package_and_edge_ignored() {
        let mut resolve = sample();
        resolve.add_package("zlib", Version::new(9, 9, 9));
        resolve.add_edge("app", "zlib");
        resolve.add_edge("app", "missing");

        assert_eq!(resolve.version_of("zlib"), Some(&Version::new(1, 3, 0)));
        assert_eq!(resolve.deps("app").len(), 2);
    }

    #[test]
    fn test_override_display() {
        let o = ForcedOverride {
            package: "boost".into(),
            requested_by: "confu_algorithm/1.1.0".into(),
            requested: ">=1.83.0, <1.85.0".parse().unwrap(),
            forced: Version::new(1, 85, 0),
        };
        assert_eq!(
            o.to_string(),
            "confu_algorithm/1.1.0 requests boost >=1.83.0, <1.85.0, forced to 1.85.0"
        );
    }
}
