//! Dependency resolution.
//!
//! This module implements PubGrub-based version resolution for recipes.
//! The resolver is pure and deterministic; the index is loaded before
//! resolution starts.
//!
//! Forced requirements win over transitive requests: whenever a resolved
//! package asks for a forced package, the request is replaced by the forced
//! constraint. Replaced requests that the forced version does not satisfy
//! are reported as [`ForcedOverride`]s.

pub mod errors;
pub mod resolve;
pub mod version;

pub use errors::ResolveError;
pub use resolve::{ForcedOverride, Resolve, ResolvedPackage};

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

use pubgrub::{
    DefaultStringReporter, Dependencies, DependencyProvider, PackageResolutionStatistics, Range,
    Reporter,
};
use semver::Version;

use crate::core::{PackageIndex, Recipe};

/// Version the root package is resolved at.
pub const ROOT_VERSION: Version = Version::new(0, 0, 0);

/// A package identifier for PubGrub resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PubGrubPackage {
    pub name: String,
}

impl PubGrubPackage {
    fn new(name: impl Into<String>) -> Self {
        PubGrubPackage { name: name.into() }
    }
}

impl fmt::Display for PubGrubPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Dependency provider for PubGrub resolution.
pub struct RecipeResolver<'a> {
    index: &'a PackageIndex,

    /// Root package name
    root: String,

    /// Requirements of the root, one range per package
    root_deps: Vec<(String, Range<Version>)>,

    /// Constraints of forced requirements by package name
    forced: HashMap<String, Range<Version>>,
}

impl<'a> RecipeResolver<'a> {
    /// Create a resolver for `recipe` against `index`.
    ///
    /// Fails early when a requirement names a package the index does not
    /// have or has no acceptable version of.
    pub fn new(recipe: &Recipe, index: &'a PackageIndex) -> Result<Self, ResolveError> {
        let mut root_deps: Vec<(String, Range<Version>)> = Vec::new();
        let mut forced = HashMap::new();

        for req in &recipe.requirements {
            let versions = index.versions(req.name());
            if versions.is_empty() {
                return Err(ResolveError::PackageNotFound {
                    package: req.name().to_string(),
                    requested_by: recipe.name.clone(),
                    suggestions: similar_names(index, req.name()),
                });
            }
            if !versions.iter().any(|s| req.constraint().matches(s.version())) {
                return Err(ResolveError::NoMatchingVersion {
                    package: req.name().to_string(),
                    requirement: req.constraint().to_string(),
                    available: versions.iter().map(|s| s.version().to_string()).collect(),
                });
            }

            let range = version::constraint_to_range(req.constraint());
            if req.is_forced() {
                forced.insert(req.name().to_string(), range.clone());
            }
            match root_deps.iter_mut().find(|(name, _)| name == req.name()) {
                Some((_, existing)) => *existing = existing.intersection(&range),
                None => root_deps.push((req.name().to_string(), range)),
            }
        }

        Ok(RecipeResolver {
            index,
            root: recipe.name.clone(),
            root_deps,
            forced,
        })
    }

    /// Resolve dependencies and return the result.
    pub fn resolve(self) -> Result<Resolve, ResolveError> {
        let root_pkg = PubGrubPackage::new(self.root.clone());

        let solution = match pubgrub::resolve(&self, root_pkg, ROOT_VERSION) {
            Ok(solution) => solution,
            Err(pubgrub::PubGrubError::NoSolution(tree)) => {
                return Err(ResolveError::VersionConflict {
                    root: self.root.clone(),
                    report: DefaultStringReporter::report(&tree),
                });
            }
            Err(e) => {
                return Err(ResolveError::VersionConflict {
                    root: self.root.clone(),
                    report: format!("{:?}", e),
                });
            }
        };

        let mut resolve = Resolve::new();
        resolve.add_root(self.root.clone(), ROOT_VERSION);
        let mut chosen: Vec<(String, Version)> = solution
            .into_iter()
            .filter(|(pkg, _)| pkg.name != self.root)
            .map(|(pkg, version)| (pkg.name, version))
            .collect();
        chosen.sort();
        for (name, version) in &chosen {
            resolve.add_package(name.clone(), version.clone());
        }

        for (name, _) in &self.root_deps {
            resolve.add_edge(&self.root, name);
        }

        for (name, version) in &chosen {
            let Some(summary) = self.index.summary(name, version) else {
                continue;
            };
            for (dep, requested) in summary.dependencies() {
                resolve.add_edge(name, dep);

                if !self.forced.contains_key(dep) {
                    continue;
                }
                let Some(forced) = resolve.version_of(dep).cloned() else {
                    continue;
                };
                if !requested.matches(&forced) {
                    let entry = ForcedOverride {
                        package: dep.clone(),
                        requested_by: summary.to_string(),
                        requested: requested.clone(),
                        forced,
                    };
                    tracing::warn!("forced requirement overrides a transitive request: {}", entry);
                    resolve.add_override(entry);
                }
            }
        }

        tracing::debug!("resolved {} packages for `{}`", resolve.len(), self.root);
        Ok(resolve)
    }

    fn dependency_range(&self, name: &str, requested: Range<Version>) -> Range<Version> {
        match self.forced.get(name) {
            Some(forced) => forced.clone(),
            None => requested,
        }
    }
}

/// Resolve `recipe` against `index`.
pub fn resolve(recipe: &Recipe, index: &PackageIndex) -> Result<Resolve, ResolveError> {
    RecipeResolver::new(recipe, index)?.resolve()
}

/// Index names that look like `name`.
fn similar_names(index: &PackageIndex, name: &str) -> Vec<String> {
    let prefix: String = name.chars().take(3).collect();
    index
        .package_names()
        .filter(|candidate| {
            candidate.contains(name) || name.contains(candidate) || candidate.starts_with(&prefix)
        })
        .map(str::to_string)
        .collect()
}

impl DependencyProvider for RecipeResolver<'_> {
    type P = PubGrubPackage;
    type V = Version;
    type VS = Range<Version>;
    type M = String;
    type Err = Infallible;
    type Priority = u32;

    fn prioritize(
        &self,
        package: &Self::P,
        _range: &Self::VS,
        _package_conflicts_counts: &PackageResolutionStatistics,
    ) -> Self::Priority {
        // Higher priority = resolved first; forced packages and packages with
        // few candidates narrow the search fastest.
        if self.forced.contains_key(&package.name) {
            return u32::MAX;
        }
        let candidates = self.index.versions(&package.name).len();
        (1000 - candidates.min(1000)) as u32
    }

    fn choose_version(
        &self,
        package: &Self::P,
        range: &Self::VS,
    ) -> Result<Option<Self::V>, Self::Err> {
        if package.name == self.root {
            return Ok(range.contains(&ROOT_VERSION).then_some(ROOT_VERSION));
        }

        // Highest matching version
        Ok(self
            .index
            .versions(&package.name)
            .iter()
            .rev()
            .map(|s| s.version())
            .find(|v| range.contains(v))
            .cloned())
    }

    fn get_dependencies(
        &self,
        package: &Self::P,
        version: &Self::V,
    ) -> Result<Dependencies<Self::P, Self::VS, Self::M>, Self::Err> {
        if package.name == self.root && *version == ROOT_VERSION {
            let deps = self
                .root_deps
                .iter()
                .map(|(name, range)| (PubGrubPackage::new(name.clone()), range.clone()))
                .collect();

            return Ok(Dependencies::Available(deps));
        }

        let Some(summary) = self.index.summary(&package.name, version) else {
            return Ok(Dependencies::Unavailable(
                "not in the package index".to_string(),
            ));
        };

        let deps = summary
            .dependencies()
            .iter()
            .map(|(name, req)| {
                let range = self.dependency_range(name, version::version_req_to_range(req));
                (PubGrubPackage::new(name.clone()), range)
            })
            .collect();

        Ok(Dependencies::Available(deps))
    }
}
