//! The set of package versions the resolver can choose from.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use semver::{Version, VersionReq};
use serde::Deserialize;

use super::requirement::{validate_package_name, VersionConstraint};
use crate::resolver::version::parse_version_lenient;

const BUILTIN_INDEX: &str = include_str!("../../recipes/index.toml");

/// One published version of a package and what it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    name: String,
    version: Version,
    dependencies: Vec<(String, VersionReq)>,
}

impl PackageSummary {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        PackageSummary {
            name: name.into(),
            version,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependency(mut self, name: impl Into<String>, req: VersionReq) -> Self {
        self.dependencies.push((name.into(), req));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn dependencies(&self) -> &[(String, VersionReq)] {
        &self.dependencies
    }
}

impl fmt::Display for PackageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

#[derive(Deserialize)]
struct RawIndex {
    #[serde(default)]
    package: Vec<RawPackage>,
}

#[derive(Deserialize)]
struct RawPackage {
    name: String,
    version: String,
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
}

/// Available packages, keyed by name, versions kept sorted ascending.
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: BTreeMap<String, Vec<PackageSummary>>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The index embedded in the binary.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_INDEX, Path::new("recipes/index.toml"))
    }

    /// Load an index from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read package index: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse index content.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawIndex = toml::from_str(content)
            .with_context(|| format!("failed to parse package index: {}", path.display()))?;

        let mut index = PackageIndex::new();
        for package in raw.package {
            validate_package_name(&package.name)
                .with_context(|| format!("in package index {}", path.display()))?;
            let version = parse_version_lenient(&package.version).with_context(|| {
                format!(
                    "invalid version `{}` for `{}` in {}",
                    package.version,
                    package.name,
                    path.display()
                )
            })?;

            let mut summary = PackageSummary::new(package.name, version);
            for (dep, spec) in package.dependencies {
                let constraint = VersionConstraint::parse(&spec).with_context(|| {
                    format!("invalid dependency `{}` of {}", dep, summary)
                })?;
                summary = summary.with_dependency(dep, constraint.to_version_req());
            }
            index.add(summary);
        }

        tracing::debug!(
            "loaded package index {} ({} packages)",
            path.display(),
            index.packages.len()
        );
        Ok(index)
    }

    /// Add a summary. A later entry for the same version replaces the
    /// earlier one.
    pub fn add(&mut self, summary: PackageSummary) {
        let versions = self.packages.entry(summary.name.clone()).or_default();
        match versions.binary_search_by(|s| s.version.cmp(&summary.version)) {
            Ok(i) => {
                tracing::warn!("duplicate index entry for {}, keeping the last", summary);
                versions[i] = summary;
            }
            Err(i) => versions.insert(i, summary),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// All versions of `name`, ascending.
    pub fn versions(&self, name: &str) -> &[PackageSummary] {
        self.packages.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self, name: &str, version: &Version) -> Option<&PackageSummary> {
        let versions = self.versions(name);
        versions
            .binary_search_by(|s| s.version.cmp(version))
            .ok()
            .map(|i| &versions[i])
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Number of distinct packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
