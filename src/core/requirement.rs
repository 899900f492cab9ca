//! Requirement references: `boost/1.84.0`, `confu_algorithm/[<2]`.

use std::fmt;

use semver::{Comparator, Op, Version, VersionReq};
use serde::{Serialize, Serializer};

use super::error::RecipeError;
use crate::resolver::version::parse_version_lenient;

/// What versions of a package a requirement accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// A single pinned version.
    Exact(Version),
    /// A range, written in brackets in a reference.
    Range(VersionReq),
}

impl VersionConstraint {
    /// Parse a version or range.
    ///
    /// `[<2]` and `[>=1.0 <2.0]` are ranges, as are bare comparator
    /// expressions such as `>=1.83.0, <1.85.0`. Anything else must be a
    /// version, with missing minor or patch components filled with zero.
    pub fn parse(s: &str) -> Result<Self, RecipeError> {
        let s = s.trim();
        let invalid = || RecipeError::InvalidVersion(s.to_string());

        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(invalid)?;
            return parse_range(inner).map(VersionConstraint::Range).ok_or_else(invalid);
        }

        if s.starts_with(['<', '>', '=', '~', '^', '*']) {
            return parse_range(s).map(VersionConstraint::Range).ok_or_else(invalid);
        }

        parse_version_lenient(s)
            .map(VersionConstraint::Exact)
            .ok_or_else(invalid)
    }

    /// The pinned version, when this is an exact constraint.
    pub fn exact(&self) -> Option<&Version> {
        match self {
            VersionConstraint::Exact(v) => Some(v),
            VersionConstraint::Range(_) => None,
        }
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionConstraint::Exact(v) => v == version,
            VersionConstraint::Range(req) => req.matches(version),
        }
    }

    /// The constraint as a semver requirement.
    pub fn to_version_req(&self) -> VersionReq {
        match self {
            VersionConstraint::Exact(v) => VersionReq {
                comparators: vec![Comparator {
                    op: Op::Exact,
                    major: v.major,
                    minor: Some(v.minor),
                    patch: Some(v.patch),
                    pre: v.pre.clone(),
                }],
            },
            VersionConstraint::Range(req) => req.clone(),
        }
    }
}

/// Conan separates comparators with spaces, semver with commas; accept both.
fn parse_range(expr: &str) -> Option<VersionReq> {
    let comparators: Vec<&str> = expr
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    if comparators.is_empty() {
        return None;
    }
    comparators.join(", ").parse().ok()
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Exact(v) => write!(f, "{}", v),
            VersionConstraint::Range(req) => write!(f, "[{}]", req),
        }
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A dependency declared by a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    name: String,
    constraint: VersionConstraint,
    force: bool,
}

impl Requirement {
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Result<Self, RecipeError> {
        let name = name.into();
        validate_package_name(&name)?;
        Ok(Requirement {
            name,
            constraint,
            force: false,
        })
    }

    /// Parse a `name/version` reference.
    pub fn parse(reference: &str) -> Result<Self, RecipeError> {
        let invalid = |reason: &str| RecipeError::InvalidReference {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };

        let (name, version) = reference
            .split_once('/')
            .ok_or_else(|| invalid("missing `/` between name and version"))?;
        if version.is_empty() {
            return Err(invalid("missing version"));
        }
        if version.contains('@') || version.contains('#') {
            return Err(invalid("user, channel and revision suffixes are not supported"));
        }

        let constraint = VersionConstraint::parse(version)?;
        Requirement::new(name, constraint)
    }

    /// Mark this requirement as overriding every transitive request for
    /// the same package.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    /// `name/constraint`, without the force marker.
    pub fn reference(&self) -> String {
        format!("{}/{}", self.name, self.constraint)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.constraint)?;
        if self.force {
            write!(f, " (force)")?;
        }
        Ok(())
    }
}

/// Package names are lowercase and start with a letter or digit.
pub fn validate_package_name(name: &str) -> Result<(), RecipeError> {
    let valid = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '+')
        });

    if valid {
        Ok(())
    } else {
        Err(RecipeError::InvalidPackageName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_reference() {
        let req = Requirement::parse("boost/1.84.0").unwrap();
        assert_eq!(req.name(), "boost");
        assert_eq!(req.constraint().exact(), Some(&Version::new(1, 84, 0)));
        assert!(!req.is_forced());
        assert_eq!(req.reference(), "boost/1.84.0");
    }

    #[test]
    fn test_parse_range_reference() {
        let req = Requirement::parse("confu_algorithm/[<2]").unwrap();
        assert!(req.constraint().exact().is_none());
        assert!(req.constraint().matches(&Version::new(1, 1, 0)));
        assert!(req.constraint().matches(&Version::new(0, 0, 0)));
        assert!(!req.constraint().matches(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_space_separated_range() {
        let c = VersionConstraint::parse("[>=1.0 <2.0]").unwrap();
        assert!(c.matches(&Version::new(1, 5, 0)));
        assert!(!c.matches(&Version::new(2, 0, 0)));

        let bare = VersionConstraint::parse(">=1.83.0, <1.85.0").unwrap();
        assert!(bare.matches(&Version::new(1, 84, 0)));
        assert!(!bare.matches(&Version::new(1, 85, 0)));
    }

    #[test]
    fn test_lenient_exact_version() {
        let c = VersionConstraint::parse("3.16").unwrap();
        assert_eq!(c.exact(), Some(&Version::new(3, 16, 0)));
    }

    #[test]
    fn test_force_display() {
        let req = Requirement::parse("boost/1.83.0").unwrap().with_force(true);
        assert_eq!(req.to_string(), "boost/1.83.0 (force)");
    }

    #[test]
    fn test_exact_to_version_req() {
        let c = VersionConstraint::parse("1.84.0").unwrap();
        let req = c.to_version_req();
        assert!(req.matches(&Version::new(1, 84, 0)));
        assert!(!req.matches(&Version::new(1, 84, 1)));
    }

    #[test]
    fn test_invalid_references() {
        assert!(matches!(
            Requirement::parse("boost"),
            Err(RecipeError::InvalidReference { .. })
        ));
        assert!(matches!(
            Requirement::parse("boost/"),
            Err(RecipeError::InvalidReference { .. })
        ));
        assert!(matches!(
            Requirement::parse("boost/1.0@user/stable"),
            Err(RecipeError::InvalidReference { .. })
        ));
        assert!(matches!(
            Requirement::parse("Boost/1.0"),
            Err(RecipeError::InvalidPackageName(_))
        ));
        assert!(matches!(
            Requirement::parse("boost/[<2"),
            Err(RecipeError::InvalidVersion(_))
        ));
        assert!(matches!(
            Requirement::parse("boost/latest"),
            Err(RecipeError::InvalidVersion(_))
        ));
    }

    #[test]
    fn test_package_names() {
        assert!(validate_package_name("st_tree").is_ok());
        assert!(validate_package_name("libstdc++").is_ok());
        assert!(validate_package_name("_x").is_err());
        assert!(validate_package_name("").is_err());
    }
}
