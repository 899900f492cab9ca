//! Semver version handling for PubGrub.

use pubgrub::Range;
use semver::{Comparator, Op, Version, VersionReq};

use crate::core::requirement::VersionConstraint;

/// Convert a semver VersionReq to a PubGrub Range.
///
/// Comparators are intersected; an empty requirement matches everything.
pub fn version_req_to_range(req: &VersionReq) -> Range<Version> {
    req.comparators
        .iter()
        .fold(Range::full(), |range, comp| {
            range.intersection(&comparator_to_range(comp))
        })
}

/// Convert a recipe constraint to a PubGrub Range.
pub fn constraint_to_range(constraint: &VersionConstraint) -> Range<Version> {
    match constraint {
        VersionConstraint::Exact(v) => Range::singleton(v.clone()),
        VersionConstraint::Range(req) => version_req_to_range(req),
    }
}

/// Convert a single semver Comparator to a PubGrub Range.
///
/// Missing components widen the comparator: `<=1.2` admits every `1.2.x`
/// and `>1` starts at `2.0.0`.
fn comparator_to_range(comp: &Comparator) -> Range<Version> {
    let major = comp.major;
    let minor = comp.minor.unwrap_or(0);
    let patch = comp.patch.unwrap_or(0);

    let mut lower = Version::new(major, minor, patch);
    lower.pre = comp.pre.clone();

    // First version past everything the written prefix covers.
    let past_prefix = match (comp.minor, comp.patch) {
        (None, _) => Version::new(major + 1, 0, 0),
        (Some(_), None) => Version::new(major, minor + 1, 0),
        (Some(_), Some(_)) => Version::new(major, minor, patch + 1),
    };

    match comp.op {
        Op::Exact | Op::Wildcard => {
            if comp.patch.is_some() {
                Range::singleton(lower)
            } else {
                Range::between(lower, past_prefix)
            }
        }

        Op::Greater => {
            if comp.patch.is_some() {
                Range::strictly_higher_than(lower)
            } else {
                Range::higher_than(past_prefix)
            }
        }

        Op::GreaterEq => Range::higher_than(lower),

        Op::Less => Range::strictly_lower_than(lower),

        Op::LessEq => Range::strictly_lower_than(past_prefix),

        Op::Tilde => {
            // ~1.2.3 means >=1.2.3 <1.3.0, ~1 means >=1.0.0 <2.0.0
            let upper = if comp.minor.is_some() {
                Version::new(major, minor + 1, 0)
            } else {
                Version::new(major + 1, 0, 0)
            };
            Range::between(lower, upper)
        }

        Op::Caret => {
            // The left-most non-zero component may not change.
            let upper = if major > 0 || comp.minor.is_none() {
                Version::new(major + 1, 0, 0)
            } else if minor > 0 || comp.patch.is_none() {
                Version::new(0, minor + 1, 0)
            } else {
                Version::new(0, 0, patch + 1)
            };
            Range::between(lower, upper)
        }

        _ => Range::full(),
    }
}

/// Parse a version string, allowing for incomplete versions.
pub fn parse_version_lenient(s: &str) -> Option<Version> {
    if let Ok(v) = s.parse() {
        return Some(v);
    }

    let mut parts = s.split('.');
    let major: u64 = parts.next()?.parse().ok()?;
    let minor: u64 = match parts.next() {
        Some(minor) => minor.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Version::new(major, minor, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(req: &str) -> Range<Version> {
        version_req_to_range(&req.parse().unwrap())
    }

    #[test]
    fn test_caret_range() {
        let range = range("^1.2.3");

        assert!(range.contains(&Version::new(1, 2, 3)));
        assert!(range.contains(&Version::new(1, 9, 0)));
        assert!(!range.contains(&Version::new(2, 0, 0)));
        assert!(!range.contains(&Version::new(1, 2, 2)));
    }

    #[test]
    fn test_caret_range_zero_major() {
        let caret = range("^0.2.3");

        assert!(caret.contains(&Version::new(0, 2, 9)));
        assert!(!caret.contains(&Version::new(0, 3, 0)));

        let patch_only = range("^0.0.3");
        assert!(patch_only.contains(&Version::new(0, 0, 3)));
        assert!(!patch_only.contains(&Version::new(0, 0, 4)));
    }

    #[test]
    fn test_tilde_range() {
        let range = range("~1.2.3");

        assert!(range.contains(&Version::new(1, 2, 9)));
        assert!(!range.contains(&Version::new(1, 3, 0)));
    }

    #[test]
    fn test_exact_and_partial_exact() {
        let exact = range("=1.84.0");
        assert!(exact.contains(&Version::new(1, 84, 0)));
        assert!(!exact.contains(&Version::new(1, 84, 1)));

        let partial = range("=1.84");
        assert!(partial.contains(&Version::new(1, 84, 7)));
        assert!(!partial.contains(&Version::new(1, 85, 0)));
    }

    #[test]
    fn test_comparison_range() {
        let range = range(">=1.83.0, <1.85.0");

        assert!(range.contains(&Version::new(1, 83, 0)));
        assert!(range.contains(&Version::new(1, 84, 9)));
        assert!(!range.contains(&Version::new(1, 85, 0)));
        assert!(!range.contains(&Version::new(1, 82, 0)));
    }

    #[test]
    fn test_partial_comparators() {
        assert!(range("<2").contains(&Version::new(1, 99, 0)));
        assert!(!range("<2").contains(&Version::new(2, 0, 0)));

        let le = range("<=1.2");
        assert!(le.contains(&Version::new(1, 2, 9)));
        assert!(!le.contains(&Version::new(1, 3, 0)));

        let gt = range(">1");
        assert!(!gt.contains(&Version::new(1, 9, 0)));
        assert!(gt.contains(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_constraint_to_range() {
        let exact = constraint_to_range(&VersionConstraint::parse("1.84.0").unwrap());
        assert_eq!(exact, Range::singleton(Version::new(1, 84, 0)));

        let ranged = constraint_to_range(&VersionConstraint::parse("[<2]").unwrap());
        assert!(ranged.contains(&Version::new(0, 0, 0)));
        assert!(!ranged.contains(&Version::new(2, 0, 0)));
    }

    #[test]
    fn test_parse_version_lenient() {
        assert_eq!(parse_version_lenient("1"), Some(Version::new(1, 0, 0)));
        assert_eq!(parse_version_lenient("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_version_lenient("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version_lenient("1.2.3.4"), None);
        assert_eq!(parse_version_lenient("latest"), None);
    }
}
