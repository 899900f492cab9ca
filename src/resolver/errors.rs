//! Resolution error types and diagnostics.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error during dependency resolution.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("package not found: `{package}`")]
    #[diagnostic(code(smt::resolve::not_found))]
    PackageNotFound {
        package: String,
        requested_by: String,
        suggestions: Vec<String>,
    },

    #[error("no matching version for `{package}`")]
    #[diagnostic(code(smt::resolve::no_matching_version))]
    NoMatchingVersion {
        package: String,
        requirement: String,
        available: Vec<String>,
    },

    #[error("version conflict while resolving `{root}`:\n{report}")]
    #[diagnostic(
        code(smt::resolve::version_conflict),
        help("force the contested package in the recipe or relax one of the requirements")
    )]
    VersionConflict { root: String, report: String },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::PackageNotFound {
                package,
                requested_by,
                suggestions,
            } => {
                let mut diag = Diagnostic::error(format!("could not find package `{}`", package))
                    .with_context(format!("required by `{}`", requested_by));

                if !suggestions.is_empty() {
                    diag = diag.with_context(format!("did you mean: {}?", suggestions.join(", ")));
                }

                diag.with_suggestion("Check that the package name is spelled correctly")
                    .with_suggestion("Point `recipe.index` at an index that provides it")
            }

            ResolveError::NoMatchingVersion {
                package,
                requirement,
                available,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "no version of `{}` matches requirement `{}`",
                    package, requirement
                ));

                if !available.is_empty() {
                    diag = diag.with_context(format!("available versions: {}", available.join(", ")));
                }

                diag.with_suggestion(format!(
                    "Update the version requirement for `{}`",
                    package
                ))
            }

            ResolveError::VersionConflict { root, report } => {
                let mut diag =
                    Diagnostic::error(format!("version conflict while resolving `{}`", root));
                for line in report.lines().filter(|l| !l.trim().is_empty()) {
                    diag = diag.with_context(line.trim());
                }
                diag.with_suggestion("Force the contested package with `force = true`")
                    .with_suggestion("Relax one of the conflicting requirements")
            }
        }
    }
}
