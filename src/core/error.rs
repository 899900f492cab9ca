//! Errors raised while reading recipes and package indexes.

use miette::Diagnostic;
use thiserror::Error;

use super::options::OptionValue;

#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum RecipeError {
    #[error("invalid requirement reference `{reference}`: {reason}")]
    #[diagnostic(
        code(smt::recipe::reference),
        help("references are written `name/version` or `name/[range]`")
    )]
    InvalidReference { reference: String, reason: String },

    #[error("invalid package name `{0}`")]
    #[diagnostic(
        code(smt::recipe::name),
        help("package names use lowercase letters, digits, `_`, `-`, `.` and `+`")
    )]
    InvalidPackageName(String),

    #[error("invalid version constraint `{0}`")]
    #[diagnostic(code(smt::recipe::version))]
    InvalidVersion(String),

    #[error("option `{package}:{option}` is set to both `{first}` and `{second}`")]
    #[diagnostic(
        code(smt::recipe::option_conflict),
        help("remove one of the assignments")
    )]
    OptionConflict {
        package: String,
        option: String,
        first: OptionValue,
        second: OptionValue,
    },

    #[error("recipe revision {0} does not exist")]
    #[diagnostic(code(smt::recipe::revision))]
    UnknownRevision(u32),
}
