//! The project's dependency declaration.
//!
//! This module contains the types a recipe is made of:
//! - Settings axes and the profile that assigns them values
//! - Generators, option overrides and requirements
//! - The recipe itself and its built-in revision history
//! - The package index the resolver chooses versions from

pub mod error;
pub mod generator;
pub mod history;
pub mod index;
pub mod options;
pub mod recipe;
pub mod requirement;
pub mod settings;

pub use error::RecipeError;
pub use generator::Generator;
pub use index::{PackageIndex, PackageSummary};
pub use options::{DependencyOptions, OptionOverride, OptionValue};
pub use recipe::{Recipe, ToolchainCustomization};
pub use requirement::{Requirement, VersionConstraint};
pub use settings::{Profile, SettingsAxis};
