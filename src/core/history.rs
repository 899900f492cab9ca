//! The recipe revisions shipped with the binary.

use std::path::Path;

use anyhow::{Context, Result};

use super::error::RecipeError;
use super::recipe::Recipe;
use super::requirement::VersionConstraint;

const REVISIONS: [(&str, &str); 5] = [
    (
        "recipes/revision-1.toml",
        include_str!("../../recipes/revision-1.toml"),
    ),
    (
        "recipes/revision-2.toml",
        include_str!("../../recipes/revision-2.toml"),
    ),
    (
        "recipes/revision-3.toml",
        include_str!("../../recipes/revision-3.toml"),
    ),
    (
        "recipes/revision-4.toml",
        include_str!("../../recipes/revision-4.toml"),
    ),
    (
        "recipes/revision-5.toml",
        include_str!("../../recipes/revision-5.toml"),
    ),
];

/// Number of built-in revisions; revisions are numbered from 1.
pub const REVISION_COUNT: u32 = REVISIONS.len() as u32;

/// Every built-in revision, oldest first.
pub fn revisions() -> Result<Vec<Recipe>> {
    (1..=REVISION_COUNT).map(revision).collect()
}

/// A single built-in revision.
pub fn revision(number: u32) -> Result<Recipe> {
    let index = number
        .checked_sub(1)
        .filter(|&i| i < REVISION_COUNT)
        .ok_or(RecipeError::UnknownRevision(number))?;
    let (path, content) = REVISIONS[index as usize];
    Recipe::parse(content, Path::new(path))
        .with_context(|| format!("built-in revision {} is invalid", number))
}

/// The newest built-in revision.
pub fn latest() -> Result<Recipe> {
    revision(REVISION_COUNT)
}

/// How one revision constrains a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEntry {
    pub revision: u32,
    /// `None` when the revision does not require the package.
    pub constraint: Option<VersionConstraint>,
    pub forced: bool,
}

/// The constraint every revision places on `package`, in revision order.
pub fn pin_history(recipes: &[Recipe], package: &str) -> Vec<PinEntry> {
    recipes
        .iter()
        .map(|recipe| {
            let requirement = recipe.requirement(package);
            PinEntry {
                revision: recipe.revision,
                constraint: requirement.map(|r| r.constraint().clone()),
                forced: requirement.is_some_and(|r| r.is_forced()),
            }
        })
        .collect()
}
