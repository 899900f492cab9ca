//! Binary compatibility key of a recipe under a profile.

use anyhow::Result;

use crate::core::{Profile, Recipe};
use crate::util::hash::Fingerprint;

/// SHA-256 over the declared settings values, the effective options and
/// the requirement references.
///
/// Only declared axes contribute, so a recipe that does not vary on the
/// compiler gets the same id for every compiler. Option order and
/// requirement order in the recipe do not matter.
pub fn package_id(recipe: &Recipe, profile: &Profile) -> Result<String> {
    let mut fp = Fingerprint::new();

    fp.section("settings");
    let mut axes = recipe.settings.clone();
    axes.sort();
    axes.dedup();
    for axis in axes {
        fp.update_pair(axis.as_str(), profile.value(axis));
    }

    fp.section("options");
    for ((package, option), value) in recipe.options.effective()? {
        fp.update_pair(&format!("{}:{}", package, option), &value.to_string());
    }

    fp.section("requires");
    let mut references: Vec<String> = recipe.requirements.iter().map(|r| r.reference()).collect();
    references.sort();
    for reference in &references {
        fp.update_str(reference);
    }

    let id = fp.finish();
    tracing::debug!("package id for {} revision {}: {}", recipe.name, recipe.revision, id);
    Ok(id)
}
