//! Recipe resolution operations.

use anyhow::Result;

use crate::core::{PackageIndex, Recipe};
use crate::resolver::{self, Resolve};

/// Resolve a recipe's requirements against an index.
///
/// Resolution errors stay downcastable to [`resolver::ResolveError`] so
/// callers can render them as diagnostics.
pub fn resolve_recipe(recipe: &Recipe, index: &PackageIndex) -> Result<Resolve> {
    tracing::info!(
        "Resolving {} revision {} ({} requirements)",
        recipe.name,
        recipe.revision,
        recipe.requirements.len()
    );

    let resolve = resolver::resolve(recipe, index)?;

    for forced in resolve.overrides() {
        tracing::debug!("override: {}", forced);
    }
    Ok(resolve)
}
