//! `smt generate` command

use anyhow::Result;

use crate::cli::GenerateArgs;
use small_memory_tree::ops::{generate, resolve_recipe};
use small_memory_tree::util::GlobalContext;

pub fn execute(args: GenerateArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let recipe = ctx.recipe(args.recipe.revision)?;
    let index = ctx.index(args.recipe.index.as_deref())?;
    let profile = ctx.profile();

    let resolve = resolve_recipe(&recipe, &index)?;

    let output_dir = ctx.output_dir(args.output_dir.as_deref());
    let source_dir = match &args.source_dir {
        Some(dir) => ctx.path(dir),
        None => ctx.cwd().to_path_buf(),
    };

    let files = generate(&recipe, &profile, &resolve, &output_dir, &source_dir)?;

    for file in &files {
        println!("{}", file.path.display());
    }
    tracing::info!(
        "generated {} file(s) for {} revision {}",
        files.len(),
        recipe.name,
        recipe.revision
    );

    Ok(())
}
