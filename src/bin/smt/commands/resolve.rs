//! `smt resolve` command

use anyhow::Result;
use serde_json::json;

use crate::cli::ResolveArgs;
use small_memory_tree::ops::resolve_recipe;
use small_memory_tree::util::GlobalContext;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let recipe = ctx.recipe(args.recipe.revision)?;
    let index = ctx.index(args.recipe.index.as_deref())?;

    let resolve = resolve_recipe(&recipe, &index)?;

    if args.json {
        let out = json!({
            "root": resolve.root(),
            "packages": resolve.dependencies(),
            "overrides": resolve.overrides(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for package in resolve.dependencies() {
        println!("{}", package);
    }

    if !resolve.overrides().is_empty() {
        println!();
        println!("forced overrides:");
        for forced in resolve.overrides() {
            println!("  {}", forced);
        }
    }

    Ok(())
}
