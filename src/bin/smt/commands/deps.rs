//! `smt deps` command

use std::collections::HashSet;

use anyhow::{bail, Result};

use crate::cli::DepsArgs;
use small_memory_tree::ops::resolve_recipe;
use small_memory_tree::util::GlobalContext;
use small_memory_tree::Resolve;

pub fn execute(args: DepsArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let recipe = ctx.recipe(args.recipe.revision)?;
    let index = ctx.index(args.recipe.index.as_deref())?;

    let resolve = resolve_recipe(&recipe, &index)?;
    let max_depth = args.depth.unwrap_or(usize::MAX);

    // Print tree
    let mut seen = HashSet::new();
    match args.invert {
        Some(package) => {
            if !resolve.contains(&package) {
                bail!("`{}` is not part of the resolved graph", package);
            }
            print_tree(&resolve, &package, 0, max_depth, &mut seen, true);
        }
        None => print_tree(&resolve, &recipe.name, 0, max_depth, &mut seen, false),
    }

    Ok(())
}

fn print_tree(
    resolve: &Resolve,
    name: &str,
    depth: usize,
    max_depth: usize,
    seen: &mut HashSet<String>,
    invert: bool,
) {
    if depth > max_depth {
        return;
    }
    let Some(package) = resolve.get(name) else {
        return;
    };

    let is_duplicate = !seen.insert(name.to_string());

    // Print package
    let prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}├── ", "│   ".repeat(depth - 1))
    };
    let dup_marker = if is_duplicate { " (*)" } else { "" };
    let forced = if resolve.overrides().iter().any(|o| o.package == name) {
        " (forced)"
    } else {
        ""
    };

    println!("{}{} v{}{}{}", prefix, package.name, package.version, forced, dup_marker);

    if is_duplicate {
        return;
    }

    let next = if invert {
        resolve.dependents(name)
    } else {
        resolve.deps(name)
    };
    for dep in next {
        print_tree(resolve, &dep.name, depth + 1, max_depth, seen, invert);
    }
}
