//! `smt check` command
//!
//! Validates every recipe revision on its own, then the pin history across
//! them.

use anyhow::{bail, Result};

use crate::cli::CheckArgs;
use small_memory_tree::core::history;
use small_memory_tree::ops::{check_history, check_recipe};
use small_memory_tree::util::diagnostic::{emit, Summary};

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let recipes = history::revisions()?;

    let mut diagnostics = Vec::new();
    for recipe in &recipes {
        diagnostics.extend(check_recipe(recipe));
    }
    diagnostics.extend(check_history(&recipes));

    for diagnostic in &diagnostics {
        emit(diagnostic, color);
    }

    let summary = Summary::of(&diagnostics);
    if summary.errors > 0 {
        bail!("{} revision(s) checked: {}", recipes.len(), summary);
    }
    if args.deny_warnings && summary.warnings > 0 {
        bail!("{} warning(s) denied", summary.warnings);
    }

    println!("{} revision(s) checked: {}", recipes.len(), summary);
    Ok(())
}
