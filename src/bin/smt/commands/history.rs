//! `smt history` command

use anyhow::{bail, Result};

use crate::cli::HistoryArgs;
use small_memory_tree::core::history::{pin_history, revisions};

pub fn execute(args: HistoryArgs) -> Result<()> {
    let recipes = revisions()?;
    let entries = pin_history(&recipes, &args.package);

    if entries.iter().all(|entry| entry.constraint.is_none()) {
        bail!("no revision requires `{}`", args.package);
    }

    for entry in entries {
        match entry.constraint {
            Some(constraint) => {
                let force = if entry.forced { " (force)" } else { "" };
                println!("revision {}: {}/{}{}", entry.revision, args.package, constraint, force);
            }
            None => println!("revision {}: -", entry.revision),
        }
    }

    Ok(())
}
