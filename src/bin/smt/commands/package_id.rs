//! `smt package-id` command

use anyhow::Result;

use crate::cli::PackageIdArgs;
use small_memory_tree::ops::package_id;
use small_memory_tree::util::GlobalContext;

pub fn execute(args: PackageIdArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let recipe = ctx.recipe(args.revision)?;
    let profile = ctx.profile();

    tracing::debug!("profile:\n{}", profile);
    println!("{}", package_id(&recipe, &profile)?);

    Ok(())
}
