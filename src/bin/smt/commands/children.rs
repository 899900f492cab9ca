//! `smt children` command

use anyhow::Result;

use crate::cli::ChildrenArgs;
use small_memory_tree::ops::{load_encoded, TreeValue};
use small_memory_tree::util::GlobalContext;

pub fn execute(args: ChildrenArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let tree = load_encoded(&ctx.path(&args.encoded))?;

    let path: Vec<TreeValue> = args
        .path
        .iter()
        .map(|segment| match segment.parse() {
            Ok(value) => value,
            Err(never) => match never {},
        })
        .collect();
    let sorted = args.sorted || ctx.config().tree.sorted_lookup();

    for child in tree.children_for_path(&path, sorted)? {
        println!("{}", child);
    }

    Ok(())
}
