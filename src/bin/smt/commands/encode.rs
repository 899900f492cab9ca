//! `smt encode` command

use anyhow::Result;

use crate::cli::EncodeArgs;
use small_memory_tree::ops::encode_file;
use small_memory_tree::util::fs::write_string;
use small_memory_tree::util::GlobalContext;

pub fn execute(args: EncodeArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let encoded = encode_file(&ctx.path(&args.input), args.layout, args.offset_width)?;

    match &args.output {
        Some(output) => {
            let output = ctx.path(output);
            write_string(&output, &encoded)?;
            tracing::info!("wrote {}", output.display());
        }
        None => print!("{}", encoded),
    }

    Ok(())
}
