//! `smt show` command

use anyhow::Result;

use crate::cli::ShowArgs;
use small_memory_tree::util::GlobalContext;
use small_memory_tree::Recipe;

pub fn execute(args: ShowArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let recipe = ctx.recipe(args.revision)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
    } else {
        print!("{}", render(&recipe));
    }

    Ok(())
}

fn render(recipe: &Recipe) -> String {
    let join = |items: Vec<String>| items.join(", ");

    let mut out = format!("{} (revision {})\n", recipe.name, recipe.revision);
    if let Some(description) = &recipe.description {
        out.push_str(&format!("  {}\n", description));
    }
    out.push_str(&format!(
        "settings:   {}\n",
        join(recipe.settings.iter().map(|s| s.to_string()).collect())
    ));
    out.push_str(&format!(
        "generators: {}\n",
        join(recipe.generators.iter().map(|g| g.to_string()).collect())
    ));

    if !recipe.options.is_empty() {
        out.push_str("options:\n");
        for option in recipe.options.iter() {
            out.push_str(&format!("  {}\n", option));
        }
    }

    out.push_str("requires:\n");
    for requirement in &recipe.requirements {
        out.push_str(&format!("  {}\n", requirement));
    }

    if let Some(toolchain) = &recipe.toolchain {
        out.push_str(&format!(
            "generate:   CMakeToolchain (user_presets={})\n",
            toolchain.user_presets
        ));
    }

    out
}
