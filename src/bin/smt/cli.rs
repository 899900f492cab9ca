//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use small_memory_tree::ops::{Layout, OffsetWidth};

/// smt - compact trees and the recipe that builds them
#[derive(Parser)]
#[command(name = "smt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a recipe revision
    Show(ShowArgs),

    /// Check every recipe revision and the pin history
    Check(CheckArgs),

    /// Show how one package was pinned across revisions
    History(HistoryArgs),

    /// Resolve the recipe's requirements against the package index
    Resolve(ResolveArgs),

    /// Display the resolved dependency tree
    Deps(DepsArgs),

    /// Write the CMake files the recipe asks for
    Generate(GenerateArgs),

    /// Compute the binary compatibility id for the current profile
    PackageId(PackageIdArgs),

    /// Encode a JSON tree into a compact layout
    Encode(EncodeArgs),

    /// Look up the children at the end of a path in an encoded tree
    Children(ChildrenArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Which recipe and index to work from.
#[derive(Args)]
pub struct RecipeArgs {
    /// Recipe revision (defaults to the configured or latest one)
    #[arg(short, long)]
    pub revision: Option<u32>,

    /// Package index file (defaults to the built-in index)
    #[arg(long)]
    pub index: Option<PathBuf>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Recipe revision (defaults to the configured or latest one)
    #[arg(short, long)]
    pub revision: Option<u32>,

    /// Print the recipe as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Treat warnings as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Package name
    pub package: String,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DepsArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Invert the tree to show what depends on a package
    #[arg(short, long)]
    pub invert: Option<String>,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    /// Where the toolchain, presets and finder files are written
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Source directory that receives CMakeUserPresets.json
    #[arg(long)]
    pub source_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct PackageIdArgs {
    /// Recipe revision (defaults to the configured or latest one)
    #[arg(short, long)]
    pub revision: Option<u32>,
}

#[derive(Args)]
pub struct EncodeArgs {
    /// JSON tree file (`{"value": .., "children": [..]}`)
    pub input: PathBuf,

    /// Integer width of the children offset column
    #[arg(long, default_value = "64")]
    pub offset_width: OffsetWidth,

    /// Storage layout: compact, bitmap or flat
    #[arg(long, default_value = "compact")]
    pub layout: Layout,

    /// Write the encoding to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ChildrenArgs {
    /// Encoded tree file produced by `smt encode`
    pub encoded: PathBuf,

    /// Path of values from the root
    #[arg(required = true)]
    pub path: Vec<String>,

    /// Binary search among siblings (they must be sorted; compact layout only)
    #[arg(long)]
    pub sorted: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
