//! Run a recipe's generators.

use std::path::Path;

use anyhow::{Context, Result};

use crate::builder::{CMakeDeps, CMakeToolchain, GeneratedFile};
use crate::core::{Generator, Profile, Recipe};
use crate::resolver::Resolve;
use crate::util::fs::ensure_dir;

/// Write the files of every declared generator, then apply the generate
/// step.
///
/// Toolchain and preset files go to `output_dir`, dependency configs too;
/// `CMakeUserPresets.json` goes to `source_dir` unless the generate step
/// turns it off.
pub fn generate(
    recipe: &Recipe,
    profile: &Profile,
    resolve: &Resolve,
    output_dir: &Path,
    source_dir: &Path,
) -> Result<Vec<GeneratedFile>> {
    let options = recipe
        .options
        .effective()
        .with_context(|| format!("cannot generate revision {}", recipe.revision))?;
    ensure_dir(output_dir)?;

    let mut files = Vec::new();

    if recipe.wants_toolchain() {
        if !recipe.has_generator(Generator::CMakeToolchain) {
            tracing::debug!("generate step customizes CMakeToolchain");
        }
        let toolchain = CMakeToolchain::new(recipe, profile);
        if !toolchain.user_presets {
            tracing::info!("generate step: CMakeUserPresets.json disabled");
        }
        files.extend(toolchain.generate(output_dir, source_dir)?);
    }

    if recipe.has_generator(Generator::CMakeDeps) {
        files.extend(CMakeDeps::new(resolve, &options).generate(output_dir)?);
    }

    if files.is_empty() {
        tracing::warn!(
            "revision {} declares no generators; nothing was written",
            recipe.revision
        );
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{history, PackageIndex};
    use crate::resolver;
    use tempfile::TempDir;

    fn profile() -> Profile {
        Profile {
            os: "Linux".into(),
            compiler: "gcc".into(),
            build_type: "Release".into(),
            arch: "x86_64".into(),
        }
    }

    fn run(revision: u32, tmp: &TempDir) -> Vec<GeneratedFile> {
        let recipe = history::revision(revision).unwrap();
        let index = PackageIndex::builtin().unwrap();
        let resolve = resolver::resolve(&recipe, &index).unwrap();
        generate(
            &recipe,
            &profile(),
            &resolve,
            &tmp.path().join("build"),
            tmp.path(),
        )
        .unwrap()
    }

    #[test]
    fn test_revision_one_writes_user_presets() {
        let tmp = TempDir::new().unwrap();
        let files = run(1, &tmp);

        // toolchain + presets + user presets + 2 per dependency
        assert_eq!(files.len(), 3 + 2 * 4);
        assert!(tmp.path().join("CMakeUserPresets.json").exists());
        assert!(tmp.path().join("build/boost-config.cmake").exists());
    }

    #[test]
    fn test_revision_three_skips_user_presets() {
        let tmp = TempDir::new().unwrap();
        let files = run(3, &tmp);

        assert_eq!(files.len(), 2 + 2 * 5);
        assert!(tmp.path().join("build/conan_toolchain.cmake").exists());
        assert!(tmp.path().join("build/stlplus-config.cmake").exists());
        assert!(!tmp.path().join("CMakeUserPresets.json").exists());
    }

    #[test]
    fn test_boost_is_header_only() {
        let tmp = TempDir::new().unwrap();
        run(4, &tmp);
        let boost = std::fs::read_to_string(tmp.path().join("build/boost-config.cmake")).unwrap();
        assert!(boost.contains("set(boost_VERSION \"1.85.0\")"));
        assert!(boost.contains("set(boost_HEADER_ONLY TRUE)"));
    }
}
