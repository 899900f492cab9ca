//! Recipe files: which settings a project varies on, which generators it
//! runs, and what it requires.
//!
//! ```toml
//! [recipe]
//! name = "small_memory_tree"
//! revision = 3
//! settings = ["os", "compiler", "build_type", "arch"]
//! generators = ["CMakeDeps"]
//!
//! [options.boost]
//! header_only = true
//!
//! [[requires]]
//! reference = "boost/1.84.0"
//! force = true
//!
//! [toolchain]
//! user_presets = false
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::generator::Generator;
use super::options::{DependencyOptions, OptionValue};
use super::requirement::Requirement;
use super::settings::SettingsAxis;

/// Customization of the toolchain generator applied in the generate step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainCustomization {
    /// Write `CMakeUserPresets.json` next to the sources.
    #[serde(default = "default_true")]
    pub user_presets: bool,
}

impl Default for ToolchainCustomization {
    fn default() -> Self {
        ToolchainCustomization { user_presets: true }
    }
}

fn default_true() -> bool {
    true
}

/// A parsed recipe.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub name: String,
    pub revision: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub settings: Vec<SettingsAxis>,
    pub generators: Vec<Generator>,
    pub options: DependencyOptions,
    pub requirements: Vec<Requirement>,
    /// Present when the recipe has a generate step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<ToolchainCustomization>,
    #[serde(skip)]
    pub path: PathBuf,
}

#[derive(Deserialize)]
struct RawRecipe {
    recipe: RawHeader,
    #[serde(default)]
    options: toml::Table,
    #[serde(default)]
    requires: Vec<RawRequirement>,
    #[serde(default)]
    toolchain: Option<ToolchainCustomization>,
}

#[derive(Deserialize)]
struct RawHeader {
    name: String,
    revision: u32,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    settings: Vec<SettingsAxis>,
    #[serde(default)]
    generators: Vec<Generator>,
}

#[derive(Deserialize)]
struct RawRequirement {
    reference: String,
    #[serde(default)]
    force: bool,
    #[serde(default)]
    options: toml::Table,
}

impl Recipe {
    /// Load a recipe from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read recipe: {}", path.display()))?;

        Self::parse(&content, path)
    }

    /// Parse recipe content.
    ///
    /// Options from `[options.<pkg>]` tables are recorded before the inline
    /// options of `[[requires]]` entries.
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let raw: RawRecipe = toml::from_str(content)
            .with_context(|| format!("failed to parse recipe: {}", path.display()))?;

        let mut options = DependencyOptions::new();
        for (package, table) in raw.options {
            let table = match table {
                toml::Value::Table(table) => table,
                other => bail!(
                    "`options.{}` in {} must be a table, not {}",
                    package,
                    path.display(),
                    other.type_str()
                ),
            };
            for (option, value) in option_values(table, path)? {
                options.set(package.clone(), option, value);
            }
        }

        let mut requirements = Vec::with_capacity(raw.requires.len());
        for req in raw.requires {
            let requirement = Requirement::parse(&req.reference)
                .with_context(|| format!("invalid requirement in {}", path.display()))?
                .with_force(req.force);
            for (option, value) in option_values(req.options, path)? {
                options.set(requirement.name(), option, value);
            }
            requirements.push(requirement);
        }

        tracing::debug!(
            "parsed recipe `{}` revision {} ({} requirements)",
            raw.recipe.name,
            raw.recipe.revision,
            requirements.len()
        );

        Ok(Recipe {
            name: raw.recipe.name,
            revision: raw.recipe.revision,
            description: raw.recipe.description,
            settings: raw.recipe.settings,
            generators: raw.recipe.generators,
            options,
            requirements,
            toolchain: raw.toolchain,
            path: path.to_path_buf(),
        })
    }

    /// The first requirement on `name`.
    pub fn requirement(&self, name: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.name() == name)
    }

    pub fn requires(&self, name: &str) -> bool {
        self.requirement(name).is_some()
    }

    pub fn has_generator(&self, generator: Generator) -> bool {
        self.generators.contains(&generator)
    }

    /// Whether the recipe customizes generation itself.
    pub fn has_generate_step(&self) -> bool {
        self.toolchain.is_some()
    }

    /// The toolchain generator runs when declared or when the generate step
    /// customizes it.
    pub fn wants_toolchain(&self) -> bool {
        self.has_generator(Generator::CMakeToolchain) || self.has_generate_step()
    }

    /// Whether `CMakeUserPresets.json` should be written.
    pub fn user_presets(&self) -> bool {
        self.toolchain.unwrap_or_default().user_presets
    }

    /// Requirements marked `force`.
    pub fn forced(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter().filter(|r| r.is_forced())
    }
}

/// Option assignments of one TOML table, in declaration order.
fn option_values(table: toml::Table, path: &Path) -> Result<Vec<(String, OptionValue)>> {
    table
        .into_iter()
        .map(|(option, value)| -> Result<(String, OptionValue)> {
            let value: OptionValue = value.try_into().with_context(|| {
                format!("invalid value for option `{}` in {}", option, path.display())
            })?;
            Ok((option, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::requirement::VersionConstraint;
    use crate::test_support::{sample_recipe, SAMPLE_RECIPE};
    use semver::Version;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sample() {
        let recipe = sample_recipe();
        assert_eq!(recipe.name, "sample");
        assert_eq!(recipe.revision, 1);
        assert_eq!(recipe.settings, SettingsAxis::ALL.to_vec());
        assert_eq!(
            recipe.generators,
            vec![Generator::CMakeToolchain, Generator::CMakeDeps]
        );
        assert_eq!(recipe.requirements.len(), 2);
        assert!(recipe.requirement("boost").unwrap().is_forced());
        assert!(!recipe.requirement("catch2").unwrap().is_forced());
        assert_eq!(
            recipe.options.get("catch2", "with_main"),
            Some(&OptionValue::Bool(true))
        );
        assert!(!recipe.has_generate_step());
        assert!(recipe.wants_toolchain());
        assert!(recipe.user_presets());
        assert_eq!(recipe.forced().count(), 1);
    }

    #[test]
    fn test_inline_requirement_options() {
        let content = r#"
[recipe]
name = "x"
revision = 2

[options.boost]
header_only = true

[[requires]]
reference = "catch2/2.13.7"
options = { with_main = true }
"#;
        let recipe = Recipe::parse(content, Path::new("x.toml")).unwrap();
        let assignments: Vec<String> = recipe.options.iter().map(|o| o.to_string()).collect();
        assert_eq!(
            assignments,
            vec!["boost:header_only=true", "catch2:with_main=true"]
        );
    }

    #[test]
    fn test_options_keep_declaration_order() {
        let content = r#"
[recipe]
name = "x"
revision = 1

[options.catch2]
with_main = true
with_benchmark = true

[options.boost]
header_only = true

[[requires]]
reference = "zlib/1.3.1"
options = { shared = false, minizip = true }
"#;
        let recipe = Recipe::parse(content, Path::new("x.toml")).unwrap();
        let assignments: Vec<String> = recipe.options.iter().map(|o| o.to_string()).collect();
        assert_eq!(
            assignments,
            vec![
                "catch2:with_main=true",
                "catch2:with_benchmark=true",
                "boost:header_only=true",
                "zlib:shared=false",
                "zlib:minizip=true",
            ]
        );
    }

    #[test]
    fn test_options_must_be_tables() {
        let content = r#"
[recipe]
name = "x"
revision = 1

[options]
boost = true
"#;
        let err = Recipe::parse(content, Path::new("x.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("`options.boost`"));

        let content = r#"
[recipe]
name = "x"
revision = 1

[options.boost]
header_only = 3
"#;
        assert!(Recipe::parse(content, Path::new("x.toml")).is_err());
    }

    #[test]
    fn test_generate_step() {
        let content = r#"
[recipe]
name = "x"
revision = 3
generators = ["CMakeDeps"]

[[requires]]
reference = "confu_algorithm/[<2]"

[toolchain]
user_presets = false
"#;
        let recipe = Recipe::parse(content, Path::new("x.toml")).unwrap();
        assert!(recipe.has_generate_step());
        assert!(recipe.wants_toolchain());
        assert!(!recipe.user_presets());
        assert!(matches!(
            recipe.requirement("confu_algorithm").unwrap().constraint(),
            VersionConstraint::Range(_)
        ));
    }

    #[test]
    fn test_toolchain_table_defaults_user_presets_on() {
        let content = "[recipe]\nname = \"x\"\nrevision = 1\n\n[toolchain]\n";
        let recipe = Recipe::parse(content, Path::new("x.toml")).unwrap();
        assert!(recipe.user_presets());
    }

    #[test]
    fn test_unknown_axis_is_an_error() {
        let content = "[recipe]\nname = \"x\"\nrevision = 1\nsettings = [\"os\", \"libc\"]\n";
        assert!(Recipe::parse(content, Path::new("x.toml")).is_err());
    }

    #[test]
    fn test_bad_reference_has_context() {
        let content = "[recipe]\nname = \"x\"\nrevision = 1\n\n[[requires]]\nreference = \"boost\"\n";
        let err = Recipe::parse(content, Path::new("bad.toml")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("bad.toml"));
        assert!(message.contains("missing `/`"));
    }

    #[test]
    fn test_load_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("recipe.toml");
        std::fs::write(&path, SAMPLE_RECIPE).unwrap();

        let recipe = Recipe::load(&path).unwrap();
        assert_eq!(recipe.path, path);
        assert_eq!(
            recipe.requirement("catch2").unwrap().constraint().exact(),
            Some(&Version::new(2, 13, 7))
        );
    }

    #[test]
    fn test_serialize_to_json() {
        let json = serde_json::to_value(sample_recipe()).unwrap();
        assert_eq!(json["name"], "sample");
        assert_eq!(json["requirements"][0]["constraint"], "1.83.0");
        assert_eq!(json["requirements"][0]["force"], true);
        assert_eq!(json["options"][0]["package"], "catch2");
        assert_eq!(json["settings"][2], "build_type");
        assert!(json.get("toolchain").is_none());
    }
}
