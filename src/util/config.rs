//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.smt/config.toml` - User-wide defaults
//! - Project: `.smt/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Profile, SettingsAxis};

/// Name of the directory holding configuration, globally and per project.
pub const CONFIG_DIR_NAME: &str = ".smt";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings values that replace detected ones
    pub profile: ProfileConfig,

    /// Which recipe to use and where its outputs go
    pub recipe: RecipeConfig,

    /// Compact tree behaviour
    pub tree: TreeConfig,
}

/// Overrides for individual settings axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub os: Option<String>,
    pub compiler: Option<String>,
    pub build_type: Option<String>,
    pub arch: Option<String>,
}

impl ProfileConfig {
    fn get(&self, axis: SettingsAxis) -> Option<&String> {
        match axis {
            SettingsAxis::Os => self.os.as_ref(),
            SettingsAxis::Compiler => self.compiler.as_ref(),
            SettingsAxis::BuildType => self.build_type.as_ref(),
            SettingsAxis::Arch => self.arch.as_ref(),
        }
    }
}

/// Recipe selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    /// Revision used when a command is not given one (default: latest)
    pub revision: Option<u32>,

    /// Where generators write their files (default: `build`)
    pub output_dir: Option<PathBuf>,

    /// Package index file (default: the built-in index)
    pub index: Option<PathBuf>,
}

/// Compact tree settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Look children up by binary search; sibling values must be sorted
    pub sorted_lookup: Option<bool>,
}

impl TreeConfig {
    pub fn sorted_lookup(&self) -> bool {
        self.sorted_lookup.unwrap_or(false)
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Profile
        if other.profile.os.is_some() {
            self.profile.os = other.profile.os;
        }
        if other.profile.compiler.is_some() {
            self.profile.compiler = other.profile.compiler;
        }
        if other.profile.build_type.is_some() {
            self.profile.build_type = other.profile.build_type;
        }
        if other.profile.arch.is_some() {
            self.profile.arch = other.profile.arch;
        }

        // Recipe
        if other.recipe.revision.is_some() {
            self.recipe.revision = other.recipe.revision;
        }
        if other.recipe.output_dir.is_some() {
            self.recipe.output_dir = other.recipe.output_dir;
        }
        if other.recipe.index.is_some() {
            self.recipe.index = other.recipe.index;
        }

        // Tree
        if other.tree.sorted_lookup.is_some() {
            self.tree.sorted_lookup = other.tree.sorted_lookup;
        }
    }

    /// Replace the detected settings values with configured ones.
    pub fn apply_profile(&self, profile: &mut Profile) {
        for axis in SettingsAxis::ALL {
            if let Some(value) = self.profile.get(axis) {
                tracing::debug!("config sets {}={}", axis, value);
                profile.set(axis, value.clone());
            }
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.smt/config.toml)
/// 2. Global config (~/.smt/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.smt).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.smt/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.smt/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.profile.compiler.is_none());
        assert!(config.recipe.revision.is_none());
        assert!(!config.tree.sorted_lookup());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[profile]
compiler = "clang"
build_type = "Debug"

[recipe]
revision = 3
output_dir = "out"

[tree]
sorted_lookup = true
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.profile.compiler, Some("clang".to_string()));
        assert_eq!(config.profile.build_type, Some("Debug".to_string()));
        assert_eq!(config.recipe.revision, Some(3));
        assert_eq!(config.recipe.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.tree.sorted_lookup, Some(true));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.profile.compiler = Some("gcc".to_string());
        base.recipe.revision = Some(2);

        let mut override_cfg = Config::default();
        override_cfg.profile.compiler = Some("clang".to_string());

        base.merge(override_cfg);

        assert_eq!(base.profile.compiler, Some("clang".to_string()));
        assert_eq!(base.recipe.revision, Some(2)); // Not overridden
    }

    #[test]
    fn test_apply_profile() {
        let mut config = Config::default();
        config.profile.build_type = Some("Debug".to_string());
        config.profile.arch = Some("armv8".to_string());

        let mut profile = Profile {
            os: "Linux".into(),
            compiler: "gcc".into(),
            build_type: "Release".into(),
            arch: "x86_64".into(),
        };
        config.apply_profile(&mut profile);

        assert_eq!(profile.build_type, "Debug");
        assert_eq!(profile.arch, "armv8");
        assert_eq!(profile.compiler, "gcc");
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[profile]\ncompiler = \"gcc\"\narch = \"x86_64\"\n\n[recipe]\nrevision = 1\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[profile]\ncompiler = \"clang\"\n").unwrap();

        let config = load_config(&global_path, &project_path);

        assert_eq!(config.profile.compiler, Some("clang".to_string()));
        assert_eq!(config.profile.arch, Some("x86_64".to_string()));
        assert_eq!(config.recipe.revision, Some(1));
    }

    #[test]
    fn test_project_can_turn_sorted_lookup_off() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(&global_path, "[tree]\nsorted_lookup = true\n").unwrap();
        std::fs::write(&project_path, "[tree]\nsorted_lookup = false\n").unwrap();
        let config = load_config(&global_path, &project_path);
        assert_eq!(config.tree.sorted_lookup, Some(false));
        assert!(!config.tree.sorted_lookup());

        // A project config that says nothing keeps the global value.
        std::fs::write(&project_path, "[recipe]\nrevision = 2\n").unwrap();
        let config = load_config(&global_path, &project_path);
        assert!(config.tree.sorted_lookup());
    }

    #[test]
    fn test_unreadable_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[recipe]\nrevision = \"three\"\n").unwrap();

        assert!(Config::load(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("a.toml"), &tmp.path().join("b.toml"));
        assert_eq!(config, Config::default());
    }
}
