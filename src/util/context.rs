//! Global context for command execution.
//!
//! Provides centralized access to configuration and paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::config::{global_config_path, load_config, project_config_path, Config};
use crate::core::{history, PackageIndex, Profile, Recipe};

/// Directory generators write to when nothing else is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged global and project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current directory, reading its config.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a context for a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let global = global_config_path().unwrap_or_default();
        let config = load_config(&global, &project_config_path(&cwd));
        GlobalContext { cwd, config }
    }

    /// Create a context with an explicit configuration.
    pub fn with_config(cwd: PathBuf, config: Config) -> Self {
        GlobalContext { cwd, config }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn path(&self, path: &Path) -> PathBuf {
        self.cwd.join(path)
    }

    /// The requested revision, else the configured one, else the latest.
    pub fn recipe(&self, revision: Option<u32>) -> Result<Recipe> {
        match revision.or(self.config.recipe.revision) {
            Some(n) => history::revision(n),
            None => history::latest(),
        }
    }

    /// The given index file, else the configured one, else the built-in
    /// index.
    pub fn index(&self, index: Option<&Path>) -> Result<PackageIndex> {
        match index.or(self.config.recipe.index.as_deref()) {
            Some(path) => PackageIndex::load(&self.path(path)),
            None => PackageIndex::builtin(),
        }
    }

    /// The detected profile with configured overrides applied.
    pub fn profile(&self) -> Profile {
        let mut profile = Profile::detect();
        self.config.apply_profile(&mut profile);
        profile
    }

    /// Where generated files go.
    pub fn output_dir(&self, output_dir: Option<&Path>) -> PathBuf {
        let dir = output_dir
            .or(self.config.recipe.output_dir.as_deref())
            .unwrap_or(Path::new(DEFAULT_OUTPUT_DIR));
        self.path(dir)
    }
}
