//! Build-system integration files.
//!
//! Generators turn a recipe, a profile and a resolve into files a CMake
//! project consumes. Each generator renders first and writes second, so
//! rendering stays testable without touching the filesystem.

pub mod cmake_deps;
pub mod cmake_toolchain;

pub use cmake_deps::CMakeDeps;
pub use cmake_toolchain::CMakeToolchain;

use std::path::PathBuf;

use anyhow::Result;

use crate::util::fs::write_if_changed;

/// Header written at the top of every generated CMake file.
pub const GENERATED_HEADER: &str = "# Generated by smt. Do not edit; changes are overwritten.";

/// A file produced by a generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        GeneratedFile {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Write the file, leaving it untouched when already current.
    pub fn write(&self) -> Result<()> {
        if write_if_changed(&self.path, &self.contents)? {
            tracing::debug!("wrote {}", self.path.display());
        }
        Ok(())
    }
}

/// Write every file in order.
pub fn write_all(files: &[GeneratedFile]) -> Result<()> {
    files.iter().try_for_each(GeneratedFile::write)
}
