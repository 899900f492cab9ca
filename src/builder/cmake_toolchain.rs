//! `conan_toolchain.cmake` and the CMake presets that point at it.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use super::{write_all, GeneratedFile, GENERATED_HEADER};
use crate::core::{Profile, Recipe};

pub const TOOLCHAIN_FILE: &str = "conan_toolchain.cmake";
pub const PRESETS_FILE: &str = "CMakePresets.json";
pub const USER_PRESETS_FILE: &str = "CMakeUserPresets.json";

/// Toolchain generator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeToolchain {
    pub build_type: String,
    pub arch: String,
    pub compiler: String,
    /// Write `CMakeUserPresets.json` into the source directory
    pub user_presets: bool,
}

impl CMakeToolchain {
    pub fn new(recipe: &Recipe, profile: &Profile) -> Self {
        CMakeToolchain {
            build_type: profile.build_type.clone(),
            arch: profile.arch.clone(),
            compiler: profile.compiler.clone(),
            user_presets: recipe.user_presets(),
        }
    }

    /// Name shared by the configure, build and test presets.
    pub fn preset_name(&self) -> String {
        format!("conan-{}", self.build_type.to_ascii_lowercase())
    }

    /// Render the toolchain and preset files.
    pub fn render(&self, output_dir: &Path, source_dir: &Path) -> Result<Vec<GeneratedFile>> {
        let mut files = vec![
            GeneratedFile::new(output_dir.join(TOOLCHAIN_FILE), self.toolchain_file()),
            GeneratedFile::new(output_dir.join(PRESETS_FILE), self.presets(output_dir)?),
        ];
        if self.user_presets {
            files.push(GeneratedFile::new(
                source_dir.join(USER_PRESETS_FILE),
                self.user_presets_file(output_dir)?,
            ));
        }
        Ok(files)
    }

    /// Render and write.
    pub fn generate(&self, output_dir: &Path, source_dir: &Path) -> Result<Vec<GeneratedFile>> {
        let files = self.render(output_dir, source_dir)?;
        write_all(&files)?;
        tracing::info!("CMakeToolchain: wrote {} files", files.len());
        Ok(files)
    }

    fn toolchain_file(&self) -> String {
        let mut out = String::new();
        out.push_str(GENERATED_HEADER);
        out.push_str("\n\ninclude_guard()\n\n");
        out.push_str(&format!(
            "set(CMAKE_BUILD_TYPE \"{}\" CACHE STRING \"Choose the type of build.\" FORCE)\n",
            self.build_type
        ));

        if let Some(flag) = self.arch_flag() {
            out.push_str(&format!("string(APPEND CMAKE_C_FLAGS_INIT \" {}\")\n", flag));
            out.push_str(&format!("string(APPEND CMAKE_CXX_FLAGS_INIT \" {}\")\n", flag));
        }

        out.push_str(
            "\n# Find the <name>-config.cmake files generated next to this toolchain\n\
             list(PREPEND CMAKE_PREFIX_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n\
             list(PREPEND CMAKE_MODULE_PATH \"${CMAKE_CURRENT_LIST_DIR}\")\n\
             set(CMAKE_FIND_PACKAGE_PREFER_CONFIG ON)\n",
        );
        out
    }

    fn arch_flag(&self) -> Option<&'static str> {
        if self.compiler == "msvc" {
            return None;
        }
        match self.arch.as_str() {
            "x86" => Some("-m32"),
            "x86_64" => Some("-m64"),
            _ => None,
        }
    }

    fn presets(&self, output_dir: &Path) -> Result<String> {
        let name = self.preset_name();
        let presets = json!({
            "version": 3,
            "vendor": { "smt": {} },
            "cmakeMinimumRequired": { "major": 3, "minor": 15, "patch": 0 },
            "configurePresets": [{
                "name": name,
                "displayName": format!("'{}' config", name),
                "binaryDir": output_dir.display().to_string(),
                "toolchainFile": output_dir.join(TOOLCHAIN_FILE).display().to_string(),
                "cacheVariables": {
                    "CMAKE_BUILD_TYPE": self.build_type,
                    "CMAKE_POLICY_DEFAULT_CMP0091": "NEW"
                }
            }],
            "buildPresets": [{ "name": name, "configurePreset": name }],
            "testPresets": [{ "name": name, "configurePreset": name }]
        });
        to_pretty_json(&presets)
    }

    fn user_presets_file(&self, output_dir: &Path) -> Result<String> {
        let presets = json!({
            "version": 4,
            "vendor": { "smt": {} },
            "include": [output_dir.join(PRESETS_FILE).display().to_string()]
        });
        to_pretty_json(&presets)
    }
}

fn to_pretty_json(value: &serde_json::Value) -> Result<String> {
    let mut text = serde_json::to_string_pretty(value).context("failed to serialize presets")?;
    text.push('\n');
    Ok(text)
}
