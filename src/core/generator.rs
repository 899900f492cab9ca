//! Build-system integration generators a recipe can request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Generator {
    /// `conan_toolchain.cmake` plus `CMakePresets.json`.
    CMakeToolchain,
    /// One `<name>-config.cmake` per resolved dependency.
    CMakeDeps,
}

impl Generator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Generator::CMakeToolchain => "CMakeToolchain",
            Generator::CMakeDeps => "CMakeDeps",
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Generator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CMakeToolchain" => Ok(Generator::CMakeToolchain),
            "CMakeDeps" => Ok(Generator::CMakeDeps),
            other => Err(format!("unknown generator `{}`", other)),
        }
    }
}
