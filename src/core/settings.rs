//! Settings axes and the profile that gives each axis a value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the configuration dimensions a binary package varies along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsAxis {
    Os,
    Compiler,
    BuildType,
    Arch,
}

impl SettingsAxis {
    /// Every axis a recipe must declare, in canonical order.
    pub const ALL: [SettingsAxis; 4] = [
        SettingsAxis::Os,
        SettingsAxis::Compiler,
        SettingsAxis::BuildType,
        SettingsAxis::Arch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsAxis::Os => "os",
            SettingsAxis::Compiler => "compiler",
            SettingsAxis::BuildType => "build_type",
            SettingsAxis::Arch => "arch",
        }
    }
}

impl fmt::Display for SettingsAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingsAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingsAxis::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s)
            .ok_or_else(|| format!("unknown settings axis `{}`", s))
    }
}

/// Concrete values for every settings axis on the current machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub os: String,
    pub compiler: String,
    pub build_type: String,
    pub arch: String,
}

/// Build type used when nothing else is configured.
pub const DEFAULT_BUILD_TYPE: &str = "Release";

impl Profile {
    /// Detect a profile for the host.
    ///
    /// The compiler comes from `CC` when set, otherwise from the first of
    /// gcc, clang or cl found on `PATH`.
    pub fn detect() -> Self {
        let os = host_os().to_string();
        let compiler = detect_compiler().unwrap_or_else(|| {
            let fallback = default_compiler(&os);
            tracing::warn!("no C/C++ compiler found, assuming {}", fallback);
            fallback.to_string()
        });

        Profile {
            os,
            compiler,
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            arch: host_arch().to_string(),
        }
    }

    /// The value this profile assigns to `axis`.
    pub fn value(&self, axis: SettingsAxis) -> &str {
        match axis {
            SettingsAxis::Os => &self.os,
            SettingsAxis::Compiler => &self.compiler,
            SettingsAxis::BuildType => &self.build_type,
            SettingsAxis::Arch => &self.arch,
        }
    }

    /// Replace the value of a single axis.
    pub fn set(&mut self, axis: SettingsAxis, value: impl Into<String>) {
        let value = value.into();
        match axis {
            SettingsAxis::Os => self.os = value,
            SettingsAxis::Compiler => self.compiler = value,
            SettingsAxis::BuildType => self.build_type = value,
            SettingsAxis::Arch => self.arch = value,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, axis) in SettingsAxis::ALL.into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}={}", axis, self.value(axis))?;
        }
        Ok(())
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "linux" => "Linux",
        "macos" => "Macos",
        "windows" => "Windows",
        "freebsd" => "FreeBSD",
        "android" => "Android",
        "ios" => "iOS",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "aarch64" => "armv8",
        "arm" => "armv7",
        "x86" => "x86",
        "x86_64" => "x86_64",
        other => other,
    }
}

fn default_compiler(os: &str) -> &'static str {
    match os {
        "Windows" => "msvc",
        "Macos" => "apple-clang",
        _ => "gcc",
    }
}

fn detect_compiler() -> Option<String> {
    if let Ok(cc) = std::env::var("CC") {
        if let Some(family) = compiler_family(&cc) {
            return Some(family.to_string());
        }
    }

    for (program, family) in [("gcc", "gcc"), ("clang", "clang"), ("cl", "msvc")] {
        if which::which(program).is_ok() {
            tracing::debug!("detected compiler `{}` on PATH", program);
            return Some(family.to_string());
        }
    }

    None
}

/// Map a compiler executable to its family name.
fn compiler_family(program: &str) -> Option<&'static str> {
    let name = std::path::Path::new(program)
        .file_stem()?
        .to_str()?
        .to_ascii_lowercase();

    if name == "cl" || name == "clang-cl" {
        Some("msvc")
    } else if name.contains("clang") {
        if cfg!(target_os = "macos") {
            Some("apple-clang")
        } else {
            Some("clang")
        }
    } else if name.contains("gcc") || name.contains("g++") || name == "cc" || name == "c++" {
        Some("gcc")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_round_trip_through_str() {
        for axis in SettingsAxis::ALL {
            assert_eq!(axis.as_str().parse::<SettingsAxis>().unwrap(), axis);
        }
        assert!("compiler.version".parse::<SettingsAxis>().is_err());
    }

    #[test]
    fn test_axis_serde_names() {
        #[derive(Deserialize)]
        struct Axes {
            settings: Vec<SettingsAxis>,
        }
        let axes: Axes =
            toml::from_str(r#"settings = ["os", "compiler", "build_type", "arch"]"#).unwrap();
        assert_eq!(axes.settings, SettingsAxis::ALL.to_vec());
    }

    #[test]
    fn test_compiler_family() {
        assert_eq!(compiler_family("/usr/bin/gcc-13"), Some("gcc"));
        assert_eq!(compiler_family("cc"), Some("gcc"));
        assert_eq!(compiler_family("cl.exe"), Some("msvc"));
        assert_eq!(compiler_family("icx"), None);
        assert!(compiler_family("/opt/llvm/bin/clang").unwrap().ends_with("clang"));
    }

    #[test]
    fn test_profile_value_and_set() {
        let mut profile = Profile {
            os: "Linux".into(),
            compiler: "gcc".into(),
            build_type: "Release".into(),
            arch: "x86_64".into(),
        };
        assert_eq!(profile.value(SettingsAxis::BuildType), "Release");
        profile.set(SettingsAxis::BuildType, "Debug");
        assert_eq!(profile.build_type, "Debug");
        assert_eq!(
            profile.to_string(),
            "os=Linux\ncompiler=gcc\nbuild_type=Debug\narch=x86_64"
        );
    }

    #[test]
    fn test_detect_defaults_to_release() {
        let profile = Profile::detect();
        assert_eq!(profile.build_type, DEFAULT_BUILD_TYPE);
        assert!(!profile.os.is_empty());
        assert!(!profile.compiler.is_empty());
    }
}
