//! One CMake package config per resolved dependency.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use super::{write_all, GeneratedFile, GENERATED_HEADER};
use crate::core::OptionValue;
use crate::resolver::{Resolve, ResolvedPackage};

/// Dependency config generator.
#[derive(Debug, Clone)]
pub struct CMakeDeps<'a> {
    resolve: &'a Resolve,
    options: &'a BTreeMap<(String, String), OptionValue>,
}

impl<'a> CMakeDeps<'a> {
    /// `options` are the recipe's effective option overrides.
    pub fn new(resolve: &'a Resolve, options: &'a BTreeMap<(String, String), OptionValue>) -> Self {
        CMakeDeps { resolve, options }
    }

    /// Render `<name>-config.cmake` and `<name>-config-version.cmake` for
    /// every dependency, sorted by name.
    pub fn render(&self, output_dir: &Path) -> Vec<GeneratedFile> {
        let mut files = Vec::new();
        for package in self.resolve.dependencies() {
            files.push(GeneratedFile::new(
                output_dir.join(format!("{}-config.cmake", package.name)),
                self.config_file(package),
            ));
            files.push(GeneratedFile::new(
                output_dir.join(format!("{}-config-version.cmake", package.name)),
                version_file(package),
            ));
        }
        files
    }

    /// Render and write.
    pub fn generate(&self, output_dir: &Path) -> Result<Vec<GeneratedFile>> {
        let files = self.render(output_dir);
        write_all(&files)?;
        tracing::info!("CMakeDeps: wrote {} files", files.len());
        Ok(files)
    }

    fn package_options<'s>(
        &'s self,
        name: &'s str,
    ) -> impl Iterator<Item = (&'s str, &'s OptionValue)> + 's {
        self.options
            .iter()
            .filter(move |((package, _), _)| package == name)
            .map(|((_, option), value)| (option.as_str(), value))
    }

    fn config_file(&self, package: &ResolvedPackage) -> String {
        let name = &package.name;
        let target = format!("{0}::{0}", name);
        let mut out = String::new();

        out.push_str(GENERATED_HEADER);
        out.push_str(&format!("\n# {}\n", package));
        for (option, value) in self.package_options(name) {
            out.push_str(&format!("# option {}={}\n", option, value));
        }

        out.push_str(&format!(
            "\nif(TARGET {target})\n  return()\nendif()\n\n\
             set({name}_FOUND TRUE)\n\
             set({name}_VERSION \"{version}\")\n",
            target = target,
            name = name,
            version = package.version,
        ));

        let header_only = matches!(
            self.options.get(&(name.clone(), "header_only".to_string())),
            Some(OptionValue::Bool(true))
        );
        if header_only {
            out.push_str(&format!("set({}_HEADER_ONLY TRUE)\n", name));
        }

        out.push_str(&format!("\nadd_library({} INTERFACE IMPORTED)\n", target));

        let deps = self.resolve.deps(name);
        if !deps.is_empty() {
            out.push_str("\ninclude(CMakeFindDependencyMacro)\n");
            for dep in &deps {
                out.push_str(&format!(
                    "find_dependency({} {} EXACT CONFIG)\n",
                    dep.name, dep.version
                ));
            }
            let links: Vec<String> = deps
                .iter()
                .map(|dep| format!("{0}::{0}", dep.name))
                .collect();
            out.push_str(&format!(
                "set_property(TARGET {} APPEND PROPERTY INTERFACE_LINK_LIBRARIES {})\n",
                target,
                links.join(" ")
            ));
        }

        out
    }
}

fn version_file(package: &ResolvedPackage) -> String {
    format!(
        "{header}\n\n\
         set(PACKAGE_VERSION \"{version}\")\n\n\
         if(NOT PACKAGE_FIND_VERSION OR PACKAGE_FIND_VERSION VERSION_EQUAL PACKAGE_VERSION)\n  \
         set(PACKAGE_VERSION_COMPATIBLE TRUE)\n  \
         if(PACKAGE_FIND_VERSION)\n    \
         set(PACKAGE_VERSION_EXACT TRUE)\n  \
         endif()\n\
         else()\n  \
         set(PACKAGE_VERSION_COMPATIBLE FALSE)\n\
         endif()\n",
        header = GENERATED_HEADER,
        version = package.version,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;
    use tempfile::TempDir;

    fn resolve() -> Resolve {
        let mut resolve = Resolve::new();
        resolve.add_root("app", Version::new(0, 0, 0));
        resolve.add_package("boost", Version::new(1, 85, 0));
        resolve.add_package("confu_algorithm", Version::new(1, 1, 0));
        resolve.add_edge("app", "boost");
        resolve.add_edge("app", "confu_algorithm");
        resolve.add_edge("confu_algorithm", "boost");
        resolve
    }

    fn options() -> BTreeMap<(String, String), OptionValue> {
        BTreeMap::from([(
            ("boost".to_string(), "header_only".to_string()),
            OptionValue::Bool(true),
        )])
    }

    #[test]
    fn test_render_files_for_each_dependency() {
        let resolve = resolve();
        let options = options();
        let files = CMakeDeps::new(&resolve, &options).render(Path::new("out"));

        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "boost-config.cmake",
                "boost-config-version.cmake",
                "confu_algorithm-config.cmake",
                "confu_algorithm-config-version.cmake",
            ]
        );
    }

    #[test]
    fn test_config_contents() {
        let resolve = resolve();
        let options = options();
        let files = CMakeDeps::new(&resolve, &options).render(Path::new("out"));

        let boost = &files[0].contents;
        assert!(boost.contains("add_library(boost::boost INTERFACE IMPORTED)"));
        assert!(boost.contains("set(boost_VERSION \"1.85.0\")"));
        assert!(boost.contains("set(boost_HEADER_ONLY TRUE)"));
        assert!(boost.contains("# option header_only=true"));
        assert!(!boost.contains("find_dependency"));

        let confu = &files[2].contents;
        assert!(confu.contains("find_dependency(boost 1.85.0 EXACT CONFIG)"));
        assert!(confu.contains("INTERFACE_LINK_LIBRARIES boost::boost"));
        assert!(!confu.contains("HEADER_ONLY"));

        let version = &files[1].contents;
        assert!(version.contains("set(PACKAGE_VERSION \"1.85.0\")"));
        assert!(version.contains("PACKAGE_VERSION_COMPATIBLE FALSE"));
    }

    #[test]
    fn test_generate_writes_files() {
        let tmp = TempDir::new().unwrap();
        let resolve = resolve();
        let options = BTreeMap::new();

        let files = CMakeDeps::new(&resolve, &options)
            .generate(tmp.path())
            .unwrap();
        assert_eq!(files.len(), 4);
        assert!(tmp.path().join("confu_algorithm-config.cmake").exists());
    }
}
