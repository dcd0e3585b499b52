//! Scanner settings

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Settings controlling how project files are classified
///
/// They are persisted with the cache so that a rescan uses the same rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Separator used when composing nested project names
    pub project_name_separator: String,

    /// Extensions (with the leading dot) of header files
    pub cpp_header_extensions: BTreeSet<String>,

    /// Extensions (with the leading dot) of source files
    pub cpp_source_extensions: BTreeSet<String>,

    /// File stems that mark a project as an executable
    pub executable_filenames: BTreeSet<String>,

    /// Directories that are never scanned
    pub ignore_directories: BTreeSet<String>,

    /// Directories whose children are scanned as separate projects
    pub skip_directories: BTreeSet<String>,

    /// Directories folded into their parent project
    pub squash_directories: BTreeSet<String>,

    /// Directories holding test projects
    pub test_directories: BTreeSet<String>,
}

fn set(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            project_name_separator: ".".into(),
            cpp_header_extensions: set(&[".hpp", ".hxx", ".h"]),
            cpp_source_extensions: set(&[".cpp", ".cxx", ".cc", ".ixx"]),
            executable_filenames: set(&["main", "Main", "WinMain"]),
            ignore_directories: set(&["build"]),
            skip_directories: set(&["projects", "Projects"]),
            squash_directories: set(&[
                "src", "srcs", "SRC", "Src", "source", "sources", "Source", "Sources", "include",
                "Include", "includes", "Includes",
            ]),
            test_directories: set(&["test", "Test", "tests", "Tests"]),
        }
    }
}

impl Settings {
    pub fn is_header(&self, path: &Path) -> bool {
        dotted_extension(path).is_some_and(|ext| self.cpp_header_extensions.contains(&ext))
    }

    pub fn is_source(&self, path: &Path) -> bool {
        dotted_extension(path).is_some_and(|ext| self.cpp_source_extensions.contains(&ext))
    }

    /// True when the file stem (e.g. `main` for `main.cpp`) names a program entry point.
    pub fn is_executable_name(&self, path: &Path) -> bool {
        path.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| self.executable_filenames.contains(stem))
    }

    pub fn is_ignored_directory(&self, name: &str) -> bool {
        self.ignore_directories.contains(name)
    }
}

fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| format!(".{ext}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.project_name_separator, ".");
        assert_eq!(settings.cpp_header_extensions.len(), 3);
        assert!(settings.cpp_source_extensions.contains(".ixx"));
        assert!(settings.squash_directories.contains("Includes"));
        assert_eq!(settings.squash_directories.len(), 12);
    }

    #[test]
    fn test_classification() {
        let settings = Settings::default();
        assert!(settings.is_header(Path::new("include/my_header.hpp")));
        assert!(!settings.is_header(Path::new("src/main.cpp")));
        assert!(settings.is_source(Path::new("src/main.cpp")));
        assert!(!settings.is_source(Path::new("README")));
        assert!(settings.is_executable_name(Path::new("app/WinMain.cpp")));
        assert!(!settings.is_executable_name(Path::new("app/lib.cpp")));
        assert!(settings.is_ignored_directory("build"));
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings: Settings = serde_yaml::from_str("project_name_separator: \"::\"\n").unwrap();
        assert_eq!(settings.project_name_separator, "::");
        assert_eq!(settings.test_directories, Settings::default().test_directories);
    }
}
