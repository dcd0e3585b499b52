//! Toolchains and artifact naming

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frontend {
    #[default]
    Clang,
    Gcc,
    Msvc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    X86,
    Arm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bitness {
    X32,
    #[default]
    X64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Linux,
    Unix,
    Windows,
}

/// Target description shared by everything a toolchain produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Abi {
    pub architecture: Architecture,
    pub bitness: Bitness,
    pub platform: Platform,
}

/// A compiler installation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Toolchain {
    pub name: String,
    pub frontend: Frontend,
    pub c_compiler: PathBuf,
    pub cpp_compiler: PathBuf,
    pub linker: PathBuf,
    pub archiver: PathBuf,
    pub abi: Abi,
}

/// Kinds of files a configuration produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    StaticLibrary,
    DynamicLibrary,
    Executable,
    Object,
    /// Precompiled header unit or module interface
    Precompiled,
}

impl Toolchain {
    pub fn new(name: impl Into<String>, frontend: Frontend) -> Self {
        Self {
            name: name.into(),
            frontend,
            ..Self::default()
        }
    }

    /// File extension (with the dot) of `artifact`, empty when the target
    /// uses none.
    pub fn extension(&self, artifact: Artifact) -> &'static str {
        let windows_linkage = match self.frontend {
            Frontend::Msvc => true,
            Frontend::Clang => self.abi.platform == Platform::Windows,
            Frontend::Gcc => false,
        };

        match artifact {
            Artifact::StaticLibrary if windows_linkage => ".lib",
            Artifact::StaticLibrary => ".a",
            Artifact::DynamicLibrary if windows_linkage => ".dll",
            Artifact::DynamicLibrary => ".so",
            Artifact::Executable if windows_linkage => ".exe",
            Artifact::Executable => "",
            Artifact::Object if windows_linkage => ".obj",
            Artifact::Object => ".o",
            Artifact::Precompiled => match self.frontend {
                Frontend::Msvc => ".ifc",
                Frontend::Clang => ".pcm",
                Frontend::Gcc => ".gcm",
            },
        }
    }
}
