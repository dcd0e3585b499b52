//! Cache data model
//!
//! Entities live in arenas owned by [`crate::Cache`] (files and projects)
//! or by [`crate::Configuration`] (everything a configuration builds).
//! They refer to each other through the typed ids below, which are only
//! meaningful for the arena that issued them.

use crate::file::File;
use cppgraph_core::Visibility;
use cppgraph_tokenizer::Token;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

macro_rules! arena_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub(crate) usize);

            impl $name {
                /// Position in the owning arena.
                pub fn index(self) -> usize {
                    self.0
                }
            }
        )*
    };
}

arena_id!(
    SourceFileId,
    HeaderFileId,
    ProjectId,
    TranslationUnitId,
    HeaderUnitId,
    ModuleId,
    ModulePartitionId,
    StaticLibraryId,
    DynamicLibraryId,
    ExecutableId,
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Executable,
    #[default]
    StaticLibrary,
    DynamicLibrary,
}

/// A named group of source and header files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub kind: ProjectKind,
    /// Insertion order
    pub sources: Vec<SourceFileId>,
    pub headers: Vec<HeaderFileId>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProjectKind::default(),
            sources: Vec::new(),
            headers: Vec::new(),
        }
    }
}

/// A source file and the tokens extracted from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub file: File,
    pub project: ProjectId,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFile {
    pub file: File,
    pub project: ProjectId,
    pub tokens: Vec<Token>,
}

impl Deref for SourceFile {
    type Target = File;

    fn deref(&self) -> &File {
        &self.file
    }
}

impl DerefMut for SourceFile {
    fn deref_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

impl Deref for HeaderFile {
    type Target = File;

    fn deref(&self) -> &File {
        &self.file
    }
}

impl DerefMut for HeaderFile {
    fn deref_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

/// A compiler, linker or archiver flag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Flag {
    pub name: String,
    pub value: String,
    /// Changing the flag changes the produced binary interface.
    pub affects_abi: bool,
}

impl Flag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            affects_abi: false,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.value.is_empty() {
            write!(f, "={}", self.value)?;
        }
        if self.affects_abi {
            write!(f, " [abi]")?;
        }
        Ok(())
    }
}

/// A predefined macro of a configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Define {
    pub name: String,
    pub value: String,
}

impl Define {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resolved dependencies of a translation unit, header or header unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    pub includes: Vec<Header>,
    pub imported_header_units: Vec<HeaderUnitId>,
    pub imported_modules: Vec<ModuleId>,
    pub imported_module_partitions: Vec<ModulePartitionId>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
            && self.imported_header_units.is_empty()
            && self.imported_modules.is_empty()
            && self.imported_module_partitions.is_empty()
    }
}

/// An included header together with what it pulls in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub file: HeaderFileId,
    pub references: References,
}

impl Header {
    pub fn new(file: HeaderFileId) -> Self {
        Self {
            file,
            references: References::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub source: SourceFileId,
    /// The object file
    pub output: File,
    pub references: References,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderUnit {
    pub header: HeaderFileId,
    pub precompiled: File,
    pub references: References,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub name: String,
    pub visibility: Visibility,
    /// Translation unit holding the primary interface, once it is known
    pub translation_unit: Option<TranslationUnitId>,
    pub precompiled: File,
    pub partitions: Vec<ModulePartitionId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePartition {
    pub name: String,
    pub module: ModuleId,
    pub visibility: Visibility,
    pub translation_unit: Option<TranslationUnitId>,
    pub precompiled: File,
}

/// The linked output of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedFile {
    pub project: ProjectId,
    pub output: File,
}

/// Id of whichever linked output a project produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkedFileId {
    StaticLibrary(StaticLibraryId),
    DynamicLibrary(DynamicLibraryId),
    Executable(ExecutableId),
}
