//! Build configuration
//!
//! A [`Configuration`] owns every entity produced for one named build
//! variant. Adding an entity that already exists returns the existing id.

use crate::file::File;
use crate::index::ConfigurationIndex;
use crate::model::{
    Define, DynamicLibraryId, ExecutableId, Flag, HeaderFileId, HeaderUnit, HeaderUnitId,
    LinkedFile, LinkedFileId, Module, ModuleId, ModulePartition, ModulePartitionId, ProjectId,
    ProjectKind, References, SourceFileId, StaticLibraryId, TranslationUnit, TranslationUnitId,
};
use crate::toolchain::{Artifact, Toolchain};
use cppgraph_core::Visibility;
use std::ops::{Index, IndexMut};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Configuration {
    name: String,
    toolchain: Toolchain,
    defines: Vec<Define>,
    compiler_flags: Vec<Flag>,
    linker_flags: Vec<Flag>,
    archiver_flags: Vec<Flag>,
    static_libraries: Vec<LinkedFile>,
    dynamic_libraries: Vec<LinkedFile>,
    executables: Vec<LinkedFile>,
    translation_units: Vec<TranslationUnit>,
    header_units: Vec<HeaderUnit>,
    modules: Vec<Module>,
    module_partitions: Vec<ModulePartition>,
    index: ConfigurationIndex,
}

impl Configuration {
    pub fn new(name: impl Into<String>, toolchain: Toolchain) -> Self {
        Self {
            name: name.into(),
            toolchain,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn set_toolchain(&mut self, toolchain: Toolchain) {
        self.toolchain = toolchain;
    }

    pub fn defines(&self) -> &[Define] {
        &self.defines
    }

    pub fn set_defines(&mut self, defines: Vec<Define>) {
        self.defines = defines;
    }

    pub fn compiler_flags(&self) -> &[Flag] {
        &self.compiler_flags
    }

    pub fn set_compiler_flags(&mut self, flags: Vec<Flag>) {
        self.compiler_flags = flags;
    }

    pub fn linker_flags(&self) -> &[Flag] {
        &self.linker_flags
    }

    pub fn set_linker_flags(&mut self, flags: Vec<Flag>) {
        self.linker_flags = flags;
    }

    pub fn archiver_flags(&self) -> &[Flag] {
        &self.archiver_flags
    }

    pub fn set_archiver_flags(&mut self, flags: Vec<Flag>) {
        self.archiver_flags = flags;
    }

    /// `<configuration>/<stem><extension>`
    pub fn artifact_path(&self, stem: &str, artifact: Artifact) -> PathBuf {
        Path::new(&self.name).join(format!("{stem}{}", self.toolchain.extension(artifact)))
    }

    pub fn add_static_library(&mut self, project: ProjectId, name: &str) -> StaticLibraryId {
        if let Some(id) = self.index.static_library(project) {
            return id;
        }

        let id = StaticLibraryId(self.static_libraries.len());
        let output = File::artifact(self.artifact_path(name, Artifact::StaticLibrary));
        self.static_libraries.push(LinkedFile { project, output });
        self.index.insert_static_library(project, id);
        id
    }

    pub fn add_dynamic_library(&mut self, project: ProjectId, name: &str) -> DynamicLibraryId {
        if let Some(id) = self.index.dynamic_library(project) {
            return id;
        }

        let id = DynamicLibraryId(self.dynamic_libraries.len());
        let output = File::artifact(self.artifact_path(name, Artifact::DynamicLibrary));
        self.dynamic_libraries.push(LinkedFile { project, output });
        self.index.insert_dynamic_library(project, id);
        id
    }

    pub fn add_executable(&mut self, project: ProjectId, name: &str) -> ExecutableId {
        if let Some(id) = self.index.executable(project) {
            return id;
        }

        let id = ExecutableId(self.executables.len());
        let output = File::artifact(self.artifact_path(name, Artifact::Executable));
        self.executables.push(LinkedFile { project, output });
        self.index.insert_executable(project, id);
        id
    }

    /// Add the linked output matching the project's kind.
    pub fn add_linked_file(
        &mut self,
        project: ProjectId,
        name: &str,
        kind: ProjectKind,
    ) -> LinkedFileId {
        match kind {
            ProjectKind::StaticLibrary => {
                LinkedFileId::StaticLibrary(self.add_static_library(project, name))
            }
            ProjectKind::DynamicLibrary => {
                LinkedFileId::DynamicLibrary(self.add_dynamic_library(project, name))
            }
            ProjectKind::Executable => LinkedFileId::Executable(self.add_executable(project, name)),
        }
    }

    /// `path` is the source path relative to the project root. The object
    /// file keeps its directories, so `a/main.cpp` and `b/main.cpp` do not
    /// collide.
    pub fn add_translation_unit(
        &mut self,
        source: SourceFileId,
        path: &Path,
    ) -> TranslationUnitId {
        if let Some(id) = self.index.translation_unit(source) {
            return id;
        }

        let stem = artifact_name(&path.with_extension(""));
        let id = TranslationUnitId(self.translation_units.len());
        let output = File::artifact(self.artifact_path(&stem, Artifact::Object));
        self.translation_units.push(TranslationUnit {
            source,
            output,
            references: References::default(),
        });
        self.index.insert_translation_unit(source, id);
        id
    }

    /// `path` is the header path relative to the project root, see
    /// [`Configuration::add_translation_unit`].
    pub fn add_header_unit(&mut self, header: HeaderFileId, path: &Path) -> HeaderUnitId {
        if let Some(id) = self.index.header_unit(header) {
            return id;
        }

        let name = artifact_name(path);
        let id = HeaderUnitId(self.header_units.len());
        let precompiled = File::artifact(self.artifact_path(&name, Artifact::Precompiled));
        self.header_units.push(HeaderUnit {
            header,
            precompiled,
            references: References::default(),
        });
        self.index.insert_header_unit(header, id);
        id
    }

    /// Create or fetch module `name`.
    ///
    /// The visibility of the first call sticks. A later call supplies the
    /// translation unit if none was known yet.
    pub fn add_module(
        &mut self,
        name: &str,
        translation_unit: Option<TranslationUnitId>,
        visibility: Visibility,
    ) -> ModuleId {
        if let Some(id) = self.index.module_(name) {
            let module = &mut self.modules[id.0];
            if module.translation_unit.is_none() {
                module.translation_unit = translation_unit;
            }
            return id;
        }

        let id = ModuleId(self.modules.len());
        let precompiled = File::artifact(self.artifact_path(name, Artifact::Precompiled));
        self.modules.push(Module {
            name: name.to_string(),
            visibility,
            translation_unit,
            precompiled,
            partitions: Vec::new(),
        });
        self.index.insert_module(name, id);
        id
    }

    /// Create or fetch partition `name` of `module`, creating the module
    /// when it does not exist yet.
    pub fn add_module_partition(
        &mut self,
        module: &str,
        name: &str,
        translation_unit: Option<TranslationUnitId>,
        visibility: Visibility,
    ) -> ModulePartitionId {
        if let Some(id) = self.index.module_partition(module, name) {
            let partition = &mut self.module_partitions[id.0];
            if partition.translation_unit.is_none() {
                partition.translation_unit = translation_unit;
            }
            return id;
        }

        let module_id = self.add_module(module, None, visibility);
        let id = ModulePartitionId(self.module_partitions.len());
        let precompiled =
            File::artifact(self.artifact_path(&format!("{module}-{name}"), Artifact::Precompiled));
        self.module_partitions.push(ModulePartition {
            name: name.to_string(),
            module: module_id,
            visibility,
            translation_unit,
            precompiled,
        });
        self.modules[module_id.0].partitions.push(id);
        self.index.insert_module_partition(module, name, id);
        id
    }

    pub fn module_(&self, name: &str) -> Option<ModuleId> {
        self.index.module_(name)
    }

    pub fn module_partition(&self, module: &str, partition: &str) -> Option<ModulePartitionId> {
        self.index.module_partition(module, partition)
    }

    pub fn header_unit(&self, header: HeaderFileId) -> Option<HeaderUnitId> {
        self.index.header_unit(header)
    }

    pub fn translation_unit(&self, source: SourceFileId) -> Option<TranslationUnitId> {
        self.index.translation_unit(source)
    }

    pub fn lookup(&self) -> &ConfigurationIndex {
        &self.index
    }

    pub fn static_libraries(&self) -> &[LinkedFile] {
        &self.static_libraries
    }

    pub fn dynamic_libraries(&self) -> &[LinkedFile] {
        &self.dynamic_libraries
    }

    pub fn executables(&self) -> &[LinkedFile] {
        &self.executables
    }

    pub fn translation_units(&self) -> &[TranslationUnit] {
        &self.translation_units
    }

    pub fn header_units(&self) -> &[HeaderUnit] {
        &self.header_units
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_partitions(&self) -> &[ModulePartition] {
        &self.module_partitions
    }
}

/// The normal components of `path` joined with `/`. Root, prefix and
/// parent components are dropped so the artifact stays inside the
/// configuration directory.
fn artifact_name(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

macro_rules! arena_index {
    ($($id:ty => $output:ty, $field:ident;)*) => {
        $(
            impl Index<$id> for Configuration {
                type Output = $output;

                fn index(&self, id: $id) -> &$output {
                    &self.$field[id.0]
                }
            }

            impl IndexMut<$id> for Configuration {
                fn index_mut(&mut self, id: $id) -> &mut $output {
                    &mut self.$field[id.0]
                }
            }
        )*
    };
}

arena_index! {
    StaticLibraryId => LinkedFile, static_libraries;
    DynamicLibraryId => LinkedFile, dynamic_libraries;
    ExecutableId => LinkedFile, executables;
    TranslationUnitId => TranslationUnit, translation_units;
    HeaderUnitId => HeaderUnit, header_units;
    ModuleId => Module, modules;
    ModulePartitionId => ModulePartition, module_partitions;
}
