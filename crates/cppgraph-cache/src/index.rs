//! Lookup tables over arena ids
//!
//! Indexes hold ids only. They never own the entities and a lookup miss is
//! an ordinary `None`.

use crate::model::{
    DynamicLibraryId, ExecutableId, HeaderFileId, HeaderUnitId, ModuleId, ModulePartitionId,
    ProjectId, SourceFileId, StaticLibraryId, TranslationUnitId,
};
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Lookups over the entities of one [`crate::Configuration`]
#[derive(Debug, Default, Clone)]
pub struct ConfigurationIndex {
    header_units: HashMap<HeaderFileId, HeaderUnitId>,
    modules: HashMap<String, ModuleId>,
    module_partitions: HashMap<String, ModulePartitionId>,
    translation_units: HashMap<SourceFileId, TranslationUnitId>,
    static_libraries: HashMap<ProjectId, StaticLibraryId>,
    dynamic_libraries: HashMap<ProjectId, DynamicLibraryId>,
    executables: HashMap<ProjectId, ExecutableId>,
}

fn partition_key(module: &str, partition: &str) -> String {
    format!("{module}:{partition}")
}

impl ConfigurationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_header_unit(&mut self, header: HeaderFileId, unit: HeaderUnitId) {
        self.header_units.insert(header, unit);
    }

    /// Re-inserting a name replaces the previous module.
    pub fn insert_module(&mut self, name: &str, module: ModuleId) {
        self.modules.insert(name.to_string(), module);
    }

    pub fn insert_module_partition(
        &mut self,
        module: &str,
        partition: &str,
        id: ModulePartitionId,
    ) {
        self.module_partitions
            .insert(partition_key(module, partition), id);
    }

    pub fn insert_translation_unit(&mut self, source: SourceFileId, unit: TranslationUnitId) {
        self.translation_units.insert(source, unit);
    }

    pub fn insert_static_library(&mut self, project: ProjectId, id: StaticLibraryId) {
        self.static_libraries.insert(project, id);
    }

    pub fn insert_dynamic_library(&mut self, project: ProjectId, id: DynamicLibraryId) {
        self.dynamic_libraries.insert(project, id);
    }

    pub fn insert_executable(&mut self, project: ProjectId, id: ExecutableId) {
        self.executables.insert(project, id);
    }

    pub fn header_unit(&self, header: HeaderFileId) -> Option<HeaderUnitId> {
        self.header_units.get(&header).copied()
    }

    pub fn module_(&self, name: &str) -> Option<ModuleId> {
        self.modules.get(name).copied()
    }

    /// Partitions are only reachable through their module's name.
    pub fn module_partition(&self, module: &str, partition: &str) -> Option<ModulePartitionId> {
        self.module_partitions
            .get(&partition_key(module, partition))
            .copied()
    }

    pub fn translation_unit(&self, source: SourceFileId) -> Option<TranslationUnitId> {
        self.translation_units.get(&source).copied()
    }

    pub fn static_library(&self, project: ProjectId) -> Option<StaticLibraryId> {
        self.static_libraries.get(&project).copied()
    }

    pub fn dynamic_library(&self, project: ProjectId) -> Option<DynamicLibraryId> {
        self.dynamic_libraries.get(&project).copied()
    }

    pub fn executable(&self, project: ProjectId) -> Option<ExecutableId> {
        self.executables.get(&project).copied()
    }
}

/// Exact and trailing-component lookups of file ids by path
#[derive(Debug, Clone)]
pub(crate) struct FileIndex<Id> {
    exact: HashMap<PathBuf, Id>,
    by_name: HashMap<OsString, Vec<(PathBuf, Id)>>,
}

impl<Id> Default for FileIndex<Id> {
    fn default() -> Self {
        Self {
            exact: HashMap::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<Id: Copy> FileIndex<Id> {
    pub(crate) fn insert(&mut self, path: &Path, id: Id) {
        self.exact.insert(path.to_path_buf(), id);

        if let Some(name) = path.file_name() {
            self.by_name
                .entry(name.to_os_string())
                .or_default()
                .push((path.to_path_buf(), id));
        }
    }

    pub(crate) fn exact(&self, path: &Path) -> Option<Id> {
        self.exact.get(path).copied()
    }

    /// First file, in insertion order, whose trailing components are `path`.
    /// `include/a.hpp` matches `lib/include/a.hpp` but not `lib/xinclude/a.hpp`.
    pub(crate) fn matching(&self, path: &Path) -> Option<Id> {
        let name = path.file_name()?;

        self.by_name
            .get(name)?
            .iter()
            .find(|(candidate, _)| candidate.ends_with(path))
            .map(|(_, id)| *id)
    }
}
