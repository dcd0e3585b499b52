//! The cache aggregate
//!
//! A [`Cache`] is bound to one YAML document describing one build
//! configuration. It owns the file and project arenas and the
//! [`Configuration`] built from them.

use crate::configuration::Configuration;
use crate::document;
use crate::error::Result;
use crate::file::File;
use crate::index::FileIndex;
use crate::model::{
    Define, Flag, HeaderFile, HeaderFileId, HeaderUnitId, LinkedFileId, ModuleId,
    ModulePartitionId, Project, ProjectId, ProjectKind, SourceFile, SourceFileId,
    TranslationUnitId,
};
use crate::toolchain::Toolchain;
use cppgraph_core::{natural_cmp, Settings, Visibility};
use cppgraph_tokenizer::Token;
use std::collections::HashMap;
use std::ops::Index;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct Cache {
    pub(crate) path: PathBuf,
    pub(crate) project_root: PathBuf,
    pub(crate) settings: Settings,
    pub(crate) toolchains: Vec<Toolchain>,
    pub(crate) projects: Vec<Project>,
    pub(crate) sources: Vec<SourceFile>,
    pub(crate) headers: Vec<HeaderFile>,
    pub(crate) configuration: Configuration,
    project_index: HashMap<String, ProjectId>,
    source_index: FileIndex<SourceFileId>,
    header_index: FileIndex<HeaderFileId>,
    dirty: bool,
}

impl Cache {
    /// Open the cache document at `path`, or start an empty cache that is
    /// written there on the first save.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            document::load(path)
        } else {
            debug!("No cache at {:?}, starting empty", path);
            Ok(Self::empty(path))
        }
    }

    pub(crate) fn empty(path: PathBuf) -> Self {
        Self {
            path,
            project_root: PathBuf::new(),
            settings: Settings::default(),
            toolchains: Vec::new(),
            projects: Vec::new(),
            sources: Vec::new(),
            headers: Vec::new(),
            configuration: Configuration::default(),
            project_index: HashMap::new(),
            source_index: FileIndex::default(),
            header_index: FileIndex::default(),
            dirty: false,
        }
    }

    /// Path of the cache document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the cache document
    pub fn build_root(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn set_project_root(&mut self, root: impl Into<PathBuf>) {
        self.project_root = root.into();
        self.dirty = true;
    }

    pub fn configuration_name(&self) -> &str {
        self.configuration.name()
    }

    pub fn set_configuration_name(&mut self, name: impl Into<String>) {
        self.configuration.set_name(name);
        self.dirty = true;
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.dirty = true;
    }

    pub fn defines(&self) -> &[Define] {
        self.configuration.defines()
    }

    pub fn set_defines(&mut self, defines: Vec<Define>) {
        self.configuration.set_defines(defines);
        self.dirty = true;
    }

    pub fn compiler_flags(&self) -> &[Flag] {
        self.configuration.compiler_flags()
    }

    pub fn set_compiler_flags(&mut self, flags: Vec<Flag>) {
        self.configuration.set_compiler_flags(flags);
        self.dirty = true;
    }

    pub fn linker_flags(&self) -> &[Flag] {
        self.configuration.linker_flags()
    }

    pub fn set_linker_flags(&mut self, flags: Vec<Flag>) {
        self.configuration.set_linker_flags(flags);
        self.dirty = true;
    }

    pub fn archiver_flags(&self) -> &[Flag] {
        self.configuration.archiver_flags()
    }

    pub fn set_archiver_flags(&mut self, flags: Vec<Flag>) {
        self.configuration.set_archiver_flags(flags);
        self.dirty = true;
    }

    // ------------------------------------------------------------------
    // Toolchains
    // ------------------------------------------------------------------

    /// Register a toolchain, replacing one with the same name.
    pub fn add_toolchain(&mut self, toolchain: Toolchain) {
        match self.toolchains.iter_mut().find(|t| t.name == toolchain.name) {
            Some(existing) => *existing = toolchain,
            None => self.toolchains.push(toolchain),
        }
        self.dirty = true;
    }

    pub fn toolchains(&self) -> &[Toolchain] {
        &self.toolchains
    }

    /// Find a toolchain by exact name or, failing that, by prefix. Among
    /// several prefix matches the greatest in natural order wins, so `clang`
    /// picks `clang-11` over `clang-9`.
    pub fn toolchain_by_name(&self, name: &str) -> Option<&Toolchain> {
        if name.is_empty() {
            return None;
        }

        if let Some(exact) = self.toolchains.iter().find(|t| t.name == name) {
            return Some(exact);
        }

        self.toolchains
            .iter()
            .filter(|t| t.name.starts_with(name))
            .max_by(|a, b| natural_cmp(&a.name, &b.name))
    }

    /// The toolchain of the configuration
    pub fn toolchain(&self) -> &Toolchain {
        self.configuration.toolchain()
    }

    /// Use `toolchain` for the configuration, registering it as well.
    pub fn set_toolchain(&mut self, toolchain: Toolchain) {
        self.add_toolchain(toolchain.clone());
        self.configuration.set_toolchain(toolchain);
    }

    /// Use the toolchain found by [`Cache::toolchain_by_name`]. Returns
    /// `false` and changes nothing when there is none.
    pub fn select_toolchain(&mut self, name: &str) -> bool {
        match self.toolchain_by_name(name).cloned() {
            Some(toolchain) => {
                debug!("Selected toolchain {} for {:?}", toolchain.name, name);
                self.configuration.set_toolchain(toolchain);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Projects and files
    // ------------------------------------------------------------------

    /// Projects in insertion order
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.project_id(name).map(|id| &self.projects[id.0])
    }

    pub fn project_id(&self, name: &str) -> Option<ProjectId> {
        self.project_index.get(name).copied()
    }

    /// Create project `name` unless it exists.
    pub fn add_project(&mut self, name: &str) -> ProjectId {
        if let Some(id) = self.project_id(name) {
            return id;
        }

        let id = ProjectId(self.projects.len());
        self.projects.push(Project::new(name));
        self.project_index.insert(name.to_string(), id);
        self.dirty = true;
        id
    }

    pub fn set_project_kind(&mut self, project: ProjectId, kind: ProjectKind) {
        if self.projects[project.0].kind != kind {
            self.projects[project.0].kind = kind;
            self.dirty = true;
        }
    }

    /// Register a source file with `project`, creating the project on
    /// demand. A path that is already known returns its existing id.
    pub fn add_source_file(&mut self, path: impl AsRef<Path>, project: &str) -> SourceFileId {
        let path = path.as_ref();

        if let Some(id) = self.source_index.exact(path) {
            return id;
        }

        let project = self.add_project(project);
        let id = self.insert_source(SourceFile {
            file: File::new(path),
            project,
            tokens: Vec::new(),
        });
        self.projects[project.0].sources.push(id);
        debug!("Registered source {:?} in {}", path, self.projects[project.0].name);
        id
    }

    /// Register a header file with `project`, see [`Cache::add_source_file`].
    pub fn add_header_file(&mut self, path: impl AsRef<Path>, project: &str) -> HeaderFileId {
        let path = path.as_ref();

        if let Some(id) = self.header_index.exact(path) {
            return id;
        }

        let project = self.add_project(project);
        let id = self.insert_header(HeaderFile {
            file: File::new(path),
            project,
            tokens: Vec::new(),
        });
        self.projects[project.0].headers.push(id);
        debug!("Registered header {:?} in {}", path, self.projects[project.0].name);
        id
    }

    /// Put a file into the arena without touching its project's list.
    pub(crate) fn insert_source(&mut self, file: SourceFile) -> SourceFileId {
        let id = SourceFileId(self.sources.len());
        self.source_index.insert(&file.path, id);
        self.sources.push(file);
        self.dirty = true;
        id
    }

    pub(crate) fn insert_header(&mut self, file: HeaderFile) -> HeaderFileId {
        let id = HeaderFileId(self.headers.len());
        self.header_index.insert(&file.path, id);
        self.headers.push(file);
        self.dirty = true;
        id
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn headers(&self) -> &[HeaderFile] {
        &self.headers
    }

    pub fn exact_source_file(&self, path: impl AsRef<Path>) -> Option<SourceFileId> {
        self.source_index.exact(path.as_ref())
    }

    pub fn exact_header_file(&self, path: impl AsRef<Path>) -> Option<HeaderFileId> {
        self.header_index.exact(path.as_ref())
    }

    /// First source whose trailing path components equal `path`, e.g.
    /// `main.cpp` matches `app/main.cpp`.
    pub fn source_file(&self, path: impl AsRef<Path>) -> Option<SourceFileId> {
        self.source_index.matching(path.as_ref())
    }

    /// First header whose trailing path components equal `path`, e.g.
    /// `include/my_header.hpp` matches `lib/include/my_header.hpp`.
    pub fn header_file(&self, path: impl AsRef<Path>) -> Option<HeaderFileId> {
        self.header_index.matching(path.as_ref())
    }

    /// Store freshly extracted tokens. The file is current afterwards.
    pub fn update_source_file_tokens(&mut self, id: SourceFileId, tokens: Vec<Token>) {
        let source = &mut self.sources[id.0];
        source.tokens = tokens;
        source.file.refresh();
        self.dirty = true;
    }

    pub fn update_header_file_tokens(&mut self, id: HeaderFileId, tokens: Vec<Token>) {
        let header = &mut self.headers[id.0];
        header.tokens = tokens;
        header.file.refresh();
        self.dirty = true;
    }

    pub fn outdated_source_files(&self) -> Vec<SourceFileId> {
        (0..self.sources.len())
            .map(SourceFileId)
            .filter(|id| self.sources[id.0].outdated)
            .collect()
    }

    pub fn outdated_header_files(&self) -> Vec<HeaderFileId> {
        (0..self.headers.len())
            .map(HeaderFileId)
            .filter(|id| self.headers[id.0].outdated)
            .collect()
    }

    // ------------------------------------------------------------------
    // Configuration entities
    // ------------------------------------------------------------------

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Direct access to the configuration. The cache counts as modified.
    pub fn configuration_mut(&mut self) -> &mut Configuration {
        self.dirty = true;
        &mut self.configuration
    }

    /// Add the translation unit of `source`. Its object file is named after
    /// the source path relative to the project root.
    pub fn add_translation_unit(&mut self, source: SourceFileId) -> TranslationUnitId {
        let path = self.relative_path(&self.sources[source.0].path);
        self.configuration_mut().add_translation_unit(source, &path)
    }

    pub fn add_header_unit(&mut self, header: HeaderFileId) -> HeaderUnitId {
        let path = self.relative_path(&self.headers[header.0].path);
        self.configuration_mut().add_header_unit(header, &path)
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_path_buf()
    }

    pub fn add_module(
        &mut self,
        name: &str,
        translation_unit: Option<TranslationUnitId>,
        visibility: Visibility,
    ) -> ModuleId {
        self.configuration_mut()
            .add_module(name, translation_unit, visibility)
    }

    pub fn add_module_partition(
        &mut self,
        module: &str,
        name: &str,
        translation_unit: Option<TranslationUnitId>,
        visibility: Visibility,
    ) -> ModulePartitionId {
        self.configuration_mut()
            .add_module_partition(module, name, translation_unit, visibility)
    }

    /// Add the library or executable `project` links into.
    pub fn add_linked_file(&mut self, project: ProjectId) -> LinkedFileId {
        let Project { name, kind, .. } = &self.projects[project.0];
        let (name, kind) = (name.clone(), *kind);
        self.configuration_mut().add_linked_file(project, &name, kind)
    }

    pub fn module_(&self, name: &str) -> Option<ModuleId> {
        self.configuration.module_(name)
    }

    pub fn module_partition(&self, module: &str, partition: &str) -> Option<ModulePartitionId> {
        self.configuration.module_partition(module, partition)
    }

    pub fn header_unit(&self, header: HeaderFileId) -> Option<HeaderUnitId> {
        self.configuration.header_unit(header)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// True when there are changes that have not been saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the document if anything changed or it does not exist yet.
    /// The previous document is replaced atomically.
    pub fn save(&mut self) -> Result<()> {
        if !self.dirty && self.path.exists() {
            return Ok(());
        }

        document::save(self)?;
        self.dirty = false;
        Ok(())
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        if let Err(e) = self.save() {
            warn!("Failed to save cache {:?}: {}", self.path, e);
        }
    }
}

impl Index<SourceFileId> for Cache {
    type Output = SourceFile;

    fn index(&self, id: SourceFileId) -> &SourceFile {
        &self.sources[id.0]
    }
}

impl Index<HeaderFileId> for Cache {
    type Output = HeaderFile;

    fn index(&self, id: HeaderFileId) -> &HeaderFile {
        &self.headers[id.0]
    }
}

impl Index<ProjectId> for Cache {
    type Output = Project;

    fn index(&self, id: ProjectId) -> &Project {
        &self.projects[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::Frontend;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cache_in(dir: &TempDir) -> Cache {
        Cache::new(dir.path().join("cppgraph.yaml")).unwrap()
    }

    #[test]
    fn test_build_root() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        assert_eq!(cache.build_root(), dir.path());
    }

    #[test]
    fn test_add_source_file_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        let first = cache.add_source_file("/p/app/main.cpp", "app");
        let second = cache.add_source_file("/p/app/main.cpp", "app");

        assert_eq!(first, second);
        assert_eq!(cache.project("app").unwrap().sources, vec![first]);
        assert_eq!(cache.sources().len(), 1);
        assert_eq!(cache[first].project, cache.project_id("app").unwrap());
    }

    #[test]
    fn test_project_lists_keep_insertion_order() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        let b = cache.add_header_file("/p/lib/b.hpp", "lib");
        let a = cache.add_header_file("/p/lib/a.hpp", "lib");
        cache.add_source_file("/p/app/main.cpp", "app");

        assert_eq!(cache.project("lib").unwrap().headers, vec![b, a]);
        let names: Vec<&str> = cache.projects().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["lib", "app"]);
    }

    #[test]
    fn test_exact_and_fuzzy_lookup() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        let header = cache.add_header_file("/p/lib/include/my_header.hpp", "lib");
        let source = cache.add_source_file("/p/app/main.cpp", "app");

        assert_eq!(cache.exact_header_file("/p/lib/include/my_header.hpp"), Some(header));
        assert_eq!(cache.exact_header_file("include/my_header.hpp"), None);
        assert_eq!(cache.header_file("include/my_header.hpp"), Some(header));
        assert_eq!(cache.source_file("main.cpp"), Some(source));
        assert_eq!(cache.source_file("other/main.cpp"), None);
        assert_eq!(cache.exact_source_file("/p/lib/include/my_header.hpp"), None);
    }

    #[test]
    fn test_toolchain_prefix_prefers_latest_version() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);

        for name in ["clang-9", "clang-11", "clang-10", "gcc-12"] {
            cache.add_toolchain(Toolchain::new(name, Frontend::Clang));
        }

        assert_eq!(cache.toolchain_by_name("clang").unwrap().name, "clang-11");
        assert_eq!(cache.toolchain_by_name("clang-1").unwrap().name, "clang-11");
        assert_eq!(cache.toolchain_by_name("clang-9").unwrap().name, "clang-9");
        assert_eq!(cache.toolchain_by_name("gcc").unwrap().name, "gcc-12");
        assert!(cache.toolchain_by_name("msvc").is_none());
        assert!(cache.toolchain_by_name("").is_none());
    }

    #[test]
    fn test_select_toolchain() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        cache.add_toolchain(Toolchain::new("gcc-12", Frontend::Gcc));

        assert!(cache.select_toolchain("gcc"));
        assert_eq!(cache.toolchain().name, "gcc-12");
        assert!(!cache.select_toolchain("msvc"));
        assert_eq!(cache.toolchain().name, "gcc-12");
    }

    #[test]
    fn test_update_tokens_clears_outdated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.cpp");
        std::fs::write(&path, "import std;").unwrap();

        let mut cache = cache_in(&dir);
        let id = cache.add_source_file(&path, "app");
        assert_eq!(cache.outdated_source_files(), vec![id]);

        let tokens = cppgraph_tokenizer::tokenize_file(&path).unwrap();
        cache.update_source_file_tokens(id, tokens);

        assert!(cache.outdated_source_files().is_empty());
        assert_eq!(cache[id].tokens.len(), 1);
    }

    #[test]
    fn test_linked_file_follows_project_kind() {
        let dir = TempDir::new().unwrap();
        let mut cache = cache_in(&dir);
        cache.set_configuration_name("release");

        let app = cache.add_project("app");
        cache.set_project_kind(app, ProjectKind::Executable);

        match cache.add_linked_file(app) {
            LinkedFileId::Executable(id) => {
                assert_eq!(cache.configuration()[id].output.path, PathBuf::from("release/app"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_save_only_when_needed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cppgraph.yaml");

        let mut cache = Cache::new(&path).unwrap();
        assert!(!cache.is_dirty());
        cache.save().unwrap();
        assert!(path.exists());

        cache.set_project_root("/p");
        assert!(cache.is_dirty());
        cache.save().unwrap();
        assert!(!cache.is_dirty());
    }
}
