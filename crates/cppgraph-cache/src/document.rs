//! YAML persistence of a [`Cache`]
//!
//! Entities are written as sequences of entries keyed by path or name, so
//! the document keeps insertion order. Cross references use those keys and
//! are resolved again on load.

use crate::cache::Cache;
use crate::configuration::Configuration;
use crate::error::{CacheError, Result};
use crate::file::{modified_nanos, File};
use crate::model::{
    Define, Flag, Header, HeaderFile, HeaderFileId, LinkedFile, LinkedFileId, ProjectId,
    ProjectKind, References, SourceFile, SourceFileId, TranslationUnitId,
};
use crate::toolchain::Toolchain;
use cppgraph_core::{Settings, Visibility};
use cppgraph_tokenizer::Token;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Document {
    name: String,
    project_root: PathBuf,
    settings: Settings,
    toolchains: Vec<Toolchain>,
    toolchain: Option<String>,
    compiler_flags: Vec<Flag>,
    linker_flags: Vec<Flag>,
    archiver_flags: Vec<Flag>,
    defines: Vec<Define>,
    projects: Vec<ProjectEntry>,
    headers: Vec<FileEntry>,
    sources: Vec<FileEntry>,
    static_libraries: Vec<LinkedFileEntry>,
    dynamic_libraries: Vec<LinkedFileEntry>,
    executables: Vec<LinkedFileEntry>,
    translation_units: Vec<TranslationUnitEntry>,
    header_units: Vec<HeaderUnitEntry>,
    modules: Vec<ModuleEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProjectEntry {
    name: String,
    #[serde(default)]
    kind: ProjectKind,
    #[serde(default)]
    sources: Vec<PathBuf>,
    #[serde(default)]
    headers: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    path: PathBuf,
    project: String,
    #[serde(default)]
    timestamp: u64,
    #[serde(default)]
    outdated: bool,
    #[serde(default)]
    tokens: Vec<Token>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LinkedFileEntry {
    project: String,
    output: File,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ReferencesEntry {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    includes: Vec<HeaderEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    imported_header_units: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    imported_modules: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    imported_module_partitions: Vec<PartitionKey>,
}

impl ReferencesEntry {
    fn is_empty(&self) -> bool {
        self.includes.is_empty()
            && self.imported_header_units.is_empty()
            && self.imported_modules.is_empty()
            && self.imported_module_partitions.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HeaderEntry {
    file: PathBuf,
    #[serde(default, skip_serializing_if = "ReferencesEntry::is_empty")]
    references: ReferencesEntry,
}

#[derive(Debug, Serialize, Deserialize)]
struct PartitionKey {
    module: String,
    partition: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TranslationUnitEntry {
    source: PathBuf,
    output: File,
    #[serde(default, skip_serializing_if = "ReferencesEntry::is_empty")]
    references: ReferencesEntry,
}

#[derive(Debug, Serialize, Deserialize)]
struct HeaderUnitEntry {
    header: PathBuf,
    precompiled: File,
    #[serde(default, skip_serializing_if = "ReferencesEntry::is_empty")]
    references: ReferencesEntry,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModuleEntry {
    name: String,
    #[serde(default)]
    visibility: Visibility,
    /// Source file of the primary interface
    #[serde(default)]
    translation_unit: Option<PathBuf>,
    precompiled: File,
    #[serde(default)]
    partitions: Vec<PartitionEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PartitionEntry {
    name: String,
    #[serde(default)]
    visibility: Visibility,
    #[serde(default)]
    translation_unit: Option<PathBuf>,
    precompiled: File,
}

// ---------------------------------------------------------------------------
// Save
// ---------------------------------------------------------------------------

/// Write `cache` to its path through a temporary file in the same directory.
pub(crate) fn save(cache: &Cache) -> Result<()> {
    let document = Writer { cache }.document();
    let dir = cache.build_root();
    fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    serde_yaml::to_writer(&mut temp, &document)?;
    temp.as_file().sync_all()?;
    temp.persist(&cache.path).map_err(|e| e.error)?;

    info!(
        "Saved cache {:?}: {} sources, {} headers",
        cache.path,
        cache.sources.len(),
        cache.headers.len()
    );
    Ok(())
}

struct Writer<'a> {
    cache: &'a Cache,
}

impl Writer<'_> {
    fn document(&self) -> Document {
        let cache = self.cache;
        let config = &cache.configuration;

        let mut toolchains = cache.toolchains.clone();
        let toolchain = config.toolchain();
        if !toolchain.name.is_empty() && !toolchains.iter().any(|t| t.name == toolchain.name) {
            toolchains.push(toolchain.clone());
        }

        Document {
            name: config.name().to_string(),
            project_root: cache.project_root.clone(),
            settings: cache.settings.clone(),
            toolchains,
            toolchain: (!toolchain.name.is_empty()).then(|| toolchain.name.clone()),
            compiler_flags: config.compiler_flags().to_vec(),
            linker_flags: config.linker_flags().to_vec(),
            archiver_flags: config.archiver_flags().to_vec(),
            defines: config.defines().to_vec(),
            projects: cache
                .projects
                .iter()
                .map(|project| ProjectEntry {
                    name: project.name.clone(),
                    kind: project.kind,
                    sources: project
                        .sources
                        .iter()
                        .map(|id| cache[*id].path.clone())
                        .collect(),
                    headers: project
                        .headers
                        .iter()
                        .map(|id| cache[*id].path.clone())
                        .collect(),
                })
                .collect(),
            headers: cache
                .headers
                .iter()
                .map(|h| self.file_entry(&h.file, h.project, &h.tokens))
                .collect(),
            sources: cache
                .sources
                .iter()
                .map(|s| self.file_entry(&s.file, s.project, &s.tokens))
                .collect(),
            static_libraries: self.linked_files(config.static_libraries()),
            dynamic_libraries: self.linked_files(config.dynamic_libraries()),
            executables: self.linked_files(config.executables()),
            translation_units: config
                .translation_units()
                .iter()
                .map(|unit| TranslationUnitEntry {
                    source: cache[unit.source].path.clone(),
                    output: unit.output.clone(),
                    references: self.references(&unit.references),
                })
                .collect(),
            header_units: config
                .header_units()
                .iter()
                .map(|unit| HeaderUnitEntry {
                    header: cache[unit.header].path.clone(),
                    precompiled: unit.precompiled.clone(),
                    references: self.references(&unit.references),
                })
                .collect(),
            modules: config
                .modules()
                .iter()
                .map(|module| ModuleEntry {
                    name: module.name.clone(),
                    visibility: module.visibility,
                    translation_unit: self.translation_unit_source(module.translation_unit),
                    precompiled: module.precompiled.clone(),
                    partitions: module
                        .partitions
                        .iter()
                        .map(|id| {
                            let partition = &config[*id];
                            PartitionEntry {
                                name: partition.name.clone(),
                                visibility: partition.visibility,
                                translation_unit: self
                                    .translation_unit_source(partition.translation_unit),
                                precompiled: partition.precompiled.clone(),
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn file_entry(&self, file: &File, project: ProjectId, tokens: &[Token]) -> FileEntry {
        FileEntry {
            path: file.path.clone(),
            project: self.cache[project].name.clone(),
            timestamp: file.timestamp,
            outdated: file.outdated,
            tokens: tokens.to_vec(),
        }
    }

    fn linked_files(&self, files: &[LinkedFile]) -> Vec<LinkedFileEntry> {
        files
            .iter()
            .map(|linked| LinkedFileEntry {
                project: self.cache[linked.project].name.clone(),
                output: linked.output.clone(),
            })
            .collect()
    }

    fn translation_unit_source(&self, unit: Option<TranslationUnitId>) -> Option<PathBuf> {
        let unit = unit?;
        let source = self.cache.configuration[unit].source;
        Some(self.cache[source].path.clone())
    }

    fn references(&self, references: &References) -> ReferencesEntry {
        let config = &self.cache.configuration;

        ReferencesEntry {
            includes: references
                .includes
                .iter()
                .map(|header| HeaderEntry {
                    file: self.cache[header.file].path.clone(),
                    references: self.references(&header.references),
                })
                .collect(),
            imported_header_units: references
                .imported_header_units
                .iter()
                .map(|id| self.cache[config[*id].header].path.clone())
                .collect(),
            imported_modules: references
                .imported_modules
                .iter()
                .map(|id| config[*id].name.clone())
                .collect(),
            imported_module_partitions: references
                .imported_module_partitions
                .iter()
                .map(|id| {
                    let partition = &config[*id];
                    PartitionKey {
                        module: config[partition.module].name.clone(),
                        partition: partition.name.clone(),
                    }
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read the document at `path`. Files that no longer exist are kept as
/// outdated records.
pub(crate) fn load(path: PathBuf) -> Result<Cache> {
    let content = fs::read_to_string(&path)?;
    let document: Document = serde_yaml::from_str(&content)?;

    let mut reader = Reader {
        cache: Cache::empty(path),
    };
    let result = reader.read(document);

    // the partially read cache must not overwrite the document when dropped
    let mut cache = reader.cache;
    cache.mark_clean();
    result?;

    info!(
        "Loaded cache {:?}: {} sources, {} headers",
        cache.path,
        cache.sources.len(),
        cache.headers.len()
    );
    Ok(cache)
}

struct Reader {
    cache: Cache,
}

struct LoadedFile {
    file: File,
    project: ProjectId,
    tokens: Vec<Token>,
}

impl Reader {
    fn read(&mut self, document: Document) -> Result<()> {
        let toolchain = match &document.toolchain {
            Some(name) => document
                .toolchains
                .iter()
                .find(|t| &t.name == name)
                .cloned()
                .ok_or_else(|| CacheError::Corrupted(format!("unknown toolchain '{name}'")))?,
            None => Toolchain::default(),
        };

        let mut config = Configuration::new(document.name, toolchain);
        config.set_compiler_flags(document.compiler_flags);
        config.set_linker_flags(document.linker_flags);
        config.set_archiver_flags(document.archiver_flags);
        config.set_defines(document.defines);

        let cache = &mut self.cache;
        cache.project_root = document.project_root;
        cache.settings = document.settings;
        cache.toolchains = document.toolchains;
        cache.configuration = config;

        for project in &document.projects {
            let id = cache.add_project(&project.name);
            cache.set_project_kind(id, project.kind);
        }

        for entry in document.headers {
            let loaded = file(&self.cache, entry)?;
            self.cache.insert_header(HeaderFile {
                file: loaded.file,
                project: loaded.project,
                tokens: loaded.tokens,
            });
        }

        for entry in document.sources {
            let loaded = file(&self.cache, entry)?;
            self.cache.insert_source(SourceFile {
                file: loaded.file,
                project: loaded.project,
                tokens: loaded.tokens,
            });
        }

        for project in &document.projects {
            self.project_members(project)?;
        }

        self.linked_files(&document.static_libraries, ProjectKind::StaticLibrary)?;
        self.linked_files(&document.dynamic_libraries, ProjectKind::DynamicLibrary)?;
        self.linked_files(&document.executables, ProjectKind::Executable)?;

        for entry in &document.translation_units {
            let source = self.source(&entry.source)?;
            let id = self.cache.add_translation_unit(source);
            self.cache.configuration[id].output = entry.output.clone();
        }

        for entry in &document.header_units {
            let header = self.header(&entry.header)?;
            let id = self.cache.add_header_unit(header);
            self.cache.configuration[id].precompiled = entry.precompiled.clone();
        }

        for entry in &document.modules {
            self.module(entry)?;
        }

        // references may point at any unit, so they are resolved last
        for entry in &document.translation_units {
            let source = self.source(&entry.source)?;
            let references = self.references(&entry.references)?;
            if let Some(id) = self.cache.configuration.translation_unit(source) {
                self.cache.configuration[id].references = references;
            }
        }

        for entry in &document.header_units {
            let header = self.header(&entry.header)?;
            let references = self.references(&entry.references)?;
            if let Some(id) = self.cache.configuration.header_unit(header) {
                self.cache.configuration[id].references = references;
            }
        }

        Ok(())
    }

    fn project_members(&mut self, entry: &ProjectEntry) -> Result<()> {
        let mut sources = Vec::new();
        for path in &entry.sources {
            sources.push(self.source(path)?);
        }

        let mut headers = Vec::new();
        for path in &entry.headers {
            headers.push(self.header(path)?);
        }

        if let Some(id) = self.cache.project_id(&entry.name) {
            let project = &mut self.cache.projects[id.index()];
            project.sources = sources;
            project.headers = headers;
        }
        Ok(())
    }

    fn linked_files(&mut self, entries: &[LinkedFileEntry], kind: ProjectKind) -> Result<()> {
        for entry in entries {
            let project = self.cache.project_id(&entry.project).ok_or_else(|| {
                CacheError::Corrupted(format!("missing project '{}'", entry.project))
            })?;

            let config = &mut self.cache.configuration;
            let output = match config.add_linked_file(project, &entry.project, kind) {
                LinkedFileId::StaticLibrary(id) => &mut config[id].output,
                LinkedFileId::DynamicLibrary(id) => &mut config[id].output,
                LinkedFileId::Executable(id) => &mut config[id].output,
            };
            *output = entry.output.clone();
        }

        Ok(())
    }

    fn module(&mut self, entry: &ModuleEntry) -> Result<()> {
        let unit = self.translation_unit(entry.translation_unit.as_deref())?;
        let id = self.cache.add_module(&entry.name, unit, entry.visibility);
        self.cache.configuration[id].precompiled = entry.precompiled.clone();

        for partition in &entry.partitions {
            let unit = self.translation_unit(partition.translation_unit.as_deref())?;
            let id = self.cache.add_module_partition(
                &entry.name,
                &partition.name,
                unit,
                partition.visibility,
            );
            self.cache.configuration[id].precompiled = partition.precompiled.clone();
        }

        Ok(())
    }

    fn source(&self, path: &Path) -> Result<SourceFileId> {
        self.cache.exact_source_file(path).ok_or_else(|| {
            CacheError::Corrupted(format!("missing source file '{}'", path.display()))
        })
    }

    fn header(&self, path: &Path) -> Result<HeaderFileId> {
        self.cache.exact_header_file(path).ok_or_else(|| {
            CacheError::Corrupted(format!("missing header file '{}'", path.display()))
        })
    }

    fn translation_unit(&self, source: Option<&Path>) -> Result<Option<TranslationUnitId>> {
        let Some(path) = source else {
            return Ok(None);
        };
        let source = self.source(path)?;

        self.cache
            .configuration
            .translation_unit(source)
            .map(Some)
            .ok_or_else(|| {
                CacheError::Corrupted(format!(
                    "missing translation unit '{}'",
                    path.display()
                ))
            })
    }

    fn references(&self, entry: &ReferencesEntry) -> Result<References> {
        let config = &self.cache.configuration;
        let mut references = References::default();

        for include in &entry.includes {
            references.includes.push(Header {
                file: self.header(&include.file)?,
                references: self.references(&include.references)?,
            });
        }

        for path in &entry.imported_header_units {
            let header = self.header(path)?;
            let unit = config.header_unit(header).ok_or_else(|| {
                CacheError::Corrupted(format!("missing header unit file '{}'", path.display()))
            })?;
            references.imported_header_units.push(unit);
        }

        for name in &entry.imported_modules {
            let module = config
                .module_(name)
                .ok_or_else(|| CacheError::Corrupted(format!("missing module '{name}'")))?;
            references.imported_modules.push(module);
        }

        for key in &entry.imported_module_partitions {
            let partition = config
                .module_partition(&key.module, &key.partition)
                .ok_or_else(|| {
                    CacheError::Corrupted(format!(
                        "missing module partition '{}:{}'",
                        key.module, key.partition
                    ))
                })?;
            references.imported_module_partitions.push(partition);
        }

        Ok(references)
    }
}

/// A file entry checked against the file on disk. A missing file keeps its
/// record but loses its timestamp and is outdated.
fn file(cache: &Cache, entry: FileEntry) -> Result<LoadedFile> {
    let project = cache.project_id(&entry.project).ok_or_else(|| {
        CacheError::Corrupted(format!(
            "missing project '{}' of '{}'",
            entry.project,
            entry.path.display()
        ))
    })?;

    let (timestamp, outdated) = match modified_nanos(&entry.path) {
        Some(current) => (entry.timestamp, entry.outdated || current != entry.timestamp),
        None => {
            debug!("{:?} no longer exists", entry.path);
            (0, true)
        }
    };

    if outdated {
        debug!("{:?} is outdated", entry.path);
    }

    Ok(LoadedFile {
        file: File {
            path: entry.path,
            timestamp,
            outdated,
        },
        project,
        tokens: entry.tokens,
    })
}
