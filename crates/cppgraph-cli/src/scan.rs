//! File collection and rescanning for `update`
//!
//! Tokenizing runs in parallel. Results are applied to the cache one file at
//! a time afterwards, since the cache is not shared between threads.

use crate::warnings::Warnings;
use cppgraph_cache::{Cache, HeaderFileId, ProjectKind, SourceFileId};
use cppgraph_core::Settings;
use cppgraph_tokenizer::{tokenize_file, Token};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub registered: usize,
    pub rescanned: usize,
}

/// Expand directories into the C++ files below them, skipping ignored
/// directories. Explicit file arguments are kept as given.
pub fn collect_files(
    inputs: &[PathBuf],
    settings: &Settings,
    warnings: &mut Warnings,
) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let walker = WalkDir::new(input)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_ignored(e.path(), settings));

            for entry in walker {
                match entry {
                    Ok(e) if e.file_type().is_file() => {
                        if settings.is_header(e.path()) || settings.is_source(e.path()) {
                            files.push(e.into_path());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warnings.push("scan", e.to_string()),
                }
            }
        } else {
            warnings.push("scan", format!("{} does not exist", input.display()));
        }
    }

    files.sort();
    files.dedup();
    info!("Found {} files", files.len());
    files
}

fn is_ignored(path: &Path, settings: &Settings) -> bool {
    path.is_dir()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| settings.is_ignored_directory(name))
}

/// Register `files` with `project`, retokenize the outdated ones and record
/// the modules, partitions and header units they declare.
pub fn update(
    cache: &mut Cache,
    project: &str,
    files: &[PathBuf],
    warnings: &mut Warnings,
) -> Summary {
    let settings = cache.settings().clone();
    let project_id = cache.add_project(project);
    let mut sources = Vec::new();
    let mut headers = Vec::new();

    for path in files {
        if settings.is_header(path) {
            headers.push(cache.add_header_file(path, project));
        } else if settings.is_source(path) {
            if settings.is_executable_name(path) {
                cache.set_project_kind(project_id, ProjectKind::Executable);
            }
            sources.push(cache.add_source_file(path, project));
        } else {
            warnings.push(
                "scan",
                format!("{} is neither a source nor a header", path.display()),
            );
        }
    }

    let outdated_headers: Vec<(HeaderFileId, PathBuf)> = headers
        .iter()
        .filter(|id| cache[**id].outdated)
        .map(|id| (*id, cache[*id].path.clone()))
        .collect();
    let outdated_sources: Vec<(SourceFileId, PathBuf)> = sources
        .iter()
        .filter(|id| cache[**id].outdated)
        .map(|id| (*id, cache[*id].path.clone()))
        .collect();
    let rescanned = outdated_headers.len() + outdated_sources.len();

    for (id, path, result) in tokenize_all(outdated_headers) {
        match result {
            Ok(tokens) => cache.update_header_file_tokens(id, tokens),
            Err(e) => warnings.push("tokenizer", format!("{}: {}", path.display(), e)),
        }
    }

    for (id, path, result) in tokenize_all(outdated_sources) {
        match result {
            Ok(tokens) => cache.update_source_file_tokens(id, tokens),
            Err(e) => warnings.push("tokenizer", format!("{}: {}", path.display(), e)),
        }
    }

    for id in &headers {
        let header = &cache[*id];
        let (tokens, path) = (header.tokens.clone(), header.path.clone());
        register_header_units(cache, &tokens, &path, warnings);
    }

    for id in &sources {
        register_source(cache, *id, warnings);
    }

    if !sources.is_empty() {
        cache.add_linked_file(project_id);
    }

    Summary {
        registered: headers.len() + sources.len(),
        rescanned,
    }
}

type Scanned<Id> = (Id, PathBuf, io::Result<Vec<Token>>);

fn tokenize_all<Id: Send>(files: Vec<(Id, PathBuf)>) -> Vec<Scanned<Id>> {
    files
        .into_par_iter()
        .map(|(id, path)| {
            let result = tokenize_file(&path);
            (id, path, result)
        })
        .collect()
}

fn register_source(cache: &mut Cache, source: SourceFileId, warnings: &mut Warnings) {
    let tokens = cache[source].tokens.clone();
    let unit = cache.add_translation_unit(source);

    for token in &tokens {
        match token {
            Token::Module { name, visibility } => {
                cache.add_module(name, Some(unit), *visibility);
            }
            Token::ModulePartition {
                module,
                name,
                visibility,
            } => {
                cache.add_module_partition(module, name, Some(unit), *visibility);
            }
            Token::If { .. }
            | Token::Else
            | Token::EndIf
            | Token::Define { .. }
            | Token::Undef { .. }
            | Token::IncludeLocal { .. }
            | Token::IncludeExternal { .. }
            | Token::IncludeStl { .. }
            | Token::ImportModule { .. }
            | Token::ImportModulePartition { .. }
            | Token::ImportIncludeLocal { .. }
            | Token::ImportIncludeExternal { .. } => {}
        }
    }

    let path = cache[source].path.clone();
    register_header_units(cache, &tokens, &path, warnings);
}

/// Header units for every `import "header";` and `import <header>;` that
/// names a known header.
fn register_header_units(
    cache: &mut Cache,
    tokens: &[Token],
    importer: &Path,
    warnings: &mut Warnings,
) {
    for token in tokens {
        let (name, local) = match token {
            Token::ImportIncludeLocal { name, .. } => (name, true),
            Token::ImportIncludeExternal { name, .. } => (name, false),
            Token::If { .. }
            | Token::Else
            | Token::EndIf
            | Token::Define { .. }
            | Token::Undef { .. }
            | Token::IncludeLocal { .. }
            | Token::IncludeExternal { .. }
            | Token::IncludeStl { .. }
            | Token::Module { .. }
            | Token::ModulePartition { .. }
            | Token::ImportModule { .. }
            | Token::ImportModulePartition { .. } => continue,
        };

        match cache.header_file(name) {
            Some(header) => {
                cache.add_header_unit(header);
            }
            None if local => warnings.push(
                "header units",
                format!("'{}' imported by {} is not a known header", name, importer.display()),
            ),
            None => debug!("External header unit {} is not part of the cache", name),
        }
    }
}
