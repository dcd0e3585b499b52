//! cppgraph CLI
//!
//! Tokenizes C++ sources and keeps a build cache up to date.

mod scan;
mod warnings;

use anyhow::{Context, Result};
use cppgraph_cache::Cache;
use cppgraph_tokenizer::tokenize_file;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use warnings::Warnings;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cppgraph")]
#[command(author, version, about = "C++ build graph cache", long_about = None)]
struct Cli {
    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a source file
    Tokenize {
        /// Source file to tokenize
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Register files with a project and rescan the outdated ones
    Update {
        /// Cache document
        #[arg(short, long, value_name = "PATH")]
        cache: PathBuf,

        /// Project the files belong to
        #[arg(short, long)]
        project: String,

        /// Toolchain to select, by name or name prefix
        #[arg(short, long)]
        toolchain: Option<String>,

        /// Files or directories to scan
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// List files that need to be rescanned
    Outdated {
        /// Cache document
        #[arg(short, long, value_name = "PATH")]
        cache: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tokenize { file, format } => {
            cmd_tokenize(&file, &format)?;
        }
        Commands::Update {
            cache,
            project,
            toolchain,
            files,
        } => {
            cmd_update(&cache, &project, toolchain.as_deref(), &files)?;
        }
        Commands::Outdated { cache } => {
            cmd_outdated(&cache)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_tokenize(file: &Path, format: &str) -> Result<()> {
    let tokens =
        tokenize_file(file).with_context(|| format!("Failed to read {}", file.display()))?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    Ok(())
}

fn cmd_update(
    cache_path: &Path,
    project: &str,
    toolchain: Option<&str>,
    inputs: &[PathBuf],
) -> Result<()> {
    let mut cache = Cache::new(cache_path)
        .with_context(|| format!("Failed to open cache {}", cache_path.display()))?;
    let mut warnings = Warnings::default();

    if let Some(name) = toolchain {
        if !cache.select_toolchain(name) {
            warnings.push("toolchain", format!("no toolchain matches '{}'", name));
        }
    }

    let files = scan::collect_files(inputs, cache.settings(), &mut warnings);
    let summary = scan::update(&mut cache, project, &files, &mut warnings);

    cache
        .save()
        .with_context(|| format!("Failed to save cache {}", cache_path.display()))?;

    println!(
        "{}: {} files, {} rescanned",
        project, summary.registered, summary.rescanned
    );
    warnings.report();
    Ok(())
}

fn cmd_outdated(cache_path: &Path) -> Result<()> {
    let cache = Cache::new(cache_path)
        .with_context(|| format!("Failed to open cache {}", cache_path.display()))?;

    for id in cache.outdated_header_files() {
        println!("{}", cache[id].path.display());
    }
    for id in cache.outdated_source_files() {
        println!("{}", cache[id].path.display());
    }

    Ok(())
}
