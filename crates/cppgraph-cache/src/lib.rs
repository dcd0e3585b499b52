//! cppgraph Cache
//!
//! Persisted build information for one build configuration: the scanned
//! source and header files with their tokens, projects, toolchains, and the
//! translation units, header units and modules of the configuration.
//!
//! ## Modules
//!
//! - `cache` - The aggregate bound to one YAML document
//! - `configuration` - Entities of one build variant and their artifacts
//! - `index` - Name and path lookups over arena ids
//! - `document` - Serialized form, atomic save and load
//!
//! ```no_run
//! use cppgraph_cache::Cache;
//!
//! let mut cache = Cache::new("build/cppgraph.yaml")?;
//! let id = cache.add_source_file("src/main.cpp", "app");
//! assert_eq!(cache.exact_source_file("src/main.cpp"), Some(id));
//! cache.save()?;
//! # Ok::<(), cppgraph_cache::CacheError>(())
//! ```

mod cache;
pub mod configuration;
mod document;
mod error;
pub mod file;
pub mod index;
pub mod model;
pub mod toolchain;

pub use cache::Cache;
pub use cppgraph_core::Visibility;
pub use configuration::Configuration;
pub use error::{CacheError, Result};
pub use file::File;
pub use index::ConfigurationIndex;
pub use model::*;
pub use toolchain::{Abi, Architecture, Artifact, Bitness, Frontend, Platform, Toolchain};
