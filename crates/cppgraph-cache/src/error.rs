//! Cache errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document references an entity it does not define.
    #[error("Corrupted cache: {0}")]
    Corrupted(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
