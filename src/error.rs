// Crate-level error type for the binary and other callers that load files

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::models::ValidationError;
use crate::utils::catalog::CatalogError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid group: {0}")]
    Validation(#[from] ValidationError),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
