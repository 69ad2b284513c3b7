//! ORM descriptor registry errors.

use super::error_code::{self, LineageErrorCode};

/// Errors raised while compiling ORM descriptors, mostly from
/// user-supplied TOML catalogs.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid pattern in ORM descriptor {orm}: {pattern}: {message}")]
    InvalidPattern {
        orm: String,
        pattern: String,
        message: String,
    },

    #[error("Unknown usage type {usage} in ORM descriptor {orm}")]
    UnknownUsageType { orm: String, usage: String },

    #[error("Unknown language {language} in ORM descriptor {orm}")]
    UnknownLanguage { orm: String, language: String },

    #[error("Descriptor catalog parse error: {message}")]
    CatalogParse { message: String },

    #[error("Failed to read descriptor catalog {path}: {message}")]
    CatalogRead { path: String, message: String },
}

impl LineageErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        error_code::REGISTRY_ERROR
    }
}
