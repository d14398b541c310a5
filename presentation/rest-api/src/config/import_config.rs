use std::env;

use business::domain::product::import::{DEFAULT_BATCH_SIZE, DEFAULT_ERROR_PREVIEW};

use super::positive_or;

/// Tuning for the CSV bulk import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    pub batch_size: usize,
    pub error_preview: usize,
}

impl ImportConfig {
    /// Environment variables:
    /// - IMPORT_BATCH_SIZE: Staged rows per flush (default: 100)
    /// - IMPORT_ERROR_PREVIEW: Row errors returned to the caller (default: 5)
    pub fn from_env() -> Self {
        Self {
            batch_size: positive_or(env::var("IMPORT_BATCH_SIZE").ok(), DEFAULT_BATCH_SIZE),
            error_preview: positive_or(
                env::var("IMPORT_ERROR_PREVIEW").ok(),
                DEFAULT_ERROR_PREVIEW,
            ),
        }
    }
}
