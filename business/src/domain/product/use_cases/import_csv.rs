use async_trait::async_trait;

use crate::domain::product::errors::ProductError;
use crate::domain::product::import::ImportOutcome;

pub struct ImportProductsCsvParams {
    pub payload: Vec<u8>,
}

/// Bulk import. Row-level problems end up in the outcome; only an
/// unreadable payload or a store failure is returned as an error.
#[async_trait]
pub trait ImportProductsCsvUseCase: Send + Sync {
    async fn execute(&self, params: ImportProductsCsvParams) -> Result<ImportOutcome, ProductError>;
}
