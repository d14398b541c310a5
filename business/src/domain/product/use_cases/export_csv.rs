use async_trait::async_trait;

use crate::domain::product::errors::ProductError;
use crate::domain::product::filter::ProductListParams;

/// Exports every product matching the listing filters, ignoring pagination.
#[async_trait]
pub trait ExportProductsCsvUseCase: Send + Sync {
    async fn execute(&self, params: ProductListParams) -> Result<Vec<u8>, ProductError>;
}
