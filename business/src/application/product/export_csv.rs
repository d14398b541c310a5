use std::sync::Arc;

use async_trait::async_trait;
use csv::{Terminator, WriterBuilder};

use crate::domain::logger::Logger;
use crate::domain::product::errors::ProductError;
use crate::domain::product::filter::{ProductListParams, compile};
use crate::domain::product::model::Product;
use crate::domain::product::repository::ProductRepository;
use crate::domain::product::use_cases::export_csv::ExportProductsCsvUseCase;

pub const CSV_HEADER: [&str; 5] = [
    "Name",
    "Description",
    "Price",
    "Stock Quantity",
    "Created Datetime",
];
pub const CSV_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct ExportProductsCsvUseCaseImpl {
    pub repository: Arc<dyn ProductRepository>,
    pub logger: Arc<dyn Logger>,
}

/// Fields holding commas, quotes or line breaks are quoted; everything else
/// is written bare.
pub fn write_csv(products: &[Product]) -> Result<Vec<u8>, ProductError> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADER)
        .map_err(|_| ProductError::ExportFailed)?;

    for product in products {
        writer
            .write_record([
                product.name.clone(),
                product.description.clone(),
                format!("{:.2}", product.price),
                product.stock_quantity.to_string(),
                product
                    .created_datetime
                    .format(CSV_DATETIME_FORMAT)
                    .to_string(),
            ])
            .map_err(|_| ProductError::ExportFailed)?;
    }

    writer.into_inner().map_err(|_| ProductError::ExportFailed)
}

#[async_trait]
impl ExportProductsCsvUseCase for ExportProductsCsvUseCaseImpl {
    async fn execute(&self, params: ProductListParams) -> Result<Vec<u8>, ProductError> {
        let query = compile(&params).unpaged();
        let products = self.repository.find(&query).await?;

        let csv = write_csv(&products).inspect_err(|e| {
            self.logger.error(&format!("CSV export failed: {}", e));
        })?;

        self.logger.info(&format!(
            "Exported {} products ({} bytes)",
            products.len(),
            csv.len()
        ));
        Ok(csv)
    }
}
