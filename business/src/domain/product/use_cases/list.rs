use async_trait::async_trait;

use crate::domain::product::errors::ProductError;
use crate::domain::product::filter::{FilterDescriptor, ProductListParams};
use crate::domain::product::model::Product;
use crate::domain::product::predicate::{ProductField, SortDirection};

/// One page of the listing together with the filter that produced it.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
    pub sort: ProductField,
    pub direction: SortDirection,
    pub filter: FilterDescriptor,
}

#[async_trait]
pub trait ListProductsUseCase: Send + Sync {
    async fn execute(&self, params: ProductListParams) -> Result<ProductPage, ProductError>;
}
