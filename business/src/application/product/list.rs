use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::logger::Logger;
use crate::domain::product::errors::ProductError;
use crate::domain::product::filter::{ProductListParams, compile};
use crate::domain::product::repository::ProductRepository;
use crate::domain::product::use_cases::list::{ListProductsUseCase, ProductPage};

pub struct ListProductsUseCaseImpl {
    pub repository: Arc<dyn ProductRepository>,
    pub logger: Arc<dyn Logger>,
}

#[async_trait]
impl ListProductsUseCase for ListProductsUseCaseImpl {
    async fn execute(&self, params: ProductListParams) -> Result<ProductPage, ProductError> {
        let compiled = compile(&params);
        self.logger.debug(&format!(
            "Listing products: {:?}, sort {} {}, page {} of size {}",
            compiled.filter, compiled.sort, compiled.direction, compiled.page, compiled.page_size
        ));

        let total = self.repository.count(&compiled.predicates).await?;
        let total_pages = total.div_ceil(u64::from(compiled.page_size));

        let filter = compiled.filter.clone();
        let (page, page_size, sort, direction) = (
            compiled.page,
            compiled.page_size,
            compiled.sort,
            compiled.direction,
        );

        // Past the last page there is nothing to fetch
        let items = if compiled.offset() >= total {
            Vec::new()
        } else {
            self.repository.find(&compiled.into_query()).await?
        };

        self.logger.info(&format!(
            "Found {} products, returning {} on page {}",
            total,
            items.len(),
            page
        ));

        Ok(ProductPage {
            items,
            total,
            page,
            page_size,
            total_pages,
            sort,
            direction,
            filter,
        })
    }
}
