use chrono::{DateTime, NaiveDate, Utc};
use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, Object};

use business::domain::product::filter::FilterDescriptor;
use business::domain::product::import::ImportOutcome;
use business::domain::product::model::{Product, ProductProps};
use business::domain::product::use_cases::list::ProductPage;

/// Editable product fields, used for both creation and edition.
#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ProductRequest {
    /// Product name (not blank, at most 255 characters)
    pub name: String,
    /// Product description (not blank)
    pub description: String,
    /// Unit price, greater than 0
    pub price: f64,
    /// Units in stock, 0 or more
    pub stock_quantity: i32,
}

impl From<ProductRequest> for ProductProps {
    fn from(request: ProductRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            price: request.price,
            stock_quantity: request.stock_quantity,
        }
    }
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock_quantity: i32,
    pub created_datetime: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock_quantity: product.stock_quantity,
            created_datetime: product.created_datetime,
        }
    }
}

/// The filter that was applied after normalization.
#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct FilterResponse {
    #[oai(skip_serializing_if_is_none)]
    pub search: Option<String>,
    #[oai(skip_serializing_if_is_none)]
    pub min_price: Option<f64>,
    #[oai(skip_serializing_if_is_none)]
    pub max_price: Option<f64>,
    #[oai(skip_serializing_if_is_none)]
    pub min_stock: Option<i64>,
    #[oai(skip_serializing_if_is_none)]
    pub max_stock: Option<i64>,
    #[oai(skip_serializing_if_is_none)]
    pub date_from: Option<NaiveDate>,
    #[oai(skip_serializing_if_is_none)]
    pub date_to: Option<NaiveDate>,
}

impl From<FilterDescriptor> for FilterResponse {
    fn from(filter: FilterDescriptor) -> Self {
        Self {
            search: filter.search,
            min_price: filter.min_price,
            max_price: filter.max_price,
            min_stock: filter.min_stock,
            max_stock: filter.max_stock,
            date_from: filter.date_from,
            date_to: filter.date_to,
        }
    }
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ProductPageResponse {
    pub items: Vec<ProductResponse>,
    /// Matching products across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    /// Sort field that was applied
    pub sort: String,
    /// "asc" or "desc"
    pub direction: String,
    pub filter: FilterResponse,
}

impl From<ProductPage> for ProductPageResponse {
    fn from(page: ProductPage) -> Self {
        Self {
            items: page.items.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            limit: page.page_size,
            total_pages: page.total_pages,
            sort: page.sort.to_string(),
            direction: page.direction.to_string(),
            filter: page.filter.into(),
        }
    }
}

/// CSV upload. The first line is treated as a header and skipped.
#[derive(Debug, Multipart)]
pub struct ImportProductsRequest {
    pub file: Upload,
}

#[derive(Debug, Clone, Object)]
#[oai(rename_all = "camelCase")]
pub struct ImportOutcomeResponse {
    pub success_count: u64,
    pub failure_count: u64,
    /// First row errors only; `failureCount` is exact
    pub errors: Vec<String>,
}

impl From<ImportOutcome> for ImportOutcomeResponse {
    fn from(outcome: ImportOutcome) -> Self {
        Self {
            success_count: outcome.success_count,
            failure_count: outcome.failure_count,
            errors: outcome.errors,
        }
    }
}
