use std::sync::Arc;

use poem_openapi::payload::{Attachment, AttachmentType, Json};
use poem_openapi::{
    OpenApi,
    param::{Path, Query},
};

use business::domain::product::errors::ProductError;
use business::domain::product::filter::ProductListParams;
use business::domain::product::use_cases::create::{CreateProductParams, CreateProductUseCase};
use business::domain::product::use_cases::delete::{DeleteProductParams, DeleteProductUseCase};
use business::domain::product::use_cases::export_csv::ExportProductsCsvUseCase;
use business::domain::product::use_cases::get_by_id::{
    GetProductByIdParams, GetProductByIdUseCase,
};
use business::domain::product::use_cases::import_csv::{
    ImportProductsCsvParams, ImportProductsCsvUseCase,
};
use business::domain::product::use_cases::list::ListProductsUseCase;
use business::domain::product::use_cases::update::{UpdateProductParams, UpdateProductUseCase};

use crate::api::error::{ErrorResponse, IntoErrorResponse};
use crate::api::product::dto::{
    ImportOutcomeResponse, ImportProductsRequest, ProductPageResponse, ProductRequest,
    ProductResponse,
};
use crate::api::tags::ApiTags;

const EXPORT_FILENAME: &str = "products.csv";

pub struct ProductApi {
    list_use_case: Arc<dyn ListProductsUseCase>,
    get_by_id_use_case: Arc<dyn GetProductByIdUseCase>,
    create_use_case: Arc<dyn CreateProductUseCase>,
    update_use_case: Arc<dyn UpdateProductUseCase>,
    delete_use_case: Arc<dyn DeleteProductUseCase>,
    export_use_case: Arc<dyn ExportProductsCsvUseCase>,
    import_use_case: Arc<dyn ImportProductsCsvUseCase>,
}

impl ProductApi {
    pub fn new(
        list_use_case: Arc<dyn ListProductsUseCase>,
        get_by_id_use_case: Arc<dyn GetProductByIdUseCase>,
        create_use_case: Arc<dyn CreateProductUseCase>,
        update_use_case: Arc<dyn UpdateProductUseCase>,
        delete_use_case: Arc<dyn DeleteProductUseCase>,
        export_use_case: Arc<dyn ExportProductsCsvUseCase>,
        import_use_case: Arc<dyn ImportProductsCsvUseCase>,
    ) -> Self {
        Self {
            list_use_case,
            get_by_id_use_case,
            create_use_case,
            update_use_case,
            delete_use_case,
            export_use_case,
            import_use_case,
        }
    }
}

fn parse_id(raw: &str) -> Result<i64, Json<ErrorResponse>> {
    raw.parse::<i64>()
        .map_err(|_| Json(ErrorResponse::new("ValidationError", "product.invalid_id")))
}

/// Product catalog API
///
/// Listing, CRUD and CSV bulk import/export for catalog products.
#[OpenApi]
impl ProductApi {
    /// List products
    ///
    /// Paginated, sorted and filtered listing. Filter values that are blank or
    /// malformed are ignored rather than rejected; an unknown sort field falls
    /// back to `id`.
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/products", method = "get", tag = "ApiTags::Products")]
    async fn list_products(
        &self,
        /// Substring matched against name or description (case-sensitive)
        search: Query<Option<String>>,
        #[oai(name = "minPrice")] min_price: Query<Option<String>>,
        #[oai(name = "maxPrice")] max_price: Query<Option<String>>,
        #[oai(name = "minStock")] min_stock: Query<Option<String>>,
        #[oai(name = "maxStock")] max_stock: Query<Option<String>>,
        /// Inclusive creation date lower bound (YYYY-MM-DD)
        #[oai(name = "dateFrom")]
        date_from: Query<Option<String>>,
        /// Inclusive creation date upper bound (YYYY-MM-DD)
        #[oai(name = "dateTo")]
        date_to: Query<Option<String>>,
        /// One of id, name, description, price, stockQuantity, createdDatetime
        sort: Query<Option<String>>,
        /// "desc" for descending, anything else ascending
        direction: Query<Option<String>>,
        page: Query<Option<String>>,
        limit: Query<Option<String>>,
    ) -> ListProductsResponse {
        let params = ProductListParams {
            search: search.0,
            min_price: min_price.0,
            max_price: max_price.0,
            min_stock: min_stock.0,
            max_stock: max_stock.0,
            date_from: date_from.0,
            date_to: date_to.0,
            sort: sort.0,
            direction: direction.0,
            page: page.0,
            limit: limit.0,
        };

        match self.list_use_case.execute(params).await {
            Ok(page) => ListProductsResponse::Ok(Json(page.into())),
            Err(err) => {
                let (_status, json) = err.into_error_response();
                ListProductsResponse::InternalError(json)
            }
        }
    }

    /// Export products as CSV
    ///
    /// Every product matching the listing filters, in the requested order.
    #[allow(clippy::too_many_arguments)]
    #[oai(path = "/products/export", method = "get", tag = "ApiTags::Products")]
    async fn export_products(
        &self,
        search: Query<Option<String>>,
        #[oai(name = "minPrice")] min_price: Query<Option<String>>,
        #[oai(name = "maxPrice")] max_price: Query<Option<String>>,
        #[oai(name = "minStock")] min_stock: Query<Option<String>>,
        #[oai(name = "maxStock")] max_stock: Query<Option<String>>,
        #[oai(name = "dateFrom")] date_from: Query<Option<String>>,
        #[oai(name = "dateTo")] date_to: Query<Option<String>>,
        sort: Query<Option<String>>,
        direction: Query<Option<String>>,
    ) -> ExportProductsResponse {
        let params = ProductListParams {
            search: search.0,
            min_price: min_price.0,
            max_price: max_price.0,
            min_stock: min_stock.0,
            max_stock: max_stock.0,
            date_from: date_from.0,
            date_to: date_to.0,
            sort: sort.0,
            direction: direction.0,
            ..Default::default()
        };

        match self.export_use_case.execute(params).await {
            Ok(csv) => ExportProductsResponse::Ok(
                Attachment::new(csv)
                    .attachment_type(AttachmentType::Attachment)
                    .filename(EXPORT_FILENAME),
            ),
            Err(err) => {
                let (_status, json) = err.into_error_response();
                ExportProductsResponse::InternalError(json)
            }
        }
    }

    /// Import products from CSV
    ///
    /// Columns: name, description, price, stock quantity; extra columns are
    /// ignored. Bad rows are reported and skipped, valid rows are saved.
    #[oai(path = "/products/import", method = "post", tag = "ApiTags::Products")]
    async fn import_products(&self, body: ImportProductsRequest) -> ImportProductsResponse {
        let payload = match body.file.into_vec().await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to read uploaded import file: {e}");
                let (_status, json) = ProductError::ImportUnreadable.into_error_response();
                return ImportProductsResponse::BadRequest(json);
            }
        };

        match self
            .import_use_case
            .execute(ImportProductsCsvParams { payload })
            .await
        {
            Ok(outcome) => ImportProductsResponse::Ok(Json(outcome.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    400 => ImportProductsResponse::BadRequest(json),
                    _ => ImportProductsResponse::InternalError(json),
                }
            }
        }
    }

    /// Create a product
    #[oai(path = "/products", method = "post", tag = "ApiTags::Products")]
    async fn create_product(&self, body: Json<ProductRequest>) -> CreateProductResponse {
        let params = CreateProductParams {
            props: body.0.into(),
        };

        match self.create_use_case.execute(params).await {
            Ok(product) => CreateProductResponse::Created(Json(product.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    400 => CreateProductResponse::BadRequest(json),
                    _ => CreateProductResponse::InternalError(json),
                }
            }
        }
    }

    /// Get a product by ID
    #[oai(path = "/products/:id", method = "get", tag = "ApiTags::Products")]
    async fn get_product_by_id(&self, id: Path<String>) -> GetProductByIdResponse {
        let id = match parse_id(&id.0) {
            Ok(id) => id,
            Err(json) => return GetProductByIdResponse::BadRequest(json),
        };

        match self
            .get_by_id_use_case
            .execute(GetProductByIdParams { id })
            .await
        {
            Ok(product) => GetProductByIdResponse::Ok(Json(product.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    404 => GetProductByIdResponse::NotFound(json),
                    _ => GetProductByIdResponse::InternalError(json),
                }
            }
        }
    }

    /// Update a product
    ///
    /// Replaces the editable fields. The identifier and creation time never change.
    #[oai(path = "/products/:id", method = "put", tag = "ApiTags::Products")]
    async fn update_product(
        &self,
        id: Path<String>,
        body: Json<ProductRequest>,
    ) -> UpdateProductResponse {
        let id = match parse_id(&id.0) {
            Ok(id) => id,
            Err(json) => return UpdateProductResponse::BadRequest(json),
        };

        let params = UpdateProductParams {
            id,
            props: body.0.into(),
        };

        match self.update_use_case.execute(params).await {
            Ok(product) => UpdateProductResponse::Ok(Json(product.into())),
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    400 => UpdateProductResponse::BadRequest(json),
                    404 => UpdateProductResponse::NotFound(json),
                    _ => UpdateProductResponse::InternalError(json),
                }
            }
        }
    }

    /// Delete a product
    #[oai(path = "/products/:id", method = "delete", tag = "ApiTags::Products")]
    async fn delete_product(&self, id: Path<String>) -> DeleteProductResponse {
        let id = match parse_id(&id.0) {
            Ok(id) => id,
            Err(json) => return DeleteProductResponse::BadRequest(json),
        };

        match self
            .delete_use_case
            .execute(DeleteProductParams { id })
            .await
        {
            Ok(()) => DeleteProductResponse::NoContent,
            Err(err) => {
                let (status, json) = err.into_error_response();
                match status.as_u16() {
                    404 => DeleteProductResponse::NotFound(json),
                    _ => DeleteProductResponse::InternalError(json),
                }
            }
        }
    }
}

#[derive(poem_openapi::ApiResponse)]
pub enum ListProductsResponse {
    #[oai(status = 200)]
    Ok(Json<ProductPageResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum ExportProductsResponse {
    #[oai(status = 200)]
    Ok(Attachment<Vec<u8>>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum ImportProductsResponse {
    #[oai(status = 200)]
    Ok(Json<ImportOutcomeResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum CreateProductResponse {
    #[oai(status = 201)]
    Created(Json<ProductResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum GetProductByIdResponse {
    #[oai(status = 200)]
    Ok(Json<ProductResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum UpdateProductResponse {
    #[oai(status = 200)]
    Ok(Json<ProductResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

#[derive(poem_openapi::ApiResponse)]
pub enum DeleteProductResponse {
    #[oai(status = 204)]
    NoContent,
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 404)]
    NotFound(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}
