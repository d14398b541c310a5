use std::sync::Arc;

use logger::TracingLogger;
use persistence::product::repository::ProductRepositoryPostgres;

use business::application::product::create::CreateProductUseCaseImpl;
use business::application::product::delete::DeleteProductUseCaseImpl;
use business::application::product::export_csv::ExportProductsCsvUseCaseImpl;
use business::application::product::get_by_id::GetProductByIdUseCaseImpl;
use business::application::product::import_csv::ImportProductsCsvUseCaseImpl;
use business::application::product::list::ListProductsUseCaseImpl;
use business::application::product::update::UpdateProductUseCaseImpl;

use crate::config::import_config::ImportConfig;

pub struct DependencyContainer {
    pub health_api: crate::api::health::routes::Api,
    pub product_api: crate::api::product::routes::ProductApi,
}

impl DependencyContainer {
    pub fn new(pool: sqlx::PgPool, import: &ImportConfig) -> Self {
        let logger = Arc::new(TracingLogger::new(TracingLogger::CATALOG));
        let health_api = crate::api::health::routes::Api::new(pool.clone());

        let product_repository = Arc::new(ProductRepositoryPostgres::new(pool));

        let list_use_case = Arc::new(ListProductsUseCaseImpl {
            repository: product_repository.clone(),
            logger: logger.clone(),
        });
        let get_by_id_use_case = Arc::new(GetProductByIdUseCaseImpl {
            repository: product_repository.clone(),
            logger: logger.clone(),
        });
        let create_use_case = Arc::new(CreateProductUseCaseImpl {
            repository: product_repository.clone(),
            logger: logger.clone(),
        });
        let update_use_case = Arc::new(UpdateProductUseCaseImpl {
            repository: product_repository.clone(),
            logger: logger.clone(),
        });
        let delete_use_case = Arc::new(DeleteProductUseCaseImpl {
            repository: product_repository.clone(),
            logger: logger.clone(),
        });
        let export_use_case = Arc::new(ExportProductsCsvUseCaseImpl {
            repository: product_repository.clone(),
            logger: logger.clone(),
        });
        let import_use_case = Arc::new(ImportProductsCsvUseCaseImpl {
            repository: product_repository,
            logger: Arc::new(TracingLogger::new(TracingLogger::IMPORT)),
            batch_size: import.batch_size,
            error_preview: import.error_preview,
        });

        let product_api = crate::api::product::routes::ProductApi::new(
            list_use_case,
            get_by_id_use_case,
            create_use_case,
            update_use_case,
            delete_use_case,
            export_use_case,
            import_use_case,
        );

        Self {
            health_api,
            product_api,
        }
    }
}
