use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;

use crate::domain::errors::RepositoryError;
use crate::domain::logger::Logger;
use crate::domain::product::model::{NewProduct, Product};
use crate::domain::product::predicate::Predicate;
use crate::domain::product::repository::{ProductQuery, ProductRepository};

mock! {
    pub ProductRepo {}

    #[async_trait]
    impl ProductRepository for ProductRepo {
        async fn find(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError>;
        async fn count(&self, predicates: &[Predicate]) -> Result<u64, RepositoryError>;
        async fn get_by_id(&self, id: i64) -> Result<Product, RepositoryError>;
        async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
        async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, RepositoryError>;
        async fn update(&self, product: &Product) -> Result<(), RepositoryError>;
        async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
    }
}

mock! {
    pub Log {}

    impl Logger for Log {
        fn info(&self, message: &str);
        fn warn(&self, message: &str);
        fn error(&self, message: &str);
        fn debug(&self, message: &str);
    }
}

pub fn mock_logger() -> Arc<dyn Logger> {
    let mut logger = MockLog::new();
    logger.expect_info().returning(|_| ());
    logger.expect_warn().returning(|_| ());
    logger.expect_error().returning(|_| ());
    logger.expect_debug().returning(|_| ());
    Arc::new(logger)
}

pub fn make_product(id: i64, name: &str, price: f64, stock_quantity: i32) -> Product {
    Product::from_repository(
        id,
        name.to_string(),
        format!("{name} description"),
        price,
        stock_quantity,
        Utc::now(),
    )
}
