use async_trait::async_trait;

use crate::domain::errors::RepositoryError;

use super::model::{NewProduct, Product};
use super::predicate::{Predicate, ProductField, SortDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
}

/// Declarative listing query. Predicates are ANDed; ties in the sort field
/// are broken by id ascending.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductQuery {
    pub predicates: Vec<Predicate>,
    pub sort: ProductField,
    pub direction: SortDirection,
    pub pagination: Option<Pagination>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError>;
    async fn count(&self, predicates: &[Predicate]) -> Result<u64, RepositoryError>;
    async fn get_by_id(&self, id: i64) -> Result<Product, RepositoryError>;
    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError>;
    /// Flushes a batch of staged records in one unit of work.
    async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, RepositoryError>;
    async fn update(&self, product: &Product) -> Result<(), RepositoryError>;
    async fn delete(&self, id: i64) -> Result<(), RepositoryError>;
}
