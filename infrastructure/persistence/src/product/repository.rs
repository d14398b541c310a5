use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};

use business::domain::errors::RepositoryError;
use business::domain::product::model::{NewProduct, Product};
use business::domain::product::predicate::{Predicate, ProductField, Value};
use business::domain::product::repository::{ProductQuery, ProductRepository};

use super::entity::{PRODUCT_COLUMNS, ProductEntity, price_to_decimal};
use super::query::{count_products, select_products};

pub struct ProductRepositoryPostgres {
    pool: PgPool,
}

impl ProductRepositoryPostgres {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(error: sqlx::Error) -> RepositoryError {
    tracing::error!("Product query failed: {error}");
    match error {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.is_check_violation() => {
            RepositoryError::ConstraintViolation
        }
        _ => RepositoryError::DatabaseError,
    }
}

#[async_trait]
impl ProductRepository for ProductRepositoryPostgres {
    async fn find(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let entities = select_products(query)
            .build_query_as::<ProductEntity>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(entities.into_iter().map(|e| e.into_domain()).collect())
    }

    async fn count(&self, predicates: &[Predicate]) -> Result<u64, RepositoryError> {
        let total: i64 = count_products(predicates)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn get_by_id(&self, id: i64) -> Result<Product, RepositoryError> {
        let by_id = ProductQuery {
            predicates: vec![Predicate::Equals {
                field: ProductField::Id,
                value: Value::Int(id),
            }],
            ..Default::default()
        };

        let entity = select_products(&by_id)
            .build_query_as::<ProductEntity>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepositoryError::NotFound)?;

        Ok(entity.into_domain())
    }

    async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let entity = sqlx::query_as::<_, ProductEntity>(&format!(
            "INSERT INTO products (name, description, price, stock_quantity, created_datetime)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(price_to_decimal(product.price))
        .bind(product.stock_quantity)
        .bind(product.created_datetime)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(entity.into_domain())
    }

    async fn insert_batch(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let mut builder = QueryBuilder::new(
            "INSERT INTO products (name, description, price, stock_quantity, created_datetime) ",
        );
        builder.push_values(products, |mut row, product| {
            row.push_bind(product.name.clone())
                .push_bind(product.description.clone())
                .push_bind(price_to_decimal(product.price))
                .push_bind(product.stock_quantity)
                .push_bind(product.created_datetime);
        });

        let inserted = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected();

        tx.commit().await.map_err(map_sqlx_error)?;

        tracing::debug!("Inserted batch of {inserted} products");
        Ok(inserted)
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE products
            SET name = $2, description = $3, price = $4, stock_quantity = $5
            WHERE id = $1"#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(price_to_decimal(product.price))
        .bind(product.stock_quantity)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
