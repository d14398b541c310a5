//! Compiles domain predicates into PostgreSQL.
//!
//! Column names only ever come from [`column`]; every user-supplied value is
//! bound as a parameter.

use sqlx::{Postgres, QueryBuilder};

use business::domain::product::predicate::{Predicate, ProductField, SortDirection, Value};
use business::domain::product::repository::ProductQuery;

use super::entity::PRODUCT_COLUMNS;

pub fn column(field: ProductField) -> &'static str {
    match field {
        ProductField::Id => "id",
        ProductField::Name => "name",
        ProductField::Description => "description",
        ProductField::Price => "price",
        ProductField::StockQuantity => "stock_quantity",
        ProductField::CreatedDatetime => "created_datetime",
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    match value {
        Value::Int(v) => {
            builder.push_bind(*v);
        }
        Value::Float(v) => {
            builder.push_bind(*v);
        }
        Value::Text(v) => {
            builder.push_bind(v.clone());
        }
        Value::Timestamp(v) => {
            builder.push_bind(*v);
        }
    }
}

fn push_predicate(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Equals { field, value } => {
            builder.push(column(*field)).push(" = ");
            push_value(builder, value);
        }
        Predicate::Range { field, min, max } => {
            if min.is_none() && max.is_none() {
                builder.push("TRUE");
                return;
            }
            builder.push("(");
            if let Some(min) = min {
                builder.push(column(*field)).push(" >= ");
                push_value(builder, min);
            }
            if let Some(max) = max {
                if min.is_some() {
                    builder.push(" AND ");
                }
                builder.push(column(*field)).push(" <= ");
                push_value(builder, max);
            }
            builder.push(")");
        }
        Predicate::Substring { field, needle } => {
            builder.push(column(*field)).push(" LIKE '%' || ");
            builder.push_bind(escape_like(needle));
            builder.push(" || '%' ESCAPE '\\'");
        }
        Predicate::Or(alternatives) => {
            if alternatives.is_empty() {
                builder.push("FALSE");
                return;
            }
            builder.push("(");
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                push_predicate(builder, alternative);
            }
            builder.push(")");
        }
    }
}

pub fn push_where(builder: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(builder, predicate);
    }
}

fn push_order(builder: &mut QueryBuilder<'_, Postgres>, sort: ProductField, direction: SortDirection) {
    let direction = match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    builder
        .push(" ORDER BY ")
        .push(column(sort))
        .push(" ")
        .push(direction);
    if sort != ProductField::Id {
        builder.push(", id ASC");
    }
}

pub fn select_products(query: &ProductQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
    push_where(&mut builder, &query.predicates);
    push_order(&mut builder, query.sort, query.direction);

    if let Some(pagination) = query.pagination {
        builder
            .push(" LIMIT ")
            .push_bind(i64::try_from(pagination.limit).unwrap_or(i64::MAX))
            .push(" OFFSET ")
            .push_bind(i64::try_from(pagination.offset).unwrap_or(i64::MAX));
    }
    builder
}

pub fn count_products(predicates: &[Predicate]) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_where(&mut builder, predicates);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use business::domain::product::repository::Pagination;

    fn substring(field: ProductField, needle: &str) -> Predicate {
        Predicate::Substring {
            field,
            needle: needle.to_string(),
        }
    }

    #[test]
    fn should_select_everything_ordered_by_id_when_unfiltered() {
        let builder = select_products(&ProductQuery::default());

        assert_eq!(
            builder.sql(),
            "SELECT id, name, description, price, stock_quantity, created_datetime FROM products ORDER BY id ASC"
        );
    }

    #[test]
    fn should_and_predicates_and_or_search_alternatives() {
        let query = ProductQuery {
            predicates: vec![
                Predicate::Or(vec![
                    substring(ProductField::Name, "lamp"),
                    substring(ProductField::Description, "lamp"),
                ]),
                Predicate::Range {
                    field: ProductField::Price,
                    min: Some(Value::Float(10.0)),
                    max: Some(Value::Float(50.0)),
                },
                Predicate::Range {
                    field: ProductField::StockQuantity,
                    min: None,
                    max: Some(Value::Int(3)),
                },
            ],
            sort: ProductField::Price,
            direction: SortDirection::Desc,
            pagination: Some(Pagination {
                limit: 10,
                offset: 20,
            }),
        };

        let builder = select_products(&query);

        assert_eq!(
            builder.sql(),
            "SELECT id, name, description, price, stock_quantity, created_datetime FROM products \
             WHERE (name LIKE '%' || $1 || '%' ESCAPE '\\' OR description LIKE '%' || $2 || '%' ESCAPE '\\') \
             AND (price >= $3 AND price <= $4) \
             AND (stock_quantity <= $5) \
             ORDER BY price DESC, id ASC LIMIT $6 OFFSET $7"
        );
    }

    #[test]
    fn should_count_with_same_where_clause() {
        let builder = count_products(&[Predicate::Equals {
            field: ProductField::Id,
            value: Value::Int(4),
        }]);

        assert_eq!(builder.sql(), "SELECT COUNT(*) FROM products WHERE id = $1");
    }

    #[test]
    fn should_render_degenerate_predicates_as_constants() {
        let builder = count_products(&[
            Predicate::Or(vec![]),
            Predicate::Range {
                field: ProductField::Price,
                min: None,
                max: None,
            },
        ]);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM products WHERE FALSE AND TRUE"
        );
    }

    #[test]
    fn should_escape_like_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
