use bigdecimal::BigDecimal;
use num_traits::{FromPrimitive, ToPrimitive};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use business::domain::product::model::Product;

pub const PRODUCT_COLUMNS: &str = "id, name, description, price, stock_quantity, created_datetime";

/// Row of the `products` table.
#[derive(Debug, FromRow)]
pub struct ProductEntity {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock_quantity: i32,
    pub created_datetime: DateTime<Utc>,
}

impl ProductEntity {
    pub fn into_domain(self) -> Product {
        Product::from_repository(
            self.id,
            self.name,
            self.description,
            self.price.to_f64().unwrap_or_default(),
            self.stock_quantity,
            self.created_datetime,
        )
    }
}

/// Converts a validated price into the column's two-decimal representation.
pub fn price_to_decimal(price: f64) -> BigDecimal {
    BigDecimal::from_f64(price).unwrap_or_default().round(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn should_round_price_to_two_decimals() {
        assert_eq!(price_to_decimal(0.1), BigDecimal::from_str("0.10").unwrap());
        assert_eq!(price_to_decimal(9.999), BigDecimal::from_str("10.00").unwrap());
    }

    #[test]
    fn should_never_write_zero_for_a_staged_price() {
        use bigdecimal::Zero;
        use business::domain::product::import::stage_row;

        assert!(stage_row(2, &["Pin", "Tiny pin", "0.004", "1"]).is_err());

        let smallest = stage_row(2, &["Pin", "Tiny pin", "0.006", "1"]).unwrap();
        let stored = price_to_decimal(smallest.price);
        assert!(stored > BigDecimal::zero());
        assert_eq!(stored, BigDecimal::from_str("0.01").unwrap());
    }

    #[test]
    fn should_map_entity_to_domain_product() {
        let created = Utc::now();
        let product = ProductEntity {
            id: 11,
            name: "Mug".to_string(),
            description: "Ceramic".to_string(),
            price: BigDecimal::from_str("9.50").unwrap(),
            stock_quantity: 20,
            created_datetime: created,
        }
        .into_domain();

        assert_eq!(product.id, 11);
        assert_eq!(product.price, 9.5);
        assert_eq!(product.created_datetime, created);
    }
}
