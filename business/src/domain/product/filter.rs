//! Translates loosely-typed listing parameters into a typed query.
//!
//! Bad filter input never rejects a request: a blank or malformed value is
//! simply treated as absent.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::predicate::{Predicate, ProductField, SortDirection, Value};
use super::repository::{Pagination, ProductQuery};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw listing parameters as received from the transport.
#[derive(Debug, Clone, Default)]
pub struct ProductListParams {
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_stock: Option<String>,
    pub max_stock: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// The normalized filter that was actually applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterDescriptor {
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub filter: FilterDescriptor,
    pub predicates: Vec<Predicate>,
    pub sort: ProductField,
    pub direction: SortDirection,
    /// 1-based.
    pub page: u32,
    pub page_size: u32,
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_float(raw: &Option<String>) -> Option<f64> {
    present(raw)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_int(raw: &Option<String>) -> Option<i64> {
    present(raw).and_then(|s| s.parse::<i64>().ok())
}

fn parse_date(raw: &Option<String>) -> Option<NaiveDate> {
    present(raw).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn positive(raw: &Option<String>) -> Option<u32> {
    parse_int(raw)
        .filter(|v| *v > 0)
        .map(|v| u32::try_from(v).unwrap_or(u32::MAX))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| start_of_day(date))
}

fn range(field: ProductField, min: Option<Value>, max: Option<Value>) -> Option<Predicate> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(Predicate::Range { field, min, max })
}

impl FilterDescriptor {
    pub fn from_params(params: &ProductListParams) -> Self {
        Self {
            search: present(&params.search).map(str::to_string),
            min_price: parse_float(&params.min_price),
            max_price: parse_float(&params.max_price),
            min_stock: parse_int(&params.min_stock),
            max_stock: parse_int(&params.max_stock),
            date_from: parse_date(&params.date_from),
            date_to: parse_date(&params.date_to),
        }
    }

    /// Predicates in a fixed order: search, price, stock, creation date.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(search) = &self.search {
            predicates.push(Predicate::Or(vec![
                Predicate::Substring {
                    field: ProductField::Name,
                    needle: search.clone(),
                },
                Predicate::Substring {
                    field: ProductField::Description,
                    needle: search.clone(),
                },
            ]));
        }

        predicates.extend(range(
            ProductField::Price,
            self.min_price.map(Value::Float),
            self.max_price.map(Value::Float),
        ));
        predicates.extend(range(
            ProductField::StockQuantity,
            self.min_stock.map(Value::Int),
            self.max_stock.map(Value::Int),
        ));
        predicates.extend(range(
            ProductField::CreatedDatetime,
            self.date_from.map(|d| Value::Timestamp(start_of_day(d))),
            self.date_to.map(|d| Value::Timestamp(end_of_day(d))),
        ));

        predicates
    }
}

/// Builds the listing query. Never fails.
///
/// Page policy: an absent, malformed or non-positive page becomes page 1.
/// A page past the end is kept as-is and yields an empty page.
pub fn compile(params: &ProductListParams) -> CompiledQuery {
    let filter = FilterDescriptor::from_params(params);
    let predicates = filter.predicates();

    let sort = present(&params.sort)
        .and_then(|s| s.parse::<ProductField>().ok())
        .unwrap_or_default();

    CompiledQuery {
        filter,
        predicates,
        sort,
        direction: SortDirection::from_param(params.direction.as_deref()),
        page: positive(&params.page).unwrap_or(1),
        page_size: positive(&params.limit)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE),
    }
}

impl CompiledQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn into_query(self) -> ProductQuery {
        let pagination = Some(Pagination {
            limit: u64::from(self.page_size),
            offset: self.offset(),
        });
        ProductQuery {
            predicates: self.predicates,
            sort: self.sort,
            direction: self.direction,
            pagination,
        }
    }

    /// Same filter and ordering, every matching row.
    pub fn unpaged(self) -> ProductQuery {
        ProductQuery {
            predicates: self.predicates,
            sort: self.sort,
            direction: self.direction,
            pagination: None,
        }
    }
}
