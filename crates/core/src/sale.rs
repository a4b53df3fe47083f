use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A sales row as extracted. Column names follow the source file, not the
/// warehouse schema (`category`, `product`, `price_per_unit`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSale {
    pub transaction_id: Option<String>,
    pub sale_date: Option<String>,
    pub sale_time: Option<String>,
    pub category_id: Option<String>,
    #[serde(rename = "category")]
    pub category_name: Option<String>,
    pub product_id: Option<String>,
    #[serde(rename = "product")]
    pub product_name: Option<String>,
    pub quantity: Option<String>,
    #[serde(rename = "price_per_unit")]
    pub unit_price: Option<String>,
    pub total_sale: Option<String>,
    pub customer_id: Option<String>,
}

/// A cleaned sales fact. Names used while resolving ids are not carried.
/// The unit price keeps the precision it was extracted with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanSale {
    pub transaction_id: Option<String>,
    pub sale_date: Option<NaiveDate>,
    pub sale_time: Option<NaiveTime>,
    pub customer_id: Option<String>,
    pub product_id: i64,
    pub category_id: i64,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
    pub total_sale: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryRow {
    pub category_id: i64,
    pub category_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRow {
    pub product_id: i64,
    pub product_name: String,
}

impl From<&CleanSale> for RawSale {
    fn from(s: &CleanSale) -> Self {
        RawSale {
            transaction_id: s.transaction_id.clone(),
            sale_date: s.sale_date.map(|d| d.format("%Y-%m-%d").to_string()),
            sale_time: s.sale_time.map(|t| t.format("%H:%M:%S").to_string()),
            category_id: Some(s.category_id.to_string()),
            category_name: None,
            product_id: Some(s.product_id.to_string()),
            product_name: None,
            quantity: s.quantity.map(|q| q.to_string()),
            unit_price: s.unit_price.map(|p| p.to_string()),
            total_sale: s.total_sale.map(|t| t.as_decimal().to_string()),
            customer_id: s.customer_id.clone(),
        }
    }
}
