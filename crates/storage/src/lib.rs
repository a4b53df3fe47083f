pub mod db;

pub use db::{
    create_db, get_categories, get_customer, get_products, get_sale, upsert_categories,
    upsert_customers, upsert_products, upsert_sales, DbPool,
};

use retail_core::Money;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Amount {0} does not fit in integer cents")]
    AmountOutOfRange(Money),
}

/// Outcome of one upsert call. Rows without a primary key are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub written: usize,
    pub skipped: usize,
}

impl UpsertSummary {
    fn log(&self, table: &str) {
        if self.skipped > 0 {
            tracing::warn!(table, skipped = self.skipped, "rows without a key were not loaded");
        }
        tracing::info!(table, written = self.written, "upsert complete");
    }
}
