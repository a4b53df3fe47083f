use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A customer row as it arrives from the source extract. Every column is
/// optional text; nothing is trusted until the normalizer has seen it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCustomer {
    pub customer_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub signup_date: Option<String>,
    pub email: Option<String>,
}

/// A customer row after cleanup. Field order is the load order of the
/// `customers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanCustomer {
    pub customer_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub gender: String,
    pub age: u32,
    pub email: String,
    pub signup_date: Option<NaiveDate>,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

impl From<&CleanCustomer> for RawCustomer {
    fn from(c: &CleanCustomer) -> Self {
        RawCustomer {
            customer_id: c.customer_id.clone(),
            first_name: non_empty(&c.first_name),
            last_name: non_empty(&c.last_name),
            full_name: non_empty(&c.full_name),
            gender: non_empty(&c.gender),
            age: Some(c.age.to_string()),
            signup_date: c.signup_date.map(|d| d.format("%Y-%m-%d").to_string()),
            email: non_empty(&c.email),
        }
    }
}
