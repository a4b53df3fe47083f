pub mod csv;
pub mod customer;
pub mod dimension;
pub mod fuzzy;
pub mod report;
pub mod sales;
pub mod temporal;
pub mod text;
pub(crate) mod util;

pub use csv::CsvError;
pub use customer::{
    normalize_customer, normalize_customers, CustomerBatch, CustomerBatchStats, CustomerRules,
};
pub use fuzzy::{ProductMatch, ProductMatcher};
pub use report::{CustomerReport, SalesReport};
pub use sales::{normalize_sales, ResolvedSale, SalesBatch, SalesNormalizer};

pub mod clean {
    use crate::*;
    use retail_core::{RawCustomer, RawSale, Vocabulary};

    pub fn clean_customers_csv<R: std::io::Read>(
        data: R,
        vocabulary: &Vocabulary,
    ) -> Result<CustomerBatch, CsvError> {
        let rows: Vec<RawCustomer> = crate::csv::read_customers(data)?;
        Ok(normalize_customers(&rows, vocabulary))
    }

    pub fn clean_sales_csv<R: std::io::Read>(
        data: R,
        vocabulary: &Vocabulary,
    ) -> Result<SalesBatch, CsvError> {
        let rows: Vec<RawSale> = crate::csv::read_sales(data)?;
        Ok(normalize_sales(&rows, vocabulary))
    }
}
