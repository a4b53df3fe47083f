//! Per-batch counts of every repair the normalizers made.
//!
//! Repairs never fail a batch, so these counters are the only signal of how
//! dirty a source file was.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerReport {
    pub rows: usize,
    pub genders_mapped: usize,
    pub ages_imputed: usize,
    /// Mean of the present ages, truncated; what missing ages were filled with.
    pub imputed_age: u32,
    pub signup_dates_unparsed: usize,
    pub first_names_corrected: usize,
    pub last_names_corrected: usize,
    pub full_names_rewritten: usize,
    /// Missing `@` inserted or a dotless provider domain fixed.
    pub email_domains_repaired: usize,
    pub email_locals_rewritten: usize,
    pub emails_blanked: usize,
}

impl CustomerReport {
    pub fn log(&self) {
        tracing::info!(
            rows = self.rows,
            genders_mapped = self.genders_mapped,
            ages_imputed = self.ages_imputed,
            imputed_age = self.imputed_age,
            signup_dates_unparsed = self.signup_dates_unparsed,
            first_names_corrected = self.first_names_corrected,
            last_names_corrected = self.last_names_corrected,
            full_names_rewritten = self.full_names_rewritten,
            email_domains_repaired = self.email_domains_repaired,
            email_locals_rewritten = self.email_locals_rewritten,
            emails_blanked = self.emails_blanked,
            "customer batch normalized"
        );
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SalesReport {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Rows with neither a quantity nor a total.
    pub rows_dropped: usize,
    pub transaction_ids_stripped: usize,
    pub sale_dates_unparsed: usize,
    pub sale_times_unparsed: usize,
    pub categories_pattern_corrected: usize,
    pub categories_defaulted: usize,
    pub products_fuzzy_corrected: usize,
    pub products_unresolved: usize,
    pub quantities_unparsed: usize,
    pub quantities_derived: usize,
    pub totals_derived: usize,
    pub category_rows: usize,
    pub product_rows: usize,
}

impl SalesReport {
    pub fn log(&self) {
        if self.rows_dropped > 0 {
            tracing::warn!(
                rows_dropped = self.rows_dropped,
                "sales rows dropped: no quantity and no total"
            );
        }
        tracing::info!(
            rows_in = self.rows_in,
            rows_out = self.rows_out,
            rows_dropped = self.rows_dropped,
            transaction_ids_stripped = self.transaction_ids_stripped,
            sale_dates_unparsed = self.sale_dates_unparsed,
            sale_times_unparsed = self.sale_times_unparsed,
            categories_pattern_corrected = self.categories_pattern_corrected,
            categories_defaulted = self.categories_defaulted,
            products_fuzzy_corrected = self.products_fuzzy_corrected,
            products_unresolved = self.products_unresolved,
            quantities_unparsed = self.quantities_unparsed,
            quantities_derived = self.quantities_derived,
            totals_derived = self.totals_derived,
            category_rows = self.category_rows,
            product_rows = self.product_rows,
            "sales batch normalized"
        );
    }
}
