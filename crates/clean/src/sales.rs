//! Sales Normalizer.

use retail_core::{
    parse_amount, CategoryRow, CategoryVocabulary, CleanSale, Money, ProductRow,
    ProductVocabulary, RawSale, Vocabulary,
};
use rust_decimal::Decimal;

use crate::dimension;
use crate::fuzzy::ProductMatcher;
use crate::report::SalesReport;
use crate::temporal::{parse_date, parse_time};
use crate::text::{strip_non_digit_prefix, title_case, trimmed};

/// A surviving sales row before the name columns are projected away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSale {
    pub sale: CleanSale,
    pub category_name: Option<String>,
    pub product_name: String,
}

#[derive(Debug, Clone)]
pub struct SalesBatch {
    pub sales: Vec<CleanSale>,
    pub categories: Vec<CategoryRow>,
    pub products: Vec<ProductRow>,
    pub report: SalesReport,
}

pub struct SalesNormalizer {
    categories: CategoryVocabulary,
    products: ProductVocabulary,
    matcher: ProductMatcher,
}

impl SalesNormalizer {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self {
            categories: vocabulary.categories.clone(),
            products: vocabulary.products.clone(),
            matcher: ProductMatcher::new(&vocabulary.products),
        }
    }

    pub fn normalize_batch(&self, rows: &[RawSale]) -> SalesBatch {
        let mut report = SalesReport {
            rows_in: rows.len(),
            ..SalesReport::default()
        };

        let resolved: Vec<ResolvedSale> = rows
            .iter()
            .filter_map(|row| self.resolve_counted(row, &mut report))
            .collect();

        let categories = dimension::category_rows(
            resolved
                .iter()
                .map(|r| (r.sale.category_id, r.category_name.as_deref())),
        );
        let products = dimension::product_rows(
            resolved
                .iter()
                .map(|r| (r.sale.product_id, Some(r.product_name.as_str()))),
            &self.products,
        );

        report.rows_out = resolved.len();
        report.category_rows = categories.len();
        report.product_rows = products.len();
        report.log();

        SalesBatch {
            sales: resolved.into_iter().map(|r| r.sale).collect(),
            categories,
            products,
            report,
        }
    }

    /// Repairs one row. `None` means the row carries neither a quantity nor a
    /// total and is dropped.
    pub fn resolve(&self, row: &RawSale) -> Option<ResolvedSale> {
        self.resolve_counted(row, &mut SalesReport::default())
    }

    fn resolve_counted(&self, row: &RawSale, report: &mut SalesReport) -> Option<ResolvedSale> {
        let quantity = trimmed(row.quantity.as_deref()).and_then(|q| {
            let parsed = parse_quantity(q);
            if parsed.is_none() {
                report.quantities_unparsed += 1;
            }
            parsed
        });
        let total_sale = trimmed(row.total_sale.as_deref()).and_then(Money::parse);
        if quantity.is_none() && total_sale.is_none() {
            report.rows_dropped += 1;
            tracing::debug!(
                transaction_id = row.transaction_id.as_deref().unwrap_or(""),
                "dropping sale without quantity or total"
            );
            return None;
        }

        let unit_price = trimmed(row.unit_price.as_deref()).and_then(parse_amount);
        let (quantity, total_sale) = fill_amounts(quantity, unit_price, total_sale, report);

        let transaction_id = trimmed(row.transaction_id.as_deref()).and_then(|id| {
            let digits = strip_non_digit_prefix(id);
            if digits.len() != id.len() {
                report.transaction_ids_stripped += 1;
            }
            (!digits.is_empty()).then(|| digits.to_string())
        });

        let sale_date = trimmed(row.sale_date.as_deref()).and_then(|s| {
            let parsed = parse_date(s);
            if parsed.is_none() {
                report.sale_dates_unparsed += 1;
            }
            parsed
        });
        let sale_time = trimmed(row.sale_time.as_deref()).and_then(|s| {
            let parsed = parse_time(s);
            if parsed.is_none() {
                report.sale_times_unparsed += 1;
            }
            parsed
        });

        let (category_id, category_name) = self.resolve_category(row, report);
        let (product_id, product_name) = self.resolve_product(row, report);

        Some(ResolvedSale {
            sale: CleanSale {
                transaction_id,
                sale_date,
                sale_time,
                customer_id: trimmed(row.customer_id.as_deref()).map(String::from),
                product_id,
                category_id,
                quantity,
                unit_price,
                total_sale,
            },
            category_name,
            product_name,
        })
    }

    /// A vocabulary id wins and names the row; otherwise a canonical name
    /// supplies the id; otherwise the row is unmapped and keeps its name.
    fn resolve_category(&self, row: &RawSale, report: &mut SalesReport) -> (i64, Option<String>) {
        let name = trimmed(row.category_name.as_deref()).map(|n| {
            let titled = title_case(n);
            let corrected = self.categories.correct(&titled);
            if corrected != titled {
                report.categories_pattern_corrected += 1;
            }
            corrected.to_string()
        });

        let id = trimmed(row.category_id.as_deref()).and_then(parse_id);
        if let Some((id, vocab_name)) =
            id.and_then(|id| self.categories.name_for(id).map(|n| (id, n)))
        {
            return (id, Some(vocab_name.to_string()));
        }
        if let Some(id) = name.as_deref().and_then(|n| self.categories.id_for(n)) {
            return (id, name);
        }
        report.categories_defaulted += 1;
        (self.categories.unmapped_id, name)
    }

    fn resolve_product(&self, row: &RawSale, report: &mut SalesReport) -> (i64, String) {
        let id = trimmed(row.product_id.as_deref()).and_then(parse_id);
        let vocab_name = id.and_then(|id| self.products.name_for(id));

        let base = trimmed(row.product_name.as_deref())
            .map(title_case)
            .or_else(|| vocab_name.map(String::from))
            .unwrap_or_else(|| self.products.placeholder.clone());
        let matched = self.matcher.resolve(&base);
        if matched != base {
            report.products_fuzzy_corrected += 1;
        }

        if let (Some(id), Some(name)) = (id, vocab_name) {
            return (id, name.to_string());
        }
        match self.products.id_for(matched) {
            Some(id) => (id, matched.to_string()),
            None => {
                report.products_unresolved += 1;
                (self.products.unmapped_id, matched.to_string())
            }
        }
    }
}

pub fn normalize_sales(rows: &[RawSale], vocabulary: &Vocabulary) -> SalesBatch {
    SalesNormalizer::new(vocabulary).normalize_batch(rows)
}

/// Derives whichever of quantity and total is missing from the other and the
/// unit price. A quantity is only derived when the division is exact.
fn fill_amounts(
    quantity: Option<u32>,
    unit_price: Option<Decimal>,
    total_sale: Option<Money>,
    report: &mut SalesReport,
) -> (Option<u32>, Option<Money>) {
    match (quantity, unit_price, total_sale) {
        (Some(q), Some(price), None) => {
            let total = Money::total_of(price, q);
            if total.is_some() {
                report.totals_derived += 1;
            }
            (Some(q), total)
        }
        (None, Some(price), Some(total)) => {
            let q = total.whole_units_of(price);
            if q.is_some() {
                report.quantities_derived += 1;
            }
            (q, Some(total))
        }
        _ => (quantity, total_sale),
    }
}

/// Integer ids, also written as whole floats (`"2.0"`).
fn parse_id(s: &str) -> Option<i64> {
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Non-negative counts, truncated toward zero.
fn parse_quantity(s: &str) -> Option<u32> {
    s.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite() && *q >= 0.0 && *q <= u32::MAX as f64)
        .map(|q| q as u32)
}
