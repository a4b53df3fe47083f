//! Customer Normalizer.
//!
//! Each row is repaired by [`normalize_customer`], a pure function of the row,
//! the batch aggregates in [`CustomerBatchStats`] and the compiled
//! [`CustomerRules`]. [`normalize_customers`] wires the three together and keeps
//! row count and order.

use regex::Regex;
use retail_core::{CleanCustomer, EmailRules, GenderMap, NameCorrections, RawCustomer, Vocabulary};

use crate::report::CustomerReport;
use crate::temporal::parse_date;
use crate::text::{capitalize, title_case, trimmed};

/// Aggregates computed once over the whole raw batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomerBatchStats {
    /// Mean of every readable age, or `0.0` when there are none.
    pub mean_age: f64,
}

impl CustomerBatchStats {
    pub fn from_batch(rows: &[RawCustomer]) -> Self {
        let ages: Vec<f64> = rows.iter().filter_map(|r| parse_age(r.age.as_deref())).collect();
        let mean_age = if ages.is_empty() {
            0.0
        } else {
            ages.iter().sum::<f64>() / ages.len() as f64
        };
        Self { mean_age }
    }

    pub fn imputed_age(&self) -> u32 {
        self.mean_age as u32
    }
}

/// Lookup tables plus the compiled email repair pattern.
pub struct CustomerRules {
    genders: GenderMap,
    names: NameCorrections,
    /// `<local><provider>` with the `@` missing, e.g. `jdoegmail.com`.
    missing_at: Option<Regex>,
    domain_corrections: Vec<(String, String)>,
}

impl CustomerRules {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        Self {
            genders: vocabulary.genders.clone(),
            names: vocabulary.names.clone(),
            missing_at: missing_at_pattern(&vocabulary.email),
            domain_corrections: vocabulary.email.domain_corrections(),
        }
    }
}

impl Default for CustomerRules {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

fn missing_at_pattern(rules: &EmailRules) -> Option<Regex> {
    if rules.providers.is_empty() {
        return None;
    }
    let providers: Vec<String> = rules
        .providers
        .iter()
        .map(|p| regex::escape(&p.to_lowercase()))
        .collect();
    Regex::new(&format!("^([^@]+)({})$", providers.join("|"))).ok()
}

/// A cleaned batch together with the counts of what was repaired.
#[derive(Debug, Clone)]
pub struct CustomerBatch {
    pub customers: Vec<CleanCustomer>,
    pub report: CustomerReport,
}

pub fn normalize_customers(rows: &[RawCustomer], vocabulary: &Vocabulary) -> CustomerBatch {
    let rules = CustomerRules::new(vocabulary);
    let stats = CustomerBatchStats::from_batch(rows);

    let mut report = CustomerReport {
        rows: rows.len(),
        imputed_age: stats.imputed_age(),
        ..CustomerReport::default()
    };
    let customers = rows
        .iter()
        .map(|row| normalize_counted(row, &stats, &rules, &mut report))
        .collect();

    report.log();
    CustomerBatch { customers, report }
}

/// Repairs a single customer row.
pub fn normalize_customer(
    row: &RawCustomer,
    stats: &CustomerBatchStats,
    rules: &CustomerRules,
) -> CleanCustomer {
    normalize_counted(row, stats, rules, &mut CustomerReport::default())
}

fn normalize_counted(
    row: &RawCustomer,
    stats: &CustomerBatchStats,
    rules: &CustomerRules,
    report: &mut CustomerReport,
) -> CleanCustomer {
    let gender = rules.genders.normalize(row.gender.as_deref());
    if row.gender.as_deref().is_some_and(|g| g != gender) {
        report.genders_mapped += 1;
    }

    let age = match parse_age(row.age.as_deref()) {
        Some(age) => age as u32,
        None => {
            report.ages_imputed += 1;
            stats.imputed_age()
        }
    };

    let signup_date = trimmed(row.signup_date.as_deref()).and_then(|s| {
        let parsed = parse_date(s);
        if parsed.is_none() {
            report.signup_dates_unparsed += 1;
        }
        parsed
    });

    let first = capitalize_field(row.first_name.as_deref());
    let first_name = rules.names.first_name(&first).to_string();
    if first_name != first {
        report.first_names_corrected += 1;
    }

    let last = capitalize_field(row.last_name.as_deref());
    let last_name = rules.names.last_name(&last).to_string();
    if last_name != last {
        report.last_names_corrected += 1;
    }

    let full_name = format!("{first_name} {last_name}");
    if trimmed(row.full_name.as_deref()).map(title_case).as_deref() != Some(full_name.as_str()) {
        report.full_names_rewritten += 1;
    }

    let email = normalize_email(row.email.as_deref(), &first_name, &last_name, rules, report);

    CleanCustomer {
        customer_id: trimmed(row.customer_id.as_deref()).map(String::from),
        first_name,
        last_name,
        full_name,
        gender,
        age,
        email,
        signup_date,
    }
}

fn capitalize_field(value: Option<&str>) -> String {
    trimmed(value).map(capitalize).unwrap_or_default()
}

/// Ages that are unreadable, negative or non-finite count as missing.
fn parse_age(value: Option<&str>) -> Option<f64> {
    trimmed(value)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|age| age.is_finite() && *age >= 0.0)
}

fn normalize_email(
    value: Option<&str>,
    first_name: &str,
    last_name: &str,
    rules: &CustomerRules,
    report: &mut CustomerReport,
) -> String {
    let Some(raw) = trimmed(value) else {
        report.emails_blanked += 1;
        return String::new();
    };

    let mut email = raw.to_lowercase();
    let mut repaired = false;
    if !email.contains('@') {
        if let Some(re) = &rules.missing_at {
            if re.is_match(&email) {
                email = re.replace(&email, "$1@$2").into_owned();
                repaired = true;
            }
        }
    }

    let Some((local, domain)) = email.split_once('@') else {
        report.emails_blanked += 1;
        return String::new();
    };

    let mut domain = domain.trim().to_string();
    for (dotless, dotted) in &rules.domain_corrections {
        if domain.contains(dotless.as_str()) {
            domain = domain.replace(dotless.as_str(), dotted);
            repaired = true;
        }
    }

    if first_name.is_empty() || last_name.is_empty() || !is_well_formed_domain(&domain) {
        report.emails_blanked += 1;
        return String::new();
    }
    if repaired {
        report.email_domains_repaired += 1;
    }

    let expected = format!("{first_name}.{last_name}").to_lowercase();
    if local.trim() != expected {
        report.email_locals_rewritten += 1;
    }
    format!("{expected}@{domain}")
}

/// At least two non-empty dot-separated labels of letters, digits and hyphens.
fn is_well_formed_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
