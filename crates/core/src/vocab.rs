//! Correction tables and closed vocabularies.
//!
//! Every table the normalizers consult lives here as data. `Vocabulary::default()`
//! carries the built-in tables; a TOML file can replace any section.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse vocabulary TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Duplicate {table} id: {id}")]
    DuplicateId { table: &'static str, id: i64 },
    #[error("Duplicate {table} name: {name}")]
    DuplicateName { table: &'static str, name: String },
    #[error("Id {id} is reserved for unmapped {table} values")]
    ReservedId { table: &'static str, id: i64 },
    #[error("Category pattern targets unknown category '{0}'")]
    UnknownPatternTarget(String),
    #[error("Match threshold must be within 0..=100, got {0}")]
    InvalidThreshold(f64),
    #[error("Email provider '{0}' must be a dotted domain")]
    InvalidProvider(String),
}

/// All lookup tables used by both pipelines.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub genders: GenderMap,
    pub names: NameCorrections,
    pub email: EmailRules,
    pub categories: CategoryVocabulary,
    pub products: ProductVocabulary,
}

impl Vocabulary {
    pub fn from_toml(toml_content: &str) -> Result<Self, VocabularyError> {
        let vocab: Vocabulary = toml::from_str(toml_content)?;
        vocab.validate()?;
        Ok(vocab)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, VocabularyError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), VocabularyError> {
        self.categories.validate()?;
        self.products.validate()?;
        self.email.validate()
    }
}

// ── Gender ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenderMap {
    /// Exact, case-sensitive source value → normalized code.
    pub mappings: HashMap<String, String>,
    /// Code used when the source value is missing.
    pub missing: String,
}

impl Default for GenderMap {
    fn default() -> Self {
        let mappings = [
            ("Male", "M"),
            ("male", "M"),
            ("Female", "F"),
            ("female", "F"),
            ("Unknown", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            mappings,
            missing: String::new(),
        }
    }
}

impl GenderMap {
    /// Values outside the table pass through untouched.
    pub fn normalize(&self, value: Option<&str>) -> String {
        match value {
            None => self.missing.clone(),
            Some(v) => self
                .mappings
                .get(v)
                .cloned()
                .unwrap_or_else(|| v.to_string()),
        }
    }
}

// ── Person names ──────────────────────────────────────────────────────────────

/// Known misspelling → canonical spelling, matched exactly after capitalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameCorrections {
    pub first_names: HashMap<String, String>,
    pub last_names: HashMap<String, String>,
}

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for NameCorrections {
    fn default() -> Self {
        Self {
            first_names: table(&[
                ("Anbhony", "Anthony"),
                ("Agthony", "Anthony"),
                ("Dorothj", "Dorothy"),
                ("Briln", "Brian"),
                ("Sawdra", "Sandra"),
                ("Melxssa", "Melissa"),
                ("Stelen", "Steven"),
                ("Charlfs", "Charles"),
                ("Jessicv", "Jessica"),
                ("Chmistopher", "Christopher"),
                ("Garbara", "Barbara"),
                ("Cetty", "Betty"),
                ("Pakl", "Paul"),
                ("Michaew", "Michael"),
            ]),
            last_names: table(&[
                ("Dasis", "Davis"),
                ("Moope", "Moore"),
                ("Taklor", "Taylor"),
                ("Anberson", "Anderson"),
                ("Write", "White"),
                ("Taompson", "Thompson"),
                ("Mooxe", "Moore"),
                ("Andsrson", "Anderson"),
                ("Johnskn", "Johnson"),
                ("Czark", "Clark"),
                ("Thompion", "Thompson"),
                ("Gsrcia", "Garcia"),
                ("Pvrez", "Perez"),
                ("Taytor", "Taylor"),
                ("Teylor", "Taylor"),
                ("Gonzoles", "Gonzales"),
                ("Rnderson", "Anderson"),
                ("Nnderson", "Anderson"),
                ("Willihms", "Williams"),
                ("Sancfez", "Sanchez"),
                ("Gonzaley", "Gonzales"),
                ("Dhvis", "Davis"),
                ("Lozez", "Lopez"),
            ]),
        }
    }
}

impl NameCorrections {
    pub fn first_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.first_names.get(name).map_or(name, String::as_str)
    }

    pub fn last_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.last_names.get(name).map_or(name, String::as_str)
    }
}

// ── Email ─────────────────────────────────────────────────────────────────────

/// Known mail providers as full domains (`gmail.com`). The dotless misspelling
/// (`gmailcom`) and the missing-`@` suffix repair are both derived from this list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailRules {
    pub providers: Vec<String>,
}

impl Default for EmailRules {
    fn default() -> Self {
        Self {
            providers: ["gmail.com", "yahoo.com", "outlook.com", "hotmail.com"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl EmailRules {
    fn validate(&self) -> Result<(), VocabularyError> {
        for provider in &self.providers {
            let valid = provider.contains('.')
                && !provider.starts_with('.')
                && !provider.ends_with('.')
                && !provider.contains('@');
            if !valid {
                return Err(VocabularyError::InvalidProvider(provider.clone()));
            }
        }
        Ok(())
    }

    /// `(dotless, dotted)` pairs, e.g. `("gmailcom", "gmail.com")`.
    pub fn domain_corrections(&self) -> Vec<(String, String)> {
        self.providers
            .iter()
            .map(|p| (p.replace('.', ""), p.to_lowercase()))
            .collect()
    }
}

// ── Categories ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: i64,
    pub name: String,
}

impl VocabularyEntry {
    fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

/// Any category name containing one of `fragments` is rewritten to `canonical`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPattern {
    pub canonical: String,
    pub fragments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryVocabulary {
    pub entries: Vec<VocabularyEntry>,
    /// Applied in order; the first pattern with a matching fragment wins.
    pub patterns: Vec<CategoryPattern>,
    pub unmapped_id: i64,
}

impl Default for CategoryVocabulary {
    fn default() -> Self {
        let pattern = |canonical: &str, fragments: &[&str]| CategoryPattern {
            canonical: canonical.to_string(),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        };
        Self {
            entries: vec![
                VocabularyEntry::new(1, "Electronics"),
                VocabularyEntry::new(2, "Furniture"),
                VocabularyEntry::new(3, "Stationery"),
                VocabularyEntry::new(4, "Grocery"),
            ],
            patterns: vec![
                pattern("Furniture", &["Furni", "ture"]),
                pattern("Electronics", &["Elec", "Electr", "tronics"]),
                pattern("Stationery", &["Stati", "onery"]),
                pattern("Grocery", &["Gro", "cery"]),
            ],
            unmapped_id: 0,
        }
    }
}

impl CategoryVocabulary {
    pub fn name_for(&self, id: i64) -> Option<&str> {
        name_for(&self.entries, id)
    }

    pub fn id_for(&self, name: &str) -> Option<i64> {
        id_for(&self.entries, name)
    }

    /// Fragment-based correction of a title-cased category name.
    pub fn correct<'a>(&'a self, name: &'a str) -> &'a str {
        self.patterns
            .iter()
            .find(|p| p.fragments.iter().any(|f| name.contains(f.as_str())))
            .map_or(name, |p| p.canonical.as_str())
    }

    fn validate(&self) -> Result<(), VocabularyError> {
        validate_entries("category", &self.entries, self.unmapped_id)?;
        for p in &self.patterns {
            if self.id_for(&p.canonical).is_none() {
                return Err(VocabularyError::UnknownPatternTarget(p.canonical.clone()));
            }
        }
        Ok(())
    }
}

// ── Products ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductVocabulary {
    /// Declaration order doubles as the fuzzy-match tie-break order.
    pub entries: Vec<VocabularyEntry>,
    /// Name given to sales rows with no product information at all.
    pub placeholder: String,
    pub unmapped_id: i64,
    /// A fuzzy candidate is accepted only when its score is strictly above this.
    pub match_threshold: f64,
}

impl Default for ProductVocabulary {
    fn default() -> Self {
        Self {
            entries: vec![
                VocabularyEntry::new(401, "Coffee Beans 1Kg"),
                VocabularyEntry::new(102, "Mechanical Keyboard"),
                VocabularyEntry::new(201, "Office Chair"),
                VocabularyEntry::new(202, "Standing Desk"),
                VocabularyEntry::new(103, "USB-C Cable"),
                VocabularyEntry::new(303, "Highlighter Set"),
                VocabularyEntry::new(301, "Notebook A5"),
                VocabularyEntry::new(302, "Ballpoint Pen"),
                VocabularyEntry::new(402, "Green Tea Box"),
                VocabularyEntry::new(101, "Wireless Mouse"),
            ],
            placeholder: "Unknown".to_string(),
            unmapped_id: 0,
            match_threshold: 85.0,
        }
    }
}

impl ProductVocabulary {
    pub fn name_for(&self, id: i64) -> Option<&str> {
        name_for(&self.entries, id)
    }

    pub fn id_for(&self, name: &str) -> Option<i64> {
        id_for(&self.entries, name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    fn validate(&self) -> Result<(), VocabularyError> {
        validate_entries("product", &self.entries, self.unmapped_id)?;
        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(VocabularyError::InvalidThreshold(self.match_threshold));
        }
        Ok(())
    }
}

fn name_for(entries: &[VocabularyEntry], id: i64) -> Option<&str> {
    entries.iter().find(|e| e.id == id).map(|e| e.name.as_str())
}

fn id_for(entries: &[VocabularyEntry], name: &str) -> Option<i64> {
    entries.iter().find(|e| e.name == name).map(|e| e.id)
}

fn validate_entries(
    table: &'static str,
    entries: &[VocabularyEntry],
    unmapped_id: i64,
) -> Result<(), VocabularyError> {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for e in entries {
        if e.id == unmapped_id {
            return Err(VocabularyError::ReservedId { table, id: e.id });
        }
        if !ids.insert(e.id) {
            return Err(VocabularyError::DuplicateId { table, id: e.id });
        }
        if !names.insert(e.name.as_str()) {
            return Err(VocabularyError::DuplicateName {
                table,
                name: e.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary_is_valid() {
        Vocabulary::default().validate().unwrap();
    }

    #[test]
    fn gender_table_and_passthrough() {
        let g = GenderMap::default();
        assert_eq!(g.normalize(Some("male")), "M");
        assert_eq!(g.normalize(Some("Female")), "F");
        assert_eq!(g.normalize(Some("Unknown")), "");
        assert_eq!(g.normalize(None), "");
        assert_eq!(g.normalize(Some("MALE")), "MALE");
        assert_eq!(g.normalize(Some("M")), "M");
    }

    #[test]
    fn name_corrections_are_exact_and_case_sensitive() {
        let n = NameCorrections::default();
        assert_eq!(n.first_name("Anbhony"), "Anthony");
        assert_eq!(n.first_name("anbhony"), "anbhony");
        assert_eq!(n.last_name("Write"), "White");
        assert_eq!(n.last_name("Davis"), "Davis");
    }

    #[test]
    fn category_lookup_both_ways() {
        let c = CategoryVocabulary::default();
        assert_eq!(c.name_for(3), Some("Stationery"));
        assert_eq!(c.id_for("Grocery"), Some(4));
        assert_eq!(c.name_for(9), None);
        assert_eq!(c.id_for("grocery"), None);
    }

    #[test]
    fn category_patterns_apply_in_order() {
        let c = CategoryVocabulary::default();
        assert_eq!(c.correct("Furnture Items"), "Furniture");
        assert_eq!(c.correct("Electrnics"), "Electronics");
        assert_eq!(c.correct("Statonery"), "Stationery");
        assert_eq!(c.correct("Grocry"), "Grocery");
        assert_eq!(c.correct("Toys"), "Toys");
    }

    #[test]
    fn email_domain_corrections_are_derived() {
        let e = EmailRules::default();
        assert!(e
            .domain_corrections()
            .contains(&("gmailcom".to_string(), "gmail.com".to_string())));
    }

    #[test]
    fn from_toml_overrides_one_section() {
        let vocab = Vocabulary::from_toml(
            r#"
            [products]
            match_threshold = 90.0

            [[products.entries]]
            id = 7
            name = "Desk Lamp"
            "#,
        )
        .unwrap();
        assert_eq!(vocab.products.entries.len(), 1);
        assert_eq!(vocab.products.id_for("Desk Lamp"), Some(7));
        assert_eq!(vocab.products.placeholder, "Unknown");
        assert_eq!(vocab.categories.entries.len(), 4);
    }

    #[test]
    fn from_toml_rejects_duplicate_ids() {
        let err = Vocabulary::from_toml(
            r#"
            [[products.entries]]
            id = 7
            name = "Desk Lamp"

            [[products.entries]]
            id = 7
            name = "Floor Lamp"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, VocabularyError::DuplicateId { id: 7, .. }));
    }

    #[test]
    fn from_toml_rejects_reserved_id() {
        let err = Vocabulary::from_toml(
            r#"
            [[categories.entries]]
            id = 0
            name = "Misc"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, VocabularyError::ReservedId { id: 0, .. }));
    }

    #[test]
    fn from_toml_rejects_pattern_without_entry() {
        let err = Vocabulary::from_toml(
            r#"
            [[categories.patterns]]
            canonical = "Toys"
            fragments = ["Toy"]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, VocabularyError::UnknownPatternTarget(_)));
    }
}
