//! Approximate matching of free-text product names against the product vocabulary.

use std::collections::BTreeSet;

use retail_core::ProductVocabulary;

use crate::util::{partial_ratio, ratio};

/// Token-based comparisons are discounted slightly so an exact character-level
/// match always outranks a reordered one.
const TOKEN_SCALE: f64 = 0.95;

/// Length ratio from which substring alignment is scored.
const PARTIAL_FROM: f64 = 1.5;
const PARTIAL_SCALE: f64 = 0.9;
/// Used instead of `PARTIAL_SCALE` when one side is more than this many times longer.
const LONG_PARTIAL_FROM: f64 = 8.0;
const LONG_PARTIAL_SCALE: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub enum ProductMatch<'a> {
    /// The best candidate cleared the threshold.
    Matched { name: &'a str, score: f64 },
    /// No candidate cleared the threshold; the input should be kept as-is.
    Unmatched { best_score: f64 },
}

struct Candidate {
    name: String,
    processed: String,
}

/// Resolves noisy product names to the closest vocabulary entry.
///
/// Candidates are scored in vocabulary declaration order and a later candidate
/// only displaces the current best with a strictly higher score, so ties go to
/// the entry declared first.
pub struct ProductMatcher {
    candidates: Vec<Candidate>,
    threshold: f64,
}

impl ProductMatcher {
    pub fn new(vocabulary: &ProductVocabulary) -> Self {
        let candidates = vocabulary
            .names()
            .map(|name| Candidate {
                name: name.to_string(),
                processed: normalize(name),
            })
            .collect();
        Self {
            candidates,
            threshold: vocabulary.match_threshold,
        }
    }

    pub fn find_match(&self, input: &str) -> ProductMatch<'_> {
        let query = normalize(input);

        let mut best: Option<(&Candidate, f64)> = None;
        for candidate in &self.candidates {
            let score = similarity(&query, &candidate.processed);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }

        match best {
            Some((candidate, score)) if score > self.threshold => ProductMatch::Matched {
                name: &candidate.name,
                score,
            },
            Some((_, score)) => ProductMatch::Unmatched { best_score: score },
            None => ProductMatch::Unmatched { best_score: 0.0 },
        }
    }

    /// The canonical name for `input`, or `input` itself when nothing is close enough.
    pub fn resolve<'a>(&'a self, input: &'a str) -> &'a str {
        match self.find_match(input) {
            ProductMatch::Matched { name, .. } => name,
            ProductMatch::Unmatched { .. } => input,
        }
    }
}

/// Weighted similarity in `[0, 100]` between two pre-normalized strings,
/// rounded to a whole score.
///
/// Strings of similar length take the best of the plain ratio and the
/// discounted token-sort and token-set ratios. When one side is at least half
/// as long again as the other, the best-aligned substring is scored instead of
/// token order, discounted by how lopsided the lengths are.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (la, lb) = (a.chars().count() as f64, b.chars().count() as f64);
    let len_ratio = la.max(lb) / la.min(lb);

    let score = if len_ratio < PARTIAL_FROM {
        ratio(a, b)
            .max(token_sort_ratio(a, b) * TOKEN_SCALE)
            .max(token_set_ratio(a, b) * TOKEN_SCALE)
    } else {
        let scale = if len_ratio > LONG_PARTIAL_FROM {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        ratio(a, b)
            .max(partial_ratio(a, b) * scale)
            .max(partial_token_sort_ratio(a, b) * TOKEN_SCALE * scale)
            .max(partial_token_set_ratio(a, b) * TOKEN_SCALE * scale)
    };
    score.round_ties_even()
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Compares the shared tokens against each side's shared-plus-remaining tokens,
/// so a name that is a token subset of another scores 100.
fn token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let sect = join(ta.intersection(&tb).copied().collect());
    let only_a = join(ta.difference(&tb).copied().collect());
    let only_b = join(tb.difference(&ta).copied().collect());

    let combine = |rest: &str| format!("{sect} {rest}").trim().to_string();
    let combined_a = combine(&only_a);
    let combined_b = combine(&only_b);

    ratio(&sect, &combined_a)
        .max(ratio(&sect, &combined_b))
        .max(ratio(&combined_a, &combined_b))
}

fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Any shared token is a full match; otherwise the leftover tokens are
/// aligned as substrings.
fn partial_token_set_ratio(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    if !ta.is_disjoint(&tb) {
        return 100.0;
    }
    let only_a: Vec<&str> = ta.difference(&tb).copied().collect();
    let only_b: Vec<&str> = tb.difference(&ta).copied().collect();
    partial_ratio(&only_a.join(" "), &only_b.join(" "))
}

/// Lowercase alphanumeric words separated by single spaces.
fn normalize(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
