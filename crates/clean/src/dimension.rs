//! Category and product lookup tables derived from resolved sales rows.

use std::collections::HashSet;

use retail_core::{CategoryRow, ProductRow, ProductVocabulary};

/// One row per distinct id, first-seen order. Rows without a name are skipped.
pub fn category_rows<'a, I>(pairs: I) -> Vec<CategoryRow>
where
    I: IntoIterator<Item = (i64, Option<&'a str>)>,
{
    first_per_id(pairs)
        .into_iter()
        .map(|(category_id, category_name)| CategoryRow {
            category_id,
            category_name,
        })
        .collect()
}

/// Like [`category_rows`], but the placeholder name and the unmapped id never
/// become dimension rows.
pub fn product_rows<'a, I>(pairs: I, vocabulary: &ProductVocabulary) -> Vec<ProductRow>
where
    I: IntoIterator<Item = (i64, Option<&'a str>)>,
{
    let resolved = pairs.into_iter().filter(|(id, name)| {
        *id != vocabulary.unmapped_id && *name != Some(vocabulary.placeholder.as_str())
    });
    first_per_id(resolved)
        .into_iter()
        .map(|(product_id, product_name)| ProductRow {
            product_id,
            product_name,
        })
        .collect()
}

// Deduping on the exact pair and then keeping the first pair per id reduces to
// keeping the first named pair per id.
fn first_per_id<'a, I>(pairs: I) -> Vec<(i64, String)>
where
    I: IntoIterator<Item = (i64, Option<&'a str>)>,
{
    let mut seen = HashSet::new();
    pairs
        .into_iter()
        .filter_map(|(id, name)| {
            let name = name?;
            seen.insert(id).then(|| (id, name.to_string()))
        })
        .collect()
}
