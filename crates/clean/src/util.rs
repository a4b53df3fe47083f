/// Indel distance (insertions and deletions only) via the two-row LCS table.
/// A substitution therefore costs 2.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_len(a, b)
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // Keep the shorter string in the inner loop to minimise allocation.
    let (a, b) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let n = b.len();

    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for ca in a {
        for j in 1..=n {
            curr[j] = if *ca == b[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized Indel similarity in `[0, 100]`. Two empty strings score 0, so an
/// empty input never looks like a match.
pub fn ratio(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    char_ratio(&a, &b)
}

fn char_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    100.0 * (1.0 - indel_distance(a, b) as f64 / total as f64)
}

/// Best [`ratio`] of the shorter string against any window of the longer one
/// with the shorter one's length. Windows running off either end are cut short.
pub fn partial_ratio(s1: &str, s2: &str) -> f64 {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0.0;
    }

    let m = short.len();
    let prefixes = (1..m).map(|end| &long[..end]);
    let suffixes = (long.len() + 1 - m..long.len()).map(|start| &long[start..]);

    let mut best = 0.0_f64;
    for window in prefixes.chain(long.windows(m)).chain(suffixes) {
        best = best.max(char_ratio(&short, window));
        if best >= 100.0 {
            break;
        }
    }
    best
}
