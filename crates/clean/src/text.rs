//! Whitespace and casing helpers shared by both normalizers.

/// Trims and treats an all-blank value as missing.
pub fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Upper-cases the first character and lower-cases the rest: `"dAVIS"` → `"Davis"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// Upper-cases every cased character that follows an uncased one and lower-cases
/// the rest, so digits and punctuation start new words: `"usb-c cable"` →
/// `"Usb-C Cable"`, `"coffee beans 1kg"` → `"Coffee Beans 1Kg"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if is_cased(c) {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

/// Drops every leading non-digit character: `"TXN-00042"` → `"00042"`.
pub fn strip_non_digit_prefix(s: &str) -> &str {
    s.trim_start_matches(|c: char| !c.is_ascii_digit())
}
