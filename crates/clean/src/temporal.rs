//! Permissive date and time parsing for hand-keyed spreadsheet columns.
//!
//! Anything that cannot be read unambiguously as a real calendar date or wall
//! clock time comes back as `None`; callers treat that as a missing value.

use chrono::{NaiveDate, NaiveTime};

const TEXTUAL_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%a, %d %b %Y",
];

/// Parses a date written in any of the common spreadsheet layouts.
///
/// Numeric dates with a four-digit leading field are year-first. Otherwise the
/// month comes first, falling back to day-first when the month would be out of
/// range (`03/04/2023` is March 4th, `13/04/2023` is April 13th). Two-digit
/// years pivot at 70. Trailing time-of-day components are ignored.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = parse_numeric_date(s) {
        return Some(date);
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let num = |r: std::ops::Range<usize>| s[r].parse::<u32>().ok();
        return NaiveDate::from_ymd_opt(num(0..4)? as i32, num(4..6)?, num(6..8)?);
    }

    for fmt in TEXTUAL_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    // `2024-01-15T10:30:00`, `2024-01-15 10:30`, `01/15/2024 9:00 AM`
    if let Some((head, tail)) = s.split_once(['T', ' ']) {
        if tail.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
            return parse_numeric_date(head);
        }
    }

    None
}

fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['-', '/', '.']).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    let num = |p: &str| p.parse::<u32>().ok();
    let (a, b, c) = (num(parts[0])?, num(parts[1])?, num(parts[2])?);

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(a as i32, b, c);
    }

    let year = match parts[2].len() {
        4 => c as i32,
        1 | 2 => expand_two_digit_year(c),
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, a, b).or_else(|| NaiveDate::from_ymd_opt(year, b, a))
}

fn expand_two_digit_year(yy: u32) -> i32 {
    if yy < 70 {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// Parses a time of day after rewriting every non-digit to `:`.
///
/// Accepts `H:M`, `H:M:S` (a fourth fractional-seconds group is dropped) and the
/// compact `HHMM` / `HHMMSS` forms. Empty groups from runs of separators are
/// ignored, so `14.30.00`, `14-30` and `1430` all parse.
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let rewritten: String = value
        .trim()
        .chars()
        .map(|c| if c.is_ascii_digit() { c } else { ':' })
        .collect();
    let groups: Vec<&str> = rewritten.split(':').filter(|g| !g.is_empty()).collect();

    let num = |g: &str| g.parse::<u32>().ok();
    match groups[..] {
        [compact] => parse_compact_time(compact),
        [h, m] if h.len() <= 2 && m.len() <= 2 => NaiveTime::from_hms_opt(num(h)?, num(m)?, 0),
        [h, m, s] | [h, m, s, _] if h.len() <= 2 && m.len() <= 2 && s.len() <= 2 => {
            NaiveTime::from_hms_opt(num(h)?, num(m)?, num(s)?)
        }
        _ => None,
    }
}

fn parse_compact_time(digits: &str) -> Option<NaiveTime> {
    let num = |g: &str| g.parse::<u32>().ok();
    match digits.len() {
        3 | 4 => {
            let split = digits.len() - 2;
            NaiveTime::from_hms_opt(num(&digits[..split])?, num(&digits[split..])?, 0)
        }
        5 | 6 => {
            let split = digits.len() - 4;
            NaiveTime::from_hms_opt(
                num(&digits[..split])?,
                num(&digits[split..split + 2])?,
                num(&digits[split + 2..])?,
            )
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    // ── parse_date ────────────────────────────────────────────────────────────

    #[test]
    fn parse_date_iso_and_slashed() {
        assert_eq!(parse_date("2023-02-28"), Some(d(2023, 2, 28)));
        assert_eq!(parse_date("2023/2/8"), Some(d(2023, 2, 8)));
        assert_eq!(parse_date(" 2023.12.01 "), Some(d(2023, 12, 1)));
        assert_eq!(parse_date("20230115"), Some(d(2023, 1, 15)));
    }

    #[test]
    fn parse_date_month_first_then_day_first() {
        assert_eq!(parse_date("03/04/2023"), Some(d(2023, 3, 4)));
        assert_eq!(parse_date("13/04/2023"), Some(d(2023, 4, 13)));
        assert_eq!(parse_date("12-31-2024"), Some(d(2024, 12, 31)));
    }

    #[test]
    fn parse_date_two_digit_year() {
        assert_eq!(parse_date("01/15/24"), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("01/15/99"), Some(d(1999, 1, 15)));
    }

    #[test]
    fn parse_date_textual_months() {
        assert_eq!(parse_date("March 5, 2023"), Some(d(2023, 3, 5)));
        assert_eq!(parse_date("5 Mar 2023"), Some(d(2023, 3, 5)));
        assert_eq!(parse_date("05-Mar-2023"), Some(d(2023, 3, 5)));
    }

    #[test]
    fn parse_date_drops_time_component() {
        assert_eq!(parse_date("2024-01-15T10:30:00"), Some(d(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15 10:30"), Some(d(2024, 1, 15)));
    }

    #[test]
    fn parse_date_rejects_impossible_dates() {
        assert_eq!(parse_date("2023/02/30"), None);
        assert_eq!(parse_date("31/31/2023"), None);
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
    }

    // ── parse_time ────────────────────────────────────────────────────────────

    #[test]
    fn parse_time_separators() {
        assert_eq!(parse_time("14:30:00"), Some(t(14, 30, 0)));
        assert_eq!(parse_time("14.30.00"), Some(t(14, 30, 0)));
        assert_eq!(parse_time(" 9-05 "), Some(t(9, 5, 0)));
        assert_eq!(parse_time("14:30:00.250"), Some(t(14, 30, 0)));
    }

    #[test]
    fn parse_time_compact() {
        assert_eq!(parse_time("1430"), Some(t(14, 30, 0)));
        assert_eq!(parse_time("930"), Some(t(9, 30, 0)));
        assert_eq!(parse_time("143015"), Some(t(14, 30, 15)));
    }

    #[test]
    fn parse_time_rejects_out_of_range() {
        assert_eq!(parse_time("25:00"), None);
        assert_eq!(parse_time("12:61:00"), None);
        assert_eq!(parse_time("noon"), None);
        assert_eq!(parse_time("7"), None);
        assert_eq!(parse_time(""), None);
    }
}
