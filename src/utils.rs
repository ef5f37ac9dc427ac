// Utility functions
use chrono::NaiveDate;

const HIGHLIGHT_OPEN: &str = "<b>";
const HIGHLIGHT_CLOSE: &str = "</b>";

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_period(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").ok()
}

/// Parses a compact 8-digit `YYYYMMDD` date.
pub fn parse_compact_date(date_str: &str) -> Option<NaiveDate> {
    let s = date_str.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

/// Removes the search highlight markers upstream wraps around matched terms.
/// Only the literal `<b>` and `</b>` strings are removed; other markup stays.
pub fn strip_highlight(text: &str) -> String {
    text.replace(HIGHLIGHT_OPEN, "").replace(HIGHLIGHT_CLOSE, "")
}

/// Reads a price that upstream sends as a decimal string.
/// Thousands separators, currency signs and empty strings give `None`.
pub fn coerce_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}
