//! Lenient parsing of path and query parameters.

use axum::extract::Query;
use veille_core::FactId;

/// Raw query string pairs; a repeated key resolves to its last value.
pub(crate) type RawQuery = Query<Vec<(String, String)>>;

pub(crate) fn last_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .rev()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Parses a path segment of ASCII digits; anything else is not an id.
pub(crate) fn parse_fact_id(raw: &str) -> Option<FactId> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Reads a numeric query value the permissive way: leading integer prefix,
/// `0` when there is none, saturating on overflow. Absent stays `None`.
pub(crate) fn lenient_int(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let mut parsed: i64 = 0;
    for byte in digits.bytes().take_while(u8::is_ascii_digit) {
        parsed = parsed
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }
    Some(if negative { -parsed } else { parsed })
}
