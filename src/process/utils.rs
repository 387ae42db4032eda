/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// Parse a numeric cell. Empty, non-numeric and non-finite cells are `None`.
pub fn parse_f64(raw: &str) -> Option<f64> {
    let s = clean_str(raw);
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative count cell such as `bike_rides_daily`. Accepts
/// integral floats ("12.0") since pandas exports write them that way.
/// Values beyond `u64` are unparseable, not clamped.
pub fn parse_count(raw: &str) -> Option<u64> {
    let s = clean_str(raw);
    if let Ok(v) = s.parse::<u64>() {
        return Some(v);
    }
    // u64::MAX as f64 rounds up to 2^64, which itself does not fit.
    parse_f64(s)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v < u64::MAX as f64)
        .map(|v| v as u64)
}

/// Thousands-separated integer rendering, e.g. `1234567` → `"1,234,567"`.
pub fn fmt_int(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
