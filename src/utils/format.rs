//! Number formatting for embeds and tables

/// Fixed-decimal price, `n/a` when absent or not finite
pub fn price(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => "n/a".to_string(),
    }
}

/// Price with an explicit sign
pub fn signed(value: f64, decimals: usize) -> String {
    if value.is_finite() {
        format!("{:+.*}", decimals, value)
    } else {
        "n/a".to_string()
    }
}

/// Parse a user-supplied number, accepting `,` thousands separators
pub fn parse_number(raw: &str, name: &str) -> Result<f64, String> {
    raw.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("❌ Invalid {}: '{}'", name, raw))
}
