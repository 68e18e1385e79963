use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
pub enum ParseDecimalError {
    #[error("value is empty")]
    Empty,

    #[error("invalid number '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: rust_decimal::Error,
    },
}

/// Trims whitespace and strips `,` and `_` digit separators, so Indian-style
/// grouping such as `1,00,000` parses.
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace([',', '_'], "")
}

/// Parses a monetary or area figure typed on the command line.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Err(ParseDecimalError::Empty);
    }
    normalized.parse().map_err(|source| {
        tracing::debug!(input = %s, "rejected decimal argument");
        ParseDecimalError::Invalid {
            input: s.to_string(),
            source,
        }
    })
}

/// Formats `value` as rupees, rounded to whole units, with Indian digit
/// grouping: `₹2,83,224`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round();
    let digits = rounded.abs().trunc().to_string();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}₹{}", group_indian(&digits))
}

/// Last three digits, then groups of two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{tail}", groups.join(","))
}

/// Formats an optional [`Decimal`] for display, using "—" when `None`.
pub fn opt_decimal_display(d: Option<Decimal>, suffix: &str) -> String {
    d.map(|v| format!("{v}{suffix}"))
        .unwrap_or_else(|| "—".to_string())
}
