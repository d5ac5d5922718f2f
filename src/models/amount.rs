use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a user- or file-supplied money string. Accepts `$`, thousands
/// separators, surrounding quotes and accounting-style `(12.00)` negatives.
pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ','], "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_str(cleaned.replace('"', "").trim()))
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .with_context(|| format!("Failed to parse '{s}' as decimal"))
}

/// Amounts are never negative: anything negative becomes 0.
pub(crate) fn clamp_amount(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}

/// Turn arbitrary input into a stored amount. Non-numeric or negative input
/// becomes 0 rather than an error.
pub(crate) fn coerce_amount(raw: &str) -> Decimal {
    match parse_decimal(raw) {
        Ok(amount) => clamp_amount(amount),
        Err(e) => {
            tracing::debug!(input = raw, error = %e, "coercing non-numeric amount to 0");
            Decimal::ZERO
        }
    }
}
