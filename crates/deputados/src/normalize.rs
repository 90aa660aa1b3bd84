use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberFormatError {
    #[error("Invalid amount: '{0}'")]
    InvalidAmount(String),
    #[error("Invalid count: '{0}'")]
    InvalidCount(String),
    #[error("No currency marker in '{0}'")]
    MissingCurrency(String),
}

pub const CURRENCY_MARKER: &str = "R$";

// Either a grouped integer part ("1.234.567") or a plain one ("1234567"),
// followed by an optional comma fraction.
static RE_BRL_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(\d{1,3}(\.\d{3})+|\d+)(,\d+)?$").expect("invalid regex: brl number")
});

/// Parses a Brazilian formatted number ("1.234,56") into a float.
pub fn parse_brl_number(text: &str) -> Result<f64, NumberFormatError> {
    let trimmed = text.trim();
    if !RE_BRL_NUMBER.is_match(trimmed) {
        return Err(NumberFormatError::InvalidAmount(trimmed.to_string()));
    }

    trimmed
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| NumberFormatError::InvalidAmount(trimmed.to_string()))
}

/// Returns the trimmed text following the currency marker.
pub fn strip_currency(text: &str) -> Result<&str, NumberFormatError> {
    text.split_once(CURRENCY_MARKER)
        .map(|(_, amount)| amount.trim())
        .ok_or_else(|| NumberFormatError::MissingCurrency(text.trim().to_string()))
}

/// Parses the leading integer of texts such as "90 dias".
pub fn parse_leading_count(text: &str) -> Result<u32, NumberFormatError> {
    let trimmed = text.trim();
    trimmed
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| NumberFormatError::InvalidCount(trimmed.to_string()))
}
