// ABOUTME: Input validation utilities for API request handlers
// ABOUTME: Field presence, numeric ranges and currency-code shape checks

use regex::Regex;
use std::sync::OnceLock;

use crate::storage::StorageError;

/// Maximum size for free-text fields (subject, message, description)
pub const MAX_TEXT_SIZE: usize = 10 * 1024;

/// Maximum size for short identifier-like fields
pub const MAX_NAME_SIZE: usize = 500;

fn currency_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{3}$").expect("valid currency regex"))
}

/// Validate a required free-text field: present, trimmed, bounded, no null bytes
pub fn validate_required_text(value: &str, field: &str) -> Result<String, StorageError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(StorageError::InvalidInput(format!(
            "{} cannot be empty",
            field
        )));
    }

    if trimmed.len() > MAX_TEXT_SIZE {
        return Err(StorageError::InvalidInput(format!(
            "{} exceeds maximum size of {} bytes",
            field, MAX_TEXT_SIZE
        )));
    }

    if trimmed.contains('\0') {
        return Err(StorageError::InvalidInput(format!(
            "{} contains invalid null bytes",
            field
        )));
    }

    Ok(trimmed.to_string())
}

/// Validate a required short name field
pub fn validate_required_name(value: &str, field: &str) -> Result<String, StorageError> {
    let trimmed = validate_required_text(value, field)?;

    if trimmed.len() > MAX_NAME_SIZE {
        return Err(StorageError::InvalidInput(format!(
            "{} exceeds maximum size of {} characters",
            field, MAX_NAME_SIZE
        )));
    }

    Ok(trimmed)
}

/// Ratings are constrained to 1-5 when present
pub fn validate_rating(rating: Option<i64>) -> Result<(), StorageError> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(StorageError::InvalidInput(format!(
            "Rating must be between 1 and 5 (got {})",
            r
        ))),
        _ => Ok(()),
    }
}

/// Currency codes must look like ISO 4217 ("USD", "EUR")
pub fn validate_currency_code(code: &str) -> Result<String, StorageError> {
    let trimmed = code.trim();

    if !currency_pattern().is_match(trimmed) {
        return Err(StorageError::InvalidInput(format!(
            "Invalid currency code: {}",
            trimmed
        )));
    }

    Ok(trimmed.to_string())
}

/// Money amounts must be positive and finite
pub fn validate_amount(amount: f64) -> Result<(), StorageError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(StorageError::InvalidInput(format!(
            "Amount must be a positive number (got {})",
            amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("hello", "Subject").is_ok());
        assert!(validate_required_text("", "Subject").is_err());
        assert!(validate_required_text("   ", "Subject").is_err());
        assert!(validate_required_text("a\0b", "Subject").is_err());
        assert!(validate_required_text(&"a".repeat(MAX_TEXT_SIZE + 1), "Subject").is_err());
    }

    #[test]
    fn test_required_text_trims() {
        let result = validate_required_text("  spaced  ", "Subject").unwrap();
        assert_eq!(result, "spaced");
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(None).is_ok());
        assert!(validate_rating(Some(1)).is_ok());
        assert!(validate_rating(Some(5)).is_ok());
        assert!(validate_rating(Some(0)).is_err());
        assert!(validate_rating(Some(6)).is_err());
    }

    #[test]
    fn test_currency_code_shape() {
        assert_eq!(validate_currency_code("USD").unwrap(), "USD");
        assert_eq!(validate_currency_code(" EUR ").unwrap(), "EUR");
        assert!(validate_currency_code("usd").is_err());
        assert!(validate_currency_code("DOLLARS").is_err());
        assert!(validate_currency_code("").is_err());
    }

    #[test]
    fn test_amount_positive() {
        assert!(validate_amount(10.5).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-3.0).is_err());
        assert!(validate_amount(f64::NAN).is_err());
    }
}
