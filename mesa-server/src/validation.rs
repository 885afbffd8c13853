//! Input validation helpers
//!
//! Text length limits and checks shared by the request handlers.

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderLineInput;

/// Entity names: product, category, table, zone, driver, customer
pub const MAX_NAME_LEN: usize = 200;

/// Notes and descriptions
pub const MAX_NOTE_LEN: usize = 500;

/// Phones, coupon codes, slugs
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

pub const MIN_PASSWORD_LEN: usize = 8;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

pub const MAX_ADDRESS_LEN: usize = 500;

/// Upper bound for any money field
pub const MAX_MONEY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Lines per order submission
pub const MAX_ORDER_LINES: usize = 100;

/// Units of one product in a single line
pub const MAX_LINE_QUANTITY: i32 = 999;

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Money fields must be non-negative, at most [`MAX_MONEY`], with at most 2 decimal places.
pub fn validate_money(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.is_sign_negative() || value.scale() > 2 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must be a non-negative amount with at most 2 decimals"),
        )
        .with_detail("field", field));
    }
    if value > MAX_MONEY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("{field} must not exceed {MAX_MONEY}"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::validation("Invalid email").with_detail("field", "email"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a batch of order lines (PDV additions and online orders).
pub fn validate_lines(lines: &[OrderLineInput]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    if lines.len() > MAX_ORDER_LINES {
        return Err(AppError::validation(format!(
            "too many lines ({}, max {MAX_ORDER_LINES})",
            lines.len()
        )));
    }
    for line in lines {
        if !(1..=MAX_LINE_QUANTITY).contains(&line.quantity) {
            return Err(AppError::new(ErrorCode::InvalidQuantity)
                .with_detail("product_id", line.product_id)
                .with_detail("quantity", line.quantity));
        }
        validate_optional_text(&line.notes, "notes", MAX_NOTE_LEN)?;
    }
    Ok(())
}
