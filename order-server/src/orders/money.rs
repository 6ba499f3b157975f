//! Input validation for monetary and quantity fields
//!
//! Totals themselves are plain `Decimal` sums (see `Order::lines_total`);
//! this module only guards what callers may send in.

use rust_decimal::Decimal;
use shared::order::OrderLineInput;

use super::OrderError;

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;
/// Maximum lines in one placement / append request
pub const MAX_LINES_PER_REQUEST: usize = 100;
/// Maximum surcharge amount
const MAX_SURCHARGE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);
/// Decimal places money columns keep
pub const MONEY_SCALE: u32 = 2;
/// Maximum note length (characters)
const MAX_NOTE_LEN: usize = 200;

pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::Invalid(format!(
            "quantity must be positive, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Invalid(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

fn validate_note(note: Option<&str>, field: &str) -> Result<(), OrderError> {
    if let Some(n) = note
        && n.chars().count() > MAX_NOTE_LEN
    {
        return Err(OrderError::Invalid(format!(
            "{field} exceeds {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate requested lines before any lookup happens
pub fn validate_lines(lines: &[OrderLineInput]) -> Result<(), OrderError> {
    if lines.is_empty() {
        return Err(OrderError::Empty);
    }
    if lines.len() > MAX_LINES_PER_REQUEST {
        return Err(OrderError::Invalid(format!(
            "too many items in one request (max {MAX_LINES_PER_REQUEST})"
        )));
    }
    for line in lines {
        validate_quantity(line.quantity)?;
        validate_note(line.note.as_deref(), "note")?;
    }
    Ok(())
}

pub fn validate_surcharge(amount: Decimal, note: Option<&str>) -> Result<(), OrderError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(OrderError::Invalid(format!(
            "surcharge must be non-negative, got {amount}"
        )));
    }
    if amount > MAX_SURCHARGE {
        return Err(OrderError::Invalid(format!(
            "surcharge exceeds maximum allowed ({MAX_SURCHARGE})"
        )));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(OrderError::Invalid(format!(
            "surcharge allows at most {MONEY_SCALE} decimal places, got {amount}"
        )));
    }
    validate_note(note, "surcharge note")
}
