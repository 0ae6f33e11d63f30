pub mod bookings;
pub mod inquiries;
pub mod notifications;

use crate::errors::AppError;

/// Trimmed value of a field that must not be blank.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("Missing required field: {field}")));
    }
    Ok(value)
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
