// src/common/validation.rs

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

/// Builds a single-field `ValidationErrors`, for rules the derive can't express.
pub fn field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<Cow<'static, str>>,
) -> ValidationErrors {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());

    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

/// Identifiers are BIGSERIAL, so anything below 1 can never match a row.
pub fn ensure_positive_id(field: &'static str, id: i64) -> Result<(), ValidationErrors> {
    if id <= 0 {
        return Err(field_error(field, "range", format!("{field} must be a positive integer")));
    }
    Ok(())
}
