//! Shared validation helpers for request payloads.
//!
//! Payload structs derive [`validator::Validate`]; [`validate_payload`] turns
//! the collected field errors into a single [`CoreError::Validation`] listing
//! every failing field, sorted by field name.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::types::Date;

/// Custom validator: the value must contain at least one non-whitespace character.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(Cow::Borrowed("must not be blank"));
        return Err(err);
    }
    Ok(())
}

/// Run derived validation and map failures to [`CoreError::Validation`].
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), CoreError> {
    payload
        .validate()
        .map_err(|errors| CoreError::Validation(describe_errors(&errors)))
}

fn describe_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{field}: {}", messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

/// An appraisal period must not end before it starts.
pub fn validate_period(start_date: Date, end_date: Date) -> Result<(), CoreError> {
    if end_date < start_date {
        return Err(CoreError::Validation(format!(
            "end_date: must not be before start_date ({start_date})"
        )));
    }
    Ok(())
}

/// Trim surrounding whitespace, collapsing blank strings to `None`.
pub fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
