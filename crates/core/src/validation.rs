//! Input validation utilities.
//!
//! The engine accepts any well-typed input. These checks are the intake rules a caller
//! applies before handing a request to the engine.

use crate::constants::{ACCEPTED_GENDERS, MAX_AGE_EXCLUSIVE, MIN_AGE_EXCLUSIVE};
use crate::request::TriageRequest;
use crate::{CoreError, CoreResult};

/// Validates a triage request against intake rules.
///
/// - age must lie strictly between 0 and 120
/// - gender must be `male`, `female` or `other` (any case)
///
/// # Errors
///
/// Returns a `CoreError::InvalidInput` describing the first failing rule.
pub fn validate_triage_request(request: &TriageRequest) -> CoreResult<()> {
    validate_age(request.age)?;
    validate_gender(&request.gender)?;
    Ok(())
}

pub fn validate_age(age: i32) -> CoreResult<()> {
    if age <= MIN_AGE_EXCLUSIVE || age >= MAX_AGE_EXCLUSIVE {
        return Err(CoreError::InvalidInput(format!(
            "age must be between {} and {} exclusive, got {age}",
            MIN_AGE_EXCLUSIVE, MAX_AGE_EXCLUSIVE
        )));
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> CoreResult<()> {
    let normalised = gender.trim().to_ascii_lowercase();
    if !ACCEPTED_GENDERS.contains(&normalised.as_str()) {
        return Err(CoreError::InvalidInput(format!(
            "gender must be one of {}, got {gender:?}",
            ACCEPTED_GENDERS.join(", ")
        )));
    }
    Ok(())
}
