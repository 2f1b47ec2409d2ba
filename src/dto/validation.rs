//! Validation helpers for DTOs.

use validator::ValidationError;

/// Error for a required free-text field left empty.
pub fn empty_field(field: &'static str) -> ValidationError {
    let mut err = ValidationError::new("empty");
    err.message = Some(format!("{field} must not be empty").into());
    err
}

/// Hour totals and increments may not go below zero.
pub fn validate_hours(value: f64) -> Result<(), ValidationError> {
    if value < 0.0 {
        let mut err = ValidationError::new("negative_hours");
        err.message = Some("hours cannot be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Completion estimates must be strictly positive.
pub fn validate_estimated_hours(value: f64) -> Result<(), ValidationError> {
    if value <= 0.0 {
        let mut err = ValidationError::new("estimate_not_positive");
        err.message = Some("estimated_hours must be > 0".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_hours() {
        assert!(validate_hours(0.0).is_ok());
        assert!(validate_hours(17.5).is_ok());
        assert!(validate_hours(-0.1).is_err());
        assert!(validate_hours(-5.0).is_err());
    }

    #[test]
    fn test_validate_estimated_hours() {
        assert!(validate_estimated_hours(0.5).is_ok());
        assert!(validate_estimated_hours(40.0).is_ok());
        assert!(validate_estimated_hours(0.0).is_err());
        assert!(validate_estimated_hours(-2.0).is_err());
    }
}
