/// Field-level input checks used at the HTTP boundary
///
/// Each helper returns a [`ServiceError::Validation`] naming the offending
/// field so the envelope can report it.

use uuid::Uuid;
use validator::{ValidateEmail, ValidationError};

use crate::error::{ServiceError, ServiceResult};

/// Non-empty and RFC 5322 (lax)
pub fn is_valid_email(email: &str) -> bool {
    !email.trim().is_empty() && email.validate_email()
}

/// Rejects empty or whitespace-only values
pub fn require_non_empty(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid_field(field, format!("{} is required", field)));
    }
    Ok(())
}

/// Trimmed copy of a required value
pub fn required(field: &str, value: &str) -> ServiceResult<String> {
    require_non_empty(field, value)?;
    Ok(value.trim().to_string())
}

/// `validator` custom rule: rejects empty or whitespace-only strings
///
/// Carries no message; the derive attribute supplies one naming the field.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Parses an id in canonical 8-4-4-4-12 form or as 32 bare hex digits
///
/// Other encodings `Uuid::parse_str` would accept (braced, `urn:uuid:`) are
/// rejected.
pub fn parse_uuid(field: &str, value: &str) -> ServiceResult<Uuid> {
    require_non_empty(field, value)?;

    let value = value.trim();
    if value.len() != 36 && value.len() != 32 {
        return Err(invalid_uuid(field));
    }
    Uuid::try_parse(value).map_err(|_| invalid_uuid(field))
}

fn invalid_uuid(field: &str) -> ServiceError {
    ServiceError::invalid_field(field, format!("{} must be a valid UUID", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("u@e.com"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
    }

    #[test]
    fn test_parse_uuid_forms() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid("id", &id.to_string()).unwrap(), id);
        assert_eq!(parse_uuid("id", &id.simple().to_string()).unwrap(), id);
        assert!(parse_uuid("id", &id.braced().to_string()).is_err());
        assert!(parse_uuid("id", "123").is_err());
    }

    #[test]
    fn test_blank_values_rejected() {
        assert!(not_blank("x").is_ok());
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t ").is_err());

        assert_eq!(required("title", "  Plan  ").unwrap(), "Plan");
        assert!(matches!(
            required("title", "   ").unwrap_err(),
            ServiceError::Validation { field: Some(f), .. } if f == "title"
        ));
    }

    #[test]
    fn test_empty_reports_field() {
        match parse_uuid("column_id", "  ").unwrap_err() {
            ServiceError::Validation { field, message } => {
                assert_eq!(field.as_deref(), Some("column_id"));
                assert_eq!(message, "column_id is required");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
