use validator::{Validate, ValidateUrl, ValidationErrors};

use super::errors::{DomainError, DomainResult};

/// Run `validator` rules on an input record and fold every field error
/// into one `DomainError::Validation` message.
pub fn validate_input<T: Validate>(input: &T) -> DomainResult<()> {
    input.validate().map_err(|errors| DomainError::Validation(describe(&errors)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut field_errors: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect();
    // HashMap iteration order is not stable
    field_errors.sort();

    if field_errors.is_empty() {
        "Validation failed".to_string()
    } else {
        field_errors.join("; ")
    }
}

/// Reject blank strings that `length(min = 1)` would let through.
pub fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut err = validator::ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Every entry of a media list must be a valid URL.
pub fn all_urls(urls: &[String]) -> Result<(), validator::ValidationError> {
    if let Some(bad) = urls.iter().find(|u| !u.validate_url()) {
        let mut err = validator::ValidationError::new("url");
        err.message = Some(format!("'{}' is not a valid URL", bad).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(custom(function = "not_blank"))]
        name: String,
        #[validate(range(min = 0.0, message = "must be at least 0"))]
        price: f64,
    }

    #[test]
    fn test_valid_input_passes() {
        let s = Sample {
            name: "Hair".into(),
            price: 1.0,
        };
        assert!(validate_input(&s).is_ok());
    }

    #[test]
    fn test_errors_are_joined_per_field() {
        let s = Sample {
            name: "   ".into(),
            price: -1.0,
        };
        let err = validate_input(&s).unwrap_err();
        let DomainError::Validation(msg) = err else {
            panic!("expected validation error");
        };
        assert_eq!(msg, "name: must not be empty; price: must be at least 0");
    }

    #[test]
    fn test_all_urls_names_the_bad_entry() {
        let urls = vec!["https://cdn.example.com/a.jpg".to_string(), "not a url".to_string()];
        let err = all_urls(&urls).unwrap_err();
        assert_eq!(err.message.as_deref(), Some("'not a url' is not a valid URL"));
        assert!(all_urls(&urls[..1]).is_ok());
        assert!(all_urls(&[]).is_ok());
    }
}
