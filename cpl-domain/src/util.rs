use validator::Validate;

use crate::{ServiceError, ServiceResult};

#[derive(Validate)]
struct UrlValidator {
    #[validate(url)]
    url: String,
}

pub fn validate_url(url: &str) -> ServiceResult<String> {
    let validator = UrlValidator {
        url: url.trim().to_string(),
    };
    if let Err(e) = validator.validate() {
        return ServiceError::validation(format!("Invalid URL: {}", e));
    }
    Ok(validator.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert_eq!(
            validate_url(" https://cdn.example.com/logo.png ").ok(),
            Some("https://cdn.example.com/logo.png".to_string())
        );
        assert!(matches!(
            validate_url("not a url"),
            Err(ServiceError::Validation(..))
        ));
    }
}
