//! Common validation utilities.

use validator::{ValidateEmail, ValidateUrl, ValidationError};

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Returns true when the value is a syntactically valid email address.
pub fn is_valid_email(value: &str) -> bool {
    value.validate_email()
}

/// Adds an `https://` scheme to bare host names such as `www.example.org`.
pub fn normalize_url(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Returns true when the value (after scheme normalisation) is a valid URL.
pub fn is_valid_url(value: &str) -> bool {
    let normalized = normalize_url(value);
    normalized.validate_url()
        && (normalized.starts_with("http://") || normalized.starts_with("https://"))
        && normalized.contains('.')
}

/// Parses a coordinate cell, accepting both `52.5` and the German `52,5`.
pub fn parse_coordinate(value: &str) -> Option<f64> {
    value.trim().replace(',', ".").parse::<f64>().ok()
}
