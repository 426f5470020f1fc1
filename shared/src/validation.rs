//! Validation utilities for the Saw-it platform
//!
//! Range checks for agronomic observations and plot metadata. The backend
//! runs these before anything is written, the browser runs them through the
//! WASM bindings before a form is submitted.

use crate::types::GpsCoordinates;

// ============================================================================
// Observation Validations
// ============================================================================

/// NDVI is a normalised index in -1..=1
pub fn validate_ndvi(ndvi: f64) -> Result<(), &'static str> {
    if !ndvi.is_finite() || !(-1.0..=1.0).contains(&ndvi) {
        return Err("NDVI must be between -1 and 1");
    }
    Ok(())
}

/// Quantities such as fertiliser dose, rainfall, plant age and yield
pub fn validate_non_negative(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() || value < 0.0 {
        return Err("Value must be a non-negative number");
    }
    Ok(())
}

/// Mean monthly temperature in a plausible range for a plantation
pub fn validate_temperature(celsius: f64) -> Result<(), &'static str> {
    if !celsius.is_finite() || !(-10.0..=60.0).contains(&celsius) {
        return Err("Temperature must be between -10 and 60 °C");
    }
    Ok(())
}

/// Predicted productivity must be a positive yield
pub fn validate_prediction_value(ton_per_ha: f64) -> Result<(), &'static str> {
    if !ton_per_ha.is_finite() || ton_per_ha <= 0.0 {
        return Err("Prediction must be a positive number");
    }
    Ok(())
}

// ============================================================================
// Lahan Validations
// ============================================================================

/// Lahan names must contain something other than whitespace
pub fn validate_lahan_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Lahan name cannot be empty");
    }
    if name.trim().chars().count() > 120 {
        return Err("Lahan name must be at most 120 characters");
    }
    Ok(())
}

/// Latitude and longitude must be given together and within bounds
pub fn validate_coordinates(lat: Option<f64>, lon: Option<f64>) -> Result<(), &'static str> {
    match (lat, lon) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) if GpsCoordinates::new(lat, lon).is_valid() => Ok(()),
        (Some(_), Some(_)) => Err("Coordinates are out of range"),
        _ => Err("Latitude and longitude must be provided together"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ndvi_range() {
        assert!(validate_ndvi(0.75).is_ok());
        assert!(validate_ndvi(-1.0).is_ok());
        assert!(validate_ndvi(1.01).is_err());
        assert!(validate_ndvi(f64::NAN).is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative(0.0).is_ok());
        assert!(validate_non_negative(135.0).is_ok());
        assert!(validate_non_negative(-0.1).is_err());
    }

    #[test]
    fn test_prediction_value() {
        assert!(validate_prediction_value(2.35).is_ok());
        assert!(validate_prediction_value(0.0).is_err());
    }

    #[test]
    fn test_lahan_name() {
        assert!(validate_lahan_name("Blok A1").is_ok());
        assert!(validate_lahan_name("   ").is_err());
        assert!(validate_lahan_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn test_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(-2.5), Some(102.5)).is_ok());
        assert!(validate_coordinates(Some(-2.5), None).is_err());
        assert!(validate_coordinates(Some(120.0), Some(102.5)).is_err());
    }
}
