//! Offering bounds
//!
//! Pure checks shared by the offering store (on create and update) and by
//! UI pre-submit validation. No I/O, no side effects.

use crate::domain::base_service::BaseService;
use crate::shared::errors::{DomainError, DomainResult};

/// No offering may be shorter than this, whatever the base duration
pub const MIN_DURATION_FLOOR: f64 = 15.0;
/// Lower duration bound as a fraction of the base duration
pub const MIN_DURATION_FACTOR: f64 = 0.5;
/// Upper duration bound as a multiple of the base duration
pub const MAX_DURATION_FACTOR: f64 = 2.0;

/// Inclusive duration band (minutes) allowed for offerings of a base service.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBounds {
    pub min: f64,
    pub max: f64,
}

impl DurationBounds {
    pub fn for_base(base_duration: u32) -> Self {
        let base = f64::from(base_duration);
        Self {
            min: MIN_DURATION_FLOOR.max(base * MIN_DURATION_FACTOR),
            max: base * MAX_DURATION_FACTOR,
        }
    }

    pub fn contains(&self, duration: u32) -> bool {
        let d = f64::from(duration);
        d >= self.min && d <= self.max
    }
}

pub fn check_price(base: &BaseService, price: f64) -> DomainResult<()> {
    if !price.is_finite() {
        return Err(DomainError::Validation("Price must be a number".to_string()));
    }
    if price < base.base_price {
        return Err(DomainError::Validation(format!(
            "Price must be at least {} (base price of {})",
            base.base_price, base.name
        )));
    }
    Ok(())
}

pub fn check_duration(base: &BaseService, duration: u32) -> DomainResult<()> {
    let bounds = DurationBounds::for_base(base.base_duration);
    if f64::from(duration) < bounds.min {
        return Err(DomainError::Validation(format!(
            "Duration must be at least {} minutes",
            bounds.min
        )));
    }
    if f64::from(duration) > bounds.max {
        return Err(DomainError::Validation(format!(
            "Duration must be at most {} minutes",
            bounds.max
        )));
    }
    Ok(())
}

/// Check a professional's price and duration against a base service.
///
/// The price check runs first; the first violated bound is reported.
pub fn validate_offering(base: &BaseService, price: f64, duration: u32) -> DomainResult<()> {
    check_price(base, price)?;
    check_duration(base, duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::base_service::NewBaseService;

    fn base(price: f64, duration: u32) -> BaseService {
        BaseService::new(NewBaseService::new("cat", "Blowout", "", price, duration))
    }

    fn message(result: DomainResult<()>) -> String {
        match result {
            Err(DomainError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_price_floor() {
        let b = base(100.0, 60);
        let msg = message(validate_offering(&b, 90.0, 60));
        assert!(msg.contains("100"), "{}", msg);

        assert!(validate_offering(&b, 100.0, 60).is_ok());
        assert!(validate_offering(&b, 100.01, 60).is_ok());
        assert!(validate_offering(&b, 99.99, 60).is_err());
    }

    #[test]
    fn test_non_finite_price_rejected() {
        let b = base(0.0, 60);
        assert!(validate_offering(&b, f64::NAN, 60).is_err());
        assert!(validate_offering(&b, f64::INFINITY, 60).is_err());
    }

    #[test]
    fn test_duration_band_boundaries_are_inclusive() {
        let b = base(100.0, 60);
        assert!(validate_offering(&b, 100.0, 30).is_ok());
        assert!(validate_offering(&b, 100.0, 120).is_ok());

        let low = message(validate_offering(&b, 100.0, 29));
        assert!(low.contains("at least 30"), "{}", low);

        let high = message(validate_offering(&b, 100.0, 121));
        assert!(high.contains("at most 120"), "{}", high);
    }

    #[test]
    fn test_floor_of_fifteen_minutes_applies_to_short_services() {
        let b = base(10.0, 20);
        let bounds = DurationBounds::for_base(20);
        assert_eq!(bounds.min, 15.0);
        assert_eq!(bounds.max, 40.0);

        assert!(validate_offering(&b, 10.0, 15).is_ok());
        let msg = message(validate_offering(&b, 10.0, 14));
        assert!(msg.contains("15"), "{}", msg);
    }

    #[test]
    fn test_odd_base_duration_gives_fractional_minimum() {
        let bounds = DurationBounds::for_base(45);
        assert_eq!(bounds.min, 22.5);
        assert!(!bounds.contains(22));
        assert!(bounds.contains(23));
        assert!(bounds.contains(90));
    }

    #[test]
    fn test_price_checked_before_duration() {
        let b = base(100.0, 60);
        let msg = message(validate_offering(&b, 1.0, 1));
        assert!(msg.starts_with("Price"));
    }

    #[test]
    fn test_exhaustive_band_for_sample_bases() {
        for base_duration in [15u32, 20, 30, 45, 60, 90, 240] {
            let b = base(0.0, base_duration);
            let bounds = DurationBounds::for_base(base_duration);
            for duration in 0..=base_duration * 2 + 5 {
                let expected = f64::from(duration) >= bounds.min && f64::from(duration) <= bounds.max;
                assert_eq!(
                    validate_offering(&b, 0.0, duration).is_ok(),
                    expected,
                    "base {} duration {}",
                    base_duration,
                    duration
                );
            }
        }
    }
}
