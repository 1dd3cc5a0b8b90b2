use serde::{Deserialize, Serialize};
use std::fmt;

/// A point on Earth in decimal degrees.
///
/// Immutable value type; two locations are equal when both coordinates are equal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    /// Create a new location from decimal degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Whether both coordinates are finite and within the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let loc = Location::new(51.05, -114.07);
        assert_eq!(loc.to_string(), "(51.05, -114.07)");
    }

    #[test]
    fn test_validity() {
        assert!(Location::new(51.05, -114.07).is_valid());
        assert!(Location::new(-90.0, 180.0).is_valid());
        assert!(!Location::new(91.0, 0.0).is_valid());
        assert!(!Location::new(0.0, -180.5).is_valid());
        assert!(!Location::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_equality_is_coordinate_equality() {
        assert_eq!(Location::new(1.5, 2.5), Location::new(1.5, 2.5));
        assert_ne!(Location::new(1.5, 2.5), Location::new(2.5, 1.5));
    }
}
