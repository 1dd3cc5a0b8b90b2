//! Great-circle distance between coordinates.

use crate::models::Location;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two locations in kilometers.
///
/// Pure and total: symmetric in its arguments and zero for identical points.
pub fn distance_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.longitude() - a.longitude()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push near-antipodal points just above 1
    let h = h.min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_same_point() {
        let p = Location::new(51.05, -114.07);
        assert_eq!(distance_km(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_calgary_edmonton() {
        let calgary = Location::new(51.0447, -114.0719);
        let edmonton = Location::new(53.5461, -113.4938);
        let d = distance_km(&calgary, &edmonton);
        // Roughly 280 km apart
        assert!((d - 280.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_distance_one_degree_of_latitude() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(1.0, 0.0);
        let expected = EARTH_RADIUS_KM * 1f64.to_radians();
        assert!((distance_km(&a, &b) - expected).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let a = Location::new(lat1, lon1);
            let b = Location::new(lat2, lon2);
            prop_assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
        }

        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let a = Location::new(lat, lon);
            prop_assert_eq!(distance_km(&a, &a), 0.0);
        }

        #[test]
        fn prop_distance_is_bounded(
            lat1 in -90.0f64..90.0, lon1 in -180.0f64..180.0,
            lat2 in -90.0f64..90.0, lon2 in -180.0f64..180.0,
        ) {
            let d = distance_km(&Location::new(lat1, lon1), &Location::new(lat2, lon2));
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
        }
    }
}
