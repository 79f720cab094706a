//! Spherical-earth distance used by the radius search.

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two points, in meters.
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        assert_eq!(haversine_distance_m(55.7512, 37.6184, 55.7512, 37.6184), 0.0);
    }

    #[test]
    fn moscow_to_saint_petersburg() {
        // Red Square to Palace Square, roughly 634 km.
        let d = haversine_distance_m(55.7539, 37.6208, 59.9390, 30.3158);
        assert!((d - 634_000.0).abs() < 5_000.0, "got {}", d);
    }

    #[test]
    fn short_distances_stay_short() {
        // Two points ~750 m apart in central Moscow.
        let d = haversine_distance_m(55.7512, 37.6184, 55.7576, 37.6137);
        assert!(d > 500.0 && d < 1_000.0, "got {}", d);
    }
}
