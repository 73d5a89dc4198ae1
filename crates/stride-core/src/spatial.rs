//! Geodesic distance and bounding-box math.

use crate::models::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers (haversine).
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Rectangular area around a center point, sized from a radius.
///
/// One degree of latitude spans ~111 km; longitude degrees shrink with
/// cos(latitude). The box is a cheap prefilter: anything inside the true
/// radius is inside the box, but not the other way around, so callers must
/// still exact-filter with [`haversine_km`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let lat_buffer = radius_km / 111.0;
        let lng_buffer = radius_km / (111.0 * center.lat.to_radians().cos());

        Self {
            min_lat: center.lat - lat_buffer,
            max_lat: center.lat + lat_buffer,
            min_lng: center.lng - lng_buffer,
            max_lng: center.lng + lng_buffer,
        }
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }
}

/// Destination point after traveling `distance_km` from `origin` on the
/// given bearing (degrees, 0 = north, clockwise).
pub fn offset_by_bearing(origin: Coordinate, distance_km: f64, bearing_deg: f64) -> Coordinate {
    if distance_km.abs() <= f64::EPSILON {
        return origin;
    }

    let lat1 = origin.lat.to_radians();
    let lng1 = origin.lng.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular_distance = distance_km / EARTH_RADIUS_KM;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lng2 = lng1 + y.atan2(x);
    lng2 = (lng2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    Coordinate::new(lat2.to_degrees(), lng2.to_degrees())
}
