use consts::{BASE_FARE, EARTH_RADIUS, FARE_PER_KM};
use models::{FareEstimate, GeoPoint};

pub mod consts;
pub mod models;

/// Great-circle distance between two points, in metres.
pub fn haversine_distance_m(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi_1 = from.lat().to_radians();
    let phi_2 = to.lat().to_radians();
    let delta_phi = (to.lat() - from.lat()).to_radians();
    let delta_lambda = (to.lng() - from.lng()).to_radians();
    let a = (delta_phi / 2.0).sin().powi(2)
        + phi_1.cos() * phi_2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * (a.sqrt().atan2((1.0 - a).sqrt()));
    EARTH_RADIUS * c
}

pub fn estimate_fare(from: GeoPoint, to: GeoPoint) -> FareEstimate {
    let distance_km = haversine_distance_m(from, to) / 1000.0;
    let started_kilometres = distance_km.ceil() as u64;
    FareEstimate {
        distance_km: (distance_km * 100.0).round() / 100.0,
        fee: BASE_FARE + started_kilometres * FARE_PER_KM,
    }
}
