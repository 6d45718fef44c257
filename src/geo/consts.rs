pub const EARTH_RADIUS: f64 = 6_371_000.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;
/// Flat part of every delivery fee, in baht.
pub const BASE_FARE: u64 = 20;
/// Charged for every started kilometre between the two points.
pub const FARE_PER_KM: u64 = 10;
