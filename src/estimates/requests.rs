use crate::geo::models::GeoPoint;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct FareEstimateRequest {
    pub from: GeoPoint,
    pub to: GeoPoint,
}
