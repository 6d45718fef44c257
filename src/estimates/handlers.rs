use crate::auth::extractors::User;
use crate::estimates::requests::FareEstimateRequest;
use crate::estimates::responses::FareEstimateResponse;
use crate::geo;
use axum::response::Json;

pub async fn fare(
    _user: User,
    Json(request): Json<FareEstimateRequest>,
) -> Json<FareEstimateResponse> {
    Json(FareEstimateResponse {
        error: false,
        estimate: geo::estimate_fare(request.from, request.to),
    })
}
