use crate::auth::tests::RIDER_TOKEN;
use crate::estimates::responses::FareEstimateResponse;
use crate::http::tests::{authorization, test_server};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_fare_estimate() {
    let (server, _fakes) = test_server();

    let response = server
        .post("/estimates/fare")
        .add_header(AUTHORIZATION, authorization(RIDER_TOKEN))
        .json(&json!({
            "from": {"lat": 13.75, "lng": 100.50},
            "to": {"lat": 13.80, "lng": 100.60},
        }))
        .await;

    response.assert_status_ok();
    let body = response.json::<FareEstimateResponse>();
    assert!(!body.error);
    assert!(body.estimate.distance_km > 11.0 && body.estimate.distance_km < 13.0);
    assert_eq!(body.estimate.fee, 20 + 13 * 10);
}

#[tokio::test]
async fn test_fare_estimate_rejects_out_of_range_points() {
    let (server, _fakes) = test_server();

    let response = server
        .post("/estimates/fare")
        .add_header(AUTHORIZATION, authorization(RIDER_TOKEN))
        .json(&json!({
            "from": {"lat": 95.0, "lng": 100.50},
            "to": {"lat": 13.80, "lng": 100.60},
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_fare_estimate_requires_a_token() {
    let (server, _fakes) = test_server();

    let response = server
        .post("/estimates/fare")
        .json(&json!({
            "from": {"lat": 13.75, "lng": 100.50},
            "to": {"lat": 13.80, "lng": 100.60},
        }))
        .await;

    response.assert_status_unauthorized();
}
