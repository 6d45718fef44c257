use crate::geo::models::GeoPoint;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location is unavailable: {0}")]
    Unavailable(String),
    #[error("location request timed out")]
    Timeout,
    #[error("location service returned an invalid position")]
    InvalidPosition,
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError>;
}

/// Waits for a position for at most `timeout`.
pub async fn locate(
    source: &dyn PositionSource,
    timeout: Duration,
) -> Result<GeoPoint, GeolocationError> {
    match tokio::time::timeout(timeout, source.current_position()).await {
        Ok(result) => result,
        Err(_elapsed) => Err(GeolocationError::Timeout),
    }
}

#[derive(Deserialize)]
struct PositionResponse {
    latitude: f64,
    longitude: f64,
}

/// Asks a location service over HTTP. The response is `{"latitude": .., "longitude": ..}`.
pub struct HttpPositionSource {
    client: Client,
    url: Url,
}

impl HttpPositionSource {
    pub fn new(url: Url) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl PositionSource for HttpPositionSource {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| GeolocationError::Unavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(GeolocationError::Unavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }
        let position: PositionResponse = response
            .json()
            .await
            .map_err(|_err| GeolocationError::InvalidPosition)?;
        GeoPoint::new(position.latitude, position.longitude)
            .map_err(|_err| GeolocationError::InvalidPosition)
    }
}

/// Always answers with the same position, or with "unavailable" when there is none.
pub struct StaticPositionSource {
    position: Option<GeoPoint>,
}

impl StaticPositionSource {
    pub fn new(position: Option<GeoPoint>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl PositionSource for StaticPositionSource {
    async fn current_position(&self) -> Result<GeoPoint, GeolocationError> {
        self.position.ok_or_else(|| {
            GeolocationError::Unavailable(String::from("no device location is configured"))
        })
    }
}
