//! Client of the laundry service's REST API, which owns shops, addresses and orders.

use crate::api::env::LAUNDRY_API_TOKEN;
use crate::api::models::{
    LocationSubmission, OrderTrackingRecord, PointRecord, SubmissionReceipt,
};
use crate::cli::Args;
use crate::maps::models::PointOfInterest;
use crate::warn_if_env_var_is_missing;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

pub mod env;
#[cfg(test)]
pub mod fake;
pub mod models;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("the API base URL cannot have path segments")]
    InvalidBaseUrl,
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("the API answered with HTTP {0}")]
    Status(u16),
    #[error("invalid response: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait LaundryApi: Send + Sync {
    async fn shops(&self) -> Result<Vec<PointOfInterest>, ApiError>;

    async fn saved_addresses(&self, user_id: &str) -> Result<Vec<PointOfInterest>, ApiError>;

    async fn order_tracking(&self, order_id: &str) -> Result<Vec<PointOfInterest>, ApiError>;

    async fn submit_location(
        &self,
        submission: &LocationSubmission,
    ) -> Result<SubmissionReceipt, ApiError>;
}

pub fn init(_args: &Args) {
    warn_if_env_var_is_missing!(
        LAUNDRY_API_TOKEN,
        "Requests to the laundry API will be unauthenticated."
    );
}

pub struct HttpLaundryApi {
    base_url: Url,
    client: Client,
    token: Option<String>,
}

impl HttpLaundryApi {
    pub fn new(base_url: Url, token: Option<String>) -> Self {
        Self {
            base_url,
            client: Client::new(),
            token,
        }
    }

    pub fn from_env(base_url: Url) -> Self {
        Self::new(base_url, std::env::var(LAUNDRY_API_TOKEN).ok())
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned + Default>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))?;
        if body.is_empty() {
            return Ok(T::default());
        }
        serde_json::from_slice(&body).map_err(|err| ApiError::InvalidData(err.to_string()))
    }

    async fn points(&self, segments: &[&str]) -> Result<Vec<PointOfInterest>, ApiError> {
        let url = self.endpoint(segments)?;
        let records: Vec<PointRecord> = self.send(self.request(Method::GET, url)).await?;
        Ok(records.into_iter().map(PointRecord::into_point).collect())
    }
}

#[async_trait]
impl LaundryApi for HttpLaundryApi {
    async fn shops(&self) -> Result<Vec<PointOfInterest>, ApiError> {
        self.points(&["shops"]).await
    }

    async fn saved_addresses(&self, user_id: &str) -> Result<Vec<PointOfInterest>, ApiError> {
        self.points(&["users", user_id, "addresses"]).await
    }

    async fn order_tracking(&self, order_id: &str) -> Result<Vec<PointOfInterest>, ApiError> {
        let url = self.endpoint(&["orders", order_id, "tracking"])?;
        let record: OrderTrackingRecord = self.send(self.request(Method::GET, url)).await?;
        Ok(record.into_points())
    }

    async fn submit_location(
        &self,
        submission: &LocationSubmission,
    ) -> Result<SubmissionReceipt, ApiError> {
        let request = match submission {
            LocationSubmission::Pickup { .. } => {
                self.request(Method::POST, self.endpoint(&["orders"])?)
            }
            LocationSubmission::SavedAddress { user_id, .. } => self.request(
                Method::POST,
                self.endpoint(&["users", user_id.as_str(), "addresses"])?,
            ),
            LocationSubmission::ShopPin { shop_id, .. } => self.request(
                Method::PUT,
                self.endpoint(&["shops", shop_id.as_str(), "location"])?,
            ),
        };
        self.send(request.json(submission)).await
    }
}
