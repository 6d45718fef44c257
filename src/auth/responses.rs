use crate::auth::models::Role;
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeTokenResponse {
    pub error: bool,
    pub user_id: String,
    pub role: Role,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenExtractionError {
    pub error: bool,
    pub reason: TokenExtractionReason,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenExtractionReason {
    NoAuthorizationHeaderProvided,
    InvalidToken,
}
