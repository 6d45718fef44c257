use crate::geo::models::FareEstimate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FareEstimateResponse {
    pub error: bool,
    #[serde(flatten)]
    pub estimate: FareEstimate,
}
