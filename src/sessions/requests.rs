use crate::sessions::models::PickerKind;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub kind: PickerKind,
    /// Required for `riderMap`.
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Latitude and longitude as typed into the form, unparsed.
#[derive(Debug, Deserialize)]
pub struct ManualSelectionRequest {
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lng: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSelectionRequest {
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}
