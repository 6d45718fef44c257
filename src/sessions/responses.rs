use crate::sessions::models::SessionView;
use serde::Serialize;

/// All possible reasons why a picker operation may be refused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionErrorCode {
    SessionNotFound,
    NotSessionOwner,
    KindNotAllowed,
    MissingOrderId,
    ContainerBusy,
    MapLoadFailed,
    MapNotReady,
    SelectionDisabled,
    NothingToDrag,
    SelectionNotReady,
    MissingShopId,
    LocationUnavailable,
    ApiUnavailable,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<SessionErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
}

impl SessionResponse {
    pub fn ok(session: SessionView) -> Self {
        Self {
            error: false,
            error_code: None,
            session: Some(session),
        }
    }

    pub fn refused(error_code: SessionErrorCode) -> Self {
        Self {
            error: true,
            error_code: Some(error_code),
            session: None,
        }
    }

    /// The operation failed but the page is still there and may have changed.
    pub fn refused_with(error_code: SessionErrorCode, session: SessionView) -> Self {
        Self {
            error: true,
            error_code: Some(error_code),
            session: Some(session),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusPointResponse {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<SessionErrorCode>,
    /// `false` when the point has no marker (unknown id or no coordinates).
    pub focused: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSelectionResponse {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<SessionErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
}

impl SubmitSelectionResponse {
    pub fn refused(error_code: SessionErrorCode) -> Self {
        Self {
            error: true,
            error_code: Some(error_code),
            receipt_id: None,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSessionResponse {
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<SessionErrorCode>,
}
