use crate::app_context::{AppContext, RequestContext};
use crate::auth::extractors::User;
use crate::sessions::responses::{FocusPointResponse, SessionResponse};
use crate::sessions::services::SessionHttpHandler;
use crate::storage::sessions::HashMapSessionStorage;
use axum::extract::{Path, State};
use axum::response::Json;

#[axum::debug_handler]
pub async fn refresh(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
) -> Json<SessionResponse> {
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .refresh_points()
        .await;
    Json(response)
}

#[axum::debug_handler]
pub async fn focus(
    user: User,
    Path((session_id, point_id)): Path<(String, String)>,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
) -> Json<FocusPointResponse> {
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .focus(&point_id)
        .await;
    Json(response)
}
