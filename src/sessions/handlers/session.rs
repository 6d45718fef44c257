use crate::app_context::{AppContext, RequestContext};
use crate::auth::extractors::User;
use crate::sessions::requests::CreateSessionRequest;
use crate::sessions::responses::{DeleteSessionResponse, SessionResponse};
use crate::sessions::services::{CreateSessionHttpHandler, SessionHttpHandler};
use crate::storage::sessions::HashMapSessionStorage;
use axum::extract::{Path, State};
use axum::response::Json;

#[axum::debug_handler]
pub async fn create(
    user: User,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
    Json(request): Json<CreateSessionRequest>,
) -> Json<SessionResponse> {
    let response = CreateSessionHttpHandler::new(app_context, &user)
        .create(request)
        .await;
    Json(response)
}

#[axum::debug_handler]
pub async fn view(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
) -> Json<SessionResponse> {
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .view()
        .await;
    Json(response)
}

#[axum::debug_handler]
pub async fn mount(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
) -> Json<SessionResponse> {
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .mount()
        .await;
    Json(response)
}

#[axum::debug_handler]
pub async fn delete(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<HashMapSessionStorage>>,
) -> Json<DeleteSessionResponse> {
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .delete()
        .await;
    Json(response)
}
