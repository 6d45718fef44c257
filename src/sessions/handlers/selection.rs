use crate::app_context::{AppContext, RequestContext};
use crate::auth::extractors::User;
use crate::geo::models::GeoPoint;
use crate::sessions::requests::{ManualSelectionRequest, SubmitSelectionRequest};
use crate::sessions::responses::{SessionResponse, SubmitSelectionResponse};
use crate::sessions::services::SessionHttpHandler;
use crate::storage::interface::ISessionStorage;
use axum::extract::{Path, State};
use axum::response::Json;

pub async fn click<SS>(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<SS>>,
    Json(point): Json<GeoPoint>,
) -> Json<SessionResponse>
where
    SS: ISessionStorage,
{
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .click(point)
        .await;
    Json(response)
}

pub async fn drag<SS>(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<SS>>,
    Json(point): Json<GeoPoint>,
) -> Json<SessionResponse>
where
    SS: ISessionStorage,
{
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .drag(point)
        .await;
    Json(response)
}

pub async fn enter<SS>(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<SS>>,
    Json(request): Json<ManualSelectionRequest>,
) -> Json<SessionResponse>
where
    SS: ISessionStorage,
{
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .enter_selection(request)
        .await;
    Json(response)
}

pub async fn current_location<SS>(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<SS>>,
) -> Json<SessionResponse>
where
    SS: ISessionStorage,
{
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .use_current_location()
        .await;
    Json(response)
}

pub async fn default_location<SS>(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<SS>>,
) -> Json<SessionResponse>
where
    SS: ISessionStorage,
{
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .use_default_location()
        .await;
    Json(response)
}

pub async fn submit<SS>(
    user: User,
    Path(session_id): Path<String>,
    State(app_context): State<AppContext<SS>>,
    Json(request): Json<SubmitSelectionRequest>,
) -> Json<SubmitSelectionResponse>
where
    SS: ISessionStorage,
{
    let request_context = RequestContext { user, session_id };
    let response = SessionHttpHandler::new(app_context, &request_context)
        .submit(request)
        .await;
    Json(response)
}
