use crate::api::models::LocationSubmission;
use crate::app_context::{AppContext, RequestContext};
use crate::auth::extractors::User;
use crate::geo::models::GeoPoint;
use crate::maps::document::BindError;
use crate::maps::geolocation;
use crate::maps::lifecycle::MountOutcome;
use crate::sessions::consts::{
    DEFAULT_ADDRESS_LABEL, LOCATION_UNAVAILABLE_MESSAGE, POINTS_UNAVAILABLE_MESSAGE,
};
use crate::sessions::models::{PickerKind, PickerSession, PointSource, SessionHandle};
use crate::sessions::requests::{
    CreateSessionRequest, ManualSelectionRequest, SubmitSelectionRequest,
};
use crate::sessions::responses::{
    DeleteSessionResponse, FocusPointResponse, SessionErrorCode, SessionResponse,
    SubmitSelectionResponse,
};
use crate::storage::interface::ISessionStorage;
use std::sync::Arc;

pub struct CreateSessionHttpHandler<'a, SS: ISessionStorage> {
    app_context: AppContext<SS>,
    user: &'a User,
}

impl<'a, SS> CreateSessionHttpHandler<'a, SS>
where
    SS: ISessionStorage,
{
    pub fn new(app_context: AppContext<SS>, user: &'a User) -> Self {
        Self { app_context, user }
    }

    pub async fn create(&self, request: CreateSessionRequest) -> SessionResponse {
        let kind = request.kind;
        if !kind.allows(self.user.role) {
            return SessionResponse::refused(SessionErrorCode::KindNotAllowed);
        }
        let point_source = match kind {
            PickerKind::CreateOrder | PickerKind::ShopPinning | PickerKind::EmployeeShops => {
                PointSource::Shops
            }
            PickerKind::SavedAddress => PointSource::SavedAddresses {
                user_id: self.user.user_id.clone(),
            },
            PickerKind::RiderMap => match request.order_id {
                Some(order_id) if !order_id.trim().is_empty() => {
                    PointSource::OrderTracking { order_id }
                }
                _ => return SessionResponse::refused(SessionErrorCode::MissingOrderId),
            },
            PickerKind::MapTest => PointSource::Nothing,
        };
        let initial_selection = kind
            .has_selection()
            .then_some(self.app_context.config.default_location);
        let session = PickerSession::new(kind, &self.user.user_id, point_source, initial_selection);
        self.app_context
            .document()
            .add_container(session.lifecycle.container_id());
        let session_id = session.id.clone();
        evict_over_limit(&self.app_context, &self.user.user_id).await;
        let handle = self.app_context.sessions.insert(session).await;
        tracing::info!(
            task = "picker_session",
            action = "created",
            session_id = %session_id,
            kind = ?kind,
            user_id = %self.user.user_id,
        );
        log_sessions_count(&self.app_context).await;

        if let Err(error_code) = mount(&self.app_context, &handle).await {
            tracing::warn!(session_id = %session_id, ?error_code, "Failed to mount a new picker.");
        }
        load_points(&self.app_context, &handle).await;
        if kind.has_selection() {
            spawn_location_hint(&self.app_context, &handle);
        }

        let view = handle.lock().await.view();
        SessionResponse::ok(view)
    }
}

pub struct SessionHttpHandler<'a, SS: ISessionStorage> {
    app_context: AppContext<SS>,
    request_context: &'a RequestContext,
}

impl<'a, SS> SessionHttpHandler<'a, SS>
where
    SS: ISessionStorage,
{
    pub fn new(app_context: AppContext<SS>, request_context: &'a RequestContext) -> Self {
        Self {
            app_context,
            request_context,
        }
    }

    async fn owned_session(&self) -> Result<SessionHandle, SessionErrorCode> {
        let handle = self
            .app_context
            .sessions
            .get(&self.request_context.session_id)
            .await
            .ok_or(SessionErrorCode::SessionNotFound)?;
        {
            let mut session = handle.lock().await;
            if session.owner_id != self.request_context.user.user_id {
                return Err(SessionErrorCode::NotSessionOwner);
            }
            session.touch();
        }
        Ok(handle)
    }

    /// Runs a synchronous operation on the session and answers with the updated view.
    async fn update<F>(&self, operation: F) -> SessionResponse
    where
        F: FnOnce(&mut PickerSession) -> Result<(), SessionErrorCode>,
    {
        let handle = match self.owned_session().await {
            Ok(handle) => handle,
            Err(error_code) => return SessionResponse::refused(error_code),
        };
        let mut session = handle.lock().await;
        match operation(&mut *session) {
            Ok(()) => SessionResponse::ok(session.view()),
            Err(error_code) => SessionResponse::refused_with(error_code, session.view()),
        }
    }

    pub async fn view(&self) -> SessionResponse {
        self.update(|_session| Ok(())).await
    }

    pub async fn click(&self, point: GeoPoint) -> SessionResponse {
        self.update(|session| session.click(point)).await
    }

    pub async fn drag(&self, point: GeoPoint) -> SessionResponse {
        self.update(|session| session.drag(point)).await
    }

    pub async fn enter_selection(&self, request: ManualSelectionRequest) -> SessionResponse {
        self.update(|session| {
            session
                .enter_selection(&request.lat, &request.lng)
                .map(|_parsed| ())
        })
        .await
    }

    pub async fn use_default_location(&self) -> SessionResponse {
        let default_location = self.app_context.config.default_location;
        self.update(|session| {
            if !session.kind.has_selection() {
                return Err(SessionErrorCode::SelectionDisabled);
            }
            session.message = None;
            session.select(default_location, true);
            Ok(())
        })
        .await
    }

    pub async fn use_current_location(&self) -> SessionResponse {
        let handle = match self.owned_session().await {
            Ok(handle) => handle,
            Err(error_code) => return SessionResponse::refused(error_code),
        };
        if !handle.lock().await.kind.has_selection() {
            return SessionResponse::refused(SessionErrorCode::SelectionDisabled);
        }
        let located = geolocation::locate(
            self.app_context.positions.as_ref(),
            self.app_context.config.geolocation_timeout,
        )
        .await;
        let mut session = handle.lock().await;
        if !session.is_mounted() {
            return SessionResponse::refused(SessionErrorCode::SessionNotFound);
        }
        match located {
            Ok(point) => {
                session.message = None;
                session.select(point, true);
                SessionResponse::ok(session.view())
            }
            Err(err) => {
                tracing::info!(session_id = %session.id, %err, "Current location is unavailable.");
                session.message = Some(LOCATION_UNAVAILABLE_MESSAGE.to_string());
                SessionResponse::refused_with(SessionErrorCode::LocationUnavailable, session.view())
            }
        }
    }

    pub async fn refresh_points(&self) -> SessionResponse {
        let handle = match self.owned_session().await {
            Ok(handle) => handle,
            Err(error_code) => return SessionResponse::refused(error_code),
        };
        load_points(&self.app_context, &handle).await;
        let view = handle.lock().await.view();
        SessionResponse::ok(view)
    }

    /// Explicit retry after the map library failed to load.
    pub async fn mount(&self) -> SessionResponse {
        let handle = match self.owned_session().await {
            Ok(handle) => handle,
            Err(error_code) => return SessionResponse::refused(error_code),
        };
        let mounted = mount(&self.app_context, &handle).await;
        let view = handle.lock().await.view();
        match mounted {
            Ok(()) => SessionResponse::ok(view),
            Err(error_code) => SessionResponse::refused_with(error_code, view),
        }
    }

    pub async fn focus(&self, point_id: &str) -> FocusPointResponse {
        match self.owned_session().await {
            Ok(handle) => FocusPointResponse {
                error: false,
                error_code: None,
                focused: handle.lock().await.focus(point_id),
            },
            Err(error_code) => FocusPointResponse {
                error: true,
                error_code: Some(error_code),
                focused: false,
            },
        }
    }

    pub async fn submit(&self, request: SubmitSelectionRequest) -> SubmitSelectionResponse {
        let handle = match self.owned_session().await {
            Ok(handle) => handle,
            Err(error_code) => return SubmitSelectionResponse::refused(error_code),
        };
        let (kind, owner_id, selection) = {
            let session = handle.lock().await;
            (session.kind, session.owner_id.clone(), session.coords.get())
        };
        if !kind.has_selection() {
            return SubmitSelectionResponse::refused(SessionErrorCode::SelectionDisabled);
        }
        let Some(location) = selection else {
            return SubmitSelectionResponse::refused(SessionErrorCode::SelectionNotReady);
        };
        let submission = match kind {
            PickerKind::CreateOrder => LocationSubmission::Pickup {
                shop_id: request.shop_id,
                location,
                note: request.note,
            },
            PickerKind::SavedAddress => LocationSubmission::SavedAddress {
                user_id: owner_id,
                label: request
                    .label
                    .unwrap_or_else(|| DEFAULT_ADDRESS_LABEL.to_string()),
                location,
            },
            PickerKind::ShopPinning => match request.shop_id {
                Some(shop_id) => LocationSubmission::ShopPin { shop_id, location },
                None => return SubmitSelectionResponse::refused(SessionErrorCode::MissingShopId),
            },
            PickerKind::EmployeeShops | PickerKind::RiderMap | PickerKind::MapTest => {
                return SubmitSelectionResponse::refused(SessionErrorCode::SelectionDisabled)
            }
        };

        match self.app_context.api.submit_location(&submission).await {
            Ok(receipt) => {
                tracing::info!(
                    task = "picker_session",
                    action = "submitted",
                    session_id = %self.request_context.session_id,
                    kind = ?kind,
                    lat = location.lat(),
                    lng = location.lng(),
                );
                if kind == PickerKind::ShopPinning {
                    load_points(&self.app_context, &handle).await;
                }
                SubmitSelectionResponse {
                    error: false,
                    error_code: None,
                    receipt_id: receipt.id,
                }
            }
            Err(err) => {
                tracing::warn!(session_id = %self.request_context.session_id, %err, "Failed to submit a selection.");
                SubmitSelectionResponse::refused(SessionErrorCode::ApiUnavailable)
            }
        }
    }

    /// The session a selection socket attaches to once the upgrade completes.
    pub async fn selection_stream(&self) -> Result<SessionHandle, SessionErrorCode> {
        self.owned_session().await
    }

    pub async fn delete(&self) -> DeleteSessionResponse {
        if let Err(error_code) = self.owned_session().await {
            return DeleteSessionResponse {
                error: true,
                error_code: Some(error_code),
            };
        }
        if let Some(handle) = self
            .app_context
            .sessions
            .remove(&self.request_context.session_id)
            .await
        {
            release(&self.app_context, &mut *handle.lock().await, "deleted");
            log_sessions_count(&self.app_context).await;
        }
        DeleteSessionResponse {
            error: false,
            error_code: None,
        }
    }
}

async fn mount<SS: ISessionStorage>(
    app_context: &AppContext<SS>,
    handle: &SessionHandle,
) -> Result<(), SessionErrorCode> {
    let ticket = {
        let mut session = handle.lock().await;
        match session.lifecycle.begin_mount(app_context.document()) {
            Ok(Some(ticket)) => ticket,
            Ok(None) => return Ok(()),
            Err(BindError::Missing) => return Err(SessionErrorCode::SessionNotFound),
            Err(BindError::Occupied) => return Err(SessionErrorCode::ContainerBusy),
        }
    };
    let loaded = app_context.loader.ensure_loaded().await;
    let mut session = handle.lock().await;
    let center = session
        .coords
        .get()
        .unwrap_or(app_context.config.default_location);
    match loaded {
        Ok(library) => {
            let outcome =
                session
                    .lifecycle
                    .finish_mount(ticket, &library, center, &app_context.config.tiles);
            if outcome == MountOutcome::Mounted {
                session.render();
            }
            Ok(())
        }
        Err(err) => {
            session.lifecycle.fail_mount(ticket, &err);
            Err(SessionErrorCode::MapLoadFailed)
        }
    }
}

/// Tears down a session that is already out of storage.
pub(crate) fn release<SS: ISessionStorage>(
    app_context: &AppContext<SS>,
    session: &mut PickerSession,
    action: &'static str,
) {
    session.unmount();
    app_context
        .document()
        .remove_container(session.lifecycle.container_id());
    tracing::info!(
        task = "picker_session",
        action,
        session_id = %session.id,
    );
}

pub(crate) async fn log_sessions_count<SS: ISessionStorage>(app_context: &AppContext<SS>) {
    let sessions_count = app_context.sessions.count().await;
    tracing::info!(
        task = "sessions_count",
        sessions_count,
        bound_containers = app_context.document().bound_containers(),
    );
}

/// Makes room for one more session of `owner_id` by evicting their least recently used ones.
async fn evict_over_limit<SS: ISessionStorage>(app_context: &AppContext<SS>, owner_id: &str) {
    let mut owned = Vec::new();
    for handle in app_context.sessions.all().await {
        let session = handle.lock().await;
        if session.owner_id == owner_id {
            owned.push((session.last_touched, session.id.clone()));
        }
    }
    let limit = app_context.config.max_sessions_per_owner;
    if owned.len() < limit {
        return;
    }
    owned.sort();
    let excess = owned.len() + 1 - limit;
    for (_last_touched, session_id) in owned.into_iter().take(excess) {
        if let Some(handle) = app_context.sessions.remove(&session_id).await {
            release(app_context, &mut *handle.lock().await, "evicted");
        }
    }
}

async fn load_points<SS: ISessionStorage>(app_context: &AppContext<SS>, handle: &SessionHandle) {
    let point_source = handle.lock().await.point_source.clone();
    let fetched = match &point_source {
        PointSource::Nothing => Ok(Vec::new()),
        PointSource::Shops => app_context.api.shops().await,
        PointSource::SavedAddresses { user_id } => app_context.api.saved_addresses(user_id).await,
        PointSource::OrderTracking { order_id } => app_context.api.order_tracking(order_id).await,
    };
    let mut session = handle.lock().await;
    if !session.is_mounted() {
        tracing::debug!(session_id = %session.id, "Dropping points that arrived after unmount.");
        return;
    }
    match fetched {
        Ok(points) => {
            if session.message.as_deref() == Some(POINTS_UNAVAILABLE_MESSAGE) {
                session.message = None;
            }
            session.apply_points(points);
        }
        Err(err) => {
            tracing::warn!(session_id = %session.id, %err, "Failed to load map points.");
            session.message = Some(POINTS_UNAVAILABLE_MESSAGE.to_string());
        }
    }
}

/// Starts the picker at the device location once (and if) it arrives.
fn spawn_location_hint<SS: ISessionStorage>(app_context: &AppContext<SS>, handle: &SessionHandle) {
    let positions = Arc::clone(&app_context.positions);
    let timeout = app_context.config.geolocation_timeout;
    let handle = Arc::clone(handle);
    tokio::spawn(async move {
        let located = geolocation::locate(positions.as_ref(), timeout).await;
        let mut session = handle.lock().await;
        match located {
            Ok(point) => {
                if session.apply_location_hint(point) {
                    tracing::debug!(session_id = %session.id, "Moved the picker to the device location.");
                }
            }
            Err(err) => {
                tracing::debug!(session_id = %session.id, %err, "Staying at the default location.");
            }
        }
    });
}
