use crate::auth::models::Role;
use crate::geo::models::GeoPoint;
use crate::maps::backend::MapSnapshot;
use crate::maps::coords::CoordinateState;
use crate::maps::lifecycle::{MapLifecycle, MapState};
use crate::maps::markers::MarkerSync;
use crate::maps::models::PointOfInterest;
use crate::sessions::consts::SESSION_ID_LENGTH;
use crate::sessions::responses::SessionErrorCode;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::Instant;

pub type SessionHandle = Arc<Mutex<PickerSession>>;

/// The screens that embed a location picker.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PickerKind {
    /// Customer chooses a pickup point and a shop.
    CreateOrder,
    /// Customer pins one of their saved addresses.
    SavedAddress,
    /// Admin pins where a shop is.
    ShopPinning,
    /// Employee looks at all shops.
    EmployeeShops,
    /// Rider and customer positions of one order.
    RiderMap,
    /// Scratch map with fare estimates.
    MapTest,
}

impl PickerKind {
    pub fn allows(&self, role: Role) -> bool {
        match self {
            PickerKind::CreateOrder | PickerKind::SavedAddress => {
                matches!(role, Role::Customer | Role::Admin)
            }
            PickerKind::ShopPinning => role == Role::Admin,
            PickerKind::EmployeeShops => matches!(role, Role::Employee | Role::Admin),
            PickerKind::RiderMap => matches!(role, Role::Rider | Role::Customer | Role::Admin),
            PickerKind::MapTest => true,
        }
    }

    /// Whether the user picks a point on this map.
    pub fn has_selection(&self) -> bool {
        matches!(
            self,
            PickerKind::CreateOrder
                | PickerKind::SavedAddress
                | PickerKind::ShopPinning
                | PickerKind::MapTest
        )
    }

    pub fn container_prefix(&self) -> &'static str {
        match self {
            PickerKind::CreateOrder => "create-order-map",
            PickerKind::SavedAddress => "saved-address-map",
            PickerKind::ShopPinning => "shop-pinning-map",
            PickerKind::EmployeeShops => "employee-shops-map",
            PickerKind::RiderMap => "rider-map",
            PickerKind::MapTest => "test-map",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PointSource {
    Nothing,
    Shops,
    SavedAddresses { user_id: String },
    OrderTracking { order_id: String },
}

/// One mounted page with a map on it.
pub struct PickerSession {
    pub id: String,
    pub kind: PickerKind,
    pub owner_id: String,
    pub point_source: PointSource,
    pub lifecycle: MapLifecycle,
    pub markers: MarkerSync,
    pub coords: CoordinateState,
    pub points: Vec<PointOfInterest>,
    pub message: Option<String>,
    /// Set once the user chose a point themselves; location hints stop overriding it then.
    pub user_touched_selection: bool,
    pub last_touched: Instant,
    pub open_sockets: usize,
}

impl PickerSession {
    pub fn new(
        kind: PickerKind,
        owner_id: &str,
        point_source: PointSource,
        initial_selection: Option<GeoPoint>,
    ) -> Self {
        let id = generate_session_id();
        let container_id = format!("{}-{}", kind.container_prefix(), id);
        Self {
            id,
            kind,
            owner_id: owner_id.to_string(),
            point_source,
            lifecycle: MapLifecycle::new(&container_id),
            markers: MarkerSync::new(),
            coords: CoordinateState::new(initial_selection),
            points: Vec::new(),
            message: None,
            user_touched_selection: false,
            last_touched: Instant::now(),
            open_sockets: 0,
        }
    }

    pub fn touch(&mut self) {
        self.last_touched = Instant::now();
    }

    /// No request for `idle_timeout` and no selection socket open.
    pub fn is_idle(&self, idle_timeout: Duration) -> bool {
        self.open_sockets == 0 && self.last_touched.elapsed() >= idle_timeout
    }

    pub fn attach_socket(&mut self) -> watch::Receiver<Option<GeoPoint>> {
        self.open_sockets += 1;
        self.touch();
        self.coords.subscribe()
    }

    pub fn detach_socket(&mut self) {
        self.open_sockets = self.open_sockets.saturating_sub(1);
        self.touch();
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle.state() != MapState::Destroyed
    }

    /// Draws the points and the selection on a freshly mounted map.
    pub fn render(&mut self) {
        let Some(map) = self.lifecycle.map() else {
            return;
        };
        self.markers.redraw(map, &self.points);
        if self.kind.has_selection() {
            if let Err(err) = self.markers.follow_selection(map, &self.coords) {
                tracing::warn!(session_id = %self.id, %err, "Failed to draw the selection.");
            }
        }
    }

    pub fn apply_points(&mut self, points: Vec<PointOfInterest>) {
        self.points = points;
        if let Some(map) = self.lifecycle.map() {
            self.markers.redraw(map, &self.points);
        }
    }

    /// Moves the selection to a location hint unless the user already picked something.
    pub fn apply_location_hint(&mut self, point: GeoPoint) -> bool {
        if !self.kind.has_selection() || self.user_touched_selection || !self.is_mounted() {
            return false;
        }
        self.coords.set(point);
        self.sync_selection(true);
        true
    }

    pub fn select(&mut self, point: GeoPoint, pan: bool) {
        self.user_touched_selection = true;
        self.coords.set(point);
        self.sync_selection(pan);
    }

    pub fn sync_selection(&mut self, pan: bool) {
        let Some(map) = self.lifecycle.map() else {
            return;
        };
        if let Err(err) = self.markers.follow_selection(map, &self.coords) {
            tracing::warn!(session_id = %self.id, %err, "Failed to move the selection.");
            return;
        }
        if let (true, Some(point)) = (pan, self.coords.get()) {
            let _ = map.library().pan_to(map.id(), point);
        }
    }

    pub fn click(&mut self, point: GeoPoint) -> Result<(), SessionErrorCode> {
        if !self.kind.has_selection() {
            return Err(SessionErrorCode::SelectionDisabled);
        }
        let Some(map) = self.lifecycle.map() else {
            return Err(SessionErrorCode::MapNotReady);
        };
        self.user_touched_selection = true;
        self.markers
            .place_selection(map, &self.coords, point)
            .map_err(|err| {
                tracing::warn!(session_id = %self.id, %err, "Failed to place the selection.");
                SessionErrorCode::MapNotReady
            })
    }

    pub fn drag(&mut self, point: GeoPoint) -> Result<(), SessionErrorCode> {
        if !self.kind.has_selection() {
            return Err(SessionErrorCode::SelectionDisabled);
        }
        let Some(map) = self.lifecycle.map() else {
            return Err(SessionErrorCode::MapNotReady);
        };
        match self.markers.drag_selection(map, &self.coords, point) {
            Ok(true) => {
                self.user_touched_selection = true;
                Ok(())
            }
            Ok(false) => Err(SessionErrorCode::NothingToDrag),
            Err(err) => {
                tracing::warn!(session_id = %self.id, %err, "Failed to drag the selection.");
                Err(SessionErrorCode::MapNotReady)
            }
        }
    }

    /// Coordinates typed into the form. Unparsable input unsets the selection.
    pub fn enter_selection(
        &mut self,
        raw_lat: &str,
        raw_lng: &str,
    ) -> Result<Option<GeoPoint>, SessionErrorCode> {
        if !self.kind.has_selection() {
            return Err(SessionErrorCode::SelectionDisabled);
        }
        self.user_touched_selection = true;
        let parsed = self.coords.set_raw(raw_lat, raw_lng);
        self.sync_selection(parsed.is_some());
        Ok(parsed)
    }

    /// Cross-highlights a list entry on the map. `false` when it has no marker yet.
    pub fn focus(&self, point_id: &str) -> bool {
        match self.lifecycle.map() {
            Some(map) => self.markers.focus_point(map, point_id),
            None => false,
        }
    }

    pub fn unmount(&mut self) {
        self.lifecycle.unmount(&mut self.markers);
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id.clone(),
            kind: self.kind,
            state: self.lifecycle.state(),
            container_id: self.lifecycle.container_id().to_string(),
            selection: self.coords.get(),
            ready_to_submit: self.kind.has_selection() && self.coords.is_ready(),
            points: self.points.clone(),
            map: self.lifecycle.map().and_then(|map| map.snapshot()),
            message: self
                .lifecycle
                .error_message()
                .map(str::to_string)
                .or_else(|| self.message.clone()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub kind: PickerKind,
    pub state: MapState,
    pub container_id: String,
    pub selection: Option<GeoPoint>,
    pub ready_to_submit: bool,
    pub points: Vec<PointOfInterest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map: Option<MapSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_pin_shops() {
        assert!(PickerKind::ShopPinning.allows(Role::Admin));
        assert!(!PickerKind::ShopPinning.allows(Role::Employee));
        assert!(!PickerKind::ShopPinning.allows(Role::Customer));
    }

    #[test]
    fn riders_cannot_create_orders() {
        assert!(!PickerKind::CreateOrder.allows(Role::Rider));
        assert!(PickerKind::RiderMap.allows(Role::Rider));
        assert!(PickerKind::MapTest.allows(Role::Rider));
    }

    #[test]
    fn view_only_maps_have_no_selection() {
        assert!(!PickerKind::EmployeeShops.has_selection());
        assert!(!PickerKind::RiderMap.has_selection());
        assert!(PickerKind::CreateOrder.has_selection());
    }

    #[test]
    fn unmounted_session_ignores_location_hints() {
        let default = GeoPoint::new(13.7563, 100.5018).ok();
        let mut session = PickerSession::new(
            PickerKind::CreateOrder,
            "customer-1",
            PointSource::Shops,
            default,
        );
        session.unmount();

        assert!(!session.apply_location_hint(GeoPoint::new(13.8, 100.6).unwrap()));
        assert_eq!(session.coords.get(), default);
    }

    #[test]
    fn user_choice_wins_over_a_late_hint() {
        let mut session =
            PickerSession::new(PickerKind::MapTest, "customer-1", PointSource::Nothing, None);
        let chosen = GeoPoint::new(13.75, 100.5).unwrap();
        session.select(chosen, false);

        assert!(!session.apply_location_hint(GeoPoint::new(13.8, 100.6).unwrap()));
        assert_eq!(session.coords.get(), Some(chosen));
    }

    #[test]
    fn container_ids_are_per_session() {
        let first =
            PickerSession::new(PickerKind::RiderMap, "rider-1", PointSource::Nothing, None);
        let second =
            PickerSession::new(PickerKind::RiderMap, "rider-1", PointSource::Nothing, None);
        assert!(first.lifecycle.container_id().starts_with("rider-map-"));
        assert_ne!(
            first.lifecycle.container_id(),
            second.lifecycle.container_id()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn open_sockets_keep_a_session_alive() {
        let idle_timeout = Duration::from_secs(60);
        let mut session =
            PickerSession::new(PickerKind::MapTest, "customer-1", PointSource::Nothing, None);
        let _receiver = session.attach_socket();

        tokio::time::advance(Duration::from_secs(120)).await;
        assert!(!session.is_idle(idle_timeout));

        session.detach_socket();
        assert!(!session.is_idle(idle_timeout));
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(session.is_idle(idle_timeout));

        session.touch();
        assert!(!session.is_idle(idle_timeout));
    }
}
