use crate::geo::models::GeoPoint;
use tokio::sync::watch;

/// Holds the currently selected coordinate and notifies subscribers about changes.
pub struct CoordinateState {
    sender: watch::Sender<Option<GeoPoint>>,
}

impl CoordinateState {
    pub fn new(initial: Option<GeoPoint>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn get(&self) -> Option<GeoPoint> {
        *self.sender.borrow()
    }

    pub fn set(&self, point: GeoPoint) {
        self.sender.send_replace(Some(point));
    }

    /// Sets the coordinate from form input; non-numeric input leaves the state unset.
    pub fn set_raw(&self, raw_lat: &str, raw_lng: &str) -> Option<GeoPoint> {
        let parsed = GeoPoint::parse(raw_lat, raw_lng);
        self.sender.send_replace(parsed);
        parsed
    }

    /// Whether the selection can be submitted.
    pub fn is_ready(&self) -> bool {
        self.get().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GeoPoint>> {
        self.sender.subscribe()
    }
}

impl Default for CoordinateState {
    fn default() -> Self {
        Self::new(None)
    }
}
