pub const SESSION_ID_LENGTH: usize = 10;
pub const LOCATION_UNAVAILABLE_MESSAGE: &str = "unable to get your current location";
pub const POINTS_UNAVAILABLE_MESSAGE: &str = "failed to load map points";
pub const DEFAULT_ADDRESS_LABEL: &str = "Home";
