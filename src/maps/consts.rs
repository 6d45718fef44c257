/// Marker key of the movable point the user is choosing.
pub const SELECTION_KEY: &str = "selected";
pub const MAX_POPUP_TITLE_LENGTH: usize = 60;
pub const DEFAULT_ZOOM: u8 = 13;
pub const MAP_LOAD_FAILED_MESSAGE: &str = "failed to load map";
