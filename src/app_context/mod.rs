use crate::api::{HttpLaundryApi, LaundryApi};
use crate::auth::extractors::User;
use crate::cli::Args;
use crate::geo::models::GeoPoint;
use crate::maps::backend::{MapLibrary, SceneLibrary};
use crate::maps::document::Document;
use crate::maps::geolocation::{HttpPositionSource, PositionSource, StaticPositionSource};
use crate::maps::library::{HttpAssetFetcher, LibraryAssets, MapLibraryLoader};
use crate::maps::models::TileLayerConfig;
use crate::storage::interface::ISessionStorage;
use crate::storage::sessions::HashMapSessionStorage;
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by every picker page.
#[derive(Clone, Debug)]
pub struct PickerConfig {
    pub default_location: GeoPoint,
    pub tiles: TileLayerConfig,
    pub geolocation_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_sessions_per_owner: usize,
}

impl PickerConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            default_location: GeoPoint::new(args.default_latitude, args.default_longitude)
                .expect("The default location is out of range."),
            tiles: TileLayerConfig {
                url_template: args.tile_url_template.clone(),
                attribution: args.tile_attribution.clone(),
            },
            geolocation_timeout: Duration::from_secs(args.geolocation_timeout_secs),
            idle_timeout: Duration::from_secs(args.session_idle_timeout_secs),
            max_sessions_per_owner: args.max_sessions_per_user.max(1),
        }
    }
}

#[derive(Clone)]
pub struct AppContext<SS: ISessionStorage> {
    pub sessions: SS,
    pub loader: Arc<MapLibraryLoader>,
    pub api: Arc<dyn LaundryApi>,
    pub positions: Arc<dyn PositionSource>,
    pub config: PickerConfig,
}

impl<SS: ISessionStorage> AppContext<SS> {
    pub fn document(&self) -> &Arc<Document> {
        self.loader.document()
    }
}

pub struct RequestContext {
    pub user: User,
    pub session_id: String,
}

pub fn init(args: &Args) -> AppContext<HashMapSessionStorage> {
    let library: Arc<dyn MapLibrary> = Arc::new(SceneLibrary::new());
    let loader = MapLibraryLoader::new(
        Document::new(),
        Arc::new(HttpAssetFetcher::new()),
        library,
        LibraryAssets {
            script_url: args.map_script_url.clone(),
            stylesheet_url: args.map_stylesheet_url.clone(),
        },
    );
    let positions: Arc<dyn PositionSource> = match &args.geolocation_url {
        Some(url) => Arc::new(HttpPositionSource::new(url.clone())),
        None => {
            tracing::warn!("No geolocation service is configured, pickers will start at the default location.");
            Arc::new(StaticPositionSource::new(None))
        }
    };
    AppContext {
        sessions: HashMapSessionStorage::default(),
        loader: Arc::new(loader),
        api: Arc::new(HttpLaundryApi::from_env(args.api_url.clone())),
        positions,
        config: PickerConfig::from_args(args),
    }
}
