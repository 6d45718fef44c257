use crate::api::fake::{sample_shops, FakeLaundryApi};
use crate::app_context::{AppContext, PickerConfig};
use crate::auth;
use crate::cli::tests::fake_args;
use crate::http::router;
use crate::maps::backend::SceneLibrary;
use crate::maps::document::Document;
use crate::maps::geolocation::{PositionSource, StaticPositionSource};
use crate::maps::library::tests::{fake_assets, FakeAssetFetcher};
use crate::maps::library::MapLibraryLoader;
use crate::storage::sessions::HashMapSessionStorage;
use axum::http::HeaderValue;
use axum::Router;
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;

/// Handles to the collaborators behind a test server.
pub struct Fakes {
    pub api: Arc<FakeLaundryApi>,
    pub assets: Arc<FakeAssetFetcher>,
    pub sessions: HashMapSessionStorage,
    pub document: Arc<Document>,
    pub app_context: AppContext<HashMapSessionStorage>,
}

pub fn test_server() -> (TestServer, Fakes) {
    test_server_with(Arc::new(StaticPositionSource::new(None)))
}

pub fn test_server_with(positions: Arc<dyn PositionSource>) -> (TestServer, Fakes) {
    let (router, fakes) = test_router(positions);
    let server = TestServer::new(router).expect("Failed to run test server.");
    (server, fakes)
}

/// A server on a real socket, which websocket tests need.
pub fn ws_test_server() -> (TestServer, Fakes) {
    let (router, fakes) = test_router(Arc::new(StaticPositionSource::new(None)));
    let server = TestServer::builder()
        .http_transport()
        .build(router)
        .expect("Failed to run test server.");
    (server, fakes)
}

fn test_router(positions: Arc<dyn PositionSource>) -> (Router, Fakes) {
    let args = fake_args();
    auth::init(&args);
    let api = Arc::new(FakeLaundryApi::with_shops(sample_shops()));
    let assets = Arc::new(FakeAssetFetcher::default());
    let sessions = HashMapSessionStorage::default();
    let loader = MapLibraryLoader::new(
        Document::new(),
        Arc::clone(&assets) as _,
        Arc::new(SceneLibrary::new()),
        fake_assets(),
    );
    let document = Arc::clone(loader.document());
    let app_context = AppContext {
        sessions: sessions.clone(),
        loader: Arc::new(loader),
        api: Arc::clone(&api) as _,
        positions,
        config: PickerConfig {
            geolocation_timeout: Duration::from_millis(50),
            idle_timeout: Duration::from_millis(200),
            ..PickerConfig::from_args(&args)
        },
    };
    let router = router::new(&args, app_context.clone());
    let fakes = Fakes {
        api,
        assets,
        sessions,
        document,
        app_context,
    };
    (router, fakes)
}

pub fn authorization(token: &'static str) -> HeaderValue {
    HeaderValue::from_static(token)
}
