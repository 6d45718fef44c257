use crate::maps::backend::MapLibrary;
use crate::maps::document::{Document, HeadTag, HeadTagKind};
use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

pub const SCRIPT_TAG_ID: &str = "map-library-js";
pub const STYLESHEET_TAG_ID: &str = "map-library-css";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to fetch `{url}`: {reason}")]
    Fetch { url: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct LibraryAssets {
    pub script_url: Url,
    pub stylesheet_url: Url,
}

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<(), LoadError>;
}

pub struct HttpAssetFetcher {
    client: Client,
}

impl HttpAssetFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &Url) -> Result<(), LoadError> {
        let fetch_error = |reason: String| LoadError::Fetch {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|err| fetch_error(err.to_string()))?;
        if !response.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", response.status())));
        }
        Ok(())
    }
}

/// A loaded mapping library, ready to create maps.
#[derive(Clone)]
pub struct LibraryHandle {
    library: Arc<dyn MapLibrary>,
}

impl LibraryHandle {
    pub fn library(&self) -> Arc<dyn MapLibrary> {
        Arc::clone(&self.library)
    }
}

type PendingLoad = Shared<BoxFuture<'static, Result<LibraryHandle, LoadError>>>;

enum LoaderState {
    Idle,
    Pending { attempt: u64, load: PendingLoad },
    Ready(LibraryHandle),
}

/// Single-flight loader for the mapping library's script and stylesheet.
pub struct MapLibraryLoader {
    document: Arc<Document>,
    fetcher: Arc<dyn AssetFetcher>,
    library: Arc<dyn MapLibrary>,
    assets: LibraryAssets,
    state: Mutex<LoaderState>,
    attempts: AtomicU64,
}

impl MapLibraryLoader {
    pub fn new(
        document: Arc<Document>,
        fetcher: Arc<dyn AssetFetcher>,
        library: Arc<dyn MapLibrary>,
        assets: LibraryAssets,
    ) -> Self {
        Self {
            document,
            fetcher,
            library,
            assets,
            state: Mutex::new(LoaderState::Idle),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    #[cfg(test)]
    pub async fn is_loaded(&self) -> bool {
        matches!(*self.state.lock().await, LoaderState::Ready(_))
    }

    pub async fn ensure_loaded(&self) -> Result<LibraryHandle, LoadError> {
        let (attempt, load) = {
            let mut state = self.state.lock().await;
            match &*state {
                LoaderState::Ready(handle) => return Ok(handle.clone()),
                LoaderState::Pending { attempt, load } => (*attempt, load.clone()),
                LoaderState::Idle => {
                    let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
                    let load = self.start_load();
                    *state = LoaderState::Pending {
                        attempt,
                        load: load.clone(),
                    };
                    (attempt, load)
                }
            }
        };

        let result = load.await;

        let mut state = self.state.lock().await;
        if let LoaderState::Pending {
            attempt: current, ..
        } = &*state
        {
            if *current == attempt {
                *state = match &result {
                    Ok(handle) => {
                        tracing::info!(task = "map_library", attempt, "Map library loaded.");
                        LoaderState::Ready(handle.clone())
                    }
                    Err(err) => {
                        tracing::warn!(task = "map_library", attempt, %err, "Map library failed to load.");
                        LoaderState::Idle
                    }
                };
            }
        }
        result
    }

    fn start_load(&self) -> PendingLoad {
        self.document.inject_once(HeadTag {
            id: STYLESHEET_TAG_ID.to_string(),
            kind: HeadTagKind::Stylesheet,
            src: self.assets.stylesheet_url.to_string(),
        });
        self.document.inject_once(HeadTag {
            id: SCRIPT_TAG_ID.to_string(),
            kind: HeadTagKind::Script,
            src: self.assets.script_url.to_string(),
        });

        let fetcher = Arc::clone(&self.fetcher);
        let library = Arc::clone(&self.library);
        let assets = self.assets.clone();
        async move {
            tokio::try_join!(
                fetcher.fetch(&assets.script_url),
                fetcher.fetch(&assets.stylesheet_url),
            )?;
            Ok(LibraryHandle { library })
        }
        .boxed()
        .shared()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::maps::backend::SceneLibrary;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;

    /// Counts requests and optionally fails them.
    #[derive(Default)]
    pub struct FakeAssetFetcher {
        pub requests: AtomicUsize,
        pub failing: AtomicBool,
    }

    #[async_trait]
    impl AssetFetcher for FakeAssetFetcher {
        async fn fetch(&self, url: &Url) -> Result<(), LoadError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if self.failing.load(Ordering::SeqCst) {
                return Err(LoadError::Fetch {
                    url: url.to_string(),
                    reason: String::from("HTTP 503 Service Unavailable"),
                });
            }
            Ok(())
        }
    }

    pub fn fake_assets() -> LibraryAssets {
        LibraryAssets {
            script_url: Url::parse("https://unpkg.com/leaflet@1.9.4/dist/leaflet.js").unwrap(),
            stylesheet_url: Url::parse("https://unpkg.com/leaflet@1.9.4/dist/leaflet.css")
                .unwrap(),
        }
    }

    fn loader(fetcher: Arc<FakeAssetFetcher>) -> Arc<MapLibraryLoader> {
        Arc::new(MapLibraryLoader::new(
            Document::new(),
            fetcher,
            Arc::new(SceneLibrary::new()),
            fake_assets(),
        ))
    }

    #[tokio::test]
    async fn concurrent_loads_inject_one_script_and_one_stylesheet() {
        let fetcher = Arc::new(FakeAssetFetcher::default());
        let loader = loader(Arc::clone(&fetcher));

        let waiters = (0..16)
            .map(|_| {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move { loader.ensure_loaded().await })
            })
            .collect::<Vec<_>>();
        for waiter in waiters {
            assert!(waiter.await.unwrap().is_ok());
        }

        let tags = loader.document().head_tags();
        let scripts = tags
            .iter()
            .filter(|tag| tag.kind == HeadTagKind::Script)
            .count();
        let stylesheets = tags
            .iter()
            .filter(|tag| tag.kind == HeadTagKind::Stylesheet)
            .count();
        assert_eq!((scripts, stylesheets), (1, 1));
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 2);
        assert!(loader.is_loaded().await);
    }

    #[tokio::test]
    async fn loaded_library_is_reused() {
        let fetcher = Arc::new(FakeAssetFetcher::default());
        let loader = loader(Arc::clone(&fetcher));

        loader.ensure_loaded().await.unwrap();
        loader.ensure_loaded().await.unwrap();

        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_is_not_retried() {
        let fetcher = Arc::new(FakeAssetFetcher::default());
        fetcher.failing.store(true, Ordering::SeqCst);
        let loader = loader(Arc::clone(&fetcher));

        let (first, second) = tokio::join!(loader.ensure_loaded(), loader.ensure_loaded());

        assert!(first.is_err());
        assert_eq!(first.err(), second.err());
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 2);
        assert!(!loader.is_loaded().await);
    }

    #[tokio::test]
    async fn explicit_reload_after_failure_keeps_tags_unique() {
        let fetcher = Arc::new(FakeAssetFetcher::default());
        fetcher.failing.store(true, Ordering::SeqCst);
        let loader = loader(Arc::clone(&fetcher));
        assert!(loader.ensure_loaded().await.is_err());

        fetcher.failing.store(false, Ordering::SeqCst);
        assert!(loader.ensure_loaded().await.is_ok());

        assert_eq!(loader.document().head_tags().len(), 2);
        assert_eq!(fetcher.requests.load(Ordering::SeqCst), 4);
    }
}
