use crate::geo::models::GeoPoint;
use crate::maps::backend::{MapId, MapLibrary, MapSnapshot};
use crate::maps::consts::{DEFAULT_ZOOM, MAP_LOAD_FAILED_MESSAGE};
use crate::maps::document::{BindError, ContainerLease, Document};
use crate::maps::library::{LibraryHandle, LoadError};
use crate::maps::markers::MarkerSync;
use crate::maps::models::TileLayerConfig;
use serde::Serialize;
use std::sync::Arc;

/// A live map widget. Dropping the handle removes the widget from the library.
pub struct MapHandle {
    library: Arc<dyn MapLibrary>,
    id: MapId,
}

impl MapHandle {
    pub fn create(
        library: Arc<dyn MapLibrary>,
        container_id: &str,
        center: GeoPoint,
        zoom: u8,
    ) -> Self {
        let id = library.create_map(container_id, center, zoom);
        Self { library, id }
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn library(&self) -> &dyn MapLibrary {
        self.library.as_ref()
    }

    pub fn snapshot(&self) -> Option<MapSnapshot> {
        self.library.snapshot(self.id)
    }
}

impl Drop for MapHandle {
    fn drop(&mut self) {
        self.library.remove_map(self.id);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MapState {
    Uninitialized,
    Loading,
    Ready,
    Destroyed,
}

enum Stage {
    Uninitialized,
    Loading {
        lease: ContainerLease,
    },
    Ready {
        map: MapHandle,
        // Field order matters: the widget goes before the container is freed.
        _lease: ContainerLease,
    },
    Destroyed,
}

/// Proof that `begin_mount` moved the lifecycle into `Loading`.
#[derive(Debug)]
pub struct MountTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted,
    /// The page was torn down while the library was loading.
    Discarded,
}

/// Creates the map on mount and tears it down on unmount, at most one widget per container.
pub struct MapLifecycle {
    container_id: String,
    stage: Stage,
    generation: u64,
    error_message: Option<String>,
}

impl MapLifecycle {
    pub fn new(container_id: &str) -> Self {
        Self {
            container_id: container_id.to_string(),
            stage: Stage::Uninitialized,
            generation: 0,
            error_message: None,
        }
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn state(&self) -> MapState {
        match self.stage {
            Stage::Uninitialized => MapState::Uninitialized,
            Stage::Loading { .. } => MapState::Loading,
            Stage::Ready { .. } => MapState::Ready,
            Stage::Destroyed => MapState::Destroyed,
        }
    }

    pub fn map(&self) -> Option<&MapHandle> {
        match &self.stage {
            Stage::Ready { map, .. } => Some(map),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Claims the container and enters `Loading`. Returns `None` while already loading or ready.
    pub fn begin_mount(
        &mut self,
        document: &Arc<Document>,
    ) -> Result<Option<MountTicket>, BindError> {
        match self.stage {
            Stage::Uninitialized => {}
            Stage::Loading { .. } | Stage::Ready { .. } | Stage::Destroyed => return Ok(None),
        }
        let lease = document.bind(&self.container_id)?;
        self.generation += 1;
        self.error_message = None;
        self.stage = Stage::Loading { lease };
        tracing::debug!(container_id = %self.container_id, "Map is loading.");
        Ok(Some(MountTicket {
            generation: self.generation,
        }))
    }

    pub fn finish_mount(
        &mut self,
        ticket: MountTicket,
        library: &LibraryHandle,
        center: GeoPoint,
        tiles: &TileLayerConfig,
    ) -> MountOutcome {
        if ticket.generation != self.generation {
            return MountOutcome::Discarded;
        }
        let lease = match std::mem::replace(&mut self.stage, Stage::Uninitialized) {
            Stage::Loading { lease } => lease,
            other => {
                self.stage = other;
                return MountOutcome::Discarded;
            }
        };
        let map = MapHandle::create(library.library(), &self.container_id, center, DEFAULT_ZOOM);
        if let Err(err) =
            map.library()
                .add_tile_layer(map.id(), &tiles.url_template, &tiles.attribution)
        {
            tracing::warn!(container_id = %self.container_id, %err, "Failed to attach tiles.");
        }
        self.stage = Stage::Ready { map, _lease: lease };
        tracing::debug!(container_id = %self.container_id, "Map is ready.");
        MountOutcome::Mounted
    }

    /// The library failed to load: free the container and remember the message for the user.
    pub fn fail_mount(&mut self, ticket: MountTicket, err: &LoadError) -> MountOutcome {
        if ticket.generation != self.generation || !matches!(self.stage, Stage::Loading { .. }) {
            return MountOutcome::Discarded;
        }
        tracing::warn!(container_id = %self.container_id, %err, "Map failed to mount.");
        self.stage = Stage::Uninitialized;
        self.error_message = Some(MAP_LOAD_FAILED_MESSAGE.to_string());
        MountOutcome::Discarded
    }

    /// Releases the widget, every marker reference and the container. Final.
    pub fn unmount(&mut self, markers: &mut MarkerSync) {
        if let Some(map) = self.map() {
            markers.clear(map);
        }
        markers.forget();
        self.generation += 1;
        self.stage = Stage::Destroyed;
        tracing::debug!(container_id = %self.container_id, "Map was destroyed.");
    }
}
