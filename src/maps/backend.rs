use crate::geo::models::GeoPoint;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use url::Url;

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_MARKER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MapId(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MarkerId(u64);

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerOptions {
    pub key: String,
    pub position: GeoPoint,
    pub draggable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map {0:?} does not exist")]
    UnknownMap(MapId),
    #[error("marker {0:?} does not exist")]
    UnknownMarker(MarkerId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PopupError {
    #[error("popup image `{0}` cannot be displayed")]
    BrokenImage(String),
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Everything the rest of the server needs from a mapping library.
pub trait MapLibrary: Send + Sync {
    fn create_map(&self, container_id: &str, center: GeoPoint, zoom: u8) -> MapId;

    fn add_tile_layer(&self, map: MapId, url_template: &str, attribution: &str)
        -> Result<(), MapError>;

    fn create_marker(&self, map: MapId, options: MarkerOptions) -> Result<MarkerId, MapError>;

    fn move_marker(&self, map: MapId, marker: MarkerId, position: GeoPoint)
        -> Result<(), MapError>;

    fn remove_marker(&self, map: MapId, marker: MarkerId) -> Result<(), MapError>;

    fn bind_popup(
        &self,
        map: MapId,
        marker: MarkerId,
        content: PopupContent,
    ) -> Result<(), PopupError>;

    fn open_popup(&self, map: MapId, marker: MarkerId) -> Result<(), MapError>;

    fn pan_to(&self, map: MapId, center: GeoPoint) -> Result<(), MapError>;

    fn remove_map(&self, map: MapId);

    fn snapshot(&self, map: MapId) -> Option<MapSnapshot>;

    #[cfg(test)]
    fn live_maps(&self) -> usize;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSnapshot {
    pub container_id: String,
    pub center: GeoPoint,
    pub zoom: u8,
    pub tile_layers: Vec<TileLayerSnapshot>,
    pub markers: Vec<MarkerSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerSnapshot {
    pub url_template: String,
    pub attribution: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSnapshot {
    pub id: MarkerId,
    pub key: String,
    pub position: GeoPoint,
    pub draggable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<PopupContent>,
    pub popup_open: bool,
}

struct SceneMap {
    container_id: String,
    center: GeoPoint,
    zoom: u8,
    tile_layers: Vec<TileLayerSnapshot>,
    markers: BTreeMap<MarkerId, SceneMarker>,
    open_popup: Option<MarkerId>,
}

struct SceneMarker {
    key: String,
    position: GeoPoint,
    draggable: bool,
    popup: Option<PopupContent>,
}

/// In-memory map library. Renders into a scene graph that is served back to clients.
#[derive(Default)]
pub struct SceneLibrary {
    maps: Mutex<BTreeMap<MapId, SceneMap>>,
}

impl SceneLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn maps(&self) -> MutexGuard<'_, BTreeMap<MapId, SceneMap>> {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_map<T>(
        &self,
        map: MapId,
        f: impl FnOnce(&mut SceneMap) -> Result<T, MapError>,
    ) -> Result<T, MapError> {
        let mut maps = self.maps();
        let scene_map = maps.get_mut(&map).ok_or(MapError::UnknownMap(map))?;
        f(scene_map)
    }
}

fn image_is_displayable(image_url: &str) -> bool {
    Url::parse(image_url)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

impl MapLibrary for SceneLibrary {
    fn create_map(&self, container_id: &str, center: GeoPoint, zoom: u8) -> MapId {
        let map = MapId(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed));
        self.maps().insert(
            map,
            SceneMap {
                container_id: container_id.to_string(),
                center,
                zoom,
                tile_layers: Vec::new(),
                markers: BTreeMap::new(),
                open_popup: None,
            },
        );
        map
    }

    fn add_tile_layer(
        &self,
        map: MapId,
        url_template: &str,
        attribution: &str,
    ) -> Result<(), MapError> {
        self.with_map(map, |scene_map| {
            scene_map.tile_layers.push(TileLayerSnapshot {
                url_template: url_template.to_string(),
                attribution: attribution.to_string(),
            });
            Ok(())
        })
    }

    fn create_marker(&self, map: MapId, options: MarkerOptions) -> Result<MarkerId, MapError> {
        self.with_map(map, |scene_map| {
            let marker = MarkerId(NEXT_MARKER_ID.fetch_add(1, Ordering::Relaxed));
            scene_map.markers.insert(
                marker,
                SceneMarker {
                    key: options.key,
                    position: options.position,
                    draggable: options.draggable,
                    popup: None,
                },
            );
            Ok(marker)
        })
    }

    fn move_marker(
        &self,
        map: MapId,
        marker: MarkerId,
        position: GeoPoint,
    ) -> Result<(), MapError> {
        self.with_map(map, |scene_map| {
            let scene_marker = scene_map
                .markers
                .get_mut(&marker)
                .ok_or(MapError::UnknownMarker(marker))?;
            scene_marker.position = position;
            Ok(())
        })
    }

    fn remove_marker(&self, map: MapId, marker: MarkerId) -> Result<(), MapError> {
        self.with_map(map, |scene_map| {
            scene_map
                .markers
                .remove(&marker)
                .ok_or(MapError::UnknownMarker(marker))?;
            if scene_map.open_popup == Some(marker) {
                scene_map.open_popup = None;
            }
            Ok(())
        })
    }

    fn bind_popup(
        &self,
        map: MapId,
        marker: MarkerId,
        content: PopupContent,
    ) -> Result<(), PopupError> {
        if let Some(image_url) = &content.image_url {
            if !image_is_displayable(image_url) {
                return Err(PopupError::BrokenImage(image_url.clone()));
            }
        }
        self.with_map(map, |scene_map| {
            let scene_marker = scene_map
                .markers
                .get_mut(&marker)
                .ok_or(MapError::UnknownMarker(marker))?;
            scene_marker.popup = Some(content);
            Ok(())
        })?;
        Ok(())
    }

    fn open_popup(&self, map: MapId, marker: MarkerId) -> Result<(), MapError> {
        self.with_map(map, |scene_map| {
            if !scene_map.markers.contains_key(&marker) {
                return Err(MapError::UnknownMarker(marker));
            }
            scene_map.open_popup = Some(marker);
            Ok(())
        })
    }

    fn pan_to(&self, map: MapId, center: GeoPoint) -> Result<(), MapError> {
        self.with_map(map, |scene_map| {
            scene_map.center = center;
            Ok(())
        })
    }

    fn remove_map(&self, map: MapId) {
        self.maps().remove(&map);
    }

    fn snapshot(&self, map: MapId) -> Option<MapSnapshot> {
        let maps = self.maps();
        let scene_map = maps.get(&map)?;
        let markers = scene_map
            .markers
            .iter()
            .map(|(&id, marker)| MarkerSnapshot {
                id,
                key: marker.key.clone(),
                position: marker.position,
                draggable: marker.draggable,
                popup: marker.popup.clone(),
                popup_open: scene_map.open_popup == Some(id),
            })
            .collect();
        Some(MapSnapshot {
            container_id: scene_map.container_id.clone(),
            center: scene_map.center,
            zoom: scene_map.zoom,
            tile_layers: scene_map.tile_layers.clone(),
            markers,
        })
    }

    #[cfg(test)]
    fn live_maps(&self) -> usize {
        self.maps().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bangkok() -> GeoPoint {
        GeoPoint::new(13.7563, 100.5018).unwrap()
    }

    #[test]
    fn broken_popup_image_is_reported() {
        let library = SceneLibrary::new();
        let map = library.create_map("map", bangkok(), 13);
        let marker = library
            .create_marker(
                map,
                MarkerOptions {
                    key: String::from("s1"),
                    position: bangkok(),
                    draggable: false,
                },
            )
            .unwrap();
        let result = library.bind_popup(
            map,
            marker,
            PopupContent {
                title: String::from("Shop"),
                image_url: Some(String::from("not a url")),
            },
        );
        assert_eq!(
            result,
            Err(PopupError::BrokenImage(String::from("not a url")))
        );
        let snapshot = library.snapshot(map).unwrap();
        assert_eq!(snapshot.markers.len(), 1);
        assert_eq!(snapshot.markers[0].popup, None);
    }

    #[test]
    fn removing_a_marker_closes_its_popup() {
        let library = SceneLibrary::new();
        let map = library.create_map("map", bangkok(), 13);
        let marker = library
            .create_marker(
                map,
                MarkerOptions {
                    key: String::from("s1"),
                    position: bangkok(),
                    draggable: false,
                },
            )
            .unwrap();
        library.open_popup(map, marker).unwrap();
        library.remove_marker(map, marker).unwrap();
        assert_eq!(
            library.open_popup(map, marker),
            Err(MapError::UnknownMarker(marker))
        );
        assert!(library.snapshot(map).unwrap().markers.is_empty());
    }

    #[test]
    fn removed_map_has_no_snapshot() {
        let library = SceneLibrary::new();
        let map = library.create_map("map", bangkok(), 13);
        assert_eq!(library.live_maps(), 1);
        library.remove_map(map);
        assert_eq!(library.live_maps(), 0);
        assert!(library.snapshot(map).is_none());
        assert_eq!(library.pan_to(map, bangkok()), Err(MapError::UnknownMap(map)));
    }
}
