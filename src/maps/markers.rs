use crate::geo::models::GeoPoint;
use crate::maps::backend::{MapError, MarkerId, MarkerOptions, PopupContent, PopupError};
use crate::maps::consts::{MAX_POPUP_TITLE_LENGTH, SELECTION_KEY};
use crate::maps::coords::CoordinateState;
use crate::maps::lifecycle::MapHandle;
use crate::maps::models::PointOfInterest;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Keeps exactly one marker per point of interest, plus the movable selection marker.
#[derive(Default)]
pub struct MarkerSync {
    fixed: HashMap<String, FixedMarker>,
    selection: Option<MarkerId>,
}

struct FixedMarker {
    marker: MarkerId,
    position: GeoPoint,
}

impl MarkerSync {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn fixed_markers(&self) -> usize {
        self.fixed.len()
    }

    /// Removes every fixed marker and draws `points` from scratch. Returns how many were drawn.
    pub fn redraw(&mut self, map: &MapHandle, points: &[PointOfInterest]) -> usize {
        self.clear_fixed(map);
        for point in points {
            let Some(position) = point.location else {
                tracing::debug!(point_id = %point.id, "Skipping a point without coordinates.");
                continue;
            };
            if self.fixed.contains_key(&point.id) || point.id == SELECTION_KEY {
                tracing::warn!(point_id = %point.id, "Skipping a point with a duplicate id.");
                continue;
            }
            let options = MarkerOptions {
                key: point.id.clone(),
                position,
                draggable: false,
            };
            let marker = match map.library().create_marker(map.id(), options) {
                Ok(marker) => marker,
                Err(err) => {
                    tracing::warn!(point_id = %point.id, %err, "Failed to draw a marker.");
                    continue;
                }
            };
            bind_popup(map, marker, point);
            self.fixed
                .insert(point.id.clone(), FixedMarker { marker, position });
        }
        self.fixed.len()
    }

    /// Click-to-place: moves (or creates) the selection marker and updates the coordinate.
    pub fn place_selection(
        &mut self,
        map: &MapHandle,
        coords: &CoordinateState,
        point: GeoPoint,
    ) -> Result<(), MapError> {
        coords.set(point);
        self.follow_selection(map, coords)
    }

    /// The selection marker was dragged to `point`. Returns `false` if there's nothing to drag.
    pub fn drag_selection(
        &mut self,
        map: &MapHandle,
        coords: &CoordinateState,
        point: GeoPoint,
    ) -> Result<bool, MapError> {
        let Some(marker) = self.selection else {
            return Ok(false);
        };
        map.library().move_marker(map.id(), marker, point)?;
        coords.set(point);
        Ok(true)
    }

    /// Brings the selection marker in line with the coordinate state without re-creating it.
    pub fn follow_selection(
        &mut self,
        map: &MapHandle,
        coords: &CoordinateState,
    ) -> Result<(), MapError> {
        match (coords.get(), self.selection) {
            (Some(point), Some(marker)) => map.library().move_marker(map.id(), marker, point),
            (Some(point), None) => {
                let options = MarkerOptions {
                    key: SELECTION_KEY.to_string(),
                    position: point,
                    draggable: true,
                };
                self.selection = Some(map.library().create_marker(map.id(), options)?);
                Ok(())
            }
            (None, Some(marker)) => {
                self.selection = None;
                map.library().remove_marker(map.id(), marker)
            }
            (None, None) => Ok(()),
        }
    }

    /// Pans to the point's marker and opens its popup. Unknown ids are ignored.
    pub fn focus_point(&self, map: &MapHandle, point_id: &str) -> bool {
        let Some(fixed) = self.fixed.get(point_id) else {
            return false;
        };
        let library = map.library();
        if let Err(err) = library
            .pan_to(map.id(), fixed.position)
            .and_then(|()| library.open_popup(map.id(), fixed.marker))
        {
            tracing::warn!(point_id, %err, "Failed to focus a point.");
            return false;
        }
        true
    }

    pub fn clear(&mut self, map: &MapHandle) {
        self.clear_fixed(map);
        if let Some(marker) = self.selection.take() {
            let _ = map.library().remove_marker(map.id(), marker);
        }
    }

    /// Drops marker references whose map is already gone.
    pub fn forget(&mut self) {
        self.fixed.clear();
        self.selection = None;
    }

    fn clear_fixed(&mut self, map: &MapHandle) {
        let library = map.library();
        for (_, fixed) in self.fixed.drain() {
            let _ = library.remove_marker(map.id(), fixed.marker);
        }
    }
}

fn popup_title(label: &str) -> String {
    label.graphemes(true).take(MAX_POPUP_TITLE_LENGTH).collect()
}

fn bind_popup(map: &MapHandle, marker: MarkerId, point: &PointOfInterest) {
    let title = popup_title(&point.label);
    let content = PopupContent {
        title: title.clone(),
        image_url: point.image_url.clone(),
    };
    match map.library().bind_popup(map.id(), marker, content) {
        Ok(()) => {}
        Err(PopupError::BrokenImage(image_url)) => {
            tracing::warn!(point_id = %point.id, %image_url, "Popup image is broken, showing text only.");
            let text_only = PopupContent {
                title,
                image_url: None,
            };
            if let Err(err) = map.library().bind_popup(map.id(), marker, text_only) {
                tracing::warn!(point_id = %point.id, %err, "Failed to bind a popup.");
            }
        }
        Err(err) => tracing::warn!(point_id = %point.id, %err, "Failed to bind a popup."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maps::backend::{MapLibrary, SceneLibrary};
    use std::sync::Arc;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn map() -> (Arc<SceneLibrary>, MapHandle) {
        let library = Arc::new(SceneLibrary::new());
        let map = MapHandle::create(library.clone(), "map", point(13.7563, 100.5018), 13);
        (library, map)
    }

    #[test]
    fn points_without_coordinates_are_skipped() {
        let (library, map) = map();
        let mut markers = MarkerSync::new();
        let points = [
            PointOfInterest::new("a", "Shop A", Some(point(13.7, 100.5))),
            PointOfInterest::new("b", "Shop B", None),
        ];

        assert_eq!(markers.redraw(&map, &points), 1);
        assert!(!markers.focus_point(&map, "b"));

        let snapshot = library.snapshot(map.id()).unwrap();
        assert_eq!(snapshot.markers.len(), 1);
        assert_eq!(snapshot.markers[0].key, "a");
        assert_eq!(snapshot.markers[0].position, point(13.7, 100.5));
    }

    #[test]
    fn redraw_replaces_previous_markers() {
        let (library, map) = map();
        let mut markers = MarkerSync::new();
        markers.redraw(
            &map,
            &[
                PointOfInterest::new("a", "A", Some(point(13.7, 100.5))),
                PointOfInterest::new("b", "B", Some(point(13.8, 100.6))),
            ],
        );
        markers.redraw(
            &map,
            &[PointOfInterest::new("c", "C", Some(point(13.9, 100.7)))],
        );

        let keys = library
            .snapshot(map.id())
            .unwrap()
            .markers
            .into_iter()
            .map(|marker| marker.key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![String::from("c")]);
    }

    #[test]
    fn duplicate_ids_get_one_marker() {
        let (_library, map) = map();
        let mut markers = MarkerSync::new();
        let drawn = markers.redraw(
            &map,
            &[
                PointOfInterest::new("a", "A", Some(point(13.7, 100.5))),
                PointOfInterest::new("a", "A again", Some(point(13.8, 100.6))),
            ],
        );
        assert_eq!(drawn, 1);
    }

    #[test]
    fn broken_image_keeps_the_marker() {
        let (library, map) = map();
        let mut markers = MarkerSync::new();
        let shop = PointOfInterest::new("s1", "Shop", Some(point(13.75, 100.5)))
            .with_image("definitely not an image");

        assert_eq!(markers.redraw(&map, &[shop]), 1);

        let snapshot = library.snapshot(map.id()).unwrap();
        let popup = snapshot.markers[0].popup.clone().unwrap();
        assert_eq!(popup.title, "Shop");
        assert_eq!(popup.image_url, None);
    }

    #[test]
    fn long_titles_are_truncated_by_grapheme() {
        let label = "ซักผ้า".repeat(40);
        assert_eq!(
            popup_title(&label).graphemes(true).count(),
            MAX_POPUP_TITLE_LENGTH
        );
    }

    #[test]
    fn drag_updates_the_coordinate_exactly() {
        let (library, map) = map();
        let mut markers = MarkerSync::new();
        let coords = CoordinateState::default();
        markers
            .place_selection(&map, &coords, point(13.75, 100.5))
            .unwrap();

        let dragged = markers
            .drag_selection(&map, &coords, point(13.80, 100.60))
            .unwrap();

        assert!(dragged);
        assert_eq!(coords.get(), Some(point(13.80, 100.60)));
        let snapshot = library.snapshot(map.id()).unwrap();
        assert_eq!(snapshot.markers.len(), 1);
        assert_eq!(snapshot.markers[0].position, point(13.80, 100.60));
    }

    #[test]
    fn drag_without_selection_does_nothing() {
        let (_library, map) = map();
        let mut markers = MarkerSync::new();
        let coords = CoordinateState::default();
        assert!(!markers
            .drag_selection(&map, &coords, point(13.8, 100.6))
            .unwrap());
        assert_eq!(coords.get(), None);
    }

    #[test]
    fn external_updates_move_the_same_marker() {
        let (library, map) = map();
        let mut markers = MarkerSync::new();
        let coords = CoordinateState::default();
        markers
            .place_selection(&map, &coords, point(13.75, 100.5))
            .unwrap();
        let before = library.snapshot(map.id()).unwrap().markers[0].id;

        coords.set(point(13.9, 100.9));
        markers.follow_selection(&map, &coords).unwrap();

        let after = library.snapshot(map.id()).unwrap().markers;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, before);
        assert_eq!(after[0].position, point(13.9, 100.9));
    }

    #[test]
    fn focusing_pans_and_opens_the_popup() {
        let (library, map) = map();
        let mut markers = MarkerSync::new();
        markers.redraw(
            &map,
            &[PointOfInterest::new(
                "s1",
                "Shop",
                Some(GeoPoint::from_lng_lat([100.50, 13.75]).unwrap()),
            )],
        );

        assert!(markers.focus_point(&map, "s1"));

        let snapshot = library.snapshot(map.id()).unwrap();
        assert_eq!(snapshot.center, point(13.75, 100.50));
        assert!(snapshot.markers[0].popup_open);
    }
}
