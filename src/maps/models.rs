use crate::geo::models::GeoPoint;
use serde::Serialize;

/// Anything that can be put on a map: a shop, a saved address, a rider or a customer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub id: String,
    pub label: String,
    /// `None` when the record carried no usable coordinates; such points are never drawn.
    pub location: Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl PointOfInterest {
    pub fn new(id: &str, label: &str, location: Option<GeoPoint>) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            location,
            image_url: None,
        }
    }

    #[cfg(test)]
    pub fn with_image(mut self, image_url: &str) -> Self {
        self.image_url = Some(image_url.to_string());
        self
    }
}

#[derive(Clone, Debug)]
pub struct TileLayerConfig {
    pub url_template: String,
    pub attribution: String,
}
