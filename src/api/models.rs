use crate::geo::models::GeoPoint;
use crate::maps::models::PointOfInterest;
use serde::{Deserialize, Deserializer, Serialize};

/// A shop or saved address as the REST API returns it. Coordinates come either as
/// `lat`/`lng` (numbers or numeric strings) or as a GeoJSON-ordered `coords` pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointRecord {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default, alias = "label")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub coords: Option<[f64; 2]>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl PointRecord {
    pub fn location(&self) -> Option<GeoPoint> {
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            return GeoPoint::new(lat, lng).ok();
        }
        self.coords
            .and_then(|pair| GeoPoint::from_lng_lat(pair).ok())
    }

    pub fn into_point(self) -> PointOfInterest {
        let location = self.location();
        PointOfInterest {
            label: self.name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            location,
            image_url: self.image_url,
        }
    }
}

/// Live positions of an order's rider and customer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTrackingRecord {
    #[serde(default)]
    pub rider: Option<TrackedPosition>,
    #[serde(default)]
    pub customer: Option<TrackedPosition>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPosition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lng: Option<f64>,
}

impl OrderTrackingRecord {
    pub fn into_points(self) -> Vec<PointOfInterest> {
        [("rider", "Rider", self.rider), ("customer", "Customer", self.customer)]
            .into_iter()
            .filter_map(|(id, default_label, position)| {
                let position = position?;
                let location = match (position.lat, position.lng) {
                    (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).ok(),
                    _ => None,
                };
                let label = position.name.unwrap_or_else(|| default_label.to_string());
                Some(PointOfInterest::new(id, &label, location))
            })
            .collect()
    }
}

/// What a picker sends to the REST API once the user confirms the selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase", tag = "type")]
pub enum LocationSubmission {
    Pickup {
        #[serde(skip_serializing_if = "Option::is_none")]
        shop_id: Option<String>,
        location: GeoPoint,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    SavedAddress {
        user_id: String,
        label: String,
        location: GeoPoint,
    },
    ShopPin {
        shop_id: String,
        location: GeoPoint,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(id) => Ok(id),
        serde_json::Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or numeric id, got {other}"
        ))),
    }
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_read_leniently() {
        let records: Vec<PointRecord> = serde_json::from_str(
            r#"[
                {"id": "a", "name": "Shop A", "lat": 13.7, "lng": 100.5},
                {"id": "b", "name": "Shop B"},
                {"id": 7, "lat": "13.8", "lng": "100.6"},
                {"id": "s1", "coords": [100.50, 13.75]},
                {"id": "x", "lat": "north", "lng": 100.5},
                {"id": "y", "lat": null, "lng": null}
            ]"#,
        )
        .unwrap();
        let points = records
            .into_iter()
            .map(PointRecord::into_point)
            .collect::<Vec<_>>();

        assert_eq!(points[0].location, GeoPoint::new(13.7, 100.5).ok());
        assert_eq!(points[1].location, None);
        assert_eq!(points[2].id, "7");
        assert_eq!(points[2].label, "7");
        assert_eq!(points[2].location, GeoPoint::new(13.8, 100.6).ok());
        assert_eq!(points[3].location, GeoPoint::new(13.75, 100.50).ok());
        assert_eq!(points[4].location, None);
        assert_eq!(points[5].location, None);
    }

    #[test]
    fn tracking_without_rider_position_yields_only_the_customer() {
        let record: OrderTrackingRecord = serde_json::from_str(
            r#"{"customer": {"lat": 13.7, "lng": 100.5}, "rider": null}"#,
        )
        .unwrap();
        let points = record.into_points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].id, "customer");
        assert_eq!(points[0].label, "Customer");
    }

    #[test]
    fn submissions_are_tagged() {
        let submission = LocationSubmission::ShopPin {
            shop_id: String::from("s1"),
            location: GeoPoint::new(13.75, 100.5).unwrap(),
        };
        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            serde_json::json!({
                "type": "shopPin",
                "shopId": "s1",
                "location": {"lat": 13.75, "lng": 100.5}
            })
        );
    }
}
