use crate::geo::models::GeoPoint;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerSentSocketMessage {
    /// `null` payload means the selection was cleared.
    SelectionChanged(Option<GeoPoint>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_message_shape() {
        let point = GeoPoint::new(13.8, 100.6).unwrap();
        let message = ServerSentSocketMessage::SelectionChanged(Some(point));
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"type": "selectionChanged", "payload": {"lat": 13.8, "lng": 100.6}})
        );

        let cleared = ServerSentSocketMessage::SelectionChanged(None);
        assert_eq!(
            serde_json::to_value(&cleared).unwrap(),
            serde_json::json!({"type": "selectionChanged", "payload": null})
        );
    }
}
