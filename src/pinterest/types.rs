use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Pinterest board as returned by `GET /boards`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<BoardOwner>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardOwner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A pin as returned by `GET /boards/{id}/pins`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pin {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<PinMedia>,
}

/// Pin media block; `images` is keyed by size label ("150x150", "400x300", ...)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub images: HashMap<String, PinImage>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Paged board listing response
#[derive(Debug, Clone, Deserialize)]
pub struct BoardsResponse {
    #[serde(default)]
    pub items: Vec<Board>,
    #[serde(default)]
    pub bookmark: Option<String>,
}

/// Paged pin listing response, relayed as-is by the detail endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PinsResponse {
    #[serde(default)]
    pub items: Vec<Pin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bookmark: Option<String>,
}

/// A board merged with the pins fetched for it by the aggregate endpoint.
/// Fan-out failure for one board degrades it to an empty pin list.
#[derive(Debug, Clone, Serialize)]
pub struct BoardWithPins {
    #[serde(flatten)]
    pub board: Board,
    pub pins: Vec<Pin>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_deserialization() {
        let json = r#"{
            "id": "1234",
            "name": "Interiors",
            "description": "Living rooms",
            "privacy": "PUBLIC",
            "owner": {"username": "ada"}
        }"#;

        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.id, "1234");
        assert_eq!(board.name, "Interiors");
        assert_eq!(board.owner.unwrap().username.as_deref(), Some("ada"));
    }

    #[test]
    fn test_board_tolerates_unknown_fields() {
        let json = r#"{"id": "1", "name": "n", "pin_count": 42, "created_at": "2024-01-01"}"#;
        let board: Board = serde_json::from_str(json).unwrap();
        assert_eq!(board.id, "1");
        assert!(board.description.is_none());
    }

    #[test]
    fn test_pin_deserialization_with_image_sizes() {
        let json = r#"{
            "id": "pin-1",
            "title": "Chair",
            "media": {
                "media_type": "image",
                "images": {
                    "150x150": {"url": "https://i.pinimg.com/150x150/a.jpg", "width": 150, "height": 150},
                    "400x300": {"url": "https://i.pinimg.com/400x300/a.jpg"}
                }
            }
        }"#;

        let pin: Pin = serde_json::from_str(json).unwrap();
        let media = pin.media.unwrap();
        assert_eq!(media.media_type.as_deref(), Some("image"));
        assert_eq!(
            media.images["150x150"].url,
            "https://i.pinimg.com/150x150/a.jpg"
        );
        assert_eq!(media.images["400x300"].width, None);
    }

    #[test]
    fn test_boards_response_defaults() {
        let response: BoardsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.items.is_empty());
        assert!(response.bookmark.is_none());
    }

    #[test]
    fn test_pins_response_round_trip_keeps_bookmark() {
        let json = r#"{"items": [{"id": "p1"}], "bookmark": "next-page"}"#;
        let response: PinsResponse = serde_json::from_str(json).unwrap();

        let out = serde_json::to_string(&response).unwrap();
        assert!(out.contains("\"bookmark\":\"next-page\""));
        assert!(out.contains("\"id\":\"p1\""));
    }

    #[test]
    fn test_board_with_pins_serializes_flattened() {
        let merged = BoardWithPins {
            board: Board {
                id: "b1".to_string(),
                name: "Ideas".to_string(),
                description: None,
                privacy: None,
                owner: None,
            },
            pins: vec![Pin {
                id: "p1".to_string(),
                title: None,
                media: None,
            }],
        };

        let json = serde_json::to_value(&merged).unwrap();
        assert_eq!(json["id"], "b1");
        assert_eq!(json["name"], "Ideas");
        assert_eq!(json["pins"][0]["id"], "p1");
    }
}
