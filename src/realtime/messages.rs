//! Push Message Types
//!
//! Messages the backend pushes to connected clients. The client never
//! sends application messages on the channel.

use serde::{Deserialize, Serialize};

use crate::api::dto::{Comment, View};

/// Event pushed by the backend: `{ "event": ..., "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum PushEvent {
    /// A view was submitted by someone
    NewView(View),
    /// A comment was added to a view
    NewComment(CommentAdded),
}

/// Payload of a `new_comment` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAdded {
    pub view_id: String,
    pub comment: Comment,
}

impl PushEvent {
    /// Parse a text frame from the push socket
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// View the event concerns
    pub fn view_id(&self) -> &str {
        match self {
            PushEvent::NewView(view) => &view.id,
            PushEvent::NewComment(added) => &added.view_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_new_view() {
        let json = r#"{"event": "new_view", "data": {"_id": "v1", "text": "hi", "media_url": null, "upvotes": 0}}"#;
        let event = PushEvent::parse(json).unwrap();
        match event {
            PushEvent::NewView(view) => {
                assert_eq!(view.id, "v1");
                assert_eq!(view.text, "hi");
            }
            _ => panic!("Expected NewView"),
        }
    }

    #[test]
    fn test_parse_new_comment() {
        let json = r#"{"event": "new_comment", "data": {"view_id": "v1", "comment": {"text": "first", "timestamp": "2024-05-01T08:00:00"}}}"#;
        let event = PushEvent::parse(json).unwrap();
        assert_eq!(event.view_id(), "v1");
        match event {
            PushEvent::NewComment(added) => assert_eq!(added.comment.text, "first"),
            _ => panic!("Expected NewComment"),
        }
    }

    #[test]
    fn test_parse_unknown_event() {
        let json = r#"{"event": "view_deleted", "data": {"_id": "v1"}}"#;
        assert!(PushEvent::parse(json).is_err());
    }

    #[test]
    fn test_serialize_shape() {
        let event = PushEvent::NewView(crate::api::View::new("v2", "posted"));
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"new_view\""));
        assert!(json.contains("\"_id\":\"v2\""));
    }
}
