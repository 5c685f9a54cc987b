use serde_json::{Map, Value};

use crate::auth::Identity;
use crate::constants::ANONYMOUS_NAME;
use crate::store::Document;

/// A persisted message as the views consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Store-assigned id.
    pub id: String,
    pub text: String,
    pub author_name: String,
    /// Identity that created the message.
    pub uid: String,
    /// Client-assigned milliseconds since epoch; primary ordering key.
    pub time: u64,
    /// Store-assigned append sequence; breaks same-millisecond ties.
    pub seq: u64,
}

impl Message {
    /// Convert a wire document into a typed record.
    ///
    /// Documents missing `text`, `uid`, or `time` are dropped rather than
    /// rendered half-empty. `authorName` falls back to a placeholder.
    pub fn from_document(doc: &Document) -> Option<Self> {
        let text = doc.fields.get("text")?.as_str()?.to_string();
        let uid = doc.fields.get("uid")?.as_str()?.to_string();
        let time = doc.fields.get("time")?.as_u64()?;
        let author_name = doc
            .fields
            .get("authorName")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(ANONYMOUS_NAME)
            .to_string();

        Some(Message {
            id: doc.id.clone(),
            text,
            author_name,
            uid,
            time,
            seq: doc.seq,
        })
    }
}

/// A message the composer has built but the store has not yet accepted.
/// No id yet; the store assigns one on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub text: String,
    pub author_name: String,
    pub uid: String,
    pub time: u64,
}

impl NewMessage {
    /// Build a message at composition time. `time` is stamped here, by the
    /// writer's clock, and is never reassigned by the store.
    pub fn compose(text: impl Into<String>, identity: &Identity) -> Self {
        Self {
            text: text.into(),
            author_name: identity.name().to_string(),
            uid: identity.uid.clone(),
            time: now_millis(),
        }
    }

    /// Wire shape: `{text, authorName, uid, time}`.
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::from(self.text.as_str()));
        fields.insert(
            "authorName".to_string(),
            Value::from(self.author_name.as_str()),
        );
        fields.insert("uid".to_string(), Value::from(self.uid.as_str()));
        fields.insert("time".to_string(), Value::from(self.time));
        fields
    }
}

pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(fields: Map<String, Value>) -> Document {
        Document {
            id: "d1".to_string(),
            seq: 7,
            parent_id: None,
            fields,
        }
    }

    #[test]
    fn test_from_document_round_trip() {
        let identity = Identity {
            uid: "u1".to_string(),
            display_name: Some("Ada".to_string()),
        };
        let new = NewMessage::compose("hello", &identity);
        let message = Message::from_document(&doc(new.to_fields())).unwrap();

        assert_eq!(message.id, "d1");
        assert_eq!(message.seq, 7);
        assert_eq!(message.text, "hello");
        assert_eq!(message.author_name, "Ada");
        assert_eq!(message.uid, "u1");
        assert_eq!(message.time, new.time);
    }

    #[test]
    fn test_from_document_author_fallback() {
        let identity = Identity {
            uid: "u1".to_string(),
            display_name: None,
        };
        let new = NewMessage::compose("hi", &identity);
        let message = Message::from_document(&doc(new.to_fields())).unwrap();
        assert_eq!(message.author_name, ANONYMOUS_NAME);
    }

    #[test]
    fn test_from_document_empty_author_falls_back() {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::from("hi"));
        fields.insert("authorName".to_string(), Value::from(""));
        fields.insert("uid".to_string(), Value::from("u1"));
        fields.insert("time".to_string(), Value::from(5u64));

        let message = Message::from_document(&doc(fields)).unwrap();
        assert_eq!(message.author_name, ANONYMOUS_NAME);
    }

    #[test]
    fn test_from_document_rejects_missing_fields() {
        let mut fields = Map::new();
        fields.insert("text".to_string(), Value::from("orphan"));
        // no uid, no time
        assert!(Message::from_document(&doc(fields)).is_none());

        let mut fields = Map::new();
        fields.insert("uid".to_string(), Value::from("u1"));
        fields.insert("time".to_string(), Value::from(5u64));
        // no text
        assert!(Message::from_document(&doc(fields)).is_none());
    }
}
