use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a message carries. Exactly one kind per message; the variant makes
/// the "text xor audio" invariant structural instead of two optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Encrypted text. `ciphertext` is the cipher's wire format, never
    /// plaintext.
    Text { ciphertext: String },
    /// Reference to an uploaded audio blob.
    Audio { audio_url: String },
}

/// A persisted message as read back from the record store.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    pub id: i64,
    pub body: MessageBody,
    pub timestamp: DateTime<Utc>,
}

/// The listing response shape: plaintext text or a pass-through audio URL,
/// matching the JSON contract (`text`/`audioUrl` mutually exclusive,
/// `timestamp` RFC 3339).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl MessageView {
    pub fn text(plaintext: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: Some(plaintext),
            audio_url: None,
            timestamp,
        }
    }

    pub fn audio(audio_url: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: None,
            audio_url: Some(audio_url),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_view_omits_audio_url() {
        let view = MessageView::text("hi".to_string(), Utc::now());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["text"], "hi");
        assert!(json.get("audioUrl").is_none());
    }

    #[test]
    fn audio_view_omits_text_and_uses_camel_case() {
        let view = MessageView::audio("http://host/uploads/a.wav".to_string(), Utc::now());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["audioUrl"], "http://host/uploads/a.wav");
        assert!(json.get("text").is_none());
        assert!(json.get("audio_url").is_none());
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let ts = "2026-08-25T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let view = MessageView::text("hi".to_string(), ts);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["timestamp"], "2026-08-25T12:00:00Z");
    }
}
