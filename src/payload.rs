use serde::Serialize;
use serde_json::Value;

/// JSON body of one webhook message.
///
/// `channel` and `icon_emoji` are left out of the encoded body when unset:
/// the endpoint treats a missing key differently from an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagePayload {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Block Kit elements, passed through untouched.
    pub blocks: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

impl MessagePayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            username: None,
            blocks: Vec::new(),
            channel: None,
            icon_emoji: None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
