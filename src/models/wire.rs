use serde::{ Serialize, Deserialize };
use crate::models::chat::Message;

/// Platform tag the backend uses to tell embed clients apart.
pub const PLATFORM_TAG: &str = "react-web";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest<'a> {
    pub user_agent: &'a str,
    pub timestamp: String,
    pub metadata: SessionMetadata<'a>,
}

#[derive(Serialize, Debug)]
pub struct SessionMetadata<'a> {
    pub page: &'a str,
    pub referrer: &'a str,
    pub platform: &'static str,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MessageRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
    pub history: &'a [Message],
    pub metadata: MessageMetadata<'a>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata<'a> {
    pub timestamp: String,
    pub user_agent: &'a str,
    pub page: &'a str,
    pub platform: &'static str,
}

/// Reply body of `POST /chat/message`. The text arrives either as
/// `response` or as `message`; an empty `response` defers to `message`.
#[derive(Deserialize, Debug, Default)]
pub struct MessageResponse {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl MessageResponse {
    pub fn into_text(self) -> Option<String> {
        self.response.filter(|s| !s.is_empty()).or(self.message)
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionHistory {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
}
