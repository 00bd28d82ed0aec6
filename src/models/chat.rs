use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };
use std::fmt;

/// Insertion-ordered message identifier. Ids handed out by a single
/// conversation store are strictly increasing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// A single entry of the conversation log.
///
/// Fields are private so that the role and text cannot change after the store
/// appends the message. The serialized shape is the one the backend expects in
/// the `history` array of a message request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    #[serde(rename = "type")]
    role: Role,
    #[serde(rename = "content")]
    text: String,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(rename = "error", default)]
    is_error: bool,
    #[serde(rename = "suggestions", default, skip_serializing_if = "Option::is_none")]
    quick_replies: Option<Vec<String>>,
}

impl Message {
    pub(crate) fn user(id: MessageId, text: &str) -> Self {
        Self {
            id,
            role: Role::User,
            text: text.to_string(),
            created_at: Utc::now(),
            is_error: false,
            quick_replies: None,
        }
    }

    pub(crate) fn bot(id: MessageId, text: String, quick_replies: Option<Vec<String>>) -> Self {
        Self {
            id,
            role: Role::Bot,
            text,
            created_at: Utc::now(),
            is_error: false,
            quick_replies,
        }
    }

    pub(crate) fn bot_error(id: MessageId, text: &str) -> Self {
        Self {
            id,
            role: Role::Bot,
            text: text.to_string(),
            created_at: Utc::now(),
            is_error: true,
            quick_replies: None,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    pub fn quick_replies(&self) -> Option<&[String]> {
        self.quick_replies.as_deref()
    }
}

/// Where a session id came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Live,
    Demo,
    Fallback,
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionMode::Live => "live",
            SessionMode::Demo => "demo",
            SessionMode::Fallback => "fallback",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub mode: SessionMode,
}

impl Session {
    pub fn new(id: impl Into<String>, mode: SessionMode) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            mode,
        }
    }

    /// Session synthesized locally after a live handshake failed.
    pub fn fallback() -> Self {
        Self::new(format!("fallback_{}", Utc::now().timestamp_millis()), SessionMode::Fallback)
    }
}

/// What a transport hands back for one utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Summary of the conversation as exposed to the host page.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: Option<String>,
    pub message_count: usize,
    pub has_messages: bool,
}
