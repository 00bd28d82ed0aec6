pub mod demo;
pub mod http;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use thiserror::Error;
use crate::config::WidgetConfig;
use crate::models::{ BotReply, Message, Session };
use crate::models::wire::SessionHistory;
use self::demo::DemoTransport;
use self::http::HttpTransport;

/// Maximum number of prior messages sent upstream with each utterance.
pub const HISTORY_WINDOW: usize = 10;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Malformed(String),
    #[error("invalid API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Client details reported to the backend with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientContext {
    pub user_agent: String,
    pub page: String,
    pub referrer: String,
}

impl Default for ClientContext {
    fn default() -> Self {
        Self {
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            page: String::new(),
            referrer: String::new(),
        }
    }
}

/// Session handshake and message exchange, either against the remote service
/// or the local demo responder.
///
/// One call issues at most one request. Callers guarantee that only one
/// `send_message` is pending at a time.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Never fails outward: a live handshake that goes wrong yields a
    /// fallback session instead.
    async fn initialize_session(&self) -> Session;

    async fn send_message(
        &self,
        session: &Session,
        utterance: &str,
        history: &[Message]
    ) -> Result<BotReply, TransportError>;

    async fn fetch_session_history(&self, session_id: &str) -> Result<SessionHistory, TransportError>;

    fn describe(&self) -> String;
}

pub fn new_transport(
    config: &WidgetConfig,
    client: &ClientContext
) -> Result<Arc<dyn ChatTransport>, TransportError> {
    let transport: Arc<dyn ChatTransport> = if config.demo {
        Arc::new(DemoTransport::new())
    } else {
        Arc::new(HttpTransport::from_config(config, client.clone())?)
    };
    info!("Chat transport configured: {}", transport.describe());
    Ok(transport)
}

/// The trailing `HISTORY_WINDOW` messages of `log`.
pub fn recent_history(log: &[Message]) -> &[Message] {
    &log[log.len().saturating_sub(HISTORY_WINDOW)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_config_builds_demo_transport() {
        let transport = new_transport(&WidgetConfig::default(), &ClientContext::default()).unwrap();
        assert!(transport.describe().starts_with("demo"));
    }

    #[test]
    fn live_config_builds_http_transport() {
        let config = WidgetConfig {
            demo: false,
            api_url: "https://hotel.example/api".into(),
            ..WidgetConfig::default()
        };
        let transport = new_transport(&config, &ClientContext::default()).unwrap();
        assert!(transport.describe().contains("https://hotel.example/api"));
    }

    #[test]
    fn live_config_rejects_unparseable_url() {
        let config = WidgetConfig {
            demo: false,
            api_url: "not a url".into(),
            ..WidgetConfig::default()
        };
        assert!(matches!(
            new_transport(&config, &ClientContext::default()),
            Err(TransportError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn default_user_agent_names_the_crate() {
        assert!(ClientContext::default().user_agent.starts_with("landmark-chat-widget/"));
    }
}
