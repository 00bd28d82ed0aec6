use async_trait::async_trait;
use chrono::{ SecondsFormat, Utc };
use log::{ error, info };
use reqwest::Client as HttpClient;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use super::{ ChatTransport, ClientContext, TransportError, HISTORY_WINDOW };
use crate::config::WidgetConfig;
use crate::models::{ BotReply, Message, Session, SessionMode };
use crate::models::wire::{
    MessageMetadata,
    MessageRequest,
    MessageResponse,
    SessionHistory,
    SessionMetadata,
    SessionRequest,
    SessionResponse,
    PLATFORM_TAG,
};

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Transport talking to the chat backend over HTTPS with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
    api_key: String,
    client: ClientContext,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        api_key: &str,
        client: ClientContext,
        timeout: Duration
    ) -> Result<Self, TransportError> {
        url::Url::parse(base_url).map_err(|e| TransportError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let http = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &WidgetConfig, client: ClientContext) -> Result<Self, TransportError> {
        Self::new(&config.api_url, &config.api_key, client, config.request_timeout)
    }

    fn endpoint(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// `{base}/chat/session/{id}` with the id escaped as one path segment.
    fn session_endpoint(&self, session_id: &str) -> Result<url::Url, TransportError> {
        let invalid = |reason: &str| TransportError::InvalidUrl {
            url: self.base_url.clone(),
            reason: reason.to_string(),
        };
        let mut url = url::Url::parse(&self.base_url).map_err(|e| invalid(&e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL"))?
            .pop_if_empty()
            .extend(["chat", "session", session_id]);
        Ok(url)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// The raw handshake. Errors here are turned into a fallback session by
    /// [`ChatTransport::initialize_session`].
    pub async fn create_session(&self) -> Result<Session, TransportError> {
        let body = SessionRequest {
            user_agent: &self.client.user_agent,
            timestamp: iso_now(),
            metadata: SessionMetadata {
                page: &self.client.page,
                referrer: &self.client.referrer,
                platform: PLATFORM_TAG,
            },
        };
        let resp = self.http
            .post(self.endpoint("/chat/session"))
            .header(AUTHORIZATION, self.bearer())
            .json(&body)
            .send().await?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status()));
        }

        let data = resp
            .json::<SessionResponse>().await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        if let Some(message) = &data.message {
            info!("Session handshake: {}", message);
        }
        Ok(Session::new(data.session_id, SessionMode::Live))
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn initialize_session(&self) -> Session {
        match self.create_session().await {
            Ok(session) => session,
            Err(e) => {
                error!("Session initialization failed: {}", e);
                let session = Session::fallback();
                info!("Continuing with fallback session {}", session.id);
                session
            }
        }
    }

    async fn send_message(
        &self,
        session: &Session,
        utterance: &str,
        history: &[Message]
    ) -> Result<BotReply, TransportError> {
        let history = &history[history.len().saturating_sub(HISTORY_WINDOW)..];
        let body = MessageRequest {
            session_id: &session.id,
            message: utterance,
            history,
            metadata: MessageMetadata {
                timestamp: iso_now(),
                user_agent: &self.client.user_agent,
                page: &self.client.page,
                platform: PLATFORM_TAG,
            },
        };
        let resp = self.http
            .post(self.endpoint("/chat/message"))
            .header(AUTHORIZATION, self.bearer())
            .json(&body)
            .send().await?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status()));
        }

        let data = resp
            .json::<MessageResponse>().await
            .map_err(|e| TransportError::Malformed(e.to_string()))?;
        let suggestions = data.suggestions.clone();
        let metadata = data.metadata.clone();
        let text = data
            .into_text()
            .ok_or_else(|| TransportError::Malformed("missing 'response' or 'message' field".into()))?;

        Ok(BotReply { text, suggestions, metadata })
    }

    async fn fetch_session_history(&self, session_id: &str) -> Result<SessionHistory, TransportError> {
        let resp = self.http
            .get(self.session_endpoint(session_id)?)
            .header(AUTHORIZATION, self.bearer())
            .send().await?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status()));
        }

        resp.json::<SessionHistory>().await.map_err(|e| TransportError::Malformed(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("live ({})", self.base_url)
    }
}
