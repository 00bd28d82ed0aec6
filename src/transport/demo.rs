use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use rand::Rng;
use std::time::Duration;
use super::{ ChatTransport, TransportError };
use crate::models::{ BotReply, Message, Session, SessionMode };
use crate::models::wire::SessionHistory;
use crate::responder::ResponseGenerator;

const SESSION_SUFFIX_LEN: usize = 9;
const SESSION_SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Offline transport: synthesized sessions, canned replies after a simulated
/// network delay.
#[derive(Debug, Clone)]
pub struct DemoTransport {
    generator: ResponseGenerator,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for DemoTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoTransport {
    pub fn new() -> Self {
        Self {
            generator: ResponseGenerator::new(),
            min_delay: Duration::from_millis(800),
            max_delay: Duration::from_millis(2000),
        }
    }

    /// Overrides the simulated latency range. Bounds are swapped if given in
    /// the wrong order.
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    pub fn delay_range(&self) -> (Duration, Duration) {
        (self.min_delay, self.max_delay)
    }

    fn pick_delay(&self) -> Duration {
        if self.min_delay == self.max_delay {
            return self.min_delay;
        }
        rand::thread_rng().gen_range(self.min_delay..=self.max_delay)
    }

    fn session_id() -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..SESSION_SUFFIX_LEN)
            .map(|_| SESSION_SUFFIX_CHARSET[rng.gen_range(0..SESSION_SUFFIX_CHARSET.len())] as char)
            .collect();
        format!("demo_{}_{}", Utc::now().timestamp_millis(), suffix)
    }
}

#[async_trait]
impl ChatTransport for DemoTransport {
    async fn initialize_session(&self) -> Session {
        let session = Session::new(Self::session_id(), SessionMode::Demo);
        debug!("Demo session initialized: {}", session.id);
        session
    }

    async fn send_message(
        &self,
        session: &Session,
        utterance: &str,
        history: &[Message]
    ) -> Result<BotReply, TransportError> {
        let delay = self.pick_delay();
        debug!(
            "Demo reply for session {} in {:?} ({} messages of context)",
            session.id,
            delay,
            history.len()
        );
        tokio::time::sleep(delay).await;
        Ok(self.generator.respond(utterance))
    }

    async fn fetch_session_history(&self, session_id: &str) -> Result<SessionHistory, TransportError> {
        Ok(SessionHistory {
            session_id: session_id.to_string(),
            messages: Vec::new(),
        })
    }

    fn describe(&self) -> String {
        format!("demo (latency {:?}..={:?})", self.min_delay, self.max_delay)
    }
}
