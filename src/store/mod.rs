use log::debug;
use crate::models::{ BotReply, Message, MessageId, SessionInfo, SessionMode };
use crate::transport::{ recent_history, TransportError };

pub const GREETING: &str =
    "Welcome to Landmark Africa! I'm your AI assistant ready to help with bookings, information, and support.";
pub const DEMO_QUALIFIER: &str = " (Demo Mode)";
pub const GREETING_QUICK_REPLIES: [&str; 4] = ["Opening Hours", "Book UDH", "Facilities", "Complaint"];
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Send protocol state, backed by the typing flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Awaiting,
}

/// What the caller needs to hand to the transport once a submit is accepted.
#[derive(Debug, Clone)]
pub struct PendingSend {
    pub utterance: String,
    pub history: Vec<Message>,
}

/// Session id, append-only message log and typing flag.
#[derive(Debug, Default)]
pub struct ConversationStore {
    session_id: Option<String>,
    messages: Vec<Message>,
    typing: bool,
    next_id: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId(self.next_id)
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn state(&self) -> ExchangeState {
        if self.typing { ExchangeState::Awaiting } else { ExchangeState::Idle }
    }

    /// Records the session and replaces the log with the greeting.
    pub fn start_session(&mut self, session_id: &str, mode: SessionMode) -> &Message {
        self.session_id = Some(session_id.to_string());
        let mut text = GREETING.to_string();
        if mode != SessionMode::Live {
            text.push_str(DEMO_QUALIFIER);
        }
        let quick_replies = GREETING_QUICK_REPLIES.iter().map(|s| s.to_string()).collect();
        let id = self.allocate_id();
        self.messages.clear();
        self.messages.push(Message::bot(id, text, Some(quick_replies)));
        &self.messages[0]
    }

    /// `Idle -> Awaiting`. Appends the user message and returns the context
    /// for the transport, or `None` when the utterance is blank or a send is
    /// already in flight.
    pub fn begin_send(&mut self, utterance: &str) -> Option<PendingSend> {
        if utterance.trim().is_empty() {
            debug!("Ignoring blank utterance");
            return None;
        }
        if self.typing {
            debug!("Ignoring utterance while a reply is pending");
            return None;
        }

        let history = recent_history(&self.messages).to_vec();
        let id = self.allocate_id();
        self.messages.push(Message::user(id, utterance));
        self.typing = true;

        Some(PendingSend {
            utterance: utterance.to_string(),
            history,
        })
    }

    /// `Awaiting -> Idle`. Appends the bot reply, or the apology flagged as an
    /// error when the transport failed.
    pub fn finish_send(&mut self, outcome: Result<BotReply, TransportError>) -> &Message {
        let id = self.allocate_id();
        let message = match outcome {
            Ok(reply) => Message::bot(id, reply.text, reply.suggestions),
            Err(_) => Message::bot_error(id, APOLOGY),
        };
        self.messages.push(message);
        self.typing = false;
        &self.messages[self.messages.len() - 1]
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn session_info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.session_id.clone(),
            message_count: self.messages.len(),
            has_messages: !self.messages.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn reply(text: &str) -> BotReply {
        BotReply {
            text: text.to_string(),
            suggestions: Some(vec!["A".into(), "B".into(), "C".into()]),
            metadata: None,
        }
    }

    #[test]
    fn greeting_wording_depends_on_session_mode() {
        let mut store = ConversationStore::new();
        let live = store.start_session("s1", SessionMode::Live).clone();
        assert_eq!(live.text(), GREETING);
        assert_eq!(live.quick_replies().unwrap(), &GREETING_QUICK_REPLIES.map(String::from)[..]);

        let fallback = store.start_session("fallback_1", SessionMode::Fallback).clone();
        assert!(fallback.text().ends_with("(Demo Mode)"));
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.session_id(), Some("fallback_1"));
    }

    #[test]
    fn accepted_submit_appends_user_then_bot() {
        let mut store = ConversationStore::new();
        store.start_session("s", SessionMode::Demo);

        let pending = store.begin_send("hello").unwrap();
        assert_eq!(pending.history.len(), 1);
        assert_eq!(store.state(), ExchangeState::Awaiting);
        assert_eq!(store.messages().last().unwrap().role(), Role::User);

        store.finish_send(Ok(reply("hi!")));
        assert_eq!(store.state(), ExchangeState::Idle);
        let last = store.messages().last().unwrap();
        assert_eq!(last.role(), Role::Bot);
        assert!(!last.is_error());
        assert_eq!(last.quick_replies().map(<[String]>::len), Some(3));
        assert_eq!(store.messages().len(), 3);
    }

    #[test]
    fn blank_or_concurrent_submits_are_ignored() {
        let mut store = ConversationStore::new();
        assert!(store.begin_send("   \n").is_none());
        assert!(store.messages().is_empty());

        store.begin_send("first").unwrap();
        let before = store.messages().to_vec();
        assert!(store.begin_send("second").is_none());
        assert_eq!(store.messages(), &before[..]);
    }

    #[test]
    fn failure_appends_flagged_apology() {
        let mut store = ConversationStore::new();
        store.begin_send("hello").unwrap();
        let msg = store.finish_send(Err(TransportError::Unavailable("offline".into()))).clone();
        assert!(msg.is_error());
        assert_eq!(msg.text(), APOLOGY);
        assert!(!msg.text().contains("offline"));
        assert!(!store.is_typing());
    }

    #[test]
    fn ids_increase_across_clear() {
        let mut store = ConversationStore::new();
        store.begin_send("one").unwrap();
        store.finish_send(Ok(reply("r1")));
        let last_before = store.messages().last().unwrap().id();
        store.clear();
        assert!(!store.session_info().has_messages);
        store.begin_send("two").unwrap();
        assert!(store.messages()[0].id() > last_before);
    }

    #[test]
    fn history_is_bounded_to_ten_preceding_messages() {
        let mut store = ConversationStore::new();
        store.start_session("s", SessionMode::Demo);
        for i in 0..120 {
            let pending = store.begin_send(&format!("message {}", i)).unwrap();
            assert!(pending.history.len() <= 10);
            store.finish_send(Ok(reply("ok")));
        }
        let pending = store.begin_send("last").unwrap();
        assert_eq!(pending.history.len(), 10);
        let log = store.messages();
        assert_eq!(pending.history.last(), log.get(log.len() - 2));
        for pair in log.windows(2) {
            assert!(pair[0].id() < pair[1].id());
        }
    }
}
