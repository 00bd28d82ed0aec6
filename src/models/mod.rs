pub mod chat;
pub mod wire;

pub use chat::{ BotReply, Message, MessageId, Role, Session, SessionInfo, SessionMode };
