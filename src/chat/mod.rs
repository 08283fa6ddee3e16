mod core;
pub mod models;
pub use self::core::{ConversationSession, SessionBuilder, SessionError};
pub use models::{Message, MessageId, Role, SessionSnapshot, Transcript};
