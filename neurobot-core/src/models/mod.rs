pub mod chatbot;
pub mod interaction;
pub mod knowledge;
pub mod settings;
pub mod user;

pub use chatbot::{Chatbot, ChatbotStatus};
pub use interaction::Interaction;
pub use knowledge::{KnowledgeFragment, SourceType};
pub use settings::Settings;
pub use user::User;
