pub mod bots;
pub mod chat;
