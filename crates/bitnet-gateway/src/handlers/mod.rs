//! Request handlers for the OpenAI-compatible API

pub mod chat;
pub mod health;
pub mod models;

pub use chat::chat_router;
pub use health::health_router;
pub use models::models_router;
