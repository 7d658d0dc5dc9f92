pub mod client;
pub mod conversation;
pub mod prompts;
pub mod secrets;

pub use client::{ensure_client, test_configured_api_key};
pub use conversation::{ChatSession, OpenAiConversation, TurnPart};
pub use secrets::{clear_api_key, store_api_key};
