pub mod errors;
pub mod models;
pub mod providers;

pub use errors::{AdapterError, AdapterResult};
pub use models::chat::{ChatOptions, ChatRequest, ChatResult, InProgress, ToolOption, ToolOptionType, ToolResult};
pub use models::content::ContentUnit;
pub use models::speech::{SpeechAudio, SpeechToTextRequest, TextToSpeechRequest};
pub use models::tool::{Tool, ToolCall};
pub use providers::base::Adapter;
pub use providers::configs::ProviderConfig;
pub use providers::factory::{get_adapter, LlmAdapter, Vendor};
