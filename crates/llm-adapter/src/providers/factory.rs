use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::{
    anthropic::AnthropicAdapter, base::Adapter, configs::ProviderConfig, google::GoogleAdapter,
    groq::GroqAdapter, openai::OpenAiAdapter,
};
use crate::errors::AdapterResult;
use crate::models::chat::{ChatRequest, ChatResult};
use crate::models::speech::{SpeechAudio, SpeechToTextRequest, TextToSpeechRequest};

/// The closed set of supported vendors
#[derive(
    EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Vendor {
    #[strum(serialize = "OpenAI")]
    #[serde(rename = "OpenAI")]
    OpenAi,
    #[strum(serialize = "AzureOpenAI")]
    #[serde(rename = "AzureOpenAI")]
    AzureOpenAi,
    Anthropic,
    Google,
    Groq,
}

/// One adapter per vendor, selected by configuration
pub enum LlmAdapter {
    OpenAi(OpenAiAdapter),
    Anthropic(AnthropicAdapter),
    Google(GoogleAdapter),
    Groq(GroqAdapter),
}

pub fn get_adapter(config: ProviderConfig) -> AdapterResult<LlmAdapter> {
    match config {
        ProviderConfig::OpenAi(openai_config) => {
            Ok(LlmAdapter::OpenAi(OpenAiAdapter::new(openai_config)?))
        }
        ProviderConfig::AzureOpenAi(azure_config) => {
            Ok(LlmAdapter::OpenAi(OpenAiAdapter::azure(azure_config)?))
        }
        ProviderConfig::Anthropic(anthropic_config) => {
            Ok(LlmAdapter::Anthropic(AnthropicAdapter::new(anthropic_config)?))
        }
        ProviderConfig::Google(google_config) => {
            Ok(LlmAdapter::Google(GoogleAdapter::new(google_config)?))
        }
        ProviderConfig::Groq(groq_config) => Ok(LlmAdapter::Groq(GroqAdapter::new(groq_config)?)),
    }
}

#[async_trait]
impl Adapter for LlmAdapter {
    fn vendor(&self) -> Vendor {
        match self {
            LlmAdapter::OpenAi(adapter) => adapter.vendor(),
            LlmAdapter::Anthropic(adapter) => adapter.vendor(),
            LlmAdapter::Google(adapter) => adapter.vendor(),
            LlmAdapter::Groq(adapter) => adapter.vendor(),
        }
    }

    async fn chat_completions(&self, request: ChatRequest) -> AdapterResult<ChatResult> {
        match self {
            LlmAdapter::OpenAi(adapter) => adapter.chat_completions(request).await,
            LlmAdapter::Anthropic(adapter) => adapter.chat_completions(request).await,
            LlmAdapter::Google(adapter) => adapter.chat_completions(request).await,
            LlmAdapter::Groq(adapter) => adapter.chat_completions(request).await,
        }
    }

    async fn speech_to_text(&self, request: SpeechToTextRequest) -> AdapterResult<String> {
        match self {
            LlmAdapter::OpenAi(adapter) => adapter.speech_to_text(request).await,
            LlmAdapter::Anthropic(adapter) => adapter.speech_to_text(request).await,
            LlmAdapter::Google(adapter) => adapter.speech_to_text(request).await,
            LlmAdapter::Groq(adapter) => adapter.speech_to_text(request).await,
        }
    }

    async fn text_to_speech(&self, request: TextToSpeechRequest) -> AdapterResult<SpeechAudio> {
        match self {
            LlmAdapter::OpenAi(adapter) => adapter.text_to_speech(request).await,
            LlmAdapter::Anthropic(adapter) => adapter.text_to_speech(request).await,
            LlmAdapter::Google(adapter) => adapter.text_to_speech(request).await,
            LlmAdapter::Groq(adapter) => adapter.text_to_speech(request).await,
        }
    }
}
