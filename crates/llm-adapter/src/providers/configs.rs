use serde::{Deserialize, Serialize};

use super::factory::Vendor;
use crate::errors::{AdapterError, AdapterResult};

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const GOOGLE_HOST: &str = "https://generativelanguage.googleapis.com";
pub const GROQ_HOST: &str = "https://api.groq.com";

// Unified enum to wrap different provider configurations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderConfig {
    OpenAi(OpenAiProviderConfig),
    AzureOpenAi(AzureOpenAiProviderConfig),
    Anthropic(AnthropicProviderConfig),
    Google(GoogleProviderConfig),
    Groq(GroqProviderConfig),
}

impl ProviderConfig {
    pub fn vendor(&self) -> Vendor {
        match self {
            ProviderConfig::OpenAi(_) => Vendor::OpenAi,
            ProviderConfig::AzureOpenAi(_) => Vendor::AzureOpenAi,
            ProviderConfig::Anthropic(_) => Vendor::Anthropic,
            ProviderConfig::Google(_) => Vendor::Google,
            ProviderConfig::Groq(_) => Vendor::Groq,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub transcription_model: Option<String>,
    pub speech_model: Option<String>,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: OPENAI_HOST.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            transcription_model: None,
            speech_model: None,
        }
    }

    pub fn validate(&self) -> AdapterResult<()> {
        require(Vendor::OpenAi, "host", &self.host)?;
        require(Vendor::OpenAi, "api_key", &self.api_key)?;
        require(Vendor::OpenAi, "model", &self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AzureOpenAiProviderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    /// Deployment name of the chat model
    pub deployment: String,
    pub transcription_deployment: Option<String>,
    pub speech_deployment: Option<String>,
}

impl AzureOpenAiProviderConfig {
    pub fn validate(&self) -> AdapterResult<()> {
        require(Vendor::AzureOpenAi, "api_key", &self.api_key)?;
        require(Vendor::AzureOpenAi, "deployment", &self.deployment)?;
        require(Vendor::AzureOpenAi, "endpoint", &self.endpoint)?;
        require(Vendor::AzureOpenAi, "api_version", &self.api_version)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl AnthropicProviderConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: ANTHROPIC_HOST.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn validate(&self) -> AdapterResult<()> {
        require(Vendor::Anthropic, "host", &self.host)?;
        require(Vendor::Anthropic, "api_key", &self.api_key)?;
        require(Vendor::Anthropic, "model", &self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl GoogleProviderConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: GOOGLE_HOST.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn validate(&self) -> AdapterResult<()> {
        require(Vendor::Google, "host", &self.host)?;
        require(Vendor::Google, "api_key", &self.api_key)?;
        require(Vendor::Google, "model", &self.model)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl GroqProviderConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            host: GROQ_HOST.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn validate(&self) -> AdapterResult<()> {
        require(Vendor::Groq, "host", &self.host)?;
        require(Vendor::Groq, "api_key", &self.api_key)?;
        require(Vendor::Groq, "model", &self.model)
    }
}

fn require(vendor: Vendor, field: &'static str, value: &str) -> AdapterResult<()> {
    if value.trim().is_empty() {
        Err(AdapterError::MissingConfig { vendor, field })
    } else {
        Ok(())
    }
}
