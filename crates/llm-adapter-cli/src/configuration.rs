use crate::error::{to_env_var, ConfigError};
use config::{Config, Environment};
use llm_adapter::providers::configs::{
    AnthropicProviderConfig, AzureOpenAiProviderConfig, GoogleProviderConfig, GroqProviderConfig,
    OpenAiProviderConfig, ProviderConfig,
};
use llm_adapter::Vendor;
use serde::Deserialize;
use std::collections::HashMap;

/// Every environment variable the adapters read, keyed by its lower-cased name
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    openai_api_key: Option<String>,
    openai_api_model_chat: Option<String>,
    openai_api_model_audio_transcription: Option<String>,
    openai_api_model_text2speech: Option<String>,

    azure_openai_api_key: Option<String>,
    azure_openai_endpoint: Option<String>,
    openai_api_version: Option<String>,
    azure_openai_api_deployment_chat: Option<String>,
    azure_openai_api_deployment_audio_transcription: Option<String>,
    azure_openai_api_deployment_text2speech: Option<String>,

    anthropic_api_key: Option<String>,
    anthropic_api_model_chat: Option<String>,

    gemini_api_key: Option<String>,
    gemini_api_model_chat: Option<String>,

    groq_api_key: Option<String>,
    groq_api_model_chat: Option<String>,

    /// Json object whose `*_API_KEY` entries win over the plain variables
    app_secrets: Option<String>,

    #[serde(skip)]
    secrets: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Environment::default().try_parsing(false))
            .build()?;

        let mut settings: Settings = config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })?;

        if let Some(secrets) = settings.app_secrets.as_deref().filter(|s| !s.trim().is_empty()) {
            settings.secrets = serde_json::from_str(secrets)?;
        }

        Ok(settings)
    }

    /// Build the adapter configuration for a vendor, naming the first missing variable
    pub fn provider_config(&self, vendor: Vendor) -> Result<ProviderConfig, ConfigError> {
        let config = match vendor {
            Vendor::OpenAi => {
                let mut config = OpenAiProviderConfig::new(
                    self.api_key("openai_api_key", &self.openai_api_key)?,
                    require("openai_api_model_chat", &self.openai_api_model_chat)?,
                );
                config.transcription_model = optional(&self.openai_api_model_audio_transcription);
                config.speech_model = optional(&self.openai_api_model_text2speech);
                ProviderConfig::OpenAi(config)
            }
            Vendor::AzureOpenAi => ProviderConfig::AzureOpenAi(AzureOpenAiProviderConfig {
                api_key: self.api_key("azure_openai_api_key", &self.azure_openai_api_key)?,
                endpoint: require("azure_openai_endpoint", &self.azure_openai_endpoint)?,
                api_version: require("openai_api_version", &self.openai_api_version)?,
                deployment: require(
                    "azure_openai_api_deployment_chat",
                    &self.azure_openai_api_deployment_chat,
                )?,
                transcription_deployment: optional(
                    &self.azure_openai_api_deployment_audio_transcription,
                ),
                speech_deployment: optional(&self.azure_openai_api_deployment_text2speech),
            }),
            Vendor::Anthropic => ProviderConfig::Anthropic(AnthropicProviderConfig::new(
                self.api_key("anthropic_api_key", &self.anthropic_api_key)?,
                require("anthropic_api_model_chat", &self.anthropic_api_model_chat)?,
            )),
            Vendor::Google => ProviderConfig::Google(GoogleProviderConfig::new(
                self.api_key("gemini_api_key", &self.gemini_api_key)?,
                require("gemini_api_model_chat", &self.gemini_api_model_chat)?,
            )),
            Vendor::Groq => ProviderConfig::Groq(GroqProviderConfig::new(
                self.api_key("groq_api_key", &self.groq_api_key)?,
                require("groq_api_model_chat", &self.groq_api_model_chat)?,
            )),
        };
        Ok(config)
    }

    fn api_key(&self, field: &str, value: &Option<String>) -> Result<String, ConfigError> {
        match self.secrets.get(&to_env_var(field)).filter(|v| !v.trim().is_empty()) {
            Some(secret) => Ok(secret.clone()),
            None => require(field, value),
        }
    }
}

fn optional(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

fn require(field: &str, value: &Option<String>) -> Result<String, ConfigError> {
    optional(value).ok_or_else(|| ConfigError::MissingEnvVar {
        env_var: to_env_var(field),
    })
}
