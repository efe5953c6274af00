use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::base::Adapter;
use super::client::{check_status, headers, http_client, ChatClient, HttpChatClient};
use super::configs::{AzureOpenAiProviderConfig, OpenAiProviderConfig};
use super::factory::Vendor;
use super::utils::{
    contents_to_openai_spec, openai_response_to_result, openai_tool_choice, redact_history,
    replace_omitted_payloads, tool_results_to_openai_spec, tool_to_openai_response_format,
    tools_to_openai_spec,
};
use crate::errors::{AdapterError, AdapterResult};
use crate::models::chat::{ChatRequest, ChatResult, ToolOptionType};
use crate::models::speech::{
    SpeechAudio, SpeechToTextRequest, TextToSpeechRequest, DEFAULT_SPEECH_FORMAT,
    DEFAULT_TRANSCRIPTION_LANGUAGE, DEFAULT_VOICE,
};

/// An audio endpoint and the model (or Azure deployment) it runs
#[derive(Debug, Clone)]
struct AudioEndpoint {
    url: String,
    model: String,
}

/// Adapter for OpenAI and Azure OpenAI. Both speak the same chat completions protocol and
/// only differ in urls and authentication.
pub struct OpenAiAdapter {
    vendor: Vendor,
    model: String,
    http: Client,
    headers: HeaderMap,
    chat: Arc<dyn ChatClient>,
    transcription: Result<AudioEndpoint, &'static str>,
    speech: Result<AudioEndpoint, &'static str>,
}

impl OpenAiAdapter {
    pub fn new(config: OpenAiProviderConfig) -> AdapterResult<Self> {
        config.validate()?;

        let http = http_client()?;
        let host = config.host.trim_end_matches('/');
        let headers = headers(
            Vendor::OpenAi,
            &[("authorization", format!("Bearer {}", config.api_key).as_str())],
        )?;

        let audio_endpoint = |path: &str, model: Option<String>| {
            model
                .filter(|model| !model.trim().is_empty())
                .map(|model| AudioEndpoint {
                    url: format!("{}/v1/audio/{}", host, path),
                    model,
                })
        };
        let transcription = audio_endpoint("transcriptions", config.transcription_model)
            .ok_or("transcription_model");
        let speech = audio_endpoint("speech", config.speech_model).ok_or("speech_model");

        let chat = HttpChatClient::new(
            http.clone(),
            Vendor::OpenAi,
            format!("{}/v1/chat/completions", host),
            headers.clone(),
        );

        Ok(Self {
            vendor: Vendor::OpenAi,
            model: config.model,
            http,
            headers,
            chat: Arc::new(chat),
            transcription,
            speech,
        })
    }

    /// Azure routes each model through its own deployment url
    pub fn azure(config: AzureOpenAiProviderConfig) -> AdapterResult<Self> {
        config.validate()?;

        let http = http_client()?;
        let endpoint = config.endpoint.trim_end_matches('/');
        let headers = headers(Vendor::AzureOpenAi, &[("api-key", config.api_key.as_str())])?;

        let deployment_url = |deployment: &str, path: &str| {
            format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                endpoint, deployment, path, config.api_version
            )
        };
        let audio_endpoint = |path: &str, deployment: &Option<String>| {
            deployment
                .as_deref()
                .filter(|deployment| !deployment.trim().is_empty())
                .map(|deployment| AudioEndpoint {
                    url: deployment_url(deployment, path),
                    model: deployment.to_string(),
                })
        };
        let transcription = audio_endpoint("audio/transcriptions", &config.transcription_deployment)
            .ok_or("transcription_deployment");
        let speech =
            audio_endpoint("audio/speech", &config.speech_deployment).ok_or("speech_deployment");

        let chat = HttpChatClient::new(
            http.clone(),
            Vendor::AzureOpenAi,
            deployment_url(&config.deployment, "chat/completions"),
            headers.clone(),
        );

        Ok(Self {
            vendor: Vendor::AzureOpenAi,
            model: config.deployment,
            http,
            headers,
            chat: Arc::new(chat),
            transcription,
            speech,
        })
    }

    /// Send chat requests through another client, e.g. a proxy or a test double
    pub fn with_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = chat;
        self
    }

    /// Conversation to send: carried history plus tool results, or the system prompt on a
    /// fresh start, followed by the new user turn
    fn build_messages(&self, request: &ChatRequest) -> AdapterResult<Vec<Value>> {
        let mut messages = match &request.in_progress {
            Some(in_progress) => {
                let mut messages = in_progress.messages.clone();
                messages.extend(tool_results_to_openai_spec(&in_progress.tool_results));
                messages
            }
            None => request
                .system_prompt
                .iter()
                .map(|prompt| json!({"role": "system", "content": prompt}))
                .collect(),
        };

        if !request.new_message_contents.is_empty() {
            messages.push(json!({
                "role": "user",
                "content": contents_to_openai_spec(self.vendor, &request.new_message_contents, true)?,
            }));
        }

        Ok(messages)
    }

    fn build_payload(&self, request: &ChatRequest, messages: &[Value]) -> Value {
        let tool_option = &request.options.tool_option;
        let mut payload = json!({
            "model": self.model,
            "messages": replace_omitted_payloads(self.vendor, messages),
            "max_tokens": tool_option.max_tokens(),
            "temperature": tool_option.temperature(),
        });

        if request.options.uses_function_tools() {
            let strict = tool_option.kind == Some(ToolOptionType::FunctionStrict);
            payload["tools"] = json!(tools_to_openai_spec(&request.options.tools, strict));
            payload["tool_choice"] = openai_tool_choice(tool_option);
        }
        if let Some(tool) = request.options.response_format_tool() {
            payload["response_format"] = tool_to_openai_response_format(tool);
        }

        payload
    }

    fn audio_endpoint<'a>(
        &self,
        endpoint: &'a Result<AudioEndpoint, &'static str>,
    ) -> AdapterResult<&'a AudioEndpoint> {
        endpoint.as_ref().map_err(|field| AdapterError::MissingConfig {
            vendor: self.vendor,
            field: *field,
        })
    }
}

#[async_trait]
impl Adapter for OpenAiAdapter {
    fn vendor(&self) -> Vendor {
        self.vendor
    }

    async fn chat_completions(&self, request: ChatRequest) -> AdapterResult<ChatResult> {
        request.validate()?;

        let mut messages = self.build_messages(&request)?;
        let payload = self.build_payload(&request, &messages);

        let history = Value::Array(redact_history(self.vendor, &messages));
        info!(
            "[{}] chat completions start -- messages: {}",
            self.vendor,
            history
        );
        let response = self.chat.create(payload).await?;

        let (text, tools, assistant) = openai_response_to_result(self.vendor, &response)?;
        debug!(
            "[{}] chat completions end -- message: {:?} finish_reason: {}",
            self.vendor,
            assistant,
            response["choices"][0]["finish_reason"]
        );

        messages.extend(assistant);
        ChatResult::new(
            text,
            tools,
            redact_history(self.vendor, &messages),
            &request.options,
        )
    }

    async fn speech_to_text(&self, request: SpeechToTextRequest) -> AdapterResult<String> {
        let endpoint = self.audio_endpoint(&self.transcription)?;

        let audio = tokio::fs::read(&request.audio_file_path).await?;
        let file_name = request
            .audio_file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
            .to_string();
        let language = request
            .options
            .language
            .unwrap_or_else(|| DEFAULT_TRANSCRIPTION_LANGUAGE.to_string());

        let form = Form::new()
            .text("model", endpoint.model.clone())
            .text("language", language)
            .part("file", Part::bytes(audio).file_name(file_name));

        let response = self
            .http
            .post(&endpoint.url)
            .headers(self.headers.clone())
            .multipart(form)
            .send()
            .await?;
        let body: Value = check_status(self.vendor, response).await?.json().await?;

        body.get("text")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| AdapterError::malformed(self.vendor, "transcription has no text"))
    }

    async fn text_to_speech(&self, request: TextToSpeechRequest) -> AdapterResult<SpeechAudio> {
        let endpoint = self.audio_endpoint(&self.speech)?;

        let payload = json!({
            "model": endpoint.model,
            "input": request.message,
            "voice": request.options.voice.as_deref().unwrap_or(DEFAULT_VOICE),
            "response_format": request
                .options
                .response_format
                .as_deref()
                .unwrap_or(DEFAULT_SPEECH_FORMAT),
        });

        let response = self
            .http
            .post(&endpoint.url)
            .headers(self.headers.clone())
            .json(&payload)
            .send()
            .await?;
        let response = check_status(self.vendor, response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = response.bytes().await?.to_vec();

        Ok(SpeechAudio {
            content_type,
            content,
        })
    }
}
