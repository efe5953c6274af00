use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::base::Adapter;
use super::client::{headers, http_client, ChatClient, HttpChatClient};
use super::configs::AnthropicProviderConfig;
use super::factory::Vendor;
use super::utils::{
    arguments_object, fetch_image, redact_history, reject_audio, replace_omitted_payloads,
};
use crate::errors::{AdapterError, AdapterResult};
use crate::models::chat::{ChatOptions, ChatRequest, ChatResult, ToolResult};
use crate::models::content::ContentUnit;
use crate::models::tool::{Tool, ToolCall};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    model: String,
    http: Client,
    chat: Arc<dyn ChatClient>,
}

impl AnthropicAdapter {
    pub fn new(config: AnthropicProviderConfig) -> AdapterResult<Self> {
        config.validate()?;

        let http = http_client()?;
        let headers = headers(
            Vendor::Anthropic,
            &[
                ("x-api-key", config.api_key.as_str()),
                ("anthropic-version", ANTHROPIC_VERSION),
            ],
        )?;
        let chat = HttpChatClient::new(
            http.clone(),
            Vendor::Anthropic,
            format!("{}/v1/messages", config.host.trim_end_matches('/')),
            headers,
        );

        Ok(Self {
            model: config.model,
            http,
            chat: Arc::new(chat),
        })
    }

    pub fn with_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = chat;
        self
    }

    fn tools_to_anthropic_spec(tools: &[Tool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.input_schema,
                })
            })
            .collect()
    }

    fn tool_results_to_anthropic_spec(tool_results: &[ToolResult]) -> Vec<Value> {
        tool_results
            .iter()
            .map(|result| {
                json!({
                    "type": "tool_result",
                    "tool_use_id": result.id,
                    "content": result.content,
                })
            })
            .collect()
    }

    /// Anthropic only takes inline images, so remote urls are downloaded here
    async fn content_to_anthropic_spec(&self, content: &ContentUnit) -> AdapterResult<Value> {
        match content {
            ContentUnit::Text(text) => Ok(json!({"type": "text", "text": text})),
            ContentUnit::Image(image) => {
                let inline = fetch_image(&self.http, &image.url).await?;
                Ok(json!({
                    "type": "image",
                    "source": {
                        "type": "base64",
                        "media_type": inline.mime_type,
                        "data": inline.data,
                    }
                }))
            }
            ContentUnit::Audio(_) => Err(AdapterError::UnsupportedContent {
                vendor: Vendor::Anthropic,
                kind: content.kind(),
            }),
        }
    }

    async fn build_messages(&self, request: &ChatRequest) -> AdapterResult<Vec<Value>> {
        let mut messages = Vec::new();

        if let Some(in_progress) = &request.in_progress {
            messages.extend(in_progress.messages.iter().cloned());
            if !in_progress.tool_results.is_empty() {
                messages.push(json!({
                    "role": "user",
                    "content": Self::tool_results_to_anthropic_spec(&in_progress.tool_results),
                }));
            }
        }

        if !request.new_message_contents.is_empty() {
            let content = try_join_all(
                request
                    .new_message_contents
                    .iter()
                    .map(|content| self.content_to_anthropic_spec(content)),
            )
            .await?;
            messages.push(json!({"role": "user", "content": content}));
        }

        Ok(messages)
    }

    fn build_payload(&self, request: &ChatRequest, messages: &[Value]) -> Value {
        let tool_option = &request.options.tool_option;
        let mut payload = json!({
            "model": self.model,
            "messages": replace_omitted_payloads(Vendor::Anthropic, messages),
            "max_tokens": tool_option.max_tokens(),
            "temperature": tool_option.temperature(),
        });

        if !request.system_prompt.is_empty() {
            let system: Vec<Value> = request
                .system_prompt
                .iter()
                .map(|prompt| json!({"type": "text", "text": prompt}))
                .collect();
            payload["system"] = json!(system);
        }

        // Structured output is a forced call of the schema tool
        if let Some(tool) = request.options.response_format_tool() {
            payload["tools"] = json!(Self::tools_to_anthropic_spec(std::slice::from_ref(tool)));
            payload["tool_choice"] = json!({"type": "tool", "name": tool.name});
        } else if !request.options.tools.is_empty() {
            payload["tools"] = json!(Self::tools_to_anthropic_spec(&request.options.tools));
            payload["tool_choice"] = Self::tool_choice(&request.options);
        }

        payload
    }

    fn tool_choice(options: &ChatOptions) -> Value {
        match &options.tool_option.choice {
            Some(Value::String(choice)) => json!({"type": choice}),
            Some(choice @ Value::Object(_)) => choice.clone(),
            _ => json!({"type": "auto"}),
        }
    }

    /// First text block, tool calls when the model stopped to use tools, and the assistant
    /// turn for history
    fn response_to_result(response: &Value) -> AdapterResult<(Option<String>, Vec<ToolCall>, Value)> {
        let content = response
            .get("content")
            .and_then(Value::as_array)
            .ok_or_else(|| AdapterError::malformed(Vendor::Anthropic, "response has no content"))?;

        let text = content
            .iter()
            .find(|block| block["type"] == "text")
            .and_then(|block| block["text"].as_str())
            .map(String::from);

        let mut tools = Vec::new();
        if response["stop_reason"] == "tool_use" {
            for block in content.iter().filter(|block| block["type"] == "tool_use") {
                let id = block["id"].as_str().unwrap_or_default();
                let name = block["name"].as_str().unwrap_or_default();
                let arguments = arguments_object(Vendor::Anthropic, id, block["input"].clone())?;
                tools.push(ToolCall::new(id, name, arguments));
            }
        }

        let message = json!({
            "role": response["role"].as_str().unwrap_or("assistant"),
            "content": content,
        });

        Ok((text, tools, message))
    }
}

#[async_trait]
impl Adapter for AnthropicAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Anthropic
    }

    async fn chat_completions(&self, request: ChatRequest) -> AdapterResult<ChatResult> {
        request.validate()?;
        reject_audio(Vendor::Anthropic, &request.new_message_contents)?;

        let mut messages = self.build_messages(&request).await?;
        let payload = self.build_payload(&request, &messages);

        let history = Value::Array(redact_history(Vendor::Anthropic, &messages));
        info!(
            "[{}] chat completions start -- system: {:?} -- messages: {}",
            Vendor::Anthropic,
            request.system_prompt,
            history
        );
        let response = self.chat.create(payload).await?;

        let (text, tools, message) = Self::response_to_result(&response)?;
        debug!(
            "[{}] chat completions end -- content: {} stop_reason: {}",
            Vendor::Anthropic,
            message["content"],
            response["stop_reason"]
        );

        messages.push(message);
        ChatResult::new(
            text,
            tools,
            redact_history(Vendor::Anthropic, &messages),
            &request.options,
        )
    }
}
