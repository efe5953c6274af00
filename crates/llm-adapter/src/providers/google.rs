use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::base::Adapter;
use super::client::{headers, http_client, ChatClient, HttpChatClient};
use super::configs::GoogleProviderConfig;
use super::factory::Vendor;
use super::utils::{
    arguments_object, clean_google_schema, fetch_image, redact_history, reject_audio,
    replace_omitted_payloads,
};
use crate::errors::{AdapterError, AdapterResult};
use crate::models::chat::{ChatRequest, ChatResult, ToolOption};
use crate::models::content::ContentUnit;
use crate::models::tool::{Tool, ToolCall};

/// Adapter for the Gemini `generateContent` api
pub struct GoogleAdapter {
    http: Client,
    chat: Arc<dyn ChatClient>,
}

impl GoogleAdapter {
    pub fn new(config: GoogleProviderConfig) -> AdapterResult<Self> {
        config.validate()?;

        let http = http_client()?;
        let headers = headers(Vendor::Google, &[("x-goog-api-key", config.api_key.as_str())])?;
        let chat = HttpChatClient::new(
            http.clone(),
            Vendor::Google,
            format!(
                "{}/v1beta/models/{}:generateContent",
                config.host.trim_end_matches('/'),
                config.model
            ),
            headers,
        );

        Ok(Self {
            http,
            chat: Arc::new(chat),
        })
    }

    pub fn with_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = chat;
        self
    }

    fn tools_to_google_spec(tools: &[Tool]) -> Value {
        let declarations: Vec<Value> = tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": clean_google_schema(&tool.input_schema),
                })
            })
            .collect();
        json!([{"functionDeclarations": declarations}])
    }

    /// Upper-cased choice, e.g. `auto` -> `AUTO`. Gemini has no `required`; `ANY` means the same.
    fn function_calling_mode(tool_option: &ToolOption) -> String {
        match tool_option.choice_str() {
            Some(choice) if choice.eq_ignore_ascii_case("required") => "ANY".to_string(),
            Some(choice) if !choice.is_empty() => choice.to_ascii_uppercase(),
            _ => "AUTO".to_string(),
        }
    }

    async fn content_to_google_spec(&self, content: &ContentUnit) -> AdapterResult<Value> {
        match content {
            ContentUnit::Text(text) => Ok(json!({"text": text})),
            ContentUnit::Image(image) => {
                let inline = fetch_image(&self.http, &image.url).await?;
                Ok(json!({
                    "inlineData": {
                        "mimeType": inline.mime_type,
                        "data": inline.data,
                    }
                }))
            }
            ContentUnit::Audio(_) => Err(AdapterError::UnsupportedContent {
                vendor: Vendor::Google,
                kind: content.kind(),
            }),
        }
    }

    async fn build_contents(&self, request: &ChatRequest) -> AdapterResult<Vec<Value>> {
        let mut contents = Vec::new();

        if let Some(in_progress) = &request.in_progress {
            contents.extend(in_progress.messages.iter().cloned());
            // No tool result part type is used; results go back as text, in call order
            if !in_progress.tool_results.is_empty() {
                let parts: Vec<Value> = in_progress
                    .tool_results
                    .iter()
                    .map(|result| json!({"text": result.content}))
                    .collect();
                contents.push(json!({"role": "user", "parts": parts}));
            }
        }

        if !request.new_message_contents.is_empty() {
            let parts = try_join_all(
                request
                    .new_message_contents
                    .iter()
                    .map(|content| self.content_to_google_spec(content)),
            )
            .await?;
            contents.push(json!({"role": "user", "parts": parts}));
        }

        Ok(contents)
    }

    fn build_payload(&self, request: &ChatRequest, contents: &[Value]) -> Value {
        let tool_option = &request.options.tool_option;
        let system_parts: Vec<Value> = request
            .system_prompt
            .iter()
            .map(|prompt| json!({"text": prompt}))
            .collect();

        let mut payload = json!({
            "contents": replace_omitted_payloads(Vendor::Google, contents),
            "systemInstruction": {"parts": system_parts},
            "generationConfig": {
                "maxOutputTokens": tool_option.max_tokens(),
                "temperature": tool_option.temperature(),
            },
            "safetySettings": [{
                "category": "HARM_CATEGORY_DANGEROUS_CONTENT",
                "threshold": "BLOCK_ONLY_HIGH",
            }],
        });

        if request.options.uses_function_tools() {
            payload["tools"] = Self::tools_to_google_spec(&request.options.tools);
            payload["toolConfig"] = json!({
                "functionCallingConfig": {"mode": Self::function_calling_mode(tool_option)}
            });
        }
        if let Some(tool) = request.options.response_format_tool() {
            payload["generationConfig"]["responseMimeType"] = json!("application/json");
            payload["generationConfig"]["responseSchema"] = clean_google_schema(&tool.input_schema);
        }

        payload
    }

    /// Joined text parts of the first candidate, its function calls, and the model turn.
    /// Function calls carry no id.
    fn response_to_result(
        response: &Value,
    ) -> AdapterResult<(Option<String>, Vec<ToolCall>, Option<Value>)> {
        let Some(candidate) = response.get("candidates").and_then(|c| c.get(0)) else {
            if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
                return Err(AdapterError::malformed(
                    Vendor::Google,
                    format!("prompt was blocked: {}", reason),
                ));
            }
            return Ok((None, Vec::new(), None));
        };

        let content = candidate.get("content").filter(|content| content.is_object());
        let parts = content
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let texts: Vec<&str> = parts.iter().filter_map(|part| part["text"].as_str()).collect();
        let text = if texts.is_empty() {
            None
        } else {
            Some(texts.concat())
        };

        let mut tools = Vec::new();
        for call in parts.iter().filter_map(|part| part.get("functionCall")) {
            let name = call["name"].as_str().unwrap_or_default();
            let arguments = arguments_object(Vendor::Google, name, call["args"].clone())?;
            tools.push(ToolCall::new("", name, arguments));
        }

        let message = content.map(|content| {
            let mut message = content.clone();
            if message.get("role").is_none() {
                message["role"] = json!("model");
            }
            message
        });

        Ok((text, tools, message))
    }
}

#[async_trait]
impl Adapter for GoogleAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Google
    }

    async fn chat_completions(&self, request: ChatRequest) -> AdapterResult<ChatResult> {
        request.validate()?;
        reject_audio(Vendor::Google, &request.new_message_contents)?;

        let mut contents = self.build_contents(&request).await?;
        let payload = self.build_payload(&request, &contents);

        let history = Value::Array(redact_history(Vendor::Google, &contents));
        info!(
            "[{}] chat completions start -- contents: {}",
            Vendor::Google,
            history
        );
        let response = self.chat.create(payload).await?;

        let (text, tools, message) = Self::response_to_result(&response)?;
        debug!(
            "[{}] chat completions end -- text: {:?} function calls: {} finish_reason: {}",
            Vendor::Google,
            text,
            tools.len(),
            response["candidates"][0]["finishReason"]
        );

        contents.extend(message);
        ChatResult::new(
            text,
            tools,
            redact_history(Vendor::Google, &contents),
            &request.options,
        )
    }
}
