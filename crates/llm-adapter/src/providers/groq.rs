use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use super::base::Adapter;
use super::client::{headers, http_client, ChatClient, HttpChatClient};
use super::configs::GroqProviderConfig;
use super::factory::Vendor;
use super::utils::{
    contents_to_openai_spec, openai_response_to_result, openai_tool_choice, redact_history,
    replace_omitted_payloads, tool_results_to_openai_spec, tools_to_openai_spec,
};
use crate::errors::AdapterResult;
use crate::models::chat::{ChatRequest, ChatResult};

/// Adapter for Groq's OpenAI compatible endpoint
pub struct GroqAdapter {
    model: String,
    chat: Arc<dyn ChatClient>,
}

impl GroqAdapter {
    pub fn new(config: GroqProviderConfig) -> AdapterResult<Self> {
        config.validate()?;

        let headers = headers(
            Vendor::Groq,
            &[("authorization", format!("Bearer {}", config.api_key).as_str())],
        )?;
        let chat = HttpChatClient::new(
            http_client()?,
            Vendor::Groq,
            format!(
                "{}/openai/v1/chat/completions",
                config.host.trim_end_matches('/')
            ),
            headers,
        );

        Ok(Self {
            model: config.model,
            chat: Arc::new(chat),
        })
    }

    pub fn with_client(mut self, chat: Arc<dyn ChatClient>) -> Self {
        self.chat = chat;
        self
    }

    /// Groq refuses system messages next to image content. On a fresh vision request the
    /// system prompt is sent as a leading user turn of text parts instead.
    fn system_messages(request: &ChatRequest) -> Vec<Value> {
        if request.system_prompt.is_empty() {
            return Vec::new();
        }

        if request.has_image() {
            let parts: Vec<Value> = request
                .system_prompt
                .iter()
                .map(|prompt| json!({"type": "text", "text": prompt}))
                .collect();
            vec![json!({"role": "user", "content": parts})]
        } else {
            request
                .system_prompt
                .iter()
                .map(|prompt| json!({"role": "system", "content": prompt}))
                .collect()
        }
    }

    fn build_messages(&self, request: &ChatRequest) -> AdapterResult<Vec<Value>> {
        let mut messages = match &request.in_progress {
            Some(in_progress) => {
                let mut messages = in_progress.messages.clone();
                messages.extend(tool_results_to_openai_spec(&in_progress.tool_results));
                messages
            }
            None => Self::system_messages(request),
        };

        if !request.new_message_contents.is_empty() {
            messages.push(json!({
                "role": "user",
                "content": contents_to_openai_spec(Vendor::Groq, &request.new_message_contents, false)?,
            }));
        }

        Ok(messages)
    }

    fn build_payload(&self, request: &ChatRequest, messages: &[Value]) -> Value {
        let tool_option = &request.options.tool_option;
        let mut payload = json!({
            "model": self.model,
            "messages": replace_omitted_payloads(Vendor::Groq, messages),
            "max_tokens": tool_option.max_tokens(),
            "temperature": tool_option.temperature(),
        });

        // Groq has no strict function calling and only generic json mode
        if request.options.uses_function_tools() {
            payload["tools"] = json!(tools_to_openai_spec(&request.options.tools, false));
            payload["tool_choice"] = openai_tool_choice(tool_option);
        }
        if request.options.response_format_tool().is_some() {
            payload["response_format"] = json!({"type": "json_object"});
        }

        payload
    }
}

#[async_trait]
impl Adapter for GroqAdapter {
    fn vendor(&self) -> Vendor {
        Vendor::Groq
    }

    async fn chat_completions(&self, request: ChatRequest) -> AdapterResult<ChatResult> {
        request.validate()?;

        let mut messages = self.build_messages(&request)?;
        let payload = self.build_payload(&request, &messages);

        let history = Value::Array(redact_history(Vendor::Groq, &messages));
        info!(
            "[{}] chat completions start -- messages: {}",
            Vendor::Groq,
            history
        );
        let response = self.chat.create(payload).await?;

        let (text, tools, assistant) = openai_response_to_result(Vendor::Groq, &response)?;
        debug!(
            "[{}] chat completions end -- message: {:?} finish_reason: {}",
            Vendor::Groq,
            assistant,
            response["choices"][0]["finish_reason"]
        );

        messages.extend(assistant);
        ChatResult::new(
            text,
            tools,
            redact_history(Vendor::Groq, &messages),
            &request.options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AdapterError;
    use crate::models::chat::{ToolOption, ToolOptionType};
    use crate::models::content::ContentUnit;
    use crate::models::speech::{SpeechToTextRequest, TextToSpeechRequest};
    use crate::models::tool::Tool;
    use crate::providers::mock::MockClient;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_response(content: &str) -> Value {
        json!({
            "id": "chatcmpl-groq",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })
    }

    fn weather_tool() -> Tool {
        Tool::new(
            "get_weather",
            "Gets the current weather for a location",
            json!({
                "type": "object",
                "properties": {"location": {"type": "string"}},
                "required": ["location"]
            }),
        )
    }

    fn adapter_with(mock: &MockClient) -> GroqAdapter {
        GroqAdapter::new(GroqProviderConfig::new("test_api_key", "llama-3.2-90b-vision-preview"))
            .unwrap()
            .with_client(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_vision_moves_system_prompt_into_user_turn() -> AdapterResult<()> {
        let mock = MockClient::new(vec![text_response("A cat on a sofa.")]);
        let adapter = adapter_with(&mock);

        let result = adapter
            .chat_completions(ChatRequest::new(
                vec!["You describe images.".to_string()],
                vec![
                    ContentUnit::text("What is this?"),
                    ContentUnit::image("https://example.com/cat.png"),
                ],
            ))
            .await?;
        assert_eq!(result.text.as_deref(), Some("A cat on a sofa."));

        let payload = mock.last_payload();
        let messages = payload["messages"].as_array().unwrap();
        assert!(messages.iter().all(|message| message["role"] != "system"));
        assert_eq!(
            messages[0],
            json!({"role": "user", "content": [{"type": "text", "text": "You describe images."}]})
        );
        assert_eq!(messages[1]["content"][1]["type"], "image_url");
        assert_eq!(
            messages[1]["content"][1]["image_url"]["url"],
            "https://example.com/cat.png"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_text_only_keeps_system_role() -> AdapterResult<()> {
        let mock = MockClient::new(vec![text_response("Hi!")]);
        let adapter = adapter_with(&mock);

        adapter
            .chat_completions(ChatRequest::new(
                vec!["Reply briefly.".to_string()],
                vec![ContentUnit::text("Hi")],
            ))
            .await?;

        let payload = mock.last_payload();
        assert_eq!(
            payload["messages"][0],
            json!({"role": "system", "content": "Reply briefly."})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_tools_are_never_strict() -> AdapterResult<()> {
        let mock = MockClient::new(vec![text_response("ok")]);
        let adapter = adapter_with(&mock);

        let request = ChatRequest::new(vec![], vec![ContentUnit::text("weather in Tokyo?")])
            .with_tools(
                vec![weather_tool()],
                ToolOption {
                    kind: Some(ToolOptionType::FunctionStrict),
                    ..Default::default()
                },
            );
        adapter.chat_completions(request).await?;

        let payload = mock.last_payload();
        assert!(payload["tools"][0]["function"].get("strict").is_none());
        assert_eq!(
            payload["tools"][0]["function"]["parameters"],
            weather_tool().input_schema
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_response_format_uses_json_mode() -> AdapterResult<()> {
        let mock = MockClient::new(vec![text_response(r#"{"location":"Tokyo"}"#)]);
        let adapter = adapter_with(&mock);

        let request = ChatRequest::new(
            vec!["Answer in JSON.".to_string()],
            vec![ContentUnit::text("weather in Tokyo?")],
        )
        .with_tools(
            vec![weather_tool()],
            ToolOption {
                kind: Some(ToolOptionType::ResponseFormat),
                ..Default::default()
            },
        );
        let result = adapter.chat_completions(request).await?;

        assert_eq!(result.text.as_deref(), Some(r#"{"location":"Tokyo"}"#));
        let payload = mock.last_payload();
        assert_eq!(payload["response_format"], json!({"type": "json_object"}));
        assert!(payload.get("tools").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_audio_input_is_rejected() {
        let mock = MockClient::new(vec![]);
        let adapter = adapter_with(&mock);

        let result = adapter
            .chat_completions(ChatRequest::new(vec![], vec![ContentUnit::audio("UklGRg==")]))
            .await;
        assert!(matches!(
            result,
            Err(AdapterError::UnsupportedContent {
                vendor: Vendor::Groq,
                ..
            })
        ));
        assert!(mock.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_http_endpoint() -> AdapterResult<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer test_api_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Hello!")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = GroqProviderConfig::new("test_api_key", "llama-3.3-70b-versatile");
        config.host = mock_server.uri();
        let adapter = GroqAdapter::new(config)?;

        let result = adapter
            .chat_completions(ChatRequest::new(vec![], vec![ContentUnit::text("Hi")]))
            .await?;
        assert_eq!(result.text.as_deref(), Some("Hello!"));
        Ok(())
    }

    #[tokio::test]
    async fn test_speech_is_unsupported() -> AdapterResult<()> {
        let adapter = adapter_with(&MockClient::default());

        assert_eq!(
            adapter
                .speech_to_text(SpeechToTextRequest::new("/tmp/unused.wav"))
                .await?,
            "unsupported"
        );
        let audio = adapter
            .text_to_speech(TextToSpeechRequest::new("hello").with_response_format("aac"))
            .await?;
        assert_eq!(audio.content_type, "audio/aac");
        assert!(!audio.content.is_empty());
        Ok(())
    }
}
