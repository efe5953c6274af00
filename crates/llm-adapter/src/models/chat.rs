use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::ContentUnit;
use super::tool::{Tool, ToolCall};
use crate::errors::{AdapterError, AdapterResult};

pub const DEFAULT_MAX_TOKENS: u32 = 1028;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// How the supplied tools should be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolOptionType {
    Function,
    FunctionStrict,
    /// The first tool's schema describes a structured json output; other tools are ignored
    ResponseFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOption {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ToolOptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ToolOption {
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
            .filter(|tokens| *tokens > 0)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn is_response_format(&self) -> bool {
        self.kind == Some(ToolOptionType::ResponseFormat)
    }

    /// Tool choice as a plain string, when the caller gave one
    pub fn choice_str(&self) -> Option<&str> {
        self.choice.as_ref().and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default)]
    pub tool_option: ToolOption,
}

impl ChatOptions {
    /// The tool whose schema shapes a structured output, if structured output was requested
    pub fn response_format_tool(&self) -> Option<&Tool> {
        if self.tool_option.is_response_format() {
            self.tools.first()
        } else {
            None
        }
    }

    /// Whether the tools should be declared to the vendor as callable functions
    pub fn uses_function_tools(&self) -> bool {
        !self.tools.is_empty()
            && matches!(
                self.tool_option.kind,
                Some(ToolOptionType::Function) | Some(ToolOptionType::FunctionStrict)
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub id: String,
    pub content: String,
}

/// Conversation carried over from a previous call to the same adapter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InProgress {
    pub messages: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub system_prompt: Vec<String>,
    #[serde(default)]
    pub new_message_contents: Vec<ContentUnit>,
    #[serde(default)]
    pub options: ChatOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_progress: Option<InProgress>,
}

impl ChatRequest {
    pub fn new(system_prompt: Vec<String>, new_message_contents: Vec<ContentUnit>) -> Self {
        Self {
            system_prompt,
            new_message_contents,
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<Tool>, tool_option: ToolOption) -> Self {
        self.options = ChatOptions { tools, tool_option };
        self
    }

    pub fn with_in_progress(mut self, in_progress: InProgress) -> Self {
        self.in_progress = Some(in_progress);
        self
    }

    /// Deserialize a json request in the normalized shape and validate it
    pub fn from_value(value: Value) -> AdapterResult<Self> {
        let request: ChatRequest = serde_json::from_value(value)
            .map_err(|e| AdapterError::InvalidRequest(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> AdapterResult<()> {
        let mut tool_names = HashSet::new();
        for tool in &self.options.tools {
            tool.validate()?;
            if !tool_names.insert(tool.name.as_str()) {
                return Err(AdapterError::InvalidRequest(format!(
                    "Duplicate tool name: {}",
                    tool.name
                )));
            }
        }

        if self.options.tool_option.is_response_format() {
            match self.options.tools.len() {
                0 => {
                    return Err(AdapterError::InvalidRequest(
                        "toolOption.type response_format requires one tool describing the output schema"
                            .to_string(),
                    ))
                }
                1 => {}
                n => tracing::warn!(
                    "response_format uses only the first of {} tools as the output schema",
                    n
                ),
            }
        }

        for content in &self.new_message_contents {
            match content {
                ContentUnit::Image(image) if image.url.is_empty() => {
                    return Err(AdapterError::InvalidRequest(
                        "image.url must not be empty".to_string(),
                    ))
                }
                ContentUnit::Audio(audio) if audio.data.is_empty() => {
                    return Err(AdapterError::InvalidRequest(
                        "audio.data must not be empty".to_string(),
                    ))
                }
                _ => {}
            }
        }

        Ok(())
    }

    pub fn has_image(&self) -> bool {
        self.new_message_contents.iter().any(ContentUnit::is_image)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub text: Option<String>,
    pub tools: Vec<ToolCall>,
    /// Vendor-native history, to be passed back as `InProgress::messages`
    pub messages: Vec<Value>,
}

impl ChatResult {
    /// Build the result, substituting the structured payload for the text when a
    /// structured output was requested and the vendor answered with a tool call.
    pub fn new(
        text: Option<String>,
        tools: Vec<ToolCall>,
        messages: Vec<Value>,
        options: &ChatOptions,
    ) -> AdapterResult<Self> {
        let text = match tools.first() {
            Some(tool) if options.tool_option.is_response_format() => Some(
                serde_json::to_string(&tool.arguments)
                    .map_err(|e| AdapterError::InvalidRequest(e.to_string()))?,
            ),
            _ => text,
        };

        Ok(Self {
            text,
            tools,
            messages,
        })
    }
}
