use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::{json, Map, Value};

use super::factory::Vendor;
use crate::errors::{AdapterError, AdapterResult};
use crate::models::chat::{ToolOption, ToolResult};
use crate::models::content::ContentUnit;
use crate::models::tool::{Tool, ToolCall};

/// Stands in for inline binary payloads in returned history
pub const OMITTED: &str = "ommitted";

pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";

/// Keys of a schema node whose values are maps of named sub-schemas
const SCHEMA_MAPS: [&str; 3] = ["properties", "$defs", "definitions"];
/// Keys of a schema node whose values are a sub-schema or a list of sub-schemas
const SCHEMA_LISTS: [&str; 5] = ["items", "prefixItems", "anyOf", "oneOf", "allOf"];

/// Rebuild a json-schema tree, letting `visit` rewrite every schema node. Property names
/// are never visited as schema keywords, so a property called `$schema` survives.
fn transform_schema<F>(schema: &Value, visit: &F) -> Value
where
    F: Fn(&mut Map<String, Value>),
{
    let Some(node) = schema.as_object() else {
        return schema.clone();
    };

    let mut node = node.clone();
    visit(&mut node);

    for (key, child) in node.iter_mut() {
        if SCHEMA_MAPS.contains(&key.as_str()) {
            if let Value::Object(named) = child {
                for sub_schema in named.values_mut() {
                    *sub_schema = transform_schema(sub_schema, visit);
                }
            }
        } else if SCHEMA_LISTS.contains(&key.as_str()) {
            match child {
                Value::Array(list) => {
                    for sub_schema in list.iter_mut() {
                        *sub_schema = transform_schema(sub_schema, visit);
                    }
                }
                other => *other = transform_schema(other, visit),
            }
        }
    }

    Value::Object(node)
}

fn is_object_schema(node: &Map<String, Value>) -> bool {
    match node.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(kinds)) => kinds.iter().any(|kind| kind == "object"),
        _ => false,
    }
}

/// Set `additionalProperties` on every object node of the schema. Strict function calling
/// rejects object schemas that leave it out.
pub fn with_additional_properties(schema: &Value, allowed: bool) -> Value {
    transform_schema(schema, &|node| {
        if is_object_schema(node) {
            node.insert("additionalProperties".to_string(), Value::Bool(allowed));
        }
    })
}

/// Strip the json-schema keys Gemini's schema dialect refuses, keeping everything else
pub fn clean_google_schema(schema: &Value) -> Value {
    transform_schema(schema, &|node| {
        node.shift_remove("additionalProperties");
        node.shift_remove("$schema");
    })
}

/// Convert tools to the OpenAI function tool specification (also used by Azure and Groq)
pub fn tools_to_openai_spec(tools: &[Tool], strict: bool) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            let mut function = json!({
                "name": tool.name,
                "description": tool.description,
            });
            if strict {
                function["strict"] = json!(true);
                function["parameters"] = with_additional_properties(&tool.input_schema, false);
            } else {
                function["parameters"] = tool.input_schema.clone();
            }
            json!({
                "type": "function",
                "function": function,
            })
        })
        .collect()
}

/// Convert the structured-output tool to an OpenAI `json_schema` response format
pub fn tool_to_openai_response_format(tool: &Tool) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": tool.name,
            "description": tool.description,
            "strict": true,
            "schema": with_additional_properties(&tool.input_schema, false),
        }
    })
}

/// Tool choice for OpenAI-style payloads, `auto` unless the caller chose
pub fn openai_tool_choice(tool_option: &ToolOption) -> Value {
    tool_option.choice.clone().unwrap_or_else(|| json!("auto"))
}

/// Map tool results to OpenAI `tool` role messages
pub fn tool_results_to_openai_spec(tool_results: &[ToolResult]) -> Vec<Value> {
    tool_results
        .iter()
        .map(|result| {
            json!({
                "role": "tool",
                "tool_call_id": result.id,
                "content": result.content,
            })
        })
        .collect()
}

/// Convert content units to OpenAI content parts. Images travel by url, never fetched.
/// Inline audio is only accepted when the vendor supports it.
pub fn contents_to_openai_spec(
    vendor: Vendor,
    contents: &[ContentUnit],
    accepts_audio: bool,
) -> AdapterResult<Vec<Value>> {
    contents
        .iter()
        .map(|content| match content {
            ContentUnit::Text(text) => Ok(json!({"type": "text", "text": text})),
            ContentUnit::Image(image) => Ok(json!({
                "type": "image_url",
                "image_url": {
                    "url": image.url,
                    "detail": image.detail.clone().unwrap_or_else(|| json!("auto")),
                }
            })),
            ContentUnit::Audio(audio) if accepts_audio => Ok(json!({
                "type": "input_audio",
                "input_audio": {
                    "data": audio.data,
                    "format": audio.format.clone().unwrap_or_else(|| json!("mp3")),
                }
            })),
            ContentUnit::Audio(_) => Err(AdapterError::UnsupportedContent {
                vendor,
                kind: content.kind(),
            }),
        })
        .collect()
}

/// Fail before any network call when the vendor cannot take inline audio input
pub fn reject_audio(vendor: Vendor, contents: &[ContentUnit]) -> AdapterResult<()> {
    match contents
        .iter()
        .find(|content| matches!(content, ContentUnit::Audio(_)))
    {
        Some(content) => Err(AdapterError::UnsupportedContent {
            vendor,
            kind: content.kind(),
        }),
        None => Ok(()),
    }
}

/// Normalize an OpenAI-style chat completion: text of the first choice, its tool calls
/// when the finish reason says so, and the assistant message to append to history.
pub fn openai_response_to_result(
    vendor: Vendor,
    response: &Value,
) -> AdapterResult<(Option<String>, Vec<ToolCall>, Option<Value>)> {
    let choice = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| AdapterError::malformed(vendor, "response has no choices"))?;
    let finish_reason = choice.get("finish_reason").and_then(Value::as_str);
    let message = choice.get("message").filter(|message| message.is_object());

    let Some(message) = message else {
        return Ok((None, Vec::new(), None));
    };

    let text = message
        .get("content")
        .and_then(Value::as_str)
        .map(String::from);

    let mut tools = Vec::new();
    if finish_reason == Some("tool_calls") {
        let tool_calls = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default();
            let name = tool_call["function"]["name"].as_str().unwrap_or_default();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();
            let arguments = parse_arguments(vendor, id, arguments)?;
            tools.push(ToolCall::new(id, name, arguments));
        }
    }

    Ok((text, tools, Some(message.clone())))
}

fn parse_arguments(vendor: Vendor, id: &str, arguments: &str) -> AdapterResult<Map<String, Value>> {
    if arguments.trim().is_empty() {
        return Ok(Map::new());
    }
    let parsed: Value = serde_json::from_str(arguments).map_err(|e| {
        AdapterError::malformed(
            vendor,
            format!("Could not interpret tool use parameters for id {}: {}", id, e),
        )
    })?;
    arguments_object(vendor, id, parsed)
}

/// Tool arguments must be a json object
pub fn arguments_object(vendor: Vendor, id: &str, arguments: Value) -> AdapterResult<Map<String, Value>> {
    match arguments {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(AdapterError::malformed(
            vendor,
            format!("tool arguments for id '{}' are not an object: {}", id, other),
        )),
    }
}

/// An image ready to be sent inline
#[derive(Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 encoded bytes
    pub data: String,
}

/// Fetch an image and base64 encode it. `data:` urls are decoded in place without a request.
pub async fn fetch_image(client: &Client, url: &str) -> AdapterResult<InlineImage> {
    if let Some(rest) = url.strip_prefix("data:") {
        return decode_data_url(url, rest);
    }

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| AdapterError::content_conversion(url, e))?;

    let mime_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_IMAGE_MIME_TYPE)
        .to_string();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AdapterError::content_conversion(url, e))?;

    Ok(InlineImage {
        mime_type,
        data: STANDARD.encode(&bytes),
    })
}

fn decode_data_url(url: &str, rest: &str) -> AdapterResult<InlineImage> {
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AdapterError::content_conversion(url, "data url has no payload"))?;

    let (mime_type, is_base64) = match header.strip_suffix(";base64") {
        Some(mime_type) => (mime_type, true),
        None => (header, false),
    };
    let mime_type = if mime_type.is_empty() {
        DEFAULT_IMAGE_MIME_TYPE
    } else {
        mime_type
    };

    let data = if is_base64 {
        // Re-encode to catch corrupt payloads before the vendor does
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| AdapterError::content_conversion(url, e))?;
        STANDARD.encode(bytes)
    } else {
        STANDARD.encode(payload.as_bytes())
    };

    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        data,
    })
}

/// Replace inline binary payloads in vendor-native history with the `OMITTED` marker.
/// Running it on already redacted history changes nothing.
pub fn redact_history(vendor: Vendor, messages: &[Value]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let mut message = message.clone();
            match vendor {
                Vendor::OpenAi | Vendor::AzureOpenAi | Vendor::Groq => {
                    for part in content_items(&mut message, "content") {
                        redact_openai_part(part);
                    }
                }
                Vendor::Anthropic => {
                    for block in content_items(&mut message, "content") {
                        if block["type"] == "image" && block["source"]["type"] == "base64" {
                            block["source"]["data"] = json!(OMITTED);
                        }
                    }
                }
                Vendor::Google => {
                    for part in content_items(&mut message, "parts") {
                        if part["inlineData"]["data"].is_string() {
                            part["inlineData"]["data"] = json!(OMITTED);
                        }
                    }
                }
            }
            message
        })
        .collect()
}

fn redact_openai_part(part: &mut Value) {
    let inline_audio = part["type"] == "input_audio" && part["input_audio"]["data"].is_string();
    let inline_image = part["type"] == "image_url"
        && part["image_url"]["url"]
            .as_str()
            .is_some_and(|url| url.starts_with("data:"));

    if inline_audio {
        part["input_audio"]["data"] = json!(OMITTED);
    } else if inline_image {
        part["image_url"]["url"] = json!(OMITTED);
    }
}

/// Swap redacted parts of carried history for a short text note so the history can be
/// sent again. The placeholder itself is not valid image or audio data.
pub fn replace_omitted_payloads(vendor: Vendor, messages: &[Value]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            let mut message = message.clone();
            match vendor {
                Vendor::OpenAi | Vendor::AzureOpenAi | Vendor::Groq => {
                    for part in content_items(&mut message, "content") {
                        let omitted = part["input_audio"]["data"] == OMITTED
                            || part["image_url"]["url"] == OMITTED;
                        if omitted {
                            *part = json!({"type": "text", "text": omitted_note(part)});
                        }
                    }
                }
                Vendor::Anthropic => {
                    for block in content_items(&mut message, "content") {
                        if block["type"] == "image" && block["source"]["data"] == OMITTED {
                            *block = json!({"type": "text", "text": "(image omitted)"});
                        }
                    }
                }
                Vendor::Google => {
                    for part in content_items(&mut message, "parts") {
                        if part["inlineData"]["data"] == OMITTED {
                            *part = json!({"text": "(image omitted)"});
                        }
                    }
                }
            }
            message
        })
        .collect()
}

fn omitted_note(part: &Value) -> &'static str {
    if part["type"] == "input_audio" {
        "(audio omitted)"
    } else {
        "(image omitted)"
    }
}

fn content_items<'a>(message: &'a mut Value, key: &str) -> impl Iterator<Item = &'a mut Value> {
    message
        .get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flat_map(|items| items.iter_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "get_weather",
                        "arguments": "{\"location\": \"Tokyo\", \"unit\": \"celsius\"}"
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    }"#;

    fn nested_schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "location": {"type": "string"},
                "$schema": {"type": "string", "description": "a property named like a keyword"},
                "filters": {
                    "type": "object",
                    "additionalProperties": true,
                    "properties": {
                        "tags": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {"name": {"type": "string"}}
                            }
                        }
                    }
                },
                "window": {
                    "anyOf": [
                        {"type": "object", "properties": {"days": {"type": "integer"}}},
                        {"type": "null"}
                    ]
                }
            },
            "required": ["location"]
        })
    }

    /// Collect every object-typed node reachable through schema keywords
    fn object_nodes(schema: &Value, out: &mut Vec<Value>) {
        let Some(node) = schema.as_object() else {
            return;
        };
        if is_object_schema(node) {
            out.push(schema.clone());
        }
        for (key, child) in node {
            if SCHEMA_MAPS.contains(&key.as_str()) {
                if let Some(named) = child.as_object() {
                    named.values().for_each(|sub| object_nodes(sub, out));
                }
            } else if SCHEMA_LISTS.contains(&key.as_str()) {
                match child {
                    Value::Array(list) => list.iter().for_each(|sub| object_nodes(sub, out)),
                    other => object_nodes(other, out),
                }
            }
        }
    }

    fn has_schema_key(schema: &Value, banned: &str) -> bool {
        let Some(node) = schema.as_object() else {
            return false;
        };
        node.contains_key(banned)
            || node.iter().any(|(key, child)| {
                if SCHEMA_MAPS.contains(&key.as_str()) {
                    child
                        .as_object()
                        .is_some_and(|named| named.values().any(|sub| has_schema_key(sub, banned)))
                } else if SCHEMA_LISTS.contains(&key.as_str()) {
                    match child {
                        Value::Array(list) => list.iter().any(|sub| has_schema_key(sub, banned)),
                        other => has_schema_key(other, banned),
                    }
                } else {
                    false
                }
            })
    }

    #[test]
    fn test_strict_schema_marks_every_object_node() {
        let strict = with_additional_properties(&nested_schema(), false);

        let mut nodes = Vec::new();
        object_nodes(&strict, &mut nodes);
        assert_eq!(nodes.len(), 4);
        for node in nodes {
            assert_eq!(node["additionalProperties"], json!(false), "{}", node);
        }
        // Non-object nodes stay untouched
        assert!(strict["properties"]["location"].get("additionalProperties").is_none());
        assert!(strict["properties"]["filters"]["properties"]["tags"]
            .get("additionalProperties")
            .is_none());
    }

    #[test]
    fn test_strict_schema_does_not_alias_input() {
        let original = nested_schema();
        let _ = with_additional_properties(&original, false);
        assert_eq!(original, nested_schema());
        assert!(original.get("additionalProperties").is_none());
    }

    #[test]
    fn test_strict_schema_preserves_property_order() {
        let strict = with_additional_properties(&nested_schema(), false);
        let keys: Vec<&String> = strict["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["location", "$schema", "filters", "window"]);
    }

    #[test]
    fn test_strict_schema_tolerates_missing_properties_and_items() {
        let schema = json!({"type": "object"});
        assert_eq!(
            with_additional_properties(&schema, false),
            json!({"type": "object", "additionalProperties": false})
        );
        let schema = json!({"type": "array"});
        assert_eq!(with_additional_properties(&schema, false), schema);
    }

    #[test]
    fn test_clean_google_schema_removes_banned_keys_only() {
        let cleaned = clean_google_schema(&nested_schema());

        assert!(!has_schema_key(&cleaned, "additionalProperties"));
        assert!(!has_schema_key(&cleaned, "$schema"));
        // A property that happens to be named `$schema` is data, not a keyword
        assert_eq!(
            cleaned["properties"]["$schema"],
            json!({"type": "string", "description": "a property named like a keyword"})
        );
        assert_eq!(cleaned["required"], json!(["location"]));
        assert_eq!(
            cleaned["properties"]["filters"]["properties"]["tags"]["items"],
            json!({"type": "object", "properties": {"name": {"type": "string"}}})
        );
    }

    #[test]
    fn test_clean_google_schema_is_identity_on_clean_input() {
        let schema = json!({
            "type": "object",
            "properties": {"location": {"type": "string", "enum": ["Tokyo", "Osaka"]}},
            "required": ["location"]
        });
        assert_eq!(clean_google_schema(&schema), schema);
    }

    #[test]
    fn test_tools_to_openai_spec() {
        let tool = Tool::new("get_weather", "Weather", nested_schema());

        let spec = tools_to_openai_spec(&[tool.clone()], false);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "get_weather");
        assert!(spec[0]["function"].get("strict").is_none());
        assert_eq!(spec[0]["function"]["parameters"], nested_schema());

        let spec = tools_to_openai_spec(&[tool], true);
        assert_eq!(spec[0]["function"]["strict"], json!(true));
        assert_eq!(
            spec[0]["function"]["parameters"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn test_tool_to_openai_response_format() {
        let tool = Tool::new("answer", "Structured answer", nested_schema());
        let format = tool_to_openai_response_format(&tool);
        assert_eq!(format["type"], "json_schema");
        assert_eq!(format["json_schema"]["name"], "answer");
        assert_eq!(format["json_schema"]["strict"], json!(true));
        assert_eq!(
            format["json_schema"]["schema"]["additionalProperties"],
            json!(false)
        );
    }

    #[test]
    fn test_contents_to_openai_spec() -> AdapterResult<()> {
        let contents = vec![
            ContentUnit::text("What is this?"),
            ContentUnit::image("https://example.com/cat.png"),
            ContentUnit::audio("UklGRg=="),
        ];
        let parts = contents_to_openai_spec(Vendor::OpenAi, &contents, true)?;
        assert_eq!(parts[0], json!({"type": "text", "text": "What is this?"}));
        assert_eq!(parts[1]["image_url"]["url"], "https://example.com/cat.png");
        assert_eq!(parts[1]["image_url"]["detail"], "auto");
        assert_eq!(parts[2]["input_audio"]["format"], "mp3");

        let err = contents_to_openai_spec(Vendor::Groq, &contents, false).unwrap_err();
        assert!(matches!(
            err,
            AdapterError::UnsupportedContent {
                vendor: Vendor::Groq,
                kind: "audio"
            }
        ));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_result_tool_calls() -> AdapterResult<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        let (text, tools, message) = openai_response_to_result(Vendor::OpenAi, &response)?;

        assert_eq!(text, None);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].id, "call_1");
        assert_eq!(tools[0].name, "get_weather");
        assert_eq!(tools[0].arguments["location"], "Tokyo");
        assert_eq!(message.unwrap()["role"], "assistant");
        Ok(())
    }

    #[test]
    fn test_openai_response_tool_calls_gated_by_finish_reason() -> AdapterResult<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        response["choices"][0]["finish_reason"] = json!("stop");
        response["choices"][0]["message"]["content"] = json!("{\"location\": \"Tokyo\"}");

        let (text, tools, _) = openai_response_to_result(Vendor::OpenAi, &response)?;
        assert!(tools.is_empty());
        assert_eq!(text.as_deref(), Some("{\"location\": \"Tokyo\"}"));
        Ok(())
    }

    #[test]
    fn test_openai_response_bad_arguments() {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE).unwrap();
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        match openai_response_to_result(Vendor::Groq, &response) {
            Err(AdapterError::MalformedResponse { vendor, reason }) => {
                assert_eq!(vendor, Vendor::Groq);
                assert!(reason.starts_with("Could not interpret tool use parameters"));
            }
            other => panic!("Expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_openai_response_without_choices() {
        let result = openai_response_to_result(Vendor::OpenAi, &json!({"choices": []}));
        assert!(matches!(result, Err(AdapterError::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn test_fetch_image_uses_content_type() -> AdapterResult<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0x89, b'P', b'N', b'G']),
            )
            .mount(&mock_server)
            .await;

        let image = fetch_image(&Client::new(), &format!("{}/cat.png", mock_server.uri())).await?;
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, STANDARD.encode([0x89, b'P', b'N', b'G']));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_image_defaults_to_jpeg() -> AdapterResult<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photo"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
            .mount(&mock_server)
            .await;

        let image = fetch_image(&Client::new(), &format!("{}/photo", mock_server.uri())).await?;
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME_TYPE);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_image_failure_is_content_conversion() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing.png", mock_server.uri());
        match fetch_image(&Client::new(), &url).await {
            Err(AdapterError::ContentConversion { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("Expected ContentConversion, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_image_decodes_data_url() -> AdapterResult<()> {
        let image = fetch_image(&Client::new(), "data:image/gif;base64,R0lGODlh").await?;
        assert_eq!(image.mime_type, "image/gif");
        assert_eq!(image.data, "R0lGODlh");

        let result = fetch_image(&Client::new(), "data:image/gif;base64,@@@").await;
        assert!(matches!(result, Err(AdapterError::ContentConversion { .. })));
        Ok(())
    }

    #[test]
    fn test_redact_history_per_vendor() {
        let anthropic = vec![json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "What is this?"},
                {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo="}}
            ]
        })];
        let redacted = redact_history(Vendor::Anthropic, &anthropic);
        assert_eq!(redacted[0]["content"][1]["source"]["data"], OMITTED);
        assert_eq!(redacted[0]["content"][1]["source"]["media_type"], "image/png");
        assert_eq!(redacted[0]["content"][0], anthropic[0]["content"][0]);
        // the input is left as it was
        assert_eq!(anthropic[0]["content"][1]["source"]["data"], "iVBORw0KGgo=");

        let google = vec![json!({
            "role": "user",
            "parts": [{"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}, {"text": "hi"}]
        })];
        let redacted = redact_history(Vendor::Google, &google);
        assert_eq!(redacted[0]["parts"][0]["inlineData"]["data"], OMITTED);
        assert_eq!(redacted[0]["parts"][1]["text"], "hi");

        let openai = vec![json!({
            "role": "user",
            "content": [
                {"type": "input_audio", "input_audio": {"data": "UklGRg==", "format": "wav"}},
                {"type": "image_url", "image_url": {"url": "data:image/png;base64,iVBO", "detail": "auto"}},
                {"type": "image_url", "image_url": {"url": "https://example.com/cat.png", "detail": "auto"}}
            ]
        })];
        let redacted = redact_history(Vendor::OpenAi, &openai);
        assert_eq!(redacted[0]["content"][0]["input_audio"]["data"], OMITTED);
        assert_eq!(redacted[0]["content"][1]["image_url"]["url"], OMITTED);
        assert_eq!(
            redacted[0]["content"][2]["image_url"]["url"],
            "https://example.com/cat.png"
        );
    }

    #[test]
    fn test_redact_history_is_idempotent() {
        let histories = vec![
            (
                Vendor::Anthropic,
                vec![
                    json!({"role": "user", "content": "plain string content"}),
                    json!({"role": "user", "content": [
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}}
                    ]}),
                ],
            ),
            (
                Vendor::Google,
                vec![json!({"role": "user", "parts": [{"inlineData": {"mimeType": "image/png", "data": "AAAA"}}]})],
            ),
            (
                Vendor::Groq,
                vec![
                    json!({"role": "system", "content": "be brief"}),
                    json!({"role": "user", "content": [
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,AAAA"}}
                    ]}),
                ],
            ),
        ];

        for (vendor, history) in histories {
            let once = redact_history(vendor, &history);
            let twice = redact_history(vendor, &once);
            assert_eq!(once, twice, "{} redaction is not stable", vendor);
        }
    }

    #[test]
    fn test_replace_omitted_payloads() {
        let anthropic = redact_history(
            Vendor::Anthropic,
            &[json!({"role": "user", "content": [
                {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "AAAA"}}
            ]})],
        );
        let outbound = replace_omitted_payloads(Vendor::Anthropic, &anthropic);
        assert_eq!(
            outbound[0]["content"][0],
            json!({"type": "text", "text": "(image omitted)"})
        );

        let openai = redact_history(
            Vendor::OpenAi,
            &[json!({"role": "user", "content": [
                {"type": "input_audio", "input_audio": {"data": "AAAA", "format": "wav"}},
                {"type": "text", "text": "transcribe"}
            ]})],
        );
        let outbound = replace_omitted_payloads(Vendor::OpenAi, &openai);
        assert_eq!(outbound[0]["content"][0]["text"], "(audio omitted)");
        assert_eq!(outbound[0]["content"][1]["text"], "transcribe");

        let google = vec![json!({"role": "user", "parts": [{"inlineData": {"mimeType": "image/png", "data": "AAAA"}}]})];
        assert_eq!(replace_omitted_payloads(Vendor::Google, &google), google);
    }
}
