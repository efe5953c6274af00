use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{AdapterError, AdapterResult};

lazy_static! {
    static ref FUNCTION_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// A tool the model may call, or the schema of a structured output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A json-schema object describing the arguments
    pub input_schema: Value,
}

impl Tool {
    /// Create a new tool with the given name and description
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Check the tool against the shape every vendor accepts: a valid function name and an
    /// object schema whose `required` entries all name declared properties.
    pub fn validate(&self) -> AdapterResult<()> {
        if !is_valid_function_name(&self.name) {
            return Err(AdapterError::InvalidRequest(format!(
                "The provided tool name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                self.name
            )));
        }

        let schema = self.input_schema.as_object().ok_or_else(|| {
            AdapterError::InvalidRequest(format!("inputSchema of tool '{}' must be an object", self.name))
        })?;

        if !schema.get("type").is_some_and(Value::is_string) {
            return Err(AdapterError::InvalidRequest(format!(
                "inputSchema.type of tool '{}' must be a string",
                self.name
            )));
        }

        let properties = schema
            .get("properties")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                AdapterError::InvalidRequest(format!(
                    "inputSchema.properties of tool '{}' must be an object",
                    self.name
                ))
            })?;

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                AdapterError::InvalidRequest(format!(
                    "inputSchema.required of tool '{}' must be an array",
                    self.name
                ))
            })?;

        for key in required {
            let key = key.as_str().ok_or_else(|| {
                AdapterError::InvalidRequest(format!(
                    "inputSchema.required of tool '{}' must only contain strings",
                    self.name
                ))
            })?;
            if !properties.contains_key(key) {
                return Err(AdapterError::InvalidRequest(format!(
                    "inputSchema.required of tool '{}' names '{}' which is not a declared property",
                    self.name, key
                )));
            }
        }

        Ok(())
    }
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Vendor call id, always empty for Gemini which has no call ids
    pub id: String,
    /// The name of the tool to execute
    pub name: String,
    /// The arguments for the execution
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new<I: Into<String>, S: Into<String>>(id: I, name: S, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

pub fn is_valid_function_name(name: &str) -> bool {
    FUNCTION_NAME.is_match(name)
}
