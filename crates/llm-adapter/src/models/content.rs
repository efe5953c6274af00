use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioData {
    /// Base64 encoded audio bytes
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
}

/// One unit of new user content. Serialized as `{"text": ..}`, `{"image": {..}}` or
/// `{"audio": {..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentUnit {
    Text(String),
    Image(ImageRef),
    Audio(AudioData),
}

impl ContentUnit {
    pub fn text<S: Into<String>>(text: S) -> Self {
        ContentUnit::Text(text.into())
    }

    pub fn image<S: Into<String>>(url: S) -> Self {
        ContentUnit::Image(ImageRef {
            url: url.into(),
            detail: None,
        })
    }

    pub fn audio<S: Into<String>>(data: S) -> Self {
        ContentUnit::Audio(AudioData {
            data: data.into(),
            format: None,
        })
    }

    /// Get the text if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentUnit::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ContentUnit::Image(_))
    }

    /// Name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ContentUnit::Text(_) => "text",
            ContentUnit::Image(_) => "image",
            ContentUnit::Audio(_) => "audio",
        }
    }
}
