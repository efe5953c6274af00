use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TRANSCRIPTION_LANGUAGE: &str = "ja";
pub const DEFAULT_VOICE: &str = "alloy";
pub const DEFAULT_SPEECH_FORMAT: &str = "mp3";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechToTextOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechToTextRequest {
    pub audio_file_path: PathBuf,
    #[serde(default)]
    pub options: SpeechToTextOptions,
}

impl SpeechToTextRequest {
    pub fn new(audio_file_path: impl Into<PathBuf>) -> Self {
        Self {
            audio_file_path: audio_file_path.into(),
            options: SpeechToTextOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextToSpeechOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToSpeechRequest {
    pub message: String,
    #[serde(default)]
    pub options: TextToSpeechOptions,
}

impl TextToSpeechRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            options: TextToSpeechOptions::default(),
        }
    }

    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.options.response_format = Some(format.into());
        self
    }
}

/// Synthesized audio and its mime type
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechAudio {
    pub content_type: String,
    pub content: Vec<u8>,
}
