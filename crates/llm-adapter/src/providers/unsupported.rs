use include_dir::{include_dir, Dir};

use crate::models::speech::SpeechAudio;

/// Transcription answer of vendors that have no speech-to-text
pub const UNSUPPORTED_TRANSCRIPTION: &str = "unsupported";

static SORRY_AUDIO: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/sorry");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SorryAudioFormat {
    Mp3,
    Wav,
    Aac,
}

impl SorryAudioFormat {
    /// Anything other than `wav` or `aac` falls back to mp3
    pub fn from_requested(format: Option<&str>) -> Self {
        match format {
            Some("wav") => SorryAudioFormat::Wav,
            Some("aac") => SorryAudioFormat::Aac,
            _ => SorryAudioFormat::Mp3,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            SorryAudioFormat::Mp3 => "audio/mpeg",
            SorryAudioFormat::Wav => "audio/wav",
            SorryAudioFormat::Aac => "audio/aac",
        }
    }

    fn file_name(&self) -> &'static str {
        match self {
            SorryAudioFormat::Mp3 => "sorry.ja.mp3",
            SorryAudioFormat::Wav => "sorry.ja.wav",
            SorryAudioFormat::Aac => "sorry.ja.aac",
        }
    }
}

/// The embedded "sorry, unsupported" clip in the requested format
pub fn sorry_audio(format: SorryAudioFormat) -> SpeechAudio {
    let content = SORRY_AUDIO
        .get_file(format.file_name())
        .map(|file| file.contents())
        .unwrap_or_default();

    SpeechAudio {
        content_type: format.content_type().to_string(),
        content: content.to_vec(),
    }
}
