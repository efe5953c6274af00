use async_trait::async_trait;

use super::factory::Vendor;
use super::unsupported::{sorry_audio, SorryAudioFormat, UNSUPPORTED_TRANSCRIPTION};
use crate::errors::AdapterResult;
use crate::models::chat::{ChatRequest, ChatResult};
use crate::models::speech::{SpeechAudio, SpeechToTextRequest, TextToSpeechRequest};

/// Base trait for vendor adapters (OpenAI, Anthropic, etc)
///
/// Every call is one request/response round trip. Adapters hold no conversation state:
/// the history comes in through `ChatRequest::in_progress` and goes back out in
/// `ChatResult::messages`. Errors are returned unchanged, nothing is retried.
#[async_trait]
pub trait Adapter: Send + Sync {
    fn vendor(&self) -> Vendor;

    /// Run one chat turn and normalize the vendor's answer
    async fn chat_completions(&self, request: ChatRequest) -> AdapterResult<ChatResult>;

    /// Transcribe an audio file. Vendors without speech support answer `"unsupported"`.
    async fn speech_to_text(&self, _request: SpeechToTextRequest) -> AdapterResult<String> {
        Ok(UNSUPPORTED_TRANSCRIPTION.to_string())
    }

    /// Synthesize speech. Vendors without speech support answer with a fixed apology clip.
    async fn text_to_speech(&self, request: TextToSpeechRequest) -> AdapterResult<SpeechAudio> {
        let format = SorryAudioFormat::from_requested(request.options.response_format.as_deref());
        Ok(sorry_audio(format))
    }
}
