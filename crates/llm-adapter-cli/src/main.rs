mod configuration;
mod error;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use llm_adapter::{
    get_adapter, Adapter, ChatRequest, ContentUnit, LlmAdapter, SpeechToTextRequest,
    TextToSpeechRequest, Vendor,
};
use std::path::PathBuf;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use crate::configuration::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one chat turn and print the result as json
    Chat {
        /// Vendor name (OpenAI, AzureOpenAI, Anthropic, Google or Groq)
        #[arg(short, long)]
        vendor: Vendor,

        /// Json file holding a full chat request; overrides the other flags
        #[arg(short, long)]
        request: Option<PathBuf>,

        /// System prompt, may be repeated
        #[arg(short, long)]
        system: Vec<String>,

        /// User message text
        #[arg(short, long)]
        message: Option<String>,

        /// Image url or data url, may be repeated
        #[arg(short, long)]
        image: Vec<String>,
    },

    /// Transcribe an audio file
    Stt {
        #[arg(short, long)]
        vendor: Vendor,

        /// Audio file to upload
        #[arg(short, long)]
        file: PathBuf,

        /// Transcription language, defaults to ja
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Synthesize speech into an audio file
    Tts {
        #[arg(short, long)]
        vendor: Vendor,

        #[arg(short, long)]
        message: String,

        #[arg(long)]
        voice: Option<String>,

        /// Audio format such as mp3, wav or aac
        #[arg(short, long)]
        format: Option<String>,

        #[arg(short, long, default_value = "speech.out")]
        output: PathBuf,
    },

    /// List the supported vendors
    Vendors,
}

fn adapter_for(vendor: Vendor) -> Result<LlmAdapter> {
    let settings = Settings::new()?;
    let config = settings.provider_config(vendor)?;
    Ok(get_adapter(config)?)
}

async fn load_request(
    request: Option<PathBuf>,
    system: Vec<String>,
    message: Option<String>,
    image: Vec<String>,
) -> Result<ChatRequest> {
    if let Some(path) = request {
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        let value = serde_json::from_str(&raw).context("Request file is not valid json")?;
        return Ok(ChatRequest::from_value(value)?);
    }

    let mut contents: Vec<ContentUnit> = message.into_iter().map(ContentUnit::text).collect();
    contents.extend(image.into_iter().map(ContentUnit::image));
    Ok(ChatRequest::new(system, contents))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Chat {
            vendor,
            request,
            system,
            message,
            image,
        } => {
            let adapter = adapter_for(vendor)?;
            let request = load_request(request, system, message, image).await?;
            let result = adapter.chat_completions(request).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Stt {
            vendor,
            file,
            language,
        } => {
            let adapter = adapter_for(vendor)?;
            let mut request = SpeechToTextRequest::new(file);
            request.options.language = language;
            println!("{}", adapter.speech_to_text(request).await?);
        }
        Command::Tts {
            vendor,
            message,
            voice,
            format,
            output,
        } => {
            let adapter = adapter_for(vendor)?;
            let mut request = TextToSpeechRequest::new(message);
            request.options.voice = voice;
            request.options.response_format = format;

            let audio = adapter.text_to_speech(request).await?;
            tokio::fs::write(&output, &audio.content)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{} {} ({}, {} bytes)",
                style("wrote").green().bold(),
                output.display(),
                audio.content_type,
                audio.content.len()
            );
        }
        Command::Vendors => {
            for vendor in Vendor::iter() {
                println!("{}", style(vendor).cyan());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_command() {
        let cli = Cli::try_parse_from([
            "llm-adapter",
            "chat",
            "--vendor",
            "anthropic",
            "--system",
            "Reply briefly.",
            "--message",
            "Hi",
            "--image",
            "https://example.com/cat.png",
        ])
        .unwrap();

        match cli.command {
            Command::Chat {
                vendor,
                system,
                message,
                image,
                request,
            } => {
                assert_eq!(vendor, Vendor::Anthropic);
                assert_eq!(system, vec!["Reply briefly."]);
                assert_eq!(message.as_deref(), Some("Hi"));
                assert_eq!(image.len(), 1);
                assert!(request.is_none());
            }
            _ => panic!("Expected chat command"),
        }
    }

    #[test]
    fn test_unknown_vendor_is_rejected() {
        assert!(Cli::try_parse_from(["llm-adapter", "chat", "-v", "mistral"]).is_err());
    }

    #[tokio::test]
    async fn test_load_request_from_flags() {
        let request = load_request(
            None,
            vec!["Be nice.".to_string()],
            Some("Hello".to_string()),
            vec!["https://example.com/cat.png".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(request.system_prompt, vec!["Be nice."]);
        assert_eq!(request.new_message_contents.len(), 2);
        assert!(request.has_image());
    }

    #[tokio::test]
    async fn test_load_request_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("request.json");
        std::fs::write(
            &path,
            r#"{"systemPrompt": ["Reply briefly."], "newMessageContents": [{"text": "Hi"}]}"#,
        )
        .unwrap();

        let request = load_request(Some(path), vec![], None, vec![]).await.unwrap();
        assert_eq!(request.system_prompt, vec!["Reply briefly."]);
        assert_eq!(request.new_message_contents, vec![ContentUnit::text("Hi")]);
    }
}
