use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::SpeechToText;
use crate::config::SpeechConfig;
use crate::RefineryError;

/// Client for an OpenAI-compatible `audio/transcriptions` endpoint.
///
/// Each chunk is posted as a multipart form with the model id, a fixed language
/// hint, and temperature 0.0 for deterministic decoding. `response_format` is
/// `text`, so the body of a successful response is the transcript itself.
pub struct WhisperClient {
    http: reqwest::Client,
    config: SpeechConfig,
    api_key: String,
}

impl WhisperClient {
    pub fn new(config: SpeechConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("speech-to-text API key is empty");
        }
        if config.model.trim().is_empty() {
            anyhow::bail!("speech-to-text model is not configured");
        }

        Ok(Self {
            http: reqwest::Client::new(),
            config,
            api_key,
        })
    }
}

#[async_trait]
impl SpeechToText for WhisperClient {
    async fn transcribe_chunk(&self, file_name: &str, audio: Vec<u8>) -> Result<String> {
        let url = format!(
            "{}/audio/transcriptions",
            self.config.api_base.trim_end_matches('/')
        );

        let file_part = Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("audio/mpeg")
            .context("Failed to build multipart audio part")?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone())
            .text("response_format", "text".to_string())
            .text("language", self.config.language.clone())
            .text("temperature", self.config.temperature.to_string());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Transcription request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RefineryError::TranscriptionFailed(format!(
                "HTTP {}: {}", status, error_text
            ))
            .into());
        }

        let text = response
            .text()
            .await
            .context("Failed to read transcription response")?;

        Ok(text.trim().to_string())
    }
}
