//! Chunked transcription: cut audio into fixed-duration windows and send each
//! to the speech-to-text service, concatenating the results in window order.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

use crate::audio::AudioSlicer;
use crate::chunk::{self, TimeWindow};
use crate::utils::format_duration;

pub mod client;

pub use client::WhisperClient;

/// Separator between per-window transcripts in the assembled text
pub const WINDOW_SEPARATOR: &str = "\n\n";

/// Speech-to-text service: one audio chunk in, plain text out
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe_chunk(&self, file_name: &str, audio: Vec<u8>) -> Result<String>;
}

/// Settings for one chunked transcription run
#[derive(Debug, Clone)]
pub struct TranscribeOptions {
    /// Window length in milliseconds
    pub window_ms: u64,

    /// Send only the last N windows of the audio; None sends all of them
    pub tail_windows: Option<usize>,
}

/// Runs the chunked transcription of a single audio file.
///
/// Windows are transcribed sequentially in order. A failure on any window
/// aborts the whole run: no partial transcript is returned, and every
/// per-window temp file is removed before this returns.
pub struct Transcriber<'a> {
    stt: &'a dyn SpeechToText,
    slicer: &'a dyn AudioSlicer,
    options: TranscribeOptions,
}

impl<'a> Transcriber<'a> {
    pub fn new(stt: &'a dyn SpeechToText, slicer: &'a dyn AudioSlicer, options: TranscribeOptions) -> Self {
        Self { stt, slicer, options }
    }

    /// Transcribe `audio_path`, using `scratch_dir` for per-window chunk files
    pub async fn transcribe_file(&self, audio_path: &Path, scratch_dir: &Path) -> Result<String> {
        let total_ms = self
            .slicer
            .duration_ms(audio_path)
            .await
            .with_context(|| format!("failed to probe {}", audio_path.display()))?;

        let windows = chunk::plan_windows(total_ms, self.options.window_ms);
        if windows.is_empty() {
            anyhow::bail!("audio file has no duration: {}", audio_path.display());
        }

        let selected: &[TimeWindow] = match self.options.tail_windows {
            Some(n) if n > 0 && n < windows.len() => &windows[windows.len() - n..],
            _ => &windows[..],
        };

        tracing::info!(
            "Audio is {} long, {} window(s) planned, sending {}",
            format_duration(total_ms as f64 / 1000.0),
            windows.len(),
            selected.len()
        );

        let mut parts = Vec::with_capacity(selected.len());
        for window in selected {
            tracing::info!("Transcribing window {}/{}", window.index + 1, windows.len());

            let chunk_path = scratch_dir.join(format!("chunk_{}.mp3", window.index));
            let text = self
                .transcribe_window(audio_path, *window, &chunk_path)
                .await
                .with_context(|| format!("window {} of {}", window.index + 1, windows.len()))?;
            parts.push(text);
        }

        Ok(parts.join(WINDOW_SEPARATOR))
    }

    async fn transcribe_window(
        &self,
        audio_path: &Path,
        window: TimeWindow,
        chunk_path: &Path,
    ) -> Result<String> {
        let outcome = self.cut_and_send(audio_path, window, chunk_path).await;

        // the per-window file is removed whether the call succeeded or not
        if chunk_path.exists() {
            let _ = fs_err::remove_file(chunk_path);
        }

        outcome
    }

    async fn cut_and_send(
        &self,
        audio_path: &Path,
        window: TimeWindow,
        chunk_path: &Path,
    ) -> Result<String> {
        self.slicer.cut(audio_path, window, chunk_path).await?;

        let audio = fs_err::read(chunk_path)?;
        let file_name = chunk_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("chunk_{}.mp3", window.index));

        self.stt.transcribe_chunk(&file_name, audio).await
    }
}
