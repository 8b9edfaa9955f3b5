//! Chunked text editing: apply the style guide to the transcript, then
//! reconcile the edited text against the original with a stronger model.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::chunk;
use crate::RefineryError;

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

/// Text-generation service: one prompt in, generated text out
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Apply the style guide to the full transcript, one window at a time.
///
/// The transcript is cut into `window_chars`-character windows in original
/// order; each window is sent with the fixed style prompt and the responses are
/// appended in window order. An empty or failed response aborts the whole run,
/// so the caller never sees a partially edited transcript.
pub async fn improve_transcript(
    generator: &dyn TextGenerator,
    transcript: &str,
    window_chars: usize,
) -> Result<String> {
    let windows = chunk::split_chars(transcript, window_chars);
    let mut edited = String::new();

    for (i, window) in windows.iter().enumerate() {
        tracing::info!("Improving window {}/{}", i + 1, windows.len());

        let request = format!("{}\n\n{}", prompt::STYLE_GUIDE, window);
        let response = generator
            .generate(&request)
            .await
            .with_context(|| format!("window {} of {}", i + 1, windows.len()))?;

        if response.trim().is_empty() {
            return Err(RefineryError::EmptyGeneration(format!(
                "window {} of {}", i + 1, windows.len()
            ))
            .into());
        }

        edited.push_str(&response);
    }

    Ok(edited)
}

/// Reconcile the edited transcript against the original, window pair by pair.
///
/// Both texts are windowed independently at `window_chars` characters and
/// paired positionally; pairing stops at the shorter text's window count.
/// Same all-or-nothing failure policy as [`improve_transcript`].
pub async fn correct_transcript(
    generator: &dyn TextGenerator,
    original: &str,
    edited: &str,
    window_chars: usize,
) -> Result<String> {
    let edited_windows = chunk::split_chars(edited, window_chars);
    let original_windows = chunk::split_chars(original, window_chars);

    let total = edited_windows.len().min(original_windows.len());
    if edited_windows.len() != original_windows.len() {
        tracing::warn!(
            "Transcripts split into {} and {} windows; pairing stops at {}",
            original_windows.len(),
            edited_windows.len(),
            total
        );
    }

    let mut corrected = String::new();
    for (i, (edited_window, original_window)) in
        edited_windows.iter().zip(original_windows.iter()).enumerate()
    {
        tracing::info!("Correcting window pair {}/{}", i + 1, total);

        let request = prompt::correction_prompt(original_window, edited_window);
        let response = generator
            .generate(&request)
            .await
            .with_context(|| format!("window pair {} of {}", i + 1, total))?;

        if response.trim().is_empty() {
            return Err(RefineryError::EmptyGeneration(format!(
                "window pair {} of {}", i + 1, total
            ))
            .into());
        }

        corrected.push_str(&response);
    }

    Ok(corrected)
}
