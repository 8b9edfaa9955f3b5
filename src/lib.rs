//! Transcript Refinery - A Rust CLI tool for producing polished lecture transcripts
//!
//! This library turns spoken audio from a video URL or an uploaded file into a
//! styled written transcript. Audio is transcribed in fixed-duration windows by a
//! Whisper speech-to-text endpoint, then edited in fixed-size text windows by
//! Gemini models following a transliteration style guide.

pub mod acquire;
pub mod audio;
pub mod chunk;
pub mod cli;
pub mod config;
pub mod improve;
pub mod output;
pub mod session;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use session::{Buffer, Session, Stage};
pub use transcribe::Transcriber;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the refinery
#[derive(thiserror::Error, Debug)]
pub enum RefineryError {
    #[error("Unsupported URL format: {0}")]
    UnsupportedUrl(String),

    #[error("Unsupported audio format: {0} (expected mp3, wav, or m4a)")]
    UnsupportedFormat(String),

    #[error("Audio acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Text generation failed: {0}")]
    GenerationFailed(String),

    #[error("Text generation returned no usable output for {0}")]
    EmptyGeneration(String),

    #[error("precondition not met: {0}")]
    PreconditionFailed(String),
}
