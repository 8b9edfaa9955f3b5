use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::session::Buffer;

#[derive(Parser)]
#[command(
    name = "refinery",
    about = "Transcript Refinery - turn lecture audio into a polished transcript using Whisper and Gemini",
    version,
    long_about = "A CLI tool for producing styled lecture transcripts. Audio is acquired from a video URL (via yt-dlp) or an uploaded file, transcribed in windows by a Whisper endpoint, then edited and reconciled by Gemini models following a fixed transliteration style guide. Work happens in a session directory whose transcript files can be edited by hand between steps."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Session directory (defaults to the configured session_dir)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub session: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the audio track of a video URL into the session
    Download {
        /// Video URL (anything yt-dlp supports)
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Store an audio file (mp3, wav, m4a) in the session
    Upload {
        /// Audio file to copy into the session
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Transcribe the session audio into the original transcript
    Transcribe {
        /// Transcribe this caller-owned file instead of the session audio
        #[arg(long, value_name = "FILE")]
        audio: Option<PathBuf>,

        /// Send every audio window instead of only the final two
        #[arg(long)]
        full: bool,
    },

    /// Set the original transcript from a file ("-" reads stdin)
    SetOriginal {
        /// Text file to read, or "-" for stdin
        #[arg(value_name = "FILE")]
        file: String,
    },

    /// Apply the style guide to the original transcript
    Improve,

    /// Reconcile the improved transcript against the original
    Finalize,

    /// Print a transcript buffer
    Show {
        /// Which buffer to print
        #[arg(value_enum, value_name = "BUFFER")]
        buffer: BufferArg,

        /// Write the buffer to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the session stage, audio reference, and buffer sizes
    Status,

    /// Configuration management
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum BufferArg {
    Original,
    Improved,
    Final,
}

impl From<BufferArg> for Buffer {
    fn from(arg: BufferArg) -> Self {
        match arg {
            BufferArg::Original => Buffer::Original,
            BufferArg::Improved => Buffer::Improved,
            BufferArg::Final => Buffer::Final,
        }
    }
}
