use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

use crate::chunk::TimeWindow;

/// Probes and cuts audio files so the transcription stage can work in windows.
///
/// The transcription service takes mp3 chunks, so `cut` always transcodes the
/// window to mp3 regardless of the source container.
#[async_trait]
pub trait AudioSlicer: Send + Sync {
    /// Total duration of the audio file in milliseconds
    async fn duration_ms(&self, path: &Path) -> Result<u64>;

    /// Extract one window of the source file into `target` as mp3
    async fn cut(&self, path: &Path, window: TimeWindow, target: &Path) -> Result<()>;
}

/// Audio slicer backed by the ffmpeg/ffprobe command line tools
pub struct FfmpegSlicer {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl FfmpegSlicer {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

impl Default for FfmpegSlicer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSlicer for FfmpegSlicer {
    async fn duration_ms(&self, path: &Path) -> Result<u64> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v", "quiet",
                "-print_format", "json",
                "-show_format",
                "-show_streams",
                &path.to_string_lossy(),
            ])
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to analyze file with ffprobe: {}", error);
        }

        let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;

        // Check if file has audio streams
        let empty_vec = vec![];
        let streams = info["streams"].as_array().unwrap_or(&empty_vec);
        let has_audio = streams.iter().any(|stream| {
            stream["codec_type"].as_str() == Some("audio")
        });

        if !has_audio {
            anyhow::bail!("File does not contain any audio streams: {}", path.display());
        }

        let duration_seconds = info["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .ok_or_else(|| anyhow::anyhow!("ffprobe reported no duration for {}", path.display()))?;

        Ok((duration_seconds * 1000.0).round() as u64)
    }

    async fn cut(&self, path: &Path, window: TimeWindow, target: &Path) -> Result<()> {
        tracing::debug!(
            "Cutting window {} ({}ms..{}ms) from {}",
            window.index,
            window.start_ms,
            window.end_ms,
            path.display()
        );

        let start = format!("{:.3}", window.start_ms as f64 / 1000.0);
        let duration = format!("{:.3}", window.duration_ms() as f64 / 1000.0);

        let output = Command::new(&self.ffmpeg_path)
            .args([
                "-v", "error",
                "-ss", &start,
                "-t", &duration,
                "-i", &path.to_string_lossy(),
                "-vn", // No video
                "-acodec", "libmp3lame",
                "-b:a", "192k",
                "-y", // Overwrite output file
                &target.to_string_lossy(),
            ])
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to cut audio window with ffmpeg: {}", error);
        }

        Ok(())
    }
}
