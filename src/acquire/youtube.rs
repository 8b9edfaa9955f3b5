use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::utils::validate_and_normalize_url;
use crate::RefineryError;

/// Video audio downloader using yt-dlp
///
/// yt-dlp resolves the best audio stream for a URL and transcodes it to mp3 at
/// 192 kbps. The output file is named after the source's unique video id, so
/// re-downloading the same video overwrites the same file.
pub struct YoutubeDownloader {
    yt_dlp_path: String,
}

impl YoutubeDownloader {
    pub fn new() -> Self {
        Self {
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> Result<bool> {
        let output = Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        Ok(output.is_ok() && output.unwrap().status.success())
    }

    /// Get video information using yt-dlp
    async fn get_video_info(&self, url: &str) -> Result<Value> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--dump-json",
                "--no-playlist",
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(RefineryError::AcquisitionFailed(format!("yt-dlp failed: {}", error)).into());
        }

        let json_str = String::from_utf8(output.stdout)?;
        let info: Value = serde_json::from_str(&json_str)?;

        Ok(info)
    }

    /// Download the audio track of `url` into `dest_dir` as `<video id>.mp3`
    pub async fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let url = validate_and_normalize_url(url)?;

        if !self.check_availability().await? {
            anyhow::bail!("yt-dlp is not available. Please install it: https://github.com/yt-dlp/yt-dlp");
        }

        let info = self.get_video_info(&url).await?;
        let video_id = info["id"]
            .as_str()
            .ok_or_else(|| RefineryError::AcquisitionFailed("yt-dlp returned no video id".to_string()))?
            .to_string();

        if let Some(title) = info["title"].as_str() {
            tracing::info!("Downloading audio for \"{}\" ({})", title, video_id);
        }

        let output_template = dest_dir.join("%(id)s.%(ext)s");
        let output = Command::new(&self.yt_dlp_path)
            .args([
                "--output", &output_template.to_string_lossy(),
                "--format", "bestaudio/best",
                "--extract-audio",
                "--audio-format", "mp3",
                "--audio-quality", "192K",
                "--no-playlist",
                "--quiet",
                "--no-warnings",
                &url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            // leave no partial download behind
            remove_files_for_id(dest_dir, &video_id);
            return Err(RefineryError::AcquisitionFailed(format!(
                "failed to download audio: {}", error
            ))
            .into());
        }

        let audio_path = dest_dir.join(format!("{}.mp3", video_id));
        if !audio_path.exists() {
            remove_files_for_id(dest_dir, &video_id);
            return Err(RefineryError::AcquisitionFailed(format!(
                "yt-dlp reported success but {} was not produced",
                audio_path.display()
            ))
            .into());
        }

        Ok(audio_path)
    }
}

impl Default for YoutubeDownloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove any files named after the video id, including .part leftovers
fn remove_files_for_id(dir: &Path, video_id: &str) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(video_id) {
            let _ = std::fs::remove_file(entry.path());
        }
    }
}
