use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::AudioFormat;

/// Persist uploaded audio bytes under their declared extension, no transcoding
pub fn store_upload(bytes: &[u8], format: AudioFormat, dir: &Path) -> Result<PathBuf> {
    let filename = format!(
        "upload_{}.{}",
        &Uuid::new_v4().to_string()[..8],
        format.as_str()
    );
    let path = dir.join(filename);

    fs_err::write(&path, bytes).context("Failed to store uploaded audio")?;

    tracing::debug!("Stored {} uploaded bytes at {}", bytes.len(), path.display());

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_upload_preserves_bytes_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"not really audio";

        let path = store_upload(bytes, AudioFormat::Wav, dir.path()).unwrap();

        assert_eq!(path.extension().unwrap(), "wav");
        assert_eq!(fs_err::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_store_upload_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = store_upload(b"a", AudioFormat::Mp3, dir.path()).unwrap();
        let b = store_upload(b"b", AudioFormat::Mp3, dir.path()).unwrap();
        assert_ne!(a, b);
    }
}
