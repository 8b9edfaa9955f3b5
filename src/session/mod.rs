//! Session state: three transcript buffers, one audio reference, and the
//! stage controller that gates each pipeline operation behind its precondition.
//!
//! A session is a directory. The buffers live in it as plain text files under
//! fixed names, so the operator can edit any of them with any editor between
//! operations; the stage label and audio reference live in `state.json`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::audio::AudioSlicer;
use crate::improve::{self, TextGenerator};
use crate::transcribe::{SpeechToText, TranscribeOptions, Transcriber};
use crate::RefineryError;

const STATE_FILE: &str = "state.json";

/// Linear progress of a session through the pipeline.
///
/// The label only advances on explicit commands; editing a buffer file by hand
/// never changes it. Re-running an earlier stage rewinds the label to that
/// stage's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Stage {
    #[default]
    Empty,
    HasOriginal,
    HasImproved,
    HasFinal,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Stage::Empty => "Empty",
            Stage::HasOriginal => "HasOriginal",
            Stage::HasImproved => "HasImproved",
            Stage::HasFinal => "HasFinal",
        };
        write!(f, "{}", label)
    }
}

/// Handle to the one audio artifact a session may hold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioRef {
    pub path: PathBuf,

    /// True when this tool created the file and owns its lifetime
    pub owned: bool,

    pub acquired_at: DateTime<Utc>,
}

/// The three editable transcript buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    Original,
    Improved,
    Final,
}

impl Buffer {
    /// Fixed artifact file name for this buffer within the session directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Buffer::Original => "transcript.txt",
            Buffer::Improved => "edited_transcript.txt",
            Buffer::Final => "corrected_transcript.txt",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct SessionState {
    stage: Stage,
    audio: Option<AudioRef>,
}

/// One operator's unit of work
#[derive(Debug)]
pub struct Session {
    root: PathBuf,
    state: SessionState,
}

impl Session {
    /// Open the session stored in `root`, creating it if needed
    pub fn open(root: &Path) -> Result<Self> {
        fs_err::create_dir_all(root)
            .with_context(|| format!("failed to create session directory {}", root.display()))?;

        let state_path = root.join(STATE_FILE);
        let state = if state_path.exists() {
            let content = fs_err::read_to_string(&state_path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", state_path.display()))?
        } else {
            SessionState::default()
        };

        Ok(Self {
            root: root.to_path_buf(),
            state,
        })
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.state)?;
        fs_err::write(self.root.join(STATE_FILE), content)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn audio(&self) -> Option<&AudioRef> {
        self.state.audio.as_ref()
    }

    pub fn buffer_path(&self, buffer: Buffer) -> PathBuf {
        self.root.join(buffer.file_name())
    }

    /// Current content of a buffer; a missing file reads as empty
    pub fn buffer(&self, buffer: Buffer) -> Result<String> {
        match fs_err::read_to_string(self.buffer_path(buffer)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_buffer(&self, buffer: Buffer, text: &str) -> Result<()> {
        fs_err::write(self.buffer_path(buffer), text)?;
        Ok(())
    }

    /// Attach a newly acquired audio file, releasing any previous tool-owned one
    pub fn attach_audio(&mut self, path: PathBuf, owned: bool) -> Result<()> {
        if let Some(old) = self.state.audio.take() {
            if old.owned && old.path != path && old.path.exists() {
                tracing::debug!("Releasing previous audio file {}", old.path.display());
                fs_err::remove_file(&old.path)?;
            }
        }

        self.state.audio = Some(AudioRef {
            path,
            owned,
            acquired_at: Utc::now(),
        });
        self.save()
    }

    /// Set the original transcript directly, from pasted text or a file
    pub fn set_original(&mut self, text: &str) -> Result<()> {
        self.write_buffer(Buffer::Original, text)?;
        self.state.stage = Stage::HasOriginal;
        self.save()
    }

    /// Transcribe the session's audio into the original buffer.
    ///
    /// Requires an audio reference. On success the tool-owned source file is
    /// deleted and the reference cleared; caller-owned files are left alone.
    /// On failure nothing changes.
    pub async fn transcribe(
        &mut self,
        stt: &dyn SpeechToText,
        slicer: &dyn AudioSlicer,
        options: TranscribeOptions,
    ) -> Result<()> {
        let audio = self.state.audio.clone().ok_or_else(|| {
            RefineryError::PreconditionFailed(
                "no audio has been acquired; run download or upload first".to_string(),
            )
        })?;

        // per-window chunk files live here and vanish with it on every exit path
        let scratch = tempfile::tempdir_in(&self.root)
            .context("failed to create scratch directory")?;

        let transcriber = Transcriber::new(stt, slicer, options);
        let transcript = transcriber.transcribe_file(&audio.path, scratch.path()).await?;

        self.write_buffer(Buffer::Original, &transcript)?;
        self.state.stage = Stage::HasOriginal;

        if audio.owned {
            if audio.path.exists() {
                fs_err::remove_file(&audio.path)?;
            }
            self.state.audio = None;
        }

        self.save()
    }

    /// Apply the style guide to the original buffer, producing the improved buffer
    pub async fn improve(
        &mut self,
        generator: &dyn TextGenerator,
        window_chars: usize,
    ) -> Result<()> {
        let original = self.buffer(Buffer::Original)?;
        if original.trim().is_empty() {
            return Err(RefineryError::PreconditionFailed(
                "the original transcript is empty; transcribe audio or set it directly first"
                    .to_string(),
            )
            .into());
        }

        let improved = improve::improve_transcript(generator, &original, window_chars).await?;

        self.write_buffer(Buffer::Improved, &improved)?;
        self.state.stage = Stage::HasImproved;
        self.save()
    }

    /// Reconcile the improved buffer against the original, producing the final buffer
    pub async fn finalize(
        &mut self,
        generator: &dyn TextGenerator,
        window_chars: usize,
    ) -> Result<()> {
        let improved = self.buffer(Buffer::Improved)?;
        if improved.trim().is_empty() {
            return Err(RefineryError::PreconditionFailed(
                "the improved transcript is empty; run improve first".to_string(),
            )
            .into());
        }

        let original = self.buffer(Buffer::Original)?;
        let corrected =
            improve::correct_transcript(generator, &original, &improved, window_chars).await?;

        self.write_buffer(Buffer::Final, &corrected)?;
        self.state.stage = Stage::HasFinal;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::TimeWindow;
    use crate::improve::MockTextGenerator;
    use crate::transcribe::MockSpeechToText;
    use async_trait::async_trait;
    use mockall::Sequence;

    struct FakeSlicer {
        total_ms: u64,
    }

    #[async_trait]
    impl AudioSlicer for FakeSlicer {
        async fn duration_ms(&self, _path: &Path) -> Result<u64> {
            Ok(self.total_ms)
        }

        async fn cut(&self, _path: &Path, window: TimeWindow, target: &Path) -> Result<()> {
            fs_err::write(target, window.index.to_string())?;
            Ok(())
        }
    }

    fn options() -> TranscribeOptions {
        TranscribeOptions {
            window_ms: 600_000,
            tail_windows: Some(2),
        }
    }

    #[test]
    fn test_fresh_session_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::open(dir.path()).unwrap();

        assert_eq!(session.stage(), Stage::Empty);
        assert!(session.audio().is_none());
        assert_eq!(session.buffer(Buffer::Original).unwrap(), "");
        assert_eq!(session.buffer(Buffer::Improved).unwrap(), "");
        assert_eq!(session.buffer(Buffer::Final).unwrap(), "");
    }

    #[test]
    fn test_set_original_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        session.set_original("he said subhanallah").unwrap();

        let reopened = Session::open(dir.path()).unwrap();
        assert_eq!(reopened.stage(), Stage::HasOriginal);
        assert_eq!(reopened.buffer(Buffer::Original).unwrap(), "he said subhanallah");
    }

    #[test]
    fn test_buffers_use_fixed_artifact_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        session.set_original("text").unwrap();

        assert!(dir.path().join("transcript.txt").exists());
        assert_eq!(
            session.buffer_path(Buffer::Improved).file_name().unwrap(),
            "edited_transcript.txt"
        );
        assert_eq!(
            session.buffer_path(Buffer::Final).file_name().unwrap(),
            "corrected_transcript.txt"
        );
    }

    #[test]
    fn test_manual_edit_is_visible_without_changing_stage() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        session.set_original("first draft").unwrap();

        // the operator edits the file directly
        fs_err::write(dir.path().join("transcript.txt"), "edited by hand").unwrap();

        assert_eq!(session.buffer(Buffer::Original).unwrap(), "edited by hand");
        assert_eq!(session.stage(), Stage::HasOriginal);
    }

    #[test]
    fn test_attach_audio_releases_previous_owned_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();

        let first = dir.path().join("first.mp3");
        let second = dir.path().join("second.mp3");
        fs_err::write(&first, b"a").unwrap();
        fs_err::write(&second, b"b").unwrap();

        session.attach_audio(first.clone(), true).unwrap();
        session.attach_audio(second.clone(), true).unwrap();

        assert!(!first.exists());
        assert!(second.exists());
        assert_eq!(session.audio().unwrap().path, second);
    }

    #[test]
    fn test_attach_audio_keeps_previous_caller_owned_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();

        let first = dir.path().join("first.mp3");
        let second = dir.path().join("second.mp3");
        fs_err::write(&first, b"a").unwrap();
        fs_err::write(&second, b"b").unwrap();

        session.attach_audio(first.clone(), false).unwrap();
        session.attach_audio(second, true).unwrap();

        assert!(first.exists());
    }

    #[tokio::test]
    async fn test_transcribe_requires_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();

        let stt = MockSpeechToText::new();
        let slicer = FakeSlicer { total_ms: 600_000 };
        let err = session.transcribe(&stt, &slicer, options()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RefineryError>(),
            Some(RefineryError::PreconditionFailed(_))
        ));
        assert_eq!(session.stage(), Stage::Empty);
    }

    #[tokio::test]
    async fn test_transcribe_fills_original_and_deletes_owned_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();

        let audio = dir.path().join("lecture.mp3");
        fs_err::write(&audio, b"mp3").unwrap();
        session.attach_audio(audio.clone(), true).unwrap();

        let mut stt = MockSpeechToText::new();
        stt.expect_transcribe_chunk()
            .returning(|_, _| Ok("some speech".to_string()));
        let slicer = FakeSlicer { total_ms: 600_000 };

        session.transcribe(&stt, &slicer, options()).await.unwrap();

        assert_eq!(session.stage(), Stage::HasOriginal);
        assert_eq!(session.buffer(Buffer::Original).unwrap(), "some speech");
        assert!(!audio.exists());
        assert!(session.audio().is_none());
    }

    #[tokio::test]
    async fn test_transcribe_keeps_caller_owned_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();

        let audio = dir.path().join("lecture.mp3");
        fs_err::write(&audio, b"mp3").unwrap();
        session.attach_audio(audio.clone(), false).unwrap();

        let mut stt = MockSpeechToText::new();
        stt.expect_transcribe_chunk()
            .returning(|_, _| Ok("some speech".to_string()));
        let slicer = FakeSlicer { total_ms: 600_000 };

        session.transcribe(&stt, &slicer, options()).await.unwrap();

        assert!(audio.exists());
        assert!(session.audio().is_some());
    }

    #[tokio::test]
    async fn test_transcribe_failure_leaves_buffer_and_audio_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        session.set_original("previous transcript").unwrap();

        let audio = dir.path().join("lecture.mp3");
        fs_err::write(&audio, b"mp3").unwrap();
        session.attach_audio(audio.clone(), true).unwrap();

        let mut stt = MockSpeechToText::new();
        stt.expect_transcribe_chunk()
            .returning(|_, _| Err(anyhow::anyhow!("service unavailable")));
        let slicer = FakeSlicer { total_ms: 600_000 };

        assert!(session.transcribe(&stt, &slicer, options()).await.is_err());
        assert_eq!(session.buffer(Buffer::Original).unwrap(), "previous transcript");
        assert!(audio.exists());
        assert!(session.audio().is_some());
    }

    #[tokio::test]
    async fn test_improve_requires_nonempty_original() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();

        let mut generator = MockTextGenerator::new();
        generator.expect_generate().times(0);

        let err = session.improve(&generator, 8000).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RefineryError>(),
            Some(RefineryError::PreconditionFailed(_))
        ));
        assert_eq!(session.stage(), Stage::Empty);
    }

    #[tokio::test]
    async fn test_improve_failure_leaves_improved_buffer_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        // three 4-char windows
        session.set_original("abcdefghij").unwrap();
        fs_err::write(session.buffer_path(Buffer::Improved), "before").unwrap();

        let mut generator = MockTextGenerator::new();
        let mut seq = Sequence::new();
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("one".to_string()));
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(anyhow::anyhow!("overloaded")));

        assert!(session.improve(&generator, 4).await.is_err());
        assert_eq!(session.buffer(Buffer::Improved).unwrap(), "before");
        assert_eq!(session.stage(), Stage::HasOriginal);
    }

    #[tokio::test]
    async fn test_finalize_with_empty_improved_makes_no_service_call() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        session.set_original("some text").unwrap();
        fs_err::write(session.buffer_path(Buffer::Final), "untouched").unwrap();

        let mut generator = MockTextGenerator::new();
        generator.expect_generate().times(0);

        let err = session.finalize(&generator, 8000).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RefineryError>(),
            Some(RefineryError::PreconditionFailed(_))
        ));
        assert_eq!(session.buffer(Buffer::Final).unwrap(), "untouched");
        assert_eq!(session.stage(), Stage::HasOriginal);
    }

    #[tokio::test]
    async fn test_full_editing_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::open(dir.path()).unwrap();
        session.set_original("ya'ni he said Subhanallah").unwrap();

        let mut improver = MockTextGenerator::new();
        improver
            .expect_generate()
            .times(1)
            .withf(|request: &str| request.ends_with("ya'ni he said Subhanallah"))
            .returning(|_| Ok("He said glory be to Allah".to_string()));

        session.improve(&improver, 8000).await.unwrap();
        assert_eq!(session.stage(), Stage::HasImproved);
        assert_eq!(
            session.buffer(Buffer::Improved).unwrap(),
            "He said glory be to Allah"
        );

        let mut corrector = MockTextGenerator::new();
        corrector
            .expect_generate()
            .times(1)
            .withf(|request: &str| {
                request.contains("ya'ni he said Subhanallah")
                    && request.contains("He said glory be to Allah")
            })
            .returning(|_| Ok("He said *Subḥānallāh*".to_string()));

        session.finalize(&corrector, 8000).await.unwrap();
        assert_eq!(session.stage(), Stage::HasFinal);
        assert_eq!(session.buffer(Buffer::Final).unwrap(), "He said *Subḥānallāh*");
    }
}
