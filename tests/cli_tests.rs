use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/// Build a refinery command rooted in an isolated working directory.
///
/// API keys are set to dummies so commands reach their precondition checks;
/// no test here ever gets far enough to issue a network call.
fn refinery(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("refinery").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("GROQ_API_KEY", "test-key")
        .env("GEMINI_API_KEY", "test-key");
    cmd
}

#[test]
fn help_lists_pipeline_commands() {
    let dir = tempfile::tempdir().unwrap();
    refinery(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("transcribe"))
        .stdout(predicate::str::contains("improve"))
        .stdout(predicate::str::contains("finalize"));
}

#[test]
fn status_reports_empty_session() {
    let dir = tempfile::tempdir().unwrap();
    refinery(dir.path())
        .args(["--session", "work", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage: Empty"))
        .stdout(predicate::str::contains("Audio: none"));
}

#[test]
fn improve_with_empty_original_fails_without_service_calls() {
    let dir = tempfile::tempdir().unwrap();
    refinery(dir.path())
        .args(["--session", "work", "improve"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("precondition not met"));
}

#[test]
fn finalize_with_empty_improved_fails_without_service_calls() {
    let dir = tempfile::tempdir().unwrap();
    refinery(dir.path())
        .args(["--session", "work", "finalize"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("precondition not met"));
}

#[test]
fn transcribe_without_audio_fails() {
    let dir = tempfile::tempdir().unwrap();
    refinery(dir.path())
        .args(["--session", "work", "transcribe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no audio has been acquired"));
}

#[test]
fn set_original_advances_stage() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(dir.path().join("raw.txt"), "ya'ni he said Subhanallah").unwrap();

    refinery(dir.path())
        .args(["--session", "work", "set-original", "raw.txt"])
        .assert()
        .success();

    refinery(dir.path())
        .args(["--session", "work", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage: HasOriginal"))
        .stdout(predicate::str::contains("Original: 25 chars"));
}

#[test]
fn set_original_reads_stdin() {
    let dir = tempfile::tempdir().unwrap();

    refinery(dir.path())
        .args(["--session", "work", "set-original", "-"])
        .write_stdin("pasted transcript")
        .assert()
        .success();

    refinery(dir.path())
        .args(["--session", "work", "show", "original"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pasted transcript"));
}

#[test]
fn upload_rejects_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(dir.path().join("clip.flac"), b"not audio").unwrap();

    refinery(dir.path())
        .args(["--session", "work", "upload", "clip.flac"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported audio format"));
}

#[test]
fn upload_stores_audio_in_session() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(dir.path().join("clip.mp3"), b"mp3 bytes").unwrap();

    refinery(dir.path())
        .args(["--session", "work", "upload", "clip.mp3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Audio stored at:"));

    refinery(dir.path())
        .args(["--session", "work", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("session-owned"));
}
