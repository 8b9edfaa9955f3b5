use anyhow::Result;
use std::path::Path;

use crate::session::{Buffer, Session};

/// Print a transcript buffer to the console
pub fn print_buffer(session: &Session, buffer: Buffer) -> Result<()> {
    println!("{}", session.buffer(buffer)?);
    Ok(())
}

/// Save a transcript buffer to a file
pub fn save_buffer(session: &Session, buffer: Buffer, path: &Path) -> Result<()> {
    fs_err::write(path, session.buffer(buffer)?)?;
    Ok(())
}

/// Print the session stage, audio reference, and buffer sizes
pub fn print_status(session: &Session) -> Result<()> {
    println!("Session: {}", session.root().display());
    println!("Stage: {}", session.stage());

    match session.audio() {
        Some(audio) => {
            let ownership = if audio.owned { "session-owned" } else { "caller-provided" };
            println!(
                "Audio: {} ({}, acquired {})",
                audio.path.display(),
                ownership,
                audio.acquired_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => println!("Audio: none"),
    }

    for (label, buffer) in [
        ("Original", Buffer::Original),
        ("Improved", Buffer::Improved),
        ("Final", Buffer::Final),
    ] {
        let chars = session.buffer(buffer)?.chars().count();
        println!("{}: {} chars ({})", label, chars, buffer.file_name());
    }

    Ok(())
}
