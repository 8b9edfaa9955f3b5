use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_refinery::acquire::{store_upload, AudioFormat, YoutubeDownloader};
use transcript_refinery::audio::FfmpegSlicer;
use transcript_refinery::improve::GeminiClient;
use transcript_refinery::output;
use transcript_refinery::transcribe::{TranscribeOptions, WhisperClient};
use transcript_refinery::utils;
use transcript_refinery::{Buffer, Cli, Commands, Config, RefineryError, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "transcript_refinery=debug,refinery=debug"
    } else {
        "transcript_refinery=info,refinery=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Check for required external dependencies (non-fatal)
    let missing_deps = utils::check_dependencies().await;
    if !missing_deps.is_empty() {
        eprintln!("⚠️  Dependency check warnings:");
        for dep in missing_deps {
            eprintln!("   • {}", dep);
        }
        eprintln!("   (Continuing anyway - tools may be available)");
    }

    let config = Config::load().await?;
    let session_dir = cli
        .session
        .clone()
        .unwrap_or_else(|| config.app.session_dir.clone());

    match cli.command {
        Commands::Download { url } => {
            let mut session = Session::open(&session_dir)?;
            let downloader = YoutubeDownloader::new();

            let progress = spinner("Downloading audio...");
            let result = downloader.download(&url, session.root()).await;
            progress.finish_and_clear();

            let path = result?;
            session.attach_audio(path.clone(), true)?;
            println!("Audio downloaded to: {}", path.display());
        }
        Commands::Upload { file } => {
            let mut session = Session::open(&session_dir)?;
            utils::check_file_accessible(&file)?;

            let extension = file.extension().and_then(|e| e.to_str()).unwrap_or_default();
            let format = AudioFormat::from_extension(extension)
                .ok_or_else(|| RefineryError::UnsupportedFormat(extension.to_string()))?;

            let bytes = fs_err::read(&file)?;
            let path = store_upload(&bytes, format, session.root())?;
            session.attach_audio(path.clone(), true)?;
            println!("Audio stored at: {}", path.display());
        }
        Commands::Transcribe { audio, full } => {
            let mut session = Session::open(&session_dir)?;
            if let Some(path) = audio {
                utils::check_file_accessible(&path)?;
                session.attach_audio(path, false)?;
            }

            let stt = WhisperClient::new(config.speech.clone(), Config::groq_api_key()?)?;
            let slicer = FfmpegSlicer::new();
            let tail_windows = if full || config.pipeline.tail_windows == 0 {
                None
            } else {
                Some(config.pipeline.tail_windows)
            };
            let options = TranscribeOptions {
                window_ms: config.audio_window_ms(),
                tail_windows,
            };

            let progress = spinner("Transcribing audio...");
            let result = session.transcribe(&stt, &slicer, options).await;
            progress.finish_and_clear();
            result?;

            println!(
                "Transcript written to: {}",
                session.buffer_path(Buffer::Original).display()
            );
        }
        Commands::SetOriginal { file } => {
            let mut session = Session::open(&session_dir)?;
            let text = if file == "-" {
                std::io::read_to_string(std::io::stdin())?
            } else {
                fs_err::read_to_string(&file)?
            };

            session.set_original(&text)?;
            println!("Original transcript set ({} chars)", text.chars().count());
        }
        Commands::Improve => {
            let mut session = Session::open(&session_dir)?;
            let generator = GeminiClient::new(
                &config.generation.api_base,
                Config::gemini_api_key()?,
                &config.generation.improve_model,
            )?;

            let progress = spinner("Improving transcript...");
            let result = session
                .improve(&generator, config.pipeline.text_window_chars)
                .await;
            progress.finish_and_clear();
            result?;

            println!(
                "Improved transcript written to: {}",
                session.buffer_path(Buffer::Improved).display()
            );
        }
        Commands::Finalize => {
            let mut session = Session::open(&session_dir)?;
            let generator = GeminiClient::new(
                &config.generation.api_base,
                Config::gemini_api_key()?,
                &config.generation.correct_model,
            )?;

            let progress = spinner("Finalizing transcript...");
            let result = session
                .finalize(&generator, config.pipeline.text_window_chars)
                .await;
            progress.finish_and_clear();
            result?;

            println!(
                "Final transcript written to: {}",
                session.buffer_path(Buffer::Final).display()
            );
        }
        Commands::Show { buffer, output } => {
            let session = Session::open(&session_dir)?;
            match output {
                Some(path) => {
                    output::save_buffer(&session, buffer.into(), &path)?;
                    println!("Buffer saved to: {}", path.display());
                }
                None => output::print_buffer(&session, buffer.into())?,
            }
        }
        Commands::Status => {
            let session = Session::open(&session_dir)?;
            output::print_status(&session)?;
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.save().await?;
                println!("Edit the config file to change settings:");
                println!("  {}", Config::config_path()?.display());
            }
        }
    }

    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
