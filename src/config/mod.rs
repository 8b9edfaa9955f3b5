use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Speech-to-text service settings
    pub speech: SpeechConfig,

    /// Text-generation service settings
    pub generation: GenerationConfig,

    /// Chunking defaults for the pipeline stages
    pub pipeline: PipelineConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Base URL of an OpenAI-compatible transcription API
    pub api_base: String,

    /// Model identifier
    pub model: String,

    /// Fixed language hint sent with every chunk
    pub language: String,

    /// Decoding temperature (0.0 for deterministic output)
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the Gemini API
    pub api_base: String,

    /// Model used for the improvement pass
    pub improve_model: String,

    /// Stronger model used for the correction pass
    pub correct_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Audio window length in minutes
    pub audio_window_minutes: u64,

    /// Text window length in characters
    pub text_window_chars: usize,

    /// Send only the last N audio windows to transcription; 0 sends all
    pub tail_windows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default session directory when --session is not given
    pub session_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speech: SpeechConfig {
                api_base: "https://api.groq.com/openai/v1".to_string(),
                model: "whisper-large-v3".to_string(),
                language: "en".to_string(),
                temperature: 0.0,
            },
            generation: GenerationConfig {
                api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                improve_model: "gemini-1.5-flash".to_string(),
                correct_model: "gemini-1.5-pro-002".to_string(),
            },
            pipeline: PipelineConfig {
                audio_window_minutes: 10,
                text_window_chars: 8000,
                tail_windows: 2,
            },
            app: AppConfig {
                session_dir: PathBuf::from("session"),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("transcript-refinery").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.pipeline.audio_window_minutes == 0 {
            anyhow::bail!("audio_window_minutes must be positive");
        }
        if self.pipeline.text_window_chars == 0 {
            anyhow::bail!("text_window_chars must be positive");
        }
        if self.speech.model.is_empty() {
            anyhow::bail!("speech model must be configured");
        }
        if self.generation.improve_model.is_empty() || self.generation.correct_model.is_empty() {
            anyhow::bail!("generation models must be configured");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Speech API: {}", self.speech.api_base);
        println!("  Speech Model: {}", self.speech.model);
        println!("  Language Hint: {}", self.speech.language);
        println!("  Generation API: {}", self.generation.api_base);
        println!("  Improve Model: {}", self.generation.improve_model);
        println!("  Correct Model: {}", self.generation.correct_model);
        println!("  Audio Window: {} min", self.pipeline.audio_window_minutes);
        println!("  Text Window: {} chars", self.pipeline.text_window_chars);
        println!("  Tail Windows: {}", self.pipeline.tail_windows);
        println!("  Session Dir: {}", self.app.session_dir.display());
    }

    /// Audio window length in milliseconds
    pub fn audio_window_ms(&self) -> u64 {
        self.pipeline.audio_window_minutes * 60 * 1000
    }

    /// Speech-to-text API key from the environment
    pub fn groq_api_key() -> Result<String> {
        std::env::var("GROQ_API_KEY").context("GROQ_API_KEY is not set")
    }

    /// Gemini API key from the environment
    pub fn gemini_api_key() -> Result<String> {
        std::env::var("GEMINI_API_KEY").context("GEMINI_API_KEY is not set")
    }
}
