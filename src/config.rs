use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{MeetnotesError, Result};

/// Environment variable holding the generative API credential.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

fn default_word_budget() -> usize {
    250
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to the ffmpeg binary
    pub binary_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to the whisper binary
    pub binary_path: String,
    /// Model size tier (tiny, base, small, medium, large)
    pub model: String,
    /// Source language hint; auto-detect when unset
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// Generative API base endpoint
    pub endpoint: String,
    /// Generative model identifier
    pub model: String,
    /// Word budget requested from the model (not locally enforced)
    #[serde(default = "default_word_budget")]
    pub word_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
            },
            transcriber: TranscriberConfig {
                binary_path: "whisper".to_string(),
                model: "base".to_string(),
                language: None,
            },
            summarizer: SummarizerConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-pro".to_string(),
                word_budget: 250,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MeetnotesError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| MeetnotesError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MeetnotesError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| MeetnotesError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

/// Resolve the generative API credential from the environment.
///
/// A `.env` file in the working directory is honored; the process
/// environment takes precedence.
pub fn resolve_api_key() -> Result<String> {
    std::env::var(API_KEY_ENV).map_err(|_| {
        MeetnotesError::Config(format!(
            "Missing {} environment variable (set it or add it to .env)",
            API_KEY_ENV
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn test_default_config_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(parsed.media.binary_path, "ffmpeg");
        assert_eq!(parsed.transcriber.model, "base");
        assert_eq!(parsed.summarizer.model, "gemini-pro");
        assert_eq!(parsed.summarizer.word_budget, 250);
    }

    #[test]
    fn test_from_file() {
        let file = assert_fs::NamedTempFile::new("config.toml").unwrap();
        file.write_str(
            r#"
[media]
binary_path = "/opt/ffmpeg/bin/ffmpeg"

[transcriber]
binary_path = "whisper"
model = "small"

[summarizer]
endpoint = "https://generativelanguage.googleapis.com/v1beta"
model = "gemini-pro"
"#,
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.media.binary_path, "/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(config.transcriber.model, "small");
        assert!(config.transcriber.language.is_none());
        // word_budget falls back to the default when omitted
        assert_eq!(config.summarizer.word_budget, 250);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(MeetnotesError::Config(_))));
    }
}
