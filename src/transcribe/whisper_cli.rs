use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

use super::{Transcript, TranscriptSegment, TranscriberTrait};
use crate::config::TranscriberConfig;
use crate::error::{MeetnotesError, Result};

/// Whisper JSON output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperOutput {
    pub text: String,
    #[serde(default)]
    pub segments: Vec<WhisperSegment>,
    pub language: Option<String>,
}

/// Whisper JSON segment format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSegment {
    pub id: u64,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl From<WhisperOutput> for Transcript {
    fn from(output: WhisperOutput) -> Self {
        let segments = output
            .segments
            .into_iter()
            .map(|seg| TranscriptSegment {
                start: seg.start,
                end: seg.end,
                text: seg.text.trim().to_string(),
            })
            .collect();

        Transcript {
            text: output.text.trim().to_string(),
            segments,
            language: output.language,
        }
    }
}

/// Transcriber backed by a local whisper CLI
pub struct WhisperCliTranscriber {
    config: TranscriberConfig,
}

impl WhisperCliTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TranscriberTrait for WhisperCliTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript> {
        info!(
            "Transcribing {} with model '{}'",
            audio_path.display(),
            self.config.model
        );

        // Whisper writes its JSON next to the audio stem in the output dir;
        // a scoped temp dir keeps concurrent invocations apart.
        let temp_dir = tempfile::tempdir()
            .map_err(|e| MeetnotesError::Transcriber(format!("Failed to create temp directory: {}", e)))?;
        let output_dir = temp_dir.path();

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.arg(audio_path)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--output_dir")
            .arg(output_dir)
            .arg("--output_format")
            .arg("json");

        if let Some(lang) = self.config.language.as_deref() {
            cmd.arg("--language").arg(lang);
        }

        debug!("Executing whisper command: {:?}", cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| MeetnotesError::Transcriber(format!("Failed to execute whisper: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MeetnotesError::Transcriber(format!(
                "Whisper failed: {}",
                stderr
            )));
        }

        let audio_stem = audio_path
            .file_stem()
            .ok_or_else(|| MeetnotesError::Transcriber("Invalid audio filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", audio_stem.to_string_lossy()));

        let json_content = std::fs::read_to_string(&json_file)
            .map_err(|e| MeetnotesError::Transcriber(format!("Failed to read whisper output: {}", e)))?;

        let whisper_output: WhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| MeetnotesError::Transcriber(format!("Failed to parse whisper JSON: {}", e)))?;

        let transcript: Transcript = whisper_output.into();
        info!(
            "Transcription completed: {} segments, {} chars",
            transcript.segments.len(),
            transcript.text.len()
        );

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whisper_output() {
        let json = r#"{
            "text": " The team agreed to ship version 2 next Friday.",
            "segments": [
                {"id": 0, "start": 0.0, "end": 3.2, "text": " The team agreed to ship"},
                {"id": 1, "start": 3.2, "end": 5.0, "text": " version 2 next Friday."}
            ],
            "language": "en"
        }"#;

        let output: WhisperOutput = serde_json::from_str(json).unwrap();
        let transcript: Transcript = output.into();

        assert_eq!(
            transcript.text,
            "The team agreed to ship version 2 next Friday."
        );
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].text, "The team agreed to ship");
        assert_eq!(transcript.language.as_deref(), Some("en"));
        assert!(transcript.has_speech());
    }

    #[test]
    fn test_parse_silent_output() {
        let json = r#"{"text": "", "segments": [], "language": null}"#;

        let output: WhisperOutput = serde_json::from_str(json).unwrap();
        let transcript: Transcript = output.into();

        assert!(!transcript.has_speech());
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let transcriber = WhisperCliTranscriber::new(TranscriberConfig {
            binary_path: "/nonexistent/whisper".to_string(),
            model: "base".to_string(),
            language: None,
        });

        let result = transcriber.transcribe(Path::new("/tmp/audio.wav")).await;
        assert!(matches!(result, Err(MeetnotesError::Transcriber(_))));
    }
}
