// Transcription abstraction
//
// Speech-to-text runs through `TranscriberTrait` so the orchestrator can be
// tested against mocks. The default implementation shells out to a local
// whisper CLI; alternative engines slot in through the factory.

pub mod whisper_cli;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::TranscriberConfig;
use crate::error::Result;

/// A single timed segment of recognized speech
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Plain-text output of speech-to-text over an audio track.
///
/// An empty transcript is a valid result, not an error: it signals that no
/// speech was recognized. The orchestrator checks `has_speech` before any
/// downstream use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub segments: Vec<TranscriptSegment>,
    pub language: Option<String>,
}

impl Transcript {
    pub fn has_speech(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Main trait for transcription operations
///
/// The language hint lives in `TranscriberConfig`; auto-detection applies
/// when it is unset.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriberTrait: Send + Sync {
    /// Transcribe an audio file to text
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript>;
}

/// Transcriber implementation type
#[derive(Debug, Clone)]
pub enum TranscriberImplementation {
    WhisperCli,
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create_transcriber(
        implementation: TranscriberImplementation,
        config: TranscriberConfig,
    ) -> Box<dyn TranscriberTrait> {
        match implementation {
            TranscriberImplementation::WhisperCli => {
                Box::new(whisper_cli::WhisperCliTranscriber::new(config))
            }
        }
    }

    pub fn create_default(config: TranscriberConfig) -> Box<dyn TranscriberTrait> {
        Self::create_transcriber(TranscriberImplementation::WhisperCli, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_speech() {
        let transcript = Transcript {
            text: "The team agreed to ship version 2 next Friday.".to_string(),
            segments: Vec::new(),
            language: Some("en".to_string()),
        };
        assert!(transcript.has_speech());
    }

    #[test]
    fn test_empty_transcript_has_no_speech() {
        let transcript = Transcript {
            text: String::new(),
            segments: Vec::new(),
            language: None,
        };
        assert!(!transcript.has_speech());
    }

    #[test]
    fn test_whitespace_transcript_has_no_speech() {
        let transcript = Transcript {
            text: "  \n\t ".to_string(),
            segments: Vec::new(),
            language: None,
        };
        assert!(!transcript.has_speech());
    }
}
