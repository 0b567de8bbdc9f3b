use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use super::{build_prompt, SummarizerTrait};
use crate::config::SummarizerConfig;
use crate::error::{MeetnotesError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Content,
}

impl GenerateRequest {
    fn from_prompt(prompt: String) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

impl GenerateResponse {
    /// Pull the summary text out of the first candidate.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .next()
            .map(|part| part.text)
    }
}

/// Summarizer backed by the Gemini generateContent API
pub struct GeminiSummarizer {
    client: Client,
    config: SummarizerConfig,
    api_key: String,
}

impl GeminiSummarizer {
    pub fn new(config: SummarizerConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            config,
            api_key,
        }
    }

    fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.api_key
        )
    }
}

#[async_trait]
impl SummarizerTrait for GeminiSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            return Err(MeetnotesError::Generation(
                "Refusing to summarize an empty transcript".to_string(),
            ));
        }

        info!(
            "Requesting summary from model '{}' ({} transcript chars)",
            self.config.model,
            transcript.len()
        );

        let prompt = build_prompt(transcript, self.config.word_budget);
        let request = GenerateRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| MeetnotesError::Generation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MeetnotesError::Generation(format!(
                "Generative API error {}: {}",
                status, error_text
            )));
        }

        let generate_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MeetnotesError::Generation(format!("Failed to parse response: {}", e)))?;

        let summary = generate_response
            .into_text()
            .ok_or_else(|| MeetnotesError::Generation("Response contained no candidates".to_string()))?;

        debug!("Received summary ({} chars)", summary.len());

        Ok(summary.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GenerateRequest::from_prompt("Summarize this meeting".to_string());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json["contents"][0]["parts"][0]["text"],
            "Summarize this meeting"
        );
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "- Ship v2 next Friday\n- QA signs off Thursday"}]}}
            ]
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_text().unwrap(),
            "- Ship v2 next Friday\n- QA signs off Thursday"
        );
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_request_url() {
        let summarizer = GeminiSummarizer::new(
            SummarizerConfig {
                endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-pro".to_string(),
                word_budget: 250,
            },
            "test-key".to_string(),
        );

        assert_eq!(
            summarizer.request_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent?key=test-key"
        );
    }

    #[tokio::test]
    async fn test_rejects_empty_transcript() {
        let summarizer = GeminiSummarizer::new(SummarizerConfig::default_for_tests(), "k".into());
        let result = summarizer.summarize("   ").await;
        assert!(matches!(result, Err(MeetnotesError::Generation(_))));
    }
}

#[cfg(test)]
impl SummarizerConfig {
    fn default_for_tests() -> Self {
        Self {
            endpoint: "http://localhost:0".to_string(),
            model: "gemini-pro".to_string(),
            word_budget: 250,
        }
    }
}
