// Summary generation abstraction
//
// The generative backend sits behind `SummarizerTrait`. The default
// implementation calls the Gemini generateContent endpoint.

pub mod gemini;

use async_trait::async_trait;

use crate::config::SummarizerConfig;
use crate::error::Result;

/// Build the fixed instruction prompt prepended to the transcript.
///
/// Asks for a point-wise summary, meeting minutes, and agenda within the
/// configured word budget. The model is asked to respect the budget; it is
/// not locally enforced.
pub fn build_prompt(transcript: &str, word_budget: usize) -> String {
    format!(
        "You are a meeting video summarizer. You will be taking the transcript text \
         and summarizing the entire video, providing the important summary in points \
         alongside the meeting minutes and the agenda within {} words. Please provide \
         the summary of the text given here: {}",
        word_budget, transcript
    )
}

/// Main trait for summary generation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummarizerTrait: Send + Sync {
    /// Generate meeting notes from a non-empty transcript
    async fn summarize(&self, transcript: &str) -> Result<String>;
}

/// Summarizer implementation type
#[derive(Debug, Clone)]
pub enum SummarizerImplementation {
    Gemini,
}

/// Factory for creating summarizer instances
pub struct SummarizerFactory;

impl SummarizerFactory {
    pub fn create_summarizer(
        implementation: SummarizerImplementation,
        config: SummarizerConfig,
        api_key: String,
    ) -> Box<dyn SummarizerTrait> {
        match implementation {
            SummarizerImplementation::Gemini => {
                Box::new(gemini::GeminiSummarizer::new(config, api_key))
            }
        }
    }

    pub fn create_default(config: SummarizerConfig, api_key: String) -> Box<dyn SummarizerTrait> {
        Self::create_summarizer(SummarizerImplementation::Gemini, config, api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_contains_transcript_and_budget() {
        let prompt = build_prompt("The team agreed to ship version 2 next Friday.", 250);

        assert!(prompt.contains("The team agreed to ship version 2 next Friday."));
        assert!(prompt.contains("within 250 words"));
        assert!(prompt.contains("meeting minutes"));
        assert!(prompt.contains("agenda"));
    }

    #[test]
    fn test_build_prompt_custom_budget() {
        let prompt = build_prompt("transcript", 100);
        assert!(prompt.contains("within 100 words"));
    }
}
