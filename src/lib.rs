//! Meetnotes - Meeting Video Summarization Pipeline
//!
//! Converts a meeting video into written notes in three delegating stages:
//! audio extraction (ffmpeg), speech-to-text (whisper), and summary
//! generation (Gemini), sequenced by a single synchronous pipeline
//! orchestrator.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod summarize;
pub mod transcribe;
