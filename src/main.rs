//! Meetnotes - Meeting Video Summarization Pipeline
//!
//! Entry point: parses the CLI, wires up logging and configuration, and
//! dispatches to the pipeline or one of its individual stages.

use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meetnotes::cli::{Args, Commands};
use meetnotes::config::{resolve_api_key, Config};
use meetnotes::error::MeetnotesError;
use meetnotes::media::MediaProcessorFactory;
use meetnotes::pipeline::{NotesPipeline, PipelineOutcome, PipelineState, StateObserver, NO_SPEECH_REASON};
use meetnotes::summarize::SummarizerFactory;
use meetnotes::transcribe::TranscriberFactory;

#[tokio::main]
async fn main() -> Result<()> {
    // .env carries the generative API credential; the process environment
    // takes precedence over it.
    dotenvy::dotenv().ok();

    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Notes { input, output } => {
            info!("Generating meeting notes for: {}", input.display());

            let api_key = resolve_api_key()?;
            let media = MediaProcessorFactory::create_processor(config.media.clone());
            media.check_availability()?;
            let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
            let summarizer = SummarizerFactory::create_default(config.summarizer.clone(), api_key);

            let spinner = make_spinner();
            let pipeline = NotesPipeline::new(media, transcriber, summarizer)
                .with_observer(Box::new(SpinnerObserver(spinner.clone())));

            let outcome = match pipeline.run_file(&input).await {
                Ok(outcome) => outcome,
                Err(e @ (MeetnotesError::FileNotFound(_) | MeetnotesError::UnsupportedFormat(_))) => {
                    spinner.finish_and_clear();
                    eprintln!("Please upload a video file. ({})", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    return Err(e.into());
                }
            };
            spinner.finish_and_clear();

            match outcome {
                PipelineOutcome::Done { summary } => match output {
                    Some(path) => {
                        tokio::fs::write(&path, &summary).await?;
                        println!("Notes written to {}", path.display());
                    }
                    None => {
                        println!("Detailed Notes:\n");
                        println!("{}", summary);
                    }
                },
                PipelineOutcome::Failed { reason, .. } if reason == NO_SPEECH_REASON => {
                    eprintln!("Failed to extract text from the video.");
                    std::process::exit(1);
                }
                PipelineOutcome::Failed { stage, reason } => {
                    eprintln!("Failed while {}: {}", stage, reason);
                    std::process::exit(1);
                }
                PipelineOutcome::Idle => {
                    eprintln!("Please upload a video file.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Extract { input, output } => {
            info!("Extracting audio from: {}", input.display());

            let media = MediaProcessorFactory::create_processor(config.media.clone());
            media.check_availability()?;
            media.extract_audio(&input, &output).await?;
            println!("Audio written to {}", output.display());
        }
        Commands::Transcribe {
            input,
            output,
            language,
        } => {
            info!("Transcribing audio: {}", input.display());

            if language.is_some() {
                config.transcriber.language = language;
            }
            let transcriber = TranscriberFactory::create_default(config.transcriber.clone());
            let transcript = transcriber.transcribe(&input).await?;

            if !transcript.has_speech() {
                eprintln!("No speech detected in {}", input.display());
                std::process::exit(1);
            }

            tokio::fs::write(&output, &transcript.text).await?;
            println!("Transcript written to {}", output.display());
        }
        Commands::Summarize { input, output } => {
            info!("Summarizing transcript: {}", input.display());

            let transcript = tokio::fs::read_to_string(&input).await?;
            if transcript.trim().is_empty() {
                eprintln!("Transcript {} is empty", input.display());
                std::process::exit(1);
            }

            let api_key = resolve_api_key()?;
            let summarizer = SummarizerFactory::create_default(config.summarizer.clone(), api_key);
            let summary = summarizer.summarize(&transcript).await?;

            match output {
                Some(path) => {
                    tokio::fs::write(&path, &summary).await?;
                    println!("Notes written to {}", path.display());
                }
                None => {
                    println!("Detailed Notes:\n");
                    println!("{}", summary);
                }
            }
        }
    }

    info!("Meetnotes completed successfully");
    Ok(())
}

/// Spinner shown while the pipeline blocks on a stage
fn make_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template is valid"),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

struct SpinnerObserver(ProgressBar);

impl StateObserver for SpinnerObserver {
    fn on_state(&self, state: PipelineState) {
        match state {
            PipelineState::Done | PipelineState::Failed | PipelineState::Idle => {}
            running => self.0.set_message(format!("{}...", running)),
        }
    }
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".meetnotes").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "meetnotes.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer().with_target(false);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
