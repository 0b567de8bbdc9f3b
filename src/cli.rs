use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate detailed meeting notes from a video file
    Notes {
        /// Input meeting video (mp4, mov, or avi)
        #[arg(short, long)]
        input: PathBuf,

        /// Write the notes to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the audio track from a video file
    Extract {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output audio file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Transcribe an audio file to text
    Transcribe {
        /// Input audio file
        #[arg(short, long)]
        input: PathBuf,

        /// Output transcript file
        #[arg(short, long)]
        output: PathBuf,

        /// Source language hint
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Summarize a transcript file into meeting notes
    Summarize {
        /// Input transcript file
        #[arg(short, long)]
        input: PathBuf,

        /// Write the notes to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
