//! Pipeline orchestration: video -> audio -> transcript -> summary.
//!
//! Owns the per-invocation temporary file lifecycle and the stage state
//! machine. Stage failures are rendered into a terminal `Failed` outcome
//! rather than propagated, so the presentation layer receives exactly one
//! report per invocation.

use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{MeetnotesError, Result};
use crate::media::MediaProcessorTrait;
use crate::summarize::SummarizerTrait;
use crate::transcribe::TranscriberTrait;

/// Failure reason for the checked empty-transcript branch. Silence is a
/// valid transcription result, not a transcriber error.
pub const NO_SPEECH_REASON: &str = "no speech detected";

/// Stages of a single pipeline invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Uploading,
    Extracting,
    Transcribing,
    Summarizing,
    Done,
    Failed,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Uploading => "uploading",
            Self::Extracting => "extracting audio",
            Self::Transcribing => "transcribing",
            Self::Summarizing => "generating summary",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Accepted video container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    Mp4,
    Mov,
    Avi,
}

impl VideoFormat {
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "mov" => Ok(Self::Mov),
            "avi" => Ok(Self::Avi),
            other => Err(MeetnotesError::UnsupportedFormat(format!(
                "'{}' is not a supported video format (expected mp4, mov, or avi)",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Avi => "avi",
        }
    }
}

/// An uploaded meeting video: raw bytes plus the declared container format
pub struct VideoUpload {
    pub data: Vec<u8>,
    pub format: VideoFormat,
}

impl VideoUpload {
    /// Read an upload from disk, validating existence and extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(MeetnotesError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                MeetnotesError::UnsupportedFormat(format!(
                    "'{}' has no file extension",
                    path.display()
                ))
            })?;
        let format = VideoFormat::from_extension(ext)?;

        let data = std::fs::read(path)?;

        Ok(Self { data, format })
    }
}

/// Observer for stage transitions, so the presentation layer can show
/// progress while the pipeline blocks. Default implementation ignores them.
pub trait StateObserver: Send + Sync {
    fn on_state(&self, _state: PipelineState) {}
}

struct NoopObserver;

impl StateObserver for NoopObserver {}

/// Scoped per-invocation workspace for intermediate files.
///
/// Paths are namespaced by an invocation ID so concurrent invocations never
/// collide, and the backing directory is removed when the workspace drops,
/// on success and failure paths alike.
pub struct JobWorkspace {
    dir: TempDir,
    id: Uuid,
}

impl JobWorkspace {
    pub fn create() -> Result<Self> {
        let dir = TempDir::with_prefix("meetnotes-")?;
        let id = Uuid::new_v4();
        info!("Created workspace {} at {}", id, dir.path().display());

        Ok(Self { dir, id })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn video_path(&self, format: VideoFormat) -> PathBuf {
        self.dir
            .path()
            .join(format!("upload-{}.{}", self.id, format.extension()))
    }

    pub fn audio_path(&self) -> PathBuf {
        self.dir.path().join(format!("audio-{}.wav", self.id))
    }
}

/// Terminal report of a pipeline invocation
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Nothing was submitted; the pipeline never left idle
    Idle,
    /// The full pipeline succeeded
    Done { summary: String },
    /// A stage failed; carries the stage and a human-readable reason
    Failed {
        stage: PipelineState,
        reason: String,
    },
}

enum StageFlow {
    Summary(String),
    NoSpeech,
}

/// Sequences the three stages and reports a single terminal outcome
pub struct NotesPipeline {
    media: Box<dyn MediaProcessorTrait>,
    transcriber: Box<dyn TranscriberTrait>,
    summarizer: Box<dyn SummarizerTrait>,
    observer: Box<dyn StateObserver>,
}

impl NotesPipeline {
    pub fn new(
        media: Box<dyn MediaProcessorTrait>,
        transcriber: Box<dyn TranscriberTrait>,
        summarizer: Box<dyn SummarizerTrait>,
    ) -> Self {
        Self {
            media,
            transcriber,
            summarizer,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn StateObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn observe(&self, state: PipelineState) {
        info!("Pipeline state: {}", state);
        self.observer.on_state(state);
    }

    /// Run one pipeline invocation.
    ///
    /// `None` means no file was selected: the pipeline stays idle and no
    /// external collaborator is invoked.
    pub async fn run(&self, upload: Option<VideoUpload>) -> PipelineOutcome {
        let Some(upload) = upload else {
            warn!("No video file selected; pipeline remains idle");
            self.observe(PipelineState::Idle);
            return PipelineOutcome::Idle;
        };

        match self.execute(upload).await {
            Ok(StageFlow::Summary(summary)) => {
                self.observe(PipelineState::Done);
                PipelineOutcome::Done { summary }
            }
            Ok(StageFlow::NoSpeech) => {
                warn!("Transcript is empty; stopping before summarization");
                self.observe(PipelineState::Failed);
                PipelineOutcome::Failed {
                    stage: PipelineState::Transcribing,
                    reason: NO_SPEECH_REASON.to_string(),
                }
            }
            Err((stage, err)) => {
                error!("Pipeline failed while {}: {}", stage, err);
                self.observe(PipelineState::Failed);
                PipelineOutcome::Failed {
                    stage,
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Validate a path, read the upload, and run the pipeline
    pub async fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<PipelineOutcome> {
        let upload = VideoUpload::from_file(path)?;
        Ok(self.run(Some(upload)).await)
    }

    async fn execute(
        &self,
        upload: VideoUpload,
    ) -> std::result::Result<StageFlow, (PipelineState, MeetnotesError)> {
        // The workspace lives for the whole invocation; dropping it at any
        // return below removes every intermediate file.
        self.observe(PipelineState::Uploading);
        let workspace = JobWorkspace::create().map_err(|e| (PipelineState::Uploading, e))?;
        let video_path = workspace.video_path(upload.format);
        tokio::fs::write(&video_path, &upload.data)
            .await
            .map_err(|e| (PipelineState::Uploading, e.into()))?;

        self.observe(PipelineState::Extracting);
        let audio_path = workspace.audio_path();
        self.media
            .extract_audio(&video_path, &audio_path)
            .await
            .map_err(|e| (PipelineState::Extracting, e))?;

        self.observe(PipelineState::Transcribing);
        let transcript = self
            .transcriber
            .transcribe(&audio_path)
            .await
            .map_err(|e| (PipelineState::Transcribing, e))?;

        if !transcript.has_speech() {
            return Ok(StageFlow::NoSpeech);
        }

        self.observe(PipelineState::Summarizing);
        let summary = self
            .summarizer
            .summarize(&transcript.text)
            .await
            .map_err(|e| (PipelineState::Summarizing, e))?;

        Ok(StageFlow::Summary(summary))
    }
}
