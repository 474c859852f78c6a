use std::path::PathBuf;
use std::time::Duration;

use crate::{
    AnalyticsSnapshot, BatchId, ClientPreferences, Job, JobAction, JobId, PreferencesPatch,
    Rejection, ServerAction, SessionInfo, UploadInput, UploadOutcome,
};

/// Reply to a confirmed retry/cancel/delete/reveal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionReply {
    pub job: Option<Job>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Application started; loads the session and the first snapshot.
    Started {
        auto_refresh: bool,
        poll_interval: Duration,
    },
    /// Restore preferences loaded from disk.
    RestorePreferences(ClientPreferences),
    /// User edited one or more preferences.
    PreferencesChanged(PreferencesPatch),
    /// User asked for a refresh.
    RefreshRequested,
    /// The single-shot poll timer fired.
    PollTick { generation: u64 },
    /// User toggled auto-refresh.
    AutoRefreshToggled(bool),
    /// Response to `GET /api/jobs`.
    JobsLoaded(Result<Vec<Job>, String>),
    /// User dropped or picked files and folders.
    PathsDropped(Vec<PathBuf>),
    /// Dropped paths were read and folders packaged.
    InputsPrepared {
        inputs: Vec<UploadInput>,
        rejected: Vec<Rejection>,
    },
    /// Ready-made upload batch, bypassing path ingestion.
    UploadBatchSubmitted {
        inputs: Vec<UploadInput>,
        rejected: Vec<Rejection>,
    },
    /// One upload request settled.
    UploadItemFinished {
        batch_id: BatchId,
        index: usize,
        result: Result<UploadOutcome, String>,
    },
    /// User picked an action on a job.
    JobActionRequested { job_id: JobId, action: JobAction },
    /// Server answered a job action.
    JobActionFinished {
        job_id: JobId,
        action: ServerAction,
        result: Result<ActionReply, String>,
    },
    /// User asked to clear all history.
    ClearRequested,
    ClearFinished(Result<(), String>),
    SessionLoaded(Result<SessionInfo, String>),
    ProfileSaveRequested(String),
    ProfileSaved(Result<Option<String>, String>),
    AnalyticsRequested,
    AnalyticsLoaded(Result<AnalyticsSnapshot, String>),
}
