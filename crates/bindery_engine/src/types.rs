use std::fmt;

use bindery_core::{
    ActionReply, AnalyticsSnapshot, BatchId, Job, JobId, Rejection, ServerAction, SessionInfo,
    UploadInput, UploadOutcome,
};
use thiserror::Error;

/// Results reported by the engine thread, one per executed command.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SessionLoaded(Result<SessionInfo, ApiError>),
    JobsLoaded(Result<Vec<Job>, ApiError>),
    PollTick {
        generation: u64,
    },
    InputsPrepared {
        inputs: Vec<UploadInput>,
        rejected: Vec<Rejection>,
    },
    UploadFinished {
        batch_id: BatchId,
        index: usize,
        result: Result<UploadOutcome, ApiError>,
    },
    ActionFinished {
        job_id: JobId,
        action: ServerAction,
        result: Result<ActionReply, ApiError>,
    },
    Cleared(Result<(), ApiError>),
    ProfileSaved(Result<Option<String>, ApiError>),
    AnalyticsLoaded(Result<AnalyticsSnapshot, ApiError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Response body was not the JSON the endpoint promises.
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "unexpected response"),
        }
    }
}

/// Archive Builder failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BundleError {
    #[error("folder contains no files")]
    Empty,
    #[error("archive generation failed: {0}")]
    Build(String),
}
