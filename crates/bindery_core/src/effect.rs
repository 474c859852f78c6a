use std::path::PathBuf;
use std::time::Duration;

use crate::{BatchId, ClientPreferences, JobId, UploadInput, UploadSettings};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchSession,
    FetchJobs,
    /// Arm the single-shot poll timer.
    SchedulePoll { generation: u64, after: Duration },
    CancelPoll,
    /// Read dropped files and package dropped folders.
    PrepareUploads { paths: Vec<PathBuf> },
    Upload {
        batch_id: BatchId,
        index: usize,
        input: UploadInput,
        settings: UploadSettings,
    },
    RetryJob { job_id: JobId },
    CancelJob { job_id: JobId },
    DeleteJob { job_id: JobId },
    RevealJob { job_id: JobId },
    ClearJobs,
    SaveProfile { display_name: String },
    FetchAnalytics,
    PersistPreferences(ClientPreferences),
}
