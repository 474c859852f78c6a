//! Bindery core: job model, merge rules and the pure client state machine.
mod effect;
mod input;
mod job;
mod merge;
mod msg;
mod prefs;
mod refresh;
mod state;
mod update;
mod upload;
mod view_model;

pub use effect::Effect;
pub use input::{
    has_accepted_extension, Bundle, PlainFile, Rejection, RejectionReason, UploadInput,
    EPUB_EXTENSION, EPUB_MIME_TYPE,
};
pub use job::{
    normalize_margin, Job, JobAction, JobId, JobSettings, JobStatus, PageSize, ServerAction,
    DEFAULT_MARGIN_MM, MAX_MARGIN_MM,
};
pub use merge::{merge, remove, JobList, MergeSource};
pub use msg::{ActionReply, Msg};
pub use prefs::{
    AnalyticsSnapshot, ClientPreferences, DailyCount, PreferencesPatch, UploadSettings,
    DEFAULT_LOCALE,
};
pub use refresh::{RefreshTrigger, DEFAULT_POLL_INTERVAL};
pub use state::{AppState, Notification, NotificationLevel, SessionInfo};
pub use update::update;
pub use upload::{BatchId, BatchSummary, UploadOutcome};
pub use view_model::{format_size, AppViewModel, JobRowView, JobStats};
