use crate::{
    AnalyticsSnapshot, BatchSummary, Job, JobAction, JobId, JobStatus, Notification, PageSize,
    UploadSettings,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStats {
    pub total: usize,
    pub completed: usize,
    /// Queued plus processing.
    pub pending: usize,
}

impl JobStats {
    pub fn from_jobs(jobs: &[Job]) -> Self {
        Self {
            total: jobs.len(),
            completed: jobs
                .iter()
                .filter(|job| job.status == JobStatus::Completed)
                .count(),
            pending: jobs.iter().filter(|job| job.status.is_pending()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub jobs: Vec<JobRowView>,
    pub stats: JobStats,
    pub auto_refresh: bool,
    pub refreshing: bool,
    pub uploading: bool,
    pub queued_batches: usize,
    pub display_name: Option<String>,
    pub settings: UploadSettings,
    pub locale: String,
    pub analytics: Option<AnalyticsSnapshot>,
    pub last_batch: Option<BatchSummary>,
    pub notifications: Vec<Notification>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub filename: String,
    pub status: JobStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub size: String,
    pub page_size: PageSize,
    pub margin_mm: f64,
    pub error: Option<String>,
    pub download_url: Option<String>,
    pub actions: Vec<JobAction>,
}

impl JobRowView {
    pub fn from_job(job: &Job) -> Self {
        Self {
            job_id: job.id.clone(),
            filename: job.original_filename.clone(),
            status: job.status,
            created_at: job.created_at.clone(),
            updated_at: job.updated_at.clone(),
            size: format_size(job.size_bytes),
            page_size: job.settings.page_size,
            margin_mm: job.settings.margin_mm,
            error: job.error.clone(),
            download_url: job.download_url.clone(),
            actions: job.available_actions(),
        }
    }
}

/// Human-readable size: whole bytes, then one decimal in KB/MB/GB.
pub fn format_size(bytes: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let Some(bytes) = bytes.filter(|b| *b > 0) else {
        return "unknown".to_string();
    };
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}
