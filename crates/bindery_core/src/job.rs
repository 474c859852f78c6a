use serde::{Deserialize, Serialize};

/// Server-assigned job identifier; the identity key for every merge.
pub type JobId = String;

pub const DEFAULT_MARGIN_MM: f64 = 15.0;
pub const MAX_MARGIN_MM: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Canceled,
    /// A status this client does not recognise. Shown as-is, never actionable.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Completed, Failed and Canceled no longer change on their own, but stay actionable.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Canceled
        )
    }

    pub fn is_pending(self) -> bool {
        matches!(self, JobStatus::Queued | JobStatus::Processing)
    }

    pub fn can_retry(self) -> bool {
        self.is_terminal()
    }

    pub fn can_cancel(self) -> bool {
        self == JobStatus::Processing
    }

    /// The server may be working on a processing job; it has to be canceled first.
    pub fn can_delete(self) -> bool {
        self == JobStatus::Queued || self.is_terminal()
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
            JobStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
        }
    }

    /// Case-insensitive parse of the three sizes the service renders.
    pub fn parse(raw: &str) -> Option<Self> {
        [PageSize::A4, PageSize::Letter, PageSize::Legal]
            .into_iter()
            .find(|size| size.as_str().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Clamp a requested margin into the range the service accepts.
pub fn normalize_margin(margin_mm: f64) -> f64 {
    if !margin_mm.is_finite() {
        return DEFAULT_MARGIN_MM;
    }
    margin_mm.clamp(0.0, MAX_MARGIN_MM)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSettings {
    pub page_size: PageSize,
    pub margin_mm: f64,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            margin_mm: DEFAULT_MARGIN_MM,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    #[serde(default)]
    pub original_filename: String,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub settings: JobSettings,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobAction {
    Download,
    Reveal,
    Retry,
    Cancel,
    Delete,
}

impl JobAction {
    pub fn label(self) -> &'static str {
        match self {
            JobAction::Download => "download",
            JobAction::Reveal => "reveal",
            JobAction::Retry => "retry",
            JobAction::Cancel => "cancel",
            JobAction::Delete => "delete",
        }
    }

    /// The request this action sends to the service; `None` for client-only actions.
    pub fn on_server(self) -> Option<ServerAction> {
        match self {
            JobAction::Download => None,
            JobAction::Reveal => Some(ServerAction::Reveal),
            JobAction::Retry => Some(ServerAction::Retry),
            JobAction::Cancel => Some(ServerAction::Cancel),
            JobAction::Delete => Some(ServerAction::Delete),
        }
    }
}

/// A job action that round-trips to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerAction {
    Reveal,
    Retry,
    Cancel,
    Delete,
}

impl ServerAction {
    pub fn label(self) -> &'static str {
        JobAction::from(self).label()
    }
}

impl From<ServerAction> for JobAction {
    fn from(action: ServerAction) -> Self {
        match action {
            ServerAction::Reveal => JobAction::Reveal,
            ServerAction::Retry => JobAction::Retry,
            ServerAction::Cancel => JobAction::Cancel,
            ServerAction::Delete => JobAction::Delete,
        }
    }
}

impl Job {
    /// Actions the user may take on this job right now, in display order.
    pub fn available_actions(&self) -> Vec<JobAction> {
        let mut actions = Vec::new();
        if self.status == JobStatus::Unknown {
            return actions;
        }
        if self.download_url.is_some() {
            actions.push(JobAction::Download);
            if self.status == JobStatus::Completed {
                actions.push(JobAction::Reveal);
            }
        }
        if self.status.can_retry() {
            actions.push(JobAction::Retry);
        }
        if self.status.can_cancel() {
            actions.push(JobAction::Cancel);
        }
        if self.status.can_delete() {
            actions.push(JobAction::Delete);
        }
        actions
    }

    pub fn allows(&self, action: JobAction) -> bool {
        self.available_actions().contains(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_parse_is_case_insensitive() {
        assert_eq!(PageSize::parse("letter"), Some(PageSize::Letter));
        assert_eq!(PageSize::parse(" LEGAL "), Some(PageSize::Legal));
        assert_eq!(PageSize::parse("A5"), None);
    }

    #[test]
    fn margin_is_clamped_into_service_range() {
        assert_eq!(normalize_margin(12.5), 12.5);
        assert_eq!(normalize_margin(-3.0), 0.0);
        assert_eq!(normalize_margin(80.0), MAX_MARGIN_MM);
        assert_eq!(normalize_margin(f64::NAN), DEFAULT_MARGIN_MM);
    }

    #[test]
    fn terminal_and_pending_partition_statuses() {
        for status in [
            JobStatus::Queued,
            JobStatus::Processing,
            JobStatus::Completed,
            JobStatus::Failed,
            JobStatus::Canceled,
        ] {
            assert_ne!(status.is_terminal(), status.is_pending(), "{status:?}");
        }
    }
}
