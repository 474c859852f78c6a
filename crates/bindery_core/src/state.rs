use std::time::Duration;

use bindery_logging::bindery_debug;
use serde::{Deserialize, Serialize};

use crate::refresh::{PollTimer, RefreshDecision, RefreshGate};
use crate::upload::UploadQueue;
use crate::view_model::{AppViewModel, JobRowView, JobStats};
use crate::{BatchSummary, ClientPreferences, Effect, JobList, RefreshTrigger};

const MAX_DISPLAY_NAME: usize = 120;

/// Identity returned by `GET /api/session`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionInfo {
    pub user_id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A user-visible toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    jobs: JobList,
    refresh: RefreshGate,
    poll: PollTimer,
    uploads: UploadQueue,
    preparing: usize,
    requests_in_flight: usize,
    prefs: ClientPreferences,
    session: Option<SessionInfo>,
    last_batch: Option<BatchSummary>,
    notifications: Vec<Notification>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let jobs: Vec<JobRowView> = self.jobs.iter().map(JobRowView::from_job).collect();
        AppViewModel {
            stats: JobStats::from_jobs(self.jobs.as_slice()),
            jobs,
            auto_refresh: self.poll.is_enabled(),
            refreshing: self.refresh.is_busy(),
            uploading: self.uploads.is_uploading(),
            queued_batches: self.uploads.deferred_len(),
            display_name: self
                .session
                .as_ref()
                .and_then(|session| session.display_name.clone()),
            settings: self.prefs.upload_settings(),
            locale: self.prefs.locale.clone(),
            analytics: self.prefs.analytics.clone(),
            last_batch: self.last_batch.clone(),
            notifications: self.notifications.clone(),
            dirty: self.dirty,
        }
    }

    pub fn jobs(&self) -> &JobList {
        &self.jobs
    }

    pub fn preferences(&self) -> &ClientPreferences {
        &self.prefs
    }

    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    /// True when nothing is outstanding: no refresh, upload, ingestion or request.
    /// An armed poll timer does not count.
    pub fn is_settled(&self) -> bool {
        !self.refresh.is_busy()
            && self.uploads.is_idle()
            && self.preparing == 0
            && self.requests_in_flight == 0
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Hand pending notifications to the presentation layer.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub(crate) fn jobs_mut(&mut self) -> &mut JobList {
        self.dirty = true;
        &mut self.jobs
    }

    pub(crate) fn uploads_mut(&mut self) -> &mut UploadQueue {
        self.dirty = true;
        &mut self.uploads
    }

    pub(crate) fn prefs_mut(&mut self) -> &mut ClientPreferences {
        self.dirty = true;
        &mut self.prefs
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn notify(&mut self, level: NotificationLevel, text: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            text: text.into(),
        });
        self.dirty = true;
    }

    pub(crate) fn configure_polling(&mut self, enabled: bool, interval: Duration) {
        self.poll.configure(enabled, interval);
        self.dirty = true;
    }

    /// Route a refresh trigger through the gate; pushes `FetchJobs` only when one starts.
    pub(crate) fn request_refresh(&mut self, trigger: RefreshTrigger, effects: &mut Vec<Effect>) {
        match self.refresh.request(trigger) {
            RefreshDecision::Start => {
                bindery_debug!("refresh started ({trigger:?})");
                self.dirty = true;
                effects.push(Effect::FetchJobs);
            }
            RefreshDecision::Dropped => {
                bindery_debug!("refresh dropped ({trigger:?}): one is in flight");
            }
            RefreshDecision::Coalesced => {
                bindery_debug!("refresh queued behind the one in flight");
            }
        }
    }

    /// The outstanding refresh settled: either start the coalesced follow-up or re-arm polling.
    pub(crate) fn refresh_settled(&mut self, effects: &mut Vec<Effect>) {
        self.dirty = true;
        if self.refresh.settle() {
            effects.push(Effect::FetchJobs);
            return;
        }
        if let Some((generation, after)) = self.poll.arm() {
            effects.push(Effect::SchedulePoll { generation, after });
        }
    }

    pub(crate) fn accept_poll_tick(&mut self, generation: u64) -> bool {
        self.poll.accept_tick(generation)
    }

    pub(crate) fn set_auto_refresh(&mut self, enabled: bool, effects: &mut Vec<Effect>) {
        if enabled == self.poll.is_enabled() {
            return;
        }
        self.dirty = true;
        self.poll.set_enabled(enabled);
        if !enabled {
            self.poll.disarm();
            effects.push(Effect::CancelPoll);
        } else if !self.refresh.is_busy() {
            // Re-arming while a refresh is outstanding happens when it settles.
            if let Some((generation, after)) = self.poll.arm() {
                effects.push(Effect::SchedulePoll { generation, after });
            }
        }
    }

    pub(crate) fn begin_preparing(&mut self) {
        self.preparing += 1;
        self.dirty = true;
    }

    pub(crate) fn finish_preparing(&mut self) {
        self.preparing = self.preparing.saturating_sub(1);
    }

    pub(crate) fn begin_request(&mut self) {
        self.requests_in_flight += 1;
    }

    pub(crate) fn finish_request(&mut self) {
        self.requests_in_flight = self.requests_in_flight.saturating_sub(1);
    }

    pub(crate) fn set_last_batch(&mut self, summary: BatchSummary) {
        self.last_batch = Some(summary);
        self.dirty = true;
    }

    pub(crate) fn set_session(&mut self, session: SessionInfo) {
        self.session = Some(session);
        self.dirty = true;
    }

    pub(crate) fn set_display_name(&mut self, display_name: Option<String>) {
        let session = self.session.get_or_insert_with(SessionInfo::default);
        session.display_name = display_name;
        self.dirty = true;
    }
}

/// Trim and bound a display name the way the profile endpoint stores it.
pub(crate) fn normalize_display_name(raw: &str) -> String {
    raw.trim().chars().take(MAX_DISPLAY_NAME).collect()
}
