use bindery_logging::{bindery_debug, bindery_info, bindery_warn};

use crate::input::has_accepted_extension;
use crate::job::normalize_margin;
use crate::state::normalize_display_name;
use crate::upload::{ItemSettled, UploadRequest};
use crate::{
    ActionReply, AppState, BatchId, BatchSummary, Effect, JobAction, JobId, Msg,
    NotificationLevel, RefreshTrigger, Rejection, RejectionReason, ServerAction, UploadInput,
    UploadOutcome,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let mut effects = Vec::new();
    match msg {
        Msg::Started {
            auto_refresh,
            poll_interval,
        } => {
            state.configure_polling(auto_refresh, poll_interval);
            state.begin_request();
            effects.push(Effect::FetchSession);
            state.request_refresh(RefreshTrigger::Manual, &mut effects);
        }
        Msg::RestorePreferences(mut prefs) => {
            prefs.margin_mm = normalize_margin(prefs.margin_mm);
            *state.prefs_mut() = prefs;
        }
        Msg::PreferencesChanged(patch) => {
            if patch.apply(state.prefs_mut()) {
                effects.push(Effect::PersistPreferences(state.preferences().clone()));
                state.notify(NotificationLevel::Success, "Settings saved");
            }
        }
        Msg::RefreshRequested => state.request_refresh(RefreshTrigger::Manual, &mut effects),
        Msg::PollTick { generation } => {
            if state.accept_poll_tick(generation) {
                state.request_refresh(RefreshTrigger::Poll, &mut effects);
            } else {
                bindery_debug!("ignoring stale poll tick {generation}");
            }
        }
        Msg::AutoRefreshToggled(enabled) => state.set_auto_refresh(enabled, &mut effects),
        Msg::JobsLoaded(result) => {
            match result {
                Ok(jobs) => state.jobs_mut().apply_server_snapshot(jobs),
                Err(message) => {
                    bindery_warn!("job list refresh failed: {message}");
                    state.notify(
                        NotificationLevel::Error,
                        format!("Failed to load jobs: {message}"),
                    );
                }
            }
            state.refresh_settled(&mut effects);
        }
        Msg::PathsDropped(paths) => {
            if !paths.is_empty() {
                state.begin_preparing();
                effects.push(Effect::PrepareUploads { paths });
            }
        }
        Msg::InputsPrepared { inputs, rejected } => {
            state.finish_preparing();
            submit_batch(&mut state, inputs, rejected, &mut effects);
        }
        Msg::UploadBatchSubmitted { inputs, rejected } => {
            submit_batch(&mut state, inputs, rejected, &mut effects);
        }
        Msg::UploadItemFinished {
            batch_id,
            index,
            result,
        } => upload_finished(&mut state, batch_id, index, result, &mut effects),
        Msg::JobActionRequested { job_id, action } => {
            request_action(&mut state, job_id, action, &mut effects);
        }
        Msg::JobActionFinished {
            job_id,
            action,
            result,
        } => action_finished(&mut state, job_id, action, result, &mut effects),
        Msg::ClearRequested => {
            state.begin_request();
            effects.push(Effect::ClearJobs);
        }
        Msg::ClearFinished(result) => {
            state.finish_request();
            match result {
                Ok(()) => {
                    state.jobs_mut().clear();
                    state.notify(NotificationLevel::Success, "History cleared");
                }
                Err(message) => state.notify(
                    NotificationLevel::Error,
                    format!("Failed to clear history: {message}"),
                ),
            }
            state.request_refresh(RefreshTrigger::AfterMutation, &mut effects);
        }
        Msg::SessionLoaded(result) => {
            state.finish_request();
            match result {
                Ok(session) => state.set_session(session),
                Err(message) => bindery_debug!("no session available: {message}"),
            }
        }
        Msg::ProfileSaveRequested(raw) => {
            state.begin_request();
            effects.push(Effect::SaveProfile {
                display_name: normalize_display_name(&raw),
            });
        }
        Msg::ProfileSaved(result) => {
            state.finish_request();
            match result {
                Ok(display_name) => {
                    state.set_display_name(display_name);
                    state.notify(NotificationLevel::Success, "Profile updated");
                }
                Err(message) => state.notify(
                    NotificationLevel::Error,
                    format!("Failed to update profile: {message}"),
                ),
            }
        }
        Msg::AnalyticsRequested => {
            state.begin_request();
            effects.push(Effect::FetchAnalytics);
        }
        Msg::AnalyticsLoaded(result) => {
            state.finish_request();
            match result {
                Ok(snapshot) => {
                    state.prefs_mut().analytics = Some(snapshot);
                    effects.push(Effect::PersistPreferences(state.preferences().clone()));
                }
                Err(message) => {
                    let fallback = if state.preferences().analytics.is_some() {
                        "; showing cached figures"
                    } else {
                        ""
                    };
                    state.notify(
                        NotificationLevel::Error,
                        format!("Failed to load analytics: {message}{fallback}"),
                    );
                }
            }
        }
    }

    (state, effects)
}

fn submit_batch(
    state: &mut AppState,
    inputs: Vec<UploadInput>,
    mut rejected: Vec<Rejection>,
    effects: &mut Vec<Effect>,
) {
    let mut accepted = Vec::with_capacity(inputs.len());
    for input in inputs {
        match &input {
            UploadInput::PlainFile(file) if !has_accepted_extension(&file.name) => {
                rejected.push(Rejection {
                    name: file.name.clone(),
                    reason: RejectionReason::WrongExtension,
                });
            }
            _ => accepted.push(input),
        }
    }

    for rejection in &rejected {
        bindery_warn!("input rejected locally: {rejection}");
        state.notify(NotificationLevel::Error, rejection.to_string());
    }

    if accepted.is_empty() {
        if !rejected.is_empty() {
            state.set_last_batch(BatchSummary {
                rejected: rejected.len(),
                ..BatchSummary::default()
            });
        }
        return;
    }

    let count = accepted.len();
    match state.uploads_mut().submit(accepted, rejected.len()) {
        Some(request) => {
            bindery_info!("upload batch {} started with {count} item(s)", request.batch_id);
            state.notify(
                NotificationLevel::Info,
                format!("Uploading {count} file(s)..."),
            );
            effects.push(upload_effect(state, request));
        }
        None => state.notify(
            NotificationLevel::Info,
            format!("{count} file(s) queued behind the upload in progress"),
        ),
    }
}

fn upload_finished(
    state: &mut AppState,
    batch_id: BatchId,
    index: usize,
    result: Result<UploadOutcome, String>,
    effects: &mut Vec<Effect>,
) {
    let settled = state
        .uploads_mut()
        .settle(batch_id, index, result.as_ref().ok());
    let (filename, next, summary) = match settled {
        ItemSettled::Ignored => {
            bindery_warn!("ignoring result for unknown upload {batch_id}/{index}");
            return;
        }
        ItemSettled::Next { filename, request } => (filename, Some(request), None),
        ItemSettled::BatchDone {
            filename,
            summary,
            next_batch,
        } => (filename, next_batch, Some(summary)),
    };

    match result {
        Ok(UploadOutcome::Created(job)) => {
            state.jobs_mut().apply_optimistic_insert(job);
            state.notify(
                NotificationLevel::Success,
                format!("{filename}: queued for conversion"),
            );
        }
        Ok(UploadOutcome::Skipped(job)) => {
            state.jobs_mut().apply_optimistic_insert(job);
            state.notify(
                NotificationLevel::Info,
                format!("{filename}: unchanged, reusing the existing PDF"),
            );
        }
        Err(message) => {
            bindery_warn!("upload of {filename} failed: {message}");
            state.notify(
                NotificationLevel::Error,
                format!("{filename}: upload failed: {message}"),
            );
        }
    }

    if let Some(summary) = summary {
        state.notify(
            NotificationLevel::Info,
            format!(
                "Upload finished: {} created, {} skipped, {} failed, {} rejected",
                summary.created, summary.skipped, summary.failed, summary.rejected
            ),
        );
        state.set_last_batch(summary);
        state.request_refresh(RefreshTrigger::AfterMutation, effects);
    }

    if let Some(request) = next {
        effects.push(upload_effect(state, request));
    }
}

fn upload_effect(state: &AppState, request: UploadRequest) -> Effect {
    Effect::Upload {
        batch_id: request.batch_id,
        index: request.index,
        input: request.input,
        settings: state.preferences().upload_settings(),
    }
}

fn request_action(
    state: &mut AppState,
    job_id: JobId,
    action: JobAction,
    effects: &mut Vec<Effect>,
) {
    let Some(job) = state.jobs().get(&job_id) else {
        state.notify(NotificationLevel::Error, format!("Unknown job {job_id}"));
        return;
    };
    if !job.allows(action) {
        let text = format!(
            "Cannot {} job {job_id} while it is {}",
            action.label(),
            job.status.label()
        );
        state.notify(NotificationLevel::Error, text);
        return;
    }
    let Some(server_action) = action.on_server() else {
        let url = job.download_url.clone().unwrap_or_default();
        state.notify(NotificationLevel::Info, format!("Download: {url}"));
        return;
    };

    let effect = match server_action {
        ServerAction::Retry => Effect::RetryJob { job_id },
        ServerAction::Cancel => Effect::CancelJob { job_id },
        ServerAction::Delete => Effect::DeleteJob { job_id },
        ServerAction::Reveal => Effect::RevealJob { job_id },
    };
    state.begin_request();
    state.mark_dirty();
    effects.push(effect);
}

fn action_finished(
    state: &mut AppState,
    job_id: JobId,
    action: ServerAction,
    result: Result<ActionReply, String>,
    effects: &mut Vec<Effect>,
) {
    state.finish_request();
    match result {
        Ok(reply) => {
            match action {
                ServerAction::Retry | ServerAction::Cancel => {
                    if let Some(job) = reply.job {
                        state.jobs_mut().apply_optimistic_upsert(job);
                    }
                }
                ServerAction::Delete => state.jobs_mut().apply_removal(&job_id),
                ServerAction::Reveal => {}
            }
            let text = reply
                .message
                .unwrap_or_else(|| success_text(action).to_string());
            state.notify(NotificationLevel::Success, text);
        }
        Err(message) => {
            bindery_warn!("{} of job {job_id} failed: {message}", action.label());
            state.notify(
                NotificationLevel::Error,
                format!("Could not {} job: {message}", action.label()),
            );
        }
    }

    if action != ServerAction::Reveal {
        state.request_refresh(RefreshTrigger::AfterMutation, effects);
    }
}

fn success_text(action: ServerAction) -> &'static str {
    match action {
        ServerAction::Retry => "Job queued again",
        ServerAction::Cancel => "Job marked as canceled",
        ServerAction::Delete => "Job deleted",
        ServerAction::Reveal => "Opened in file manager",
    }
}
