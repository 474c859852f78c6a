use std::time::Duration;

use bindery_core::{Effect, Msg, ServerAction};
use bindery_engine::{EngineEvent, EngineHandle};
use bindery_logging::{bindery_debug, bindery_info, bindery_warn};

use crate::persistence::PreferencesStore;

/// Executes core effects: IO through the engine, preferences on disk.
pub struct EffectRunner {
    engine: EngineHandle,
    store: PreferencesStore,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, store: PreferencesStore) -> Self {
        Self { engine, store }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchSession => {
                    bindery_debug!("FetchSession");
                    self.engine.fetch_session();
                }
                Effect::FetchJobs => {
                    bindery_debug!("FetchJobs");
                    self.engine.fetch_jobs();
                }
                Effect::SchedulePoll { generation, after } => {
                    bindery_debug!("SchedulePoll generation={} after={:?}", generation, after);
                    self.engine.schedule_poll(generation, after);
                }
                Effect::CancelPoll => {
                    bindery_debug!("CancelPoll");
                    self.engine.cancel_poll();
                }
                Effect::PrepareUploads { paths } => {
                    bindery_info!("PrepareUploads count={}", paths.len());
                    self.engine.prepare_uploads(paths);
                }
                Effect::Upload {
                    batch_id,
                    index,
                    input,
                    settings,
                } => {
                    bindery_info!(
                        "Upload batch={} index={} file={} bytes={} page_size={} margin_mm={} force={}",
                        batch_id,
                        index,
                        input.filename(),
                        input.payload().len(),
                        settings.page_size.as_str(),
                        settings.margin_mm,
                        settings.force
                    );
                    self.engine.upload(batch_id, index, input, settings);
                }
                Effect::RetryJob { job_id } => self.job_action(job_id, ServerAction::Retry),
                Effect::CancelJob { job_id } => self.job_action(job_id, ServerAction::Cancel),
                Effect::DeleteJob { job_id } => self.job_action(job_id, ServerAction::Delete),
                Effect::RevealJob { job_id } => self.job_action(job_id, ServerAction::Reveal),
                Effect::ClearJobs => {
                    bindery_info!("ClearJobs");
                    self.engine.clear_jobs();
                }
                Effect::SaveProfile { display_name } => {
                    bindery_info!("SaveProfile name_len={}", display_name.len());
                    self.engine.save_profile(display_name);
                }
                Effect::FetchAnalytics => {
                    bindery_debug!("FetchAnalytics");
                    self.engine.fetch_analytics();
                }
                Effect::PersistPreferences(prefs) => {
                    bindery_debug!("PersistPreferences");
                    self.store.save(&prefs);
                }
            }
        }
    }

    /// Wait up to `timeout` for the next engine result.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        self.engine.recv_timeout(timeout).map(event_to_msg)
    }

    fn job_action(&self, job_id: String, action: ServerAction) {
        bindery_info!("JobAction {} job_id={}", action.label(), job_id);
        self.engine.job_action(job_id, action);
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SessionLoaded(result) => {
            Msg::SessionLoaded(result.map_err(|e| e.to_string()))
        }
        EngineEvent::JobsLoaded(result) => Msg::JobsLoaded(result.map_err(|e| e.to_string())),
        EngineEvent::PollTick { generation } => Msg::PollTick { generation },
        EngineEvent::InputsPrepared { inputs, rejected } => {
            Msg::InputsPrepared { inputs, rejected }
        }
        EngineEvent::UploadFinished {
            batch_id,
            index,
            result,
        } => {
            if let Err(err) = &result {
                bindery_warn!("Upload batch={} index={} failed: {}", batch_id, index, err);
            }
            Msg::UploadItemFinished {
                batch_id,
                index,
                result: result.map_err(|e| e.to_string()),
            }
        }
        EngineEvent::ActionFinished {
            job_id,
            action,
            result,
        } => Msg::JobActionFinished {
            job_id,
            action,
            result: result.map_err(|e| e.to_string()),
        },
        EngineEvent::Cleared(result) => Msg::ClearFinished(result.map_err(|e| e.to_string())),
        EngineEvent::ProfileSaved(result) => Msg::ProfileSaved(result.map_err(|e| e.to_string())),
        EngineEvent::AnalyticsLoaded(result) => {
            Msg::AnalyticsLoaded(result.map_err(|e| e.to_string()))
        }
    }
}
