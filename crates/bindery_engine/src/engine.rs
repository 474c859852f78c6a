use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use bindery_core::{BatchId, JobId, ServerAction, UploadInput, UploadSettings};
use bindery_logging::{bindery_debug, bindery_trace};
use tokio::sync::mpsc as async_mpsc;
use tokio::task::JoinHandle;

use crate::client::JobApi;
use crate::ingest::prepare_inputs;
use crate::walker::DEFAULT_BATCH_SIZE;
use crate::EngineEvent;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Directory entries requested per walker read.
    pub walk_batch_size: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            walk_batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

enum EngineCommand {
    SchedulePoll { generation: u64, after: Duration },
    CancelPoll,
    Run(Task),
}

/// One-shot IO, each reported by exactly one event.
enum Task {
    FetchSession,
    FetchJobs,
    PrepareUploads {
        paths: Vec<PathBuf>,
    },
    Upload {
        batch_id: BatchId,
        index: usize,
        input: UploadInput,
        settings: UploadSettings,
    },
    JobAction {
        job_id: JobId,
        action: ServerAction,
    },
    ClearJobs,
    SaveProfile {
        display_name: String,
    },
    FetchAnalytics,
}

/// Runs IO on a dedicated thread with a single-threaded runtime.
///
/// Commands are executed as tasks interleaved on that one thread; results
/// come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(api: Arc<dyn JobApi>, options: EngineOptions) -> io::Result<Self> {
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("bindery-engine".to_string())
            .spawn(move || runtime.block_on(run(api, options, cmd_rx, event_tx)))?;

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn fetch_session(&self) {
        self.run(Task::FetchSession);
    }

    pub fn fetch_jobs(&self) {
        self.run(Task::FetchJobs);
    }

    /// Arm the poll timer, replacing any armed one.
    pub fn schedule_poll(&self, generation: u64, after: Duration) {
        self.send(EngineCommand::SchedulePoll { generation, after });
    }

    pub fn cancel_poll(&self) {
        self.send(EngineCommand::CancelPoll);
    }

    pub fn prepare_uploads(&self, paths: Vec<PathBuf>) {
        self.run(Task::PrepareUploads { paths });
    }

    pub fn upload(
        &self,
        batch_id: BatchId,
        index: usize,
        input: UploadInput,
        settings: UploadSettings,
    ) {
        self.run(Task::Upload {
            batch_id,
            index,
            input,
            settings,
        });
    }

    pub fn job_action(&self, job_id: JobId, action: ServerAction) {
        self.run(Task::JobAction { job_id, action });
    }

    pub fn clear_jobs(&self) {
        self.run(Task::ClearJobs);
    }

    pub fn save_profile(&self, display_name: String) {
        self.run(Task::SaveProfile { display_name });
    }

    pub fn fetch_analytics(&self) {
        self.run(Task::FetchAnalytics);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn run(&self, task: Task) {
        self.send(EngineCommand::Run(task));
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn run(
    api: Arc<dyn JobApi>,
    options: EngineOptions,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut poll_timer: Option<JoinHandle<()>> = None;

    while let Some(command) = cmd_rx.recv().await {
        match command {
            EngineCommand::SchedulePoll { generation, after } => {
                if let Some(timer) = poll_timer.take() {
                    timer.abort();
                }
                bindery_trace!("poll {generation} armed for {after:?}");
                let event_tx = event_tx.clone();
                poll_timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = event_tx.send(EngineEvent::PollTick { generation });
                }));
            }
            EngineCommand::CancelPoll => {
                if let Some(timer) = poll_timer.take() {
                    bindery_trace!("poll timer cancelled");
                    timer.abort();
                }
            }
            EngineCommand::Run(task) => {
                let api = api.clone();
                let event_tx = event_tx.clone();
                let batch_size = options.walk_batch_size;
                tokio::spawn(async move {
                    let event = execute(api.as_ref(), task, batch_size).await;
                    let _ = event_tx.send(event);
                });
            }
        }
    }

    if let Some(timer) = poll_timer {
        timer.abort();
    }
    bindery_debug!("engine command channel closed");
}

async fn execute(api: &dyn JobApi, task: Task, batch_size: usize) -> EngineEvent {
    match task {
        Task::FetchSession => EngineEvent::SessionLoaded(api.session().await),
        Task::FetchJobs => EngineEvent::JobsLoaded(api.list_jobs().await),
        Task::PrepareUploads { paths } => {
            let (inputs, rejected) = prepare_inputs(paths, batch_size).await;
            EngineEvent::InputsPrepared { inputs, rejected }
        }
        Task::Upload {
            batch_id,
            index,
            input,
            settings,
        } => EngineEvent::UploadFinished {
            batch_id,
            index,
            result: api.create_job(&input, &settings).await,
        },
        Task::JobAction { job_id, action } => {
            let result = match action {
                ServerAction::Retry => api.retry_job(&job_id).await,
                ServerAction::Cancel | ServerAction::Delete => api.delete_job(&job_id).await,
                ServerAction::Reveal => api.reveal_job(&job_id).await,
            };
            EngineEvent::ActionFinished {
                job_id,
                action,
                result,
            }
        }
        Task::ClearJobs => EngineEvent::Cleared(api.clear_jobs().await),
        Task::SaveProfile { display_name } => {
            EngineEvent::ProfileSaved(api.update_profile(&display_name).await)
        }
        Task::FetchAnalytics => EngineEvent::AnalyticsLoaded(api.analytics().await),
    }
}
