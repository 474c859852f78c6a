use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context};
use bindery_core::{
    update, AppState, AppViewModel, ClientPreferences, JobAction, Msg, NotificationLevel,
};
use bindery_engine::{ClientSettings, EngineHandle, EngineOptions, ReqwestJobApi};
use bindery_logging::{bindery_debug, bindery_info};

use crate::cli::{settings_patch, Cli, Command};
use crate::effects::EffectRunner;
use crate::persistence::PreferencesStore;
use crate::render;

const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Keyboard input while watching.
enum Input {
    Msg(Msg),
    Quit,
}

/// Owns the core state and feeds it messages, one at a time.
struct Driver {
    state: AppState,
    runner: EffectRunner,
    client: ClientSettings,
    errors: usize,
}

impl Driver {
    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        for notification in state.take_notifications() {
            if notification.level == NotificationLevel::Error {
                self.errors += 1;
            }
            println!("{}", render::notification_line(&notification));
        }
        self.state = state;
        self.runner.run(effects);
    }

    /// Process engine results until nothing is outstanding.
    fn settle(&mut self) {
        while !self.state.is_settled() {
            if let Some(msg) = self.runner.next_msg(WAIT_SLICE) {
                self.dispatch(msg);
            }
        }
    }

    fn print_jobs(&mut self) {
        self.state.consume_dirty();
        for line in render::job_lines(&self.state.view(), &self.client) {
            println!("{line}");
        }
    }

    fn watch(&mut self, inputs: mpsc::Receiver<Input>) {
        let mut last_shown: Option<AppViewModel> = None;
        self.show_if_changed(&mut last_shown);
        loop {
            if let Some(msg) = self.runner.next_msg(WAIT_SLICE) {
                self.dispatch(msg);
            }
            loop {
                match inputs.try_recv() {
                    Ok(Input::Msg(msg)) => self.dispatch(msg),
                    Ok(Input::Quit) => return,
                    Err(mpsc::TryRecvError::Empty) => break,
                    // stdin closed; keep watching until interrupted
                    Err(mpsc::TryRecvError::Disconnected) => break,
                }
            }
            if self.state.consume_dirty() {
                self.show_if_changed(&mut last_shown);
            }
        }
    }

    /// Redraw only when the list, totals or refresh mode changed.
    fn show_if_changed(&mut self, last_shown: &mut Option<AppViewModel>) {
        let view = self.state.view();
        let changed = last_shown.as_ref().map_or(true, |last| {
            last.jobs != view.jobs
                || last.stats != view.stats
                || last.auto_refresh != view.auto_refresh
                || last.display_name != view.display_name
        });
        if changed {
            println!();
            for line in render::job_lines(&view, &self.client) {
                println!("{line}");
            }
            *last_shown = Some(view);
        }
    }
}

pub fn run(cli: Cli, state_dir: PathBuf) -> anyhow::Result<()> {
    let client = ClientSettings {
        base_url: cli.server.clone(),
        ..ClientSettings::default()
    };
    let api = ReqwestJobApi::new(client.clone())
        .with_context(|| format!("invalid --server value '{}'", cli.server))?;
    let engine = EngineHandle::new(Arc::new(api), EngineOptions::default())
        .context("failed to start the engine thread")?;

    let store = PreferencesStore::new(state_dir);
    let prefs = store.load();
    bindery_debug!("preferences file {:?}", store.path());

    let mut driver = Driver {
        state: AppState::new(),
        runner: EffectRunner::new(engine, store),
        client,
        errors: 0,
    };
    driver.dispatch(Msg::RestorePreferences(prefs));

    let poll_interval = Duration::from_secs(cli.poll_interval_secs);
    if cli.command.needs_snapshot() {
        let auto_refresh = matches!(
            cli.command,
            Command::Watch {
                no_auto_refresh: false
            }
        );
        driver.dispatch(Msg::Started {
            auto_refresh,
            poll_interval,
        });
        driver.settle();
    }

    match cli.command {
        Command::Upload { paths, force } => {
            if force {
                // Applies to this run only; not written back.
                let prefs = ClientPreferences {
                    force_regenerate: true,
                    ..driver.state.preferences().clone()
                };
                driver.dispatch(Msg::RestorePreferences(prefs));
            }
            driver.dispatch(Msg::PathsDropped(paths));
            driver.settle();
            driver.print_jobs();
        }
        Command::Jobs => driver.print_jobs(),
        Command::Watch { no_auto_refresh } => {
            let inputs = spawn_keyboard_reader(!no_auto_refresh);
            driver.watch(inputs);
            return Ok(());
        }
        Command::Retry { id } => run_action(&mut driver, id, JobAction::Retry),
        Command::Cancel { id } => run_action(&mut driver, id, JobAction::Cancel),
        Command::Delete { id } => run_action(&mut driver, id, JobAction::Delete),
        Command::Reveal { id } => run_action(&mut driver, id, JobAction::Reveal),
        Command::Clear => {
            driver.dispatch(Msg::ClearRequested);
            driver.settle();
            driver.print_jobs();
        }
        Command::Settings {
            page_size,
            margin_mm,
            force_regenerate,
            locale,
        } => {
            let patch = settings_patch(page_size, margin_mm, force_regenerate, locale);
            if !patch.is_empty() {
                driver.dispatch(Msg::PreferencesChanged(patch));
            }
            for line in render::preference_lines(driver.state.preferences()) {
                println!("{line}");
            }
        }
        Command::Profile { name } => {
            driver.dispatch(Msg::ProfileSaveRequested(name));
            driver.settle();
            if let Some(name) = driver.state.view().display_name {
                println!("Display name: {name}");
            }
        }
        Command::Analytics => {
            driver.dispatch(Msg::AnalyticsRequested);
            driver.settle();
            for line in render::analytics_lines(driver.state.preferences().analytics.as_ref()) {
                println!("{line}");
            }
        }
    }

    if driver.errors > 0 {
        bail!("{} operation(s) reported errors", driver.errors);
    }
    Ok(())
}

fn run_action(driver: &mut Driver, job_id: String, action: JobAction) {
    bindery_info!("requesting {} of {job_id}", action.label());
    driver.dispatch(Msg::JobActionRequested { job_id, action });
    driver.settle();
    driver.print_jobs();
}

/// Enter refreshes, `a` toggles auto-refresh, `q` quits.
fn spawn_keyboard_reader(mut auto_refresh: bool) -> mpsc::Receiver<Input> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let input = match line.trim() {
                "q" | "quit" => Input::Quit,
                "a" => {
                    auto_refresh = !auto_refresh;
                    Input::Msg(Msg::AutoRefreshToggled(auto_refresh))
                }
                _ => Input::Msg(Msg::RefreshRequested),
            };
            if tx.send(input).is_err() {
                break;
            }
        }
    });
    rx
}
