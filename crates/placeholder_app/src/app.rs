use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use engine_logging::{engine_info, engine_warn};
use placeholder_core::{update, AppState, ArchiverStatus, Msg, PreviewState};
use placeholder_engine::scan_selection;

use crate::cli::{skip_matches, Cli};
use crate::config::AppConfig;
use crate::effects::{selected_file, EffectRunner};
use crate::render::{queue_listing, TerminalRenderer};

const READY_TIMEOUT: Duration = Duration::from_secs(10);
const PREVIEW_TIMEOUT: Duration = Duration::from_secs(60);
const TICK: Duration = Duration::from_millis(75);

/// Selects the folders, applies skips, then generates and waits for the archive.
pub fn run(cli: &Cli, config: AppConfig) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(config.engine_config(), msg_tx);
    let mut app = App::new(runner, msg_rx);
    app.render();

    for folder in &cli.folders {
        let files = scan_selection(folder)
            .with_context(|| format!("scanning {}", folder.display()))?;
        engine_info!("Selected {:?}: {} file(s)", folder, files.len());
        app.dispatch(Msg::FilesSelected(
            files.into_iter().map(selected_file).collect(),
        ));
        if let Some(stats) = app.state.view().last_ingest {
            engine_info!(
                "Queued {} image(s); {} duplicate(s), {} non-image file(s) ignored",
                stats.added,
                stats.duplicates,
                stats.ignored
            );
        }
    }

    let previews_done = app.pump_until(Some(PREVIEW_TIMEOUT), |state| {
        state
            .items()
            .iter()
            .all(|item| item.preview() != PreviewState::Pending)
    });
    if !previews_done {
        engine_warn!("Some previews did not finish loading");
    }

    for pattern in &cli.skip {
        let ids: Vec<_> = app
            .state
            .items()
            .iter()
            .filter(|item| skip_matches(item.relative_path(), pattern))
            .map(|item| item.id().clone())
            .collect();
        if ids.is_empty() {
            engine_warn!("--skip {} matched no queued item", pattern);
        }
        for id in ids {
            app.dispatch(Msg::SkipToggled(id));
        }
    }
    if cli.skip_all {
        app.dispatch(Msg::SkipAllToggled);
    }

    if cli.list {
        for line in queue_listing(&app.state.view()) {
            println!("{line}");
        }
        return Ok(());
    }

    let settled = app.pump_until(Some(READY_TIMEOUT), |state| {
        *state.archiver() != ArchiverStatus::Loading
    });
    if !settled {
        bail!("archive capability did not report readiness within {READY_TIMEOUT:?}");
    }
    if let ArchiverStatus::Unavailable(reason) = app.state.archiver() {
        bail!("{} ({reason})", app.state.status());
    }

    app.dispatch(Msg::GenerateClicked);
    if !app.state.is_generating() {
        bail!("{}", app.state.status());
    }
    app.pump_until(None, |state| !state.is_generating());

    let view = app.state.view();
    let saved = view.last_run.as_ref().and_then(|tally| tally.saved_to.clone());
    if saved.is_none() {
        bail!("{}", view.status);
    }
    if let Some(tally) = &view.last_run {
        if tally.failed > 0 {
            engine_warn!("{} image(s) could not be converted and were left out", tally.failed);
        }
    }

    app.dispatch(Msg::ClearClicked);
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    msg_rx: mpsc::Receiver<Msg>,
    renderer: TerminalRenderer,
}

impl App {
    fn new(runner: EffectRunner, msg_rx: mpsc::Receiver<Msg>) -> Self {
        Self {
            state: AppState::new(),
            runner,
            msg_rx,
            renderer: TerminalRenderer::default(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        if was_dirty {
            self.render();
        }
    }

    fn render(&mut self) {
        let view = self.state.view();
        self.renderer.render(&view);
    }

    /// Feeds engine messages through `update` until `done` holds.
    /// Returns false if `timeout` elapsed or the engine went away first.
    fn pump_until<F>(&mut self, timeout: Option<Duration>, done: F) -> bool
    where
        F: Fn(&AppState) -> bool,
    {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            if done(&self.state) {
                return true;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return false;
            }
            match self.msg_rx.recv_timeout(TICK) {
                Ok(msg) => self.dispatch(msg),
                Err(RecvTimeoutError::Timeout) => self.dispatch(Msg::Tick),
                Err(RecvTimeoutError::Disconnected) => return done(&self.state),
            }
        }
    }
}
