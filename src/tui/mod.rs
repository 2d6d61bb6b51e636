//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values, and carries out
//! the Effects that `update()` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Store calls
//!
//! Every `Browser` call blocks on the network, so each one runs on
//! tokio's blocking pool and reports back as an `Action` over an mpsc
//! channel. The event loop drains that channel between frames. The UI
//! never waits on the server.
//!
//! ## Redraw Strategy
//!
//! - **Loading** (scan or fetch in flight): draws every ~80ms so the
//!   spinner moves.
//! - **Idle**: sleeps up to 500ms, only redraws on events or results.

mod component;
mod components;
mod event;
pub mod highlight;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, ValueView};
use crate::store::{Browser, Inspection, StoreError};
use crate::tui::component::EventHandler;
use crate::tui::components::{
    DetailEvent, DetailViewState, FinderEvent, KeyListState, PatternEvent, PatternInput,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// TUI-specific presentation state (not part of core browsing logic)
pub struct TuiState {
    // Persistent component states
    pub key_list: KeyListState,
    pub detail: DetailViewState,
    // Pattern prompt overlay (None = hidden)
    pub pattern_input: Option<PatternInput>,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            key_list: KeyListState::new(),
            detail: DetailViewState::new(),
            pattern_input: None,
        }
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

pub fn run(browser: Arc<Browser>, config: ResolvedConfig) -> std::io::Result<()> {
    let mut app = App::new(browser, &config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to enable terminal modes: {}", e))
        .ok();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    // First scan with the configured pattern
    dispatch(&mut app, &mut tui, Action::Rescan, &tx);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    loop {
        let animating = is_waiting(&app);
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if animating {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(&mut app, &mut tui, event, &tx) {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        // Results from the blocking pool
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, action, &tx) {
                should_quit = true;
            }
        }
        if should_quit {
            break;
        }
    }

    ratatui::restore();
    info!("Redview shutting down");
    Ok(())
}

/// True while any store call the user can see is outstanding.
fn is_waiting(app: &App) -> bool {
    let loading = |view: &Option<ValueView>| matches!(view, Some(ValueView::Loading { .. }));
    app.is_loading || loading(&app.preview) || loading(&app.detail)
}

/// Route one terminal event. Returns true when the app should quit.
fn handle_event(
    app: &mut App,
    tui: &mut TuiState,
    event: TuiEvent,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match event {
        // Resize just needs a redraw
        TuiEvent::Resize => return false,
        // ForceQuit (Ctrl+C) always quits regardless of page
        TuiEvent::ForceQuit => return dispatch(app, tui, Action::Quit, tx),
        _ => {}
    }

    // The error banner is modal: the next key only dismisses it
    if app.error.is_some() {
        return dispatch(app, tui, Action::DismissError, tx);
    }

    if let Some(input) = tui.pattern_input.as_mut() {
        return match input.handle_event(&event) {
            Some(PatternEvent::Submit(pattern)) => {
                tui.pattern_input = None;
                dispatch(app, tui, Action::SetPattern(pattern), tx)
            }
            Some(PatternEvent::Cancel) => {
                tui.pattern_input = None;
                false
            }
            Some(PatternEvent::Changed) | None => false,
        };
    }

    if app.detail.is_some() {
        return match tui.detail.handle_event(&event) {
            Some(DetailEvent::Close) => dispatch(app, tui, Action::CloseDetail, tx),
            None => false,
        };
    }

    match tui.key_list.handle_event(&event) {
        Some(FinderEvent::Dispatch(action)) => dispatch(app, tui, action, tx),
        Some(FinderEvent::EditPattern) => {
            tui.pattern_input = Some(PatternInput::new(&app.pattern));
            false
        }
        None => false,
    }
}

/// Run an action through the reducer and start whatever I/O it asks for.
/// Returns true when the app should quit.
fn dispatch(app: &mut App, tui: &mut TuiState, action: Action, tx: &mpsc::Sender<Action>) -> bool {
    match update(app, action) {
        Effect::None => false,
        Effect::Quit => true,
        Effect::Scan {
            generation,
            pattern,
        } => {
            spawn_scan(Arc::clone(&app.browser), generation, pattern, tx.clone());
            false
        }
        Effect::LoadPreview(key) => {
            spawn_inspect(Arc::clone(&app.browser), key, tx.clone(), |key, result| {
                Action::PreviewLoaded { key, result }
            });
            false
        }
        Effect::LoadDetail(key) => {
            tui.detail.reset();
            spawn_inspect(Arc::clone(&app.browser), key, tx.clone(), |key, result| {
                Action::DetailLoaded { key, result }
            });
            false
        }
    }
}

fn spawn_scan(browser: Arc<Browser>, generation: u64, pattern: String, tx: mpsc::Sender<Action>) {
    info!("Spawning scan #{} for '{}'", generation, pattern);
    tokio::task::spawn_blocking(move || {
        let result = browser.list_keys(&pattern);
        if tx.send(Action::KeysLoaded { generation, result }).is_err() {
            warn!("Failed to send scan #{} result: receiver dropped", generation);
        }
    });
}

fn spawn_inspect<F>(browser: Arc<Browser>, key: String, tx: mpsc::Sender<Action>, into_action: F)
where
    F: FnOnce(String, Result<Inspection, StoreError>) -> Action + Send + 'static,
{
    debug!("Spawning inspect for '{}'", key);
    tokio::task::spawn_blocking(move || {
        let result = browser.inspect(&key);
        if tx.send(into_action(key, result)).is_err() {
            warn!("Failed to send inspect result: receiver dropped");
        }
    });
}
