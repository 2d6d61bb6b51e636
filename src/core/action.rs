//! # Actions
//!
//! Everything that can happen in Redview becomes an `Action`.
//! User moves the highlight? That's `Action::SelectNext`.
//! A scan finishes? That's `Action::KeysLoaded { .. }`.
//!
//! The `update()` function takes the current state and an action,
//! mutates the state, and returns an `Effect` describing any I/O the
//! adapter should start. No side effects here. I/O happens elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! Results of I/O come back as actions tagged with what they were for
//! (scan generation, key). A result that no longer matches the state is
//! dropped, which is how a late answer to an abandoned request is discarded.

use log::debug;

use crate::core::config::DEFAULT_PATTERN;
use crate::core::state::{App, ValueView};
use crate::store::{Inspection, KeySet, StoreError};

#[derive(Debug)]
pub enum Action {
    /// Scan again with the current pattern.
    Rescan,
    /// Replace the pattern and scan.
    SetPattern(String),
    KeysLoaded {
        generation: u64,
        result: Result<KeySet, StoreError>,
    },
    /// Highlight the key at this index (ignored when out of range).
    Select(usize),
    SelectNext,
    SelectPrevious,
    SelectFirst,
    SelectLast,
    /// Move the highlight by a signed number of rows, clamped to the list.
    SelectBy(isize),
    PreviewLoaded {
        key: String,
        result: Result<Inspection, StoreError>,
    },
    OpenDetail,
    DetailLoaded {
        key: String,
        result: Result<Inspection, StoreError>,
    },
    CloseDetail,
    DismissError,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    Scan { generation: u64, pattern: String },
    LoadPreview(String),
    LoadDetail(String),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,

        Action::Rescan => start_scan(app),

        Action::SetPattern(pattern) => {
            let pattern = pattern.trim();
            app.pattern = if pattern.is_empty() {
                DEFAULT_PATTERN.to_string()
            } else {
                pattern.to_string()
            };
            start_scan(app)
        }

        Action::KeysLoaded { generation, result } => {
            if generation != app.scan_generation {
                debug!(
                    "Dropping stale scan result (generation {} != {})",
                    generation, app.scan_generation
                );
                return Effect::None;
            }
            app.is_loading = false;
            match result {
                Ok(keys) => {
                    let previous = app.selected_key().map(str::to_string);
                    app.keys = keys;
                    app.status_message =
                        format!("{} key(s) matching '{}'", app.keys.len(), app.pattern);
                    let index = previous
                        .and_then(|k| app.keys.iter().position(|candidate| *candidate == k))
                        .or(if app.keys.is_empty() { None } else { Some(0) });
                    app.selected = None;
                    select(app, index)
                }
                Err(e) => {
                    app.status_message = "Scan failed".to_string();
                    app.error = Some(e.to_string());
                    Effect::None
                }
            }
        }

        Action::Select(index) => {
            if index < app.keys.len() {
                select(app, Some(index))
            } else {
                Effect::None
            }
        }
        Action::SelectNext => select_by(app, 1),
        Action::SelectPrevious => select_by(app, -1),
        Action::SelectBy(delta) => select_by(app, delta),
        Action::SelectFirst => {
            let index = (!app.keys.is_empty()).then_some(0);
            select(app, index)
        }
        Action::SelectLast => {
            let index = app.keys.len().checked_sub(1);
            select(app, index)
        }

        Action::PreviewLoaded { key, result } => {
            match &app.preview {
                Some(view) if view.is_loading_key(&key) => {
                    app.preview = Some(settle(key, result));
                }
                _ => debug!("Dropping stale preview for '{}'", key),
            }
            Effect::None
        }

        Action::OpenDetail => match app.selected_key().map(str::to_string) {
            Some(key) => {
                app.detail = Some(ValueView::Loading { key: key.clone() });
                Effect::LoadDetail(key)
            }
            None => Effect::None,
        },

        Action::DetailLoaded { key, result } => {
            match &app.detail {
                Some(view) if view.is_loading_key(&key) => {
                    app.detail = Some(settle(key, result));
                }
                _ => debug!("Dropping stale detail for '{}'", key),
            }
            Effect::None
        }

        Action::CloseDetail => {
            app.detail = None;
            Effect::None
        }

        Action::DismissError => {
            app.error = None;
            Effect::None
        }
    }
}

fn start_scan(app: &mut App) -> Effect {
    app.scan_generation += 1;
    app.is_loading = true;
    app.status_message = format!("Scanning '{}'...", app.pattern);
    Effect::Scan {
        generation: app.scan_generation,
        pattern: app.pattern.clone(),
    }
}

fn select_by(app: &mut App, delta: isize) -> Effect {
    if app.keys.is_empty() {
        return Effect::None;
    }
    let last = app.keys.len() - 1;
    let index = match app.selected {
        Some(current) => current.saturating_add_signed(delta).min(last),
        None => 0,
    };
    select(app, Some(index))
}

/// Highlight `index` and request its preview if the highlight moved.
fn select(app: &mut App, index: Option<usize>) -> Effect {
    if index == app.selected {
        return Effect::None;
    }
    app.selected = index;
    match app.selected_key().map(str::to_string) {
        Some(key) => {
            app.preview = Some(ValueView::Loading { key: key.clone() });
            Effect::LoadPreview(key)
        }
        None => {
            app.preview = None;
            Effect::None
        }
    }
}

fn settle(key: String, result: Result<Inspection, StoreError>) -> ValueView {
    match result {
        Ok(inspection) => ValueView::Ready(inspection),
        Err(e) => ValueView::Failed {
            key,
            message: e.to_string(),
        },
    }
}
