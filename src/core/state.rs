//! # Application State
//!
//! Core browsing state for Redview. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── browser: Arc<Browser>         // pooled access to the server
//! ├── endpoint_label: String        // "host:port" for the title bar
//! ├── pattern: String               // current MATCH pattern
//! ├── keys: KeySet                  // result of the last successful scan
//! ├── selected: Option<usize>       // highlighted key
//! ├── scan_generation: u64          // id of the scan whose result we await
//! ├── is_loading: bool              // scan in flight
//! ├── preview: Option<ValueView>    // highlighted key's value
//! ├── detail: Option<ValueView>     // detail page (None = finder)
//! ├── status_message: String        // status bar text
//! └── error: Option<String>         // dismissible error banner
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::sync::Arc;

use crate::core::config::ResolvedConfig;
use crate::store::{Browser, Inspection, KeySet};

/// A value pane: waiting on the server, showing a result, or showing why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueView {
    Loading { key: String },
    Ready(Inspection),
    Failed { key: String, message: String },
}

impl ValueView {
    pub fn key(&self) -> &str {
        match self {
            ValueView::Loading { key } | ValueView::Failed { key, .. } => key,
            ValueView::Ready(inspection) => &inspection.key,
        }
    }

    pub fn is_loading_key(&self, key: &str) -> bool {
        matches!(self, ValueView::Loading { key: k } if k == key)
    }
}

pub struct App {
    pub browser: Arc<Browser>,
    pub endpoint_label: String,
    pub pattern: String,
    pub keys: KeySet,
    pub selected: Option<usize>,
    pub scan_generation: u64,
    pub is_loading: bool,
    pub preview: Option<ValueView>,
    pub detail: Option<ValueView>,
    pub status_message: String,
    pub error: Option<String>,
}

impl App {
    pub fn new(browser: Arc<Browser>, config: &ResolvedConfig) -> Self {
        Self {
            endpoint_label: browser.endpoint_label(),
            browser,
            pattern: config.pattern.clone(),
            keys: KeySet::new(),
            selected: None,
            scan_generation: 0,
            is_loading: false,
            preview: None,
            detail: None,
            status_message: String::from("Welcome to Redview!"),
            error: None,
        }
    }

    pub fn selected_key(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.keys.get(i))
            .map(String::as_str)
    }
}
