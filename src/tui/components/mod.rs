//! # TUI Components
//!
//! UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as props:
//! - `TitleBar`: endpoint, pattern and status line
//! - `ValueTable`: `Key | Value | Type` preview of the highlighted key
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep presentation state in `TuiState` and emit events:
//! - `KeyList`: scan results, selection, paging and mouse hits
//! - `DetailView`: one key's value, scrollable
//! - `PatternInput`: the `/` prompt for a new scan pattern
//!
//! Each file holds its state type, event type, rendering, event handling
//! and tests.
//!
//! ```text
//! components/
//! ├── mod.rs            (this file)
//! ├── title_bar.rs      (Top status line)
//! ├── key_list.rs       (Finder, left pane)
//! ├── value_table.rs    (Finder, right pane)
//! ├── detail_view.rs    (Full-page value)
//! └── pattern_input.rs  (Pattern prompt overlay)
//! ```

pub mod detail_view;
pub mod key_list;
pub mod pattern_input;
mod title_bar;
pub mod value_table;

pub use detail_view::{DetailEvent, DetailView, DetailViewState};
pub use key_list::{FinderEvent, KeyList, KeyListState};
pub use pattern_input::{PATTERN_INPUT_HEIGHT, PatternEvent, PatternInput};
pub use title_bar::TitleBar;
pub use value_table::ValueTable;
