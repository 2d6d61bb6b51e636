//! # Core Application Logic
//!
//! This module contains Redview's browsing logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • Config (layering)    │
//!                    │                         │
//!                    │  No I/O in update().    │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │   STORE    │
//!           │  Adapter   │─── Effect ──▶│  Browser   │
//!           │ (ratatui)  │◀── Action ───│  (redis)   │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all browsing state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`config`]: Defaults, config file, environment and CLI layering

pub mod action;
pub mod config;
pub mod state;
