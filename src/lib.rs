//! dashkeys library crate.
//!
//! Keyboard-first navigation for a productivity dashboard:
//! - Input arbitration between modals, text fields, chords and pages
//! - Leader-key chords to jump between pages
//! - Command palette with debounced search and quick create
//! - List pages with focus, selection and batch actions
//! - Triage sessions (Focus Mode, overdue sweep, action review)
//! - Terminal UI components

pub mod app;
pub mod config;
pub mod crud;
pub mod event_loop;
pub mod handlers;
pub mod input;
pub mod list;
pub mod notes;
pub mod search;
pub mod triage;
pub mod ui;
