//! Key event handlers.

pub mod keyboard;
mod modal;

pub use keyboard::{handle_key_event, KeyAction};
