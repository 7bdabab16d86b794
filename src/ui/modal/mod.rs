//! Modal dialog components for the TUI.

pub mod palette;
pub mod triage;

pub use palette::PaletteModal;
pub use triage::TriageModal;
