//! Command palette: static commands, quick-create and cross-entity search.

pub mod engine;
pub mod palette;
pub mod quick_create;
pub mod types;

pub use engine::{classify, CancelToken, SearchEngine};
pub use palette::{CreateStatus, Palette, PaletteKeyResult};
pub use quick_create::{QuickCreateKind, QuickCreateRegistry};
pub use types::{Command, PaletteAction, PaletteEntry, PaletteTarget, QueryMode, SearchRequest};
