//! Terminal UI components: list pages, modals, popups and toasts.

pub mod chord_hint;
pub mod help_menu;
pub mod layout;
pub mod list_page;
pub mod modal;
pub mod presentation;
pub mod toast;
pub mod toast_widget;

pub use chord_hint::ChordHintWidget;
pub use help_menu::HelpMenuWidget;
pub use list_page::ItemListWidget;
pub use toast::{Toast, ToastManager, ToastType};
pub use toast_widget::ToastWidget;

/// Truncate to at most `max_chars` characters (not bytes), ending in "..."
/// when something was cut.
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return s.chars().take(max_chars).collect();
    }
    let truncated: String = s.chars().take(max_chars - 3).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate_str("héllo", 5), "héllo");
        assert_eq!(truncate_str("héllo wörld", 8), "héllo...");
        assert_eq!(truncate_str("abcdef", 2), "ab");
    }
}
