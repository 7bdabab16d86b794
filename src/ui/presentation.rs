//! Presentation timing kept outside the state machines.
//!
//! The palette, triage and chord state machines change state immediately. The
//! delays a user sees (error text lingering, the pause between triage items,
//! the help overlay) are deadlines tracked here and polled by the event loop.

use std::time::{Duration, Instant};

use crate::config::Config;

/// How long the shortcut overlay stays up
const HELP_VISIBLE_MS: u64 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationTimings {
    pub error_restore: Duration,
    pub success_close: Duration,
    pub transition: Duration,
    pub chord_confirm: Duration,
    pub help: Duration,
}

impl PresentationTimings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            error_restore: Duration::from_millis(config.palette.error_restore_ms),
            success_close: Duration::from_millis(config.palette.success_close_ms),
            transition: config.triage.transition(),
            chord_confirm: config.keyboard.chord_confirm(),
            help: Duration::from_millis(HELP_VISIBLE_MS),
        }
    }
}

impl Default for PresentationTimings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// A deadline that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationEvent {
    /// Put the palette's original query back after a quick-create error
    RestorePalette,
    /// Close the palette after a successful quick-create
    ClosePalette,
}

#[derive(Debug, Default)]
pub struct Presentation {
    timings: PresentationTimings,
    palette_restore_at: Option<Instant>,
    palette_close_at: Option<Instant>,
    triage_ready_at: Option<Instant>,
    help_until: Option<Instant>,
}

impl Presentation {
    pub fn new(timings: PresentationTimings) -> Self {
        Self {
            timings,
            ..Default::default()
        }
    }

    pub fn timings(&self) -> PresentationTimings {
        self.timings
    }

    pub fn schedule_palette_restore(&mut self, now: Instant) {
        self.palette_restore_at = Some(now + self.timings.error_restore);
    }

    pub fn schedule_palette_close(&mut self, now: Instant) {
        self.palette_close_at = Some(now + self.timings.success_close);
    }

    /// Forget palette deadlines (palette closed by the user)
    pub fn clear_palette(&mut self) {
        self.palette_restore_at = None;
        self.palette_close_at = None;
    }

    /// Start the pause after a successful triage action
    pub fn start_transition(&mut self, now: Instant) {
        self.triage_ready_at = Some(now + self.timings.transition);
    }

    pub fn clear_transition(&mut self) {
        self.triage_ready_at = None;
    }

    /// Whether the triage view is still between items
    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.triage_ready_at.is_some_and(|at| now < at)
    }

    pub fn show_help(&mut self, now: Instant) {
        self.help_until = Some(now + self.timings.help);
    }

    pub fn hide_help(&mut self) {
        self.help_until = None;
    }

    pub fn help_visible(&self, now: Instant) -> bool {
        self.help_until.is_some_and(|until| now < until)
    }

    /// Take every palette deadline that has passed
    pub fn poll(&mut self, now: Instant) -> Vec<PresentationEvent> {
        let mut events = Vec::new();
        if take_due(&mut self.palette_restore_at, now) {
            events.push(PresentationEvent::RestorePalette);
        }
        if take_due(&mut self.palette_close_at, now) {
            events.push(PresentationEvent::ClosePalette);
        }
        if self.triage_ready_at.is_some_and(|at| now >= at) {
            self.triage_ready_at = None;
        }
        if self.help_until.is_some_and(|until| now >= until) {
            self.help_until = None;
        }
        events
    }
}

fn take_due(deadline: &mut Option<Instant>, now: Instant) -> bool {
    match deadline {
        Some(at) if now >= *at => {
            *deadline = None;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_restore_fires_once_after_window() {
        let mut presentation = Presentation::default();
        let t0 = Instant::now();
        presentation.schedule_palette_restore(t0);
        assert!(presentation.poll(t0 + Duration::from_millis(1499)).is_empty());
        assert_eq!(
            presentation.poll(t0 + Duration::from_millis(1500)),
            vec![PresentationEvent::RestorePalette]
        );
        assert!(presentation.poll(t0 + Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn clearing_palette_drops_pending_deadlines() {
        let mut presentation = Presentation::default();
        let t0 = Instant::now();
        presentation.schedule_palette_close(t0);
        presentation.clear_palette();
        assert!(presentation.poll(t0 + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn transition_window_matches_config() {
        let mut presentation = Presentation::default();
        let t0 = Instant::now();
        presentation.start_transition(t0);
        assert!(presentation.is_transitioning(t0 + Duration::from_millis(249)));
        assert!(!presentation.is_transitioning(t0 + Duration::from_millis(250)));
    }

    #[test]
    fn help_overlay_is_transient() {
        let mut presentation = Presentation::default();
        let t0 = Instant::now();
        presentation.show_help(t0);
        assert!(presentation.help_visible(t0 + Duration::from_secs(5)));
        presentation.poll(t0 + Duration::from_secs(6));
        assert!(!presentation.help_visible(t0 + Duration::from_secs(6)));
    }
}
