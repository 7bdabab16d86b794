//! Palette query engine: classification, static filtering, debounced search.
//!
//! The engine never talks to the collaborator itself. It hands out a
//! [`SearchRequest`] once the debounce window has passed and accepts results
//! back through [`SearchEngine::apply_results`], which drops anything tagged
//! with an older generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::crud::SearchHit;

use super::quick_create::{QuickCreateKind, QuickCreateParse, QuickCreateRegistry};
use super::types::{PaletteAction, PaletteEntry, PaletteTarget, QueryMode, SearchRequest};

/// Shared view of the latest query generation.
///
/// Background searches hold a clone and check it before and after calling the
/// collaborator; once the palette has moved on they give up.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicU64>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_to(&self, generation: u64) {
        self.0.store(generation, Ordering::SeqCst);
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.current() == generation
    }
}

/// Decide how a query is handled
pub fn classify(query: &str, registry: &QuickCreateRegistry) -> QueryMode {
    if query.trim().is_empty() {
        return QueryMode::Commands;
    }
    match registry.parse(query) {
        QuickCreateParse::Create { kind, text } => QueryMode::QuickCreate { kind, text },
        QuickCreateParse::Hints(kinds) => QueryMode::QuickCreateHints(kinds),
        QuickCreateParse::NotQuickCreate => QueryMode::Search,
    }
}

/// Search session behind the command palette
pub struct SearchEngine {
    registry: QuickCreateRegistry,
    /// Pages and commands, always available without a network call
    statics: Vec<PaletteEntry>,
    query: String,
    generation: u64,
    mode: QueryMode,
    results: Vec<PaletteEntry>,
    /// How many leading entries of `results` came from the static list
    static_count: usize,
    selected: usize,
    debounce: Duration,
    search_due: Option<Instant>,
    token: CancelToken,
}

impl SearchEngine {
    pub fn new(registry: QuickCreateRegistry, statics: Vec<PaletteEntry>, debounce: Duration) -> Self {
        let results = statics.clone();
        let static_count = results.len();
        Self {
            registry,
            statics,
            query: String::new(),
            generation: 0,
            mode: QueryMode::Commands,
            results,
            static_count,
            selected: 0,
            debounce,
            search_due: None,
            token: CancelToken::new(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn mode(&self) -> &QueryMode {
        &self.mode
    }

    pub fn results(&self) -> &[PaletteEntry] {
        &self.results
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn registry(&self) -> &QuickCreateRegistry {
        &self.registry
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Whether a debounced search is armed but not yet sent
    pub fn is_search_pending(&self) -> bool {
        self.search_due.is_some()
    }

    /// Replace the query. Every call starts a new generation.
    pub fn set_query(&mut self, text: impl Into<String>, now: Instant) {
        self.query = text.into();
        self.generation += 1;
        self.token.advance_to(self.generation);
        self.selected = 0;
        self.mode = classify(&self.query, &self.registry);

        match &self.mode {
            QueryMode::Commands => {
                self.results = self.statics.clone();
                self.static_count = self.results.len();
                self.search_due = None;
            }
            QueryMode::QuickCreateHints(kinds) => {
                self.results = kinds.iter().map(|k| self.hint_entry(*k)).collect();
                self.static_count = self.results.len();
                self.search_due = None;
            }
            QueryMode::QuickCreate { .. } => {
                self.results.clear();
                self.static_count = 0;
                self.search_due = None;
            }
            QueryMode::Search => {
                let needle = self.query.trim().to_lowercase();
                self.results = self
                    .statics
                    .iter()
                    .filter(|entry| entry.matches(&needle))
                    .cloned()
                    .collect();
                self.static_count = self.results.len();
                self.search_due = Some(now + self.debounce);
            }
        }
    }

    /// Hand out the debounced search once its window has passed
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchRequest> {
        match self.search_due {
            Some(due) if now >= due => {
                self.search_due = None;
                debug!(generation = self.generation, query = %self.query, "dispatching search");
                Some(SearchRequest {
                    query: self.query.trim().to_string(),
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }

    /// Merge dynamic hits after the static matches, but only for the current
    /// generation. Returns whether the hits were applied.
    pub fn apply_results(&mut self, generation: u64, hits: Vec<SearchHit>) -> bool {
        if generation != self.generation || self.mode != QueryMode::Search {
            debug!(
                generation,
                current = self.generation,
                "discarding stale search results"
            );
            return false;
        }

        self.results.truncate(self.static_count);
        self.results
            .extend(hits.into_iter().map(PaletteEntry::from_hit));
        self.clamp_selection();
        true
    }

    /// Move the selection, clamped to the result list
    pub fn move_selection(&mut self, delta: isize) {
        if self.results.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.results.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    pub fn selected_entry(&self) -> Option<&PaletteEntry> {
        self.results.get(self.selected)
    }

    /// Text of the create-preview row, if the query is a quick-create command
    pub fn create_preview(&self) -> Option<String> {
        match &self.mode {
            QueryMode::QuickCreate { kind, text } => {
                Some(format!("Create {}: \"{}\"", kind.entity().display_name(), text))
            }
            _ => None,
        }
    }

    /// What Enter means right now
    pub fn activate(&self, now: &DateTime<Local>) -> PaletteAction {
        if let QueryMode::QuickCreate { kind, text } = &self.mode {
            return PaletteAction::QuickCreate(kind.build(text, now));
        }

        match self.selected_entry().map(|entry| &entry.target) {
            Some(PaletteTarget::Page(destination)) => PaletteAction::Navigate(*destination),
            Some(PaletteTarget::Command(command)) => PaletteAction::Run(*command),
            Some(PaletteTarget::Item { kind, id }) => PaletteAction::OpenItem {
                kind: *kind,
                id: *id,
            },
            Some(PaletteTarget::Hint(kind)) => {
                PaletteAction::CompletePrefix(format!("{} ", self.registry.full_prefix(*kind)))
            }
            None => PaletteAction::None,
        }
    }

    fn hint_entry(&self, kind: QuickCreateKind) -> PaletteEntry {
        let description = self
            .registry
            .command(kind)
            .map(|c| c.description)
            .unwrap_or_default();
        PaletteEntry {
            label: format!("{} <text>", self.registry.full_prefix(kind)),
            detail: description.to_string(),
            target: PaletteTarget::Hint(kind),
        }
    }

    fn clamp_selection(&mut self) {
        if self.results.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(self.results.len() - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::{EntityKind, ItemStatus, Priority};
    use crate::input::Destination;
    use crate::search::types::Command;
    use chrono::TimeZone;

    fn statics() -> Vec<PaletteEntry> {
        vec![
            PaletteEntry::page(Destination::Tasks, Some("g t".to_string())),
            PaletteEntry::page(Destination::Reminders, Some("g r".to_string())),
            PaletteEntry::command(Command::StartFocus),
        ]
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(
            QuickCreateRegistry::default(),
            statics(),
            Duration::from_millis(200),
        )
    }

    fn hit(id: u64, title: &str) -> SearchHit {
        SearchHit {
            kind: EntityKind::Task,
            id,
            title: title.to_string(),
            score: 1,
        }
    }

    fn local_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 4, 15, 30, 0).unwrap()
    }

    #[test]
    fn classify_covers_every_mode() {
        let registry = QuickCreateRegistry::default();
        assert_eq!(classify("", &registry), QueryMode::Commands);
        assert_eq!(
            classify("/", &registry),
            QueryMode::QuickCreateHints(vec![
                QuickCreateKind::Task,
                QuickCreateKind::Reminder,
                QuickCreateKind::Note
            ])
        );
        assert_eq!(
            classify("/task Buy milk", &registry),
            QueryMode::QuickCreate {
                kind: QuickCreateKind::Task,
                text: "Buy milk".to_string()
            }
        );
        assert_eq!(classify("milk", &registry), QueryMode::Search);
    }

    #[test]
    fn empty_query_shows_statics_without_search() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("", t0);
        assert_eq!(engine.results().len(), 3);
        assert!(engine.poll_debounce(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn search_filters_statics_immediately_and_fires_after_debounce() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("TASK", t0);
        assert_eq!(engine.results().len(), 1);
        assert_eq!(engine.results()[0].label, "Go to Tasks");

        assert!(engine.poll_debounce(t0 + Duration::from_millis(199)).is_none());
        let request = engine
            .poll_debounce(t0 + Duration::from_millis(200))
            .unwrap();
        assert_eq!(request.query, "TASK");
        assert_eq!(request.generation, engine.generation());
        // Only one request per armed deadline
        assert!(engine.poll_debounce(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn typing_again_restarts_the_debounce() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("mi", t0);
        engine.set_query("mil", t0 + Duration::from_millis(150));
        assert!(engine.poll_debounce(t0 + Duration::from_millis(250)).is_none());
        let request = engine
            .poll_debounce(t0 + Duration::from_millis(350))
            .unwrap();
        assert_eq!(request.query, "mil");
    }

    #[test]
    fn stale_response_is_discarded_after_newer_query() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("milk", t0);
        let first = engine
            .poll_debounce(t0 + Duration::from_millis(200))
            .unwrap();
        engine.set_query("bread", t0 + Duration::from_millis(250));
        let second = engine
            .poll_debounce(t0 + Duration::from_millis(450))
            .unwrap();

        // Newer response lands first, then the older one arrives late
        assert!(engine.apply_results(second.generation, vec![hit(2, "Bread")]));
        assert!(!engine.apply_results(first.generation, vec![hit(1, "Milk")]));

        let labels: Vec<&str> = engine.results().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Bread"]);
    }

    #[test]
    fn dynamic_hits_follow_static_matches_in_received_order() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("re", t0);
        let request = engine
            .poll_debounce(t0 + Duration::from_millis(200))
            .unwrap();
        engine.apply_results(request.generation, vec![hit(9, "Renew"), hit(3, "Read")]);
        let labels: Vec<&str> = engine.results().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["Go to Reminders", "Renew", "Read"]);
    }

    #[test]
    fn cancel_token_tracks_latest_generation() {
        let mut engine = engine();
        let token = engine.cancel_token();
        engine.set_query("a", Instant::now());
        let generation = engine.generation();
        assert!(token.is_current(generation));
        engine.set_query("ab", Instant::now());
        assert!(!token.is_current(generation));
    }

    #[test]
    fn selection_resets_on_query_change_and_clamps() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("", t0);
        engine.move_selection(1);
        engine.move_selection(10);
        assert_eq!(engine.selected(), 2);
        engine.move_selection(-10);
        assert_eq!(engine.selected(), 0);

        engine.move_selection(2);
        engine.set_query("go", t0);
        assert_eq!(engine.selected(), 0);
    }

    #[test]
    fn quick_create_suppresses_search_and_builds_payload() {
        let mut engine = engine();
        let t0 = Instant::now();
        engine.set_query("/task Buy milk", t0);
        assert!(engine.results().is_empty());
        assert!(engine.poll_debounce(t0 + Duration::from_secs(1)).is_none());
        assert_eq!(
            engine.create_preview().as_deref(),
            Some("Create Task: \"Buy milk\"")
        );

        let PaletteAction::QuickCreate(item) = engine.activate(&local_now()) else {
            panic!("expected quick-create");
        };
        assert_eq!(item.title, "Buy milk");
        assert_eq!(item.kind, EntityKind::Task);
        assert_eq!(item.status, ItemStatus::Todo);
        assert_eq!(item.priority, Priority::Medium);
    }

    #[test]
    fn bare_prefix_offers_hint_and_no_create() {
        let mut engine = engine();
        engine.set_query("/task", Instant::now());
        assert_eq!(engine.results().len(), 1);
        assert_eq!(
            engine.activate(&local_now()),
            PaletteAction::CompletePrefix("/task ".to_string())
        );
    }

    #[test]
    fn enter_on_page_entry_navigates() {
        let mut engine = engine();
        engine.set_query("remind", Instant::now());
        assert_eq!(
            engine.activate(&local_now()),
            PaletteAction::Navigate(Destination::Reminders)
        );
    }
}
