//! Two-key navigation chords.
//!
//! The leader key arms a pending chord; the next eligible key either names a
//! destination page or is discarded. The navigator never owns a timer: every
//! call takes the current `Instant`, so expiry is a plain comparison.

use std::time::{Duration, Instant};

use tracing::debug;

/// Pages reachable from the chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Dashboard,
    Tasks,
    Reminders,
    Projects,
    People,
    ActionQueue,
    Focus,
    Notes,
    Calendar,
    Habits,
    Insights,
    Review,
    Settings,
}

impl Destination {
    /// Every destination in tab-bar order
    pub const ALL: [Destination; 13] = [
        Destination::Dashboard,
        Destination::Tasks,
        Destination::Reminders,
        Destination::Projects,
        Destination::People,
        Destination::ActionQueue,
        Destination::Focus,
        Destination::Notes,
        Destination::Calendar,
        Destination::Habits,
        Destination::Insights,
        Destination::Review,
        Destination::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Destination::Dashboard => "Dashboard",
            Destination::Tasks => "Tasks",
            Destination::Reminders => "Reminders",
            Destination::Projects => "Projects",
            Destination::People => "People",
            Destination::ActionQueue => "Action Queue",
            Destination::Focus => "Focus",
            Destination::Notes => "Notes",
            Destination::Calendar => "Calendar",
            Destination::Habits => "Habits",
            Destination::Insights => "Insights",
            Destination::Review => "Weekly Review",
            Destination::Settings => "Settings",
        }
    }
}

/// A destination bound to its second key
#[derive(Debug, Clone, PartialEq)]
pub struct ChordBinding {
    pub key: char,
    pub destination: Destination,
}

impl ChordBinding {
    pub fn new(key: char, destination: Destination) -> Self {
        Self { key, destination }
    }
}

/// Configuration for the chord navigator
#[derive(Debug, Clone)]
pub struct ChordConfig {
    pub leader: char,
    pub bindings: Vec<ChordBinding>,
    pub timeout: Duration,
}

impl Default for ChordConfig {
    fn default() -> Self {
        Self::new('g', Duration::from_millis(1500))
    }
}

impl ChordConfig {
    /// Create a chord config with the default destination table
    pub fn new(leader: char, timeout: Duration) -> Self {
        Self {
            leader,
            bindings: Self::default_bindings(),
            timeout,
        }
    }

    fn default_bindings() -> Vec<ChordBinding> {
        vec![
            ChordBinding::new('d', Destination::Dashboard),
            ChordBinding::new('t', Destination::Tasks),
            ChordBinding::new('r', Destination::Reminders),
            ChordBinding::new('p', Destination::Projects),
            ChordBinding::new('c', Destination::People),
            ChordBinding::new('a', Destination::ActionQueue),
            ChordBinding::new('f', Destination::Focus),
            ChordBinding::new('n', Destination::Notes),
            ChordBinding::new('k', Destination::Calendar),
            ChordBinding::new('h', Destination::Habits),
            ChordBinding::new('i', Destination::Insights),
            ChordBinding::new('w', Destination::Review),
            ChordBinding::new('s', Destination::Settings),
        ]
    }

    pub fn destination_for(&self, key: char) -> Option<Destination> {
        self.bindings
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.destination)
    }

    pub fn key_for(&self, destination: Destination) -> Option<char> {
        self.bindings
            .iter()
            .find(|b| b.destination == destination)
            .map(|b| b.key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChordState {
    #[default]
    Idle,
    Pending { expires_at: Instant },
}

/// Result of feeding a key to a pending chord
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordOutcome {
    /// Leader pressed from Idle; now waiting for the destination key
    Started,
    /// Leader pressed again while pending; deadline restarted
    Restarted,
    /// Destination key matched
    Navigate(Destination),
    /// Unmapped key; chord cancelled with no effect
    Discarded,
    /// The chord had already timed out when the key arrived
    Expired,
}

#[derive(Debug, Clone)]
pub struct ChordNavigator {
    config: ChordConfig,
    state: ChordState,
}

impl ChordNavigator {
    pub fn new(config: ChordConfig) -> Self {
        Self {
            config,
            state: ChordState::Idle,
        }
    }

    pub fn config(&self) -> &ChordConfig {
        &self.config
    }

    pub fn state(&self) -> ChordState {
        self.state
    }

    /// Pending and not yet past its deadline
    pub fn is_pending(&self, now: Instant) -> bool {
        matches!(self.state, ChordState::Pending { expires_at } if now < expires_at)
    }

    /// Arm (or re-arm) the chord
    pub fn press_leader(&mut self, now: Instant) -> ChordOutcome {
        let outcome = match self.state {
            ChordState::Pending { expires_at } if now < expires_at => ChordOutcome::Restarted,
            _ => ChordOutcome::Started,
        };
        self.state = ChordState::Pending {
            expires_at: now + self.config.timeout,
        };
        outcome
    }

    /// Feed a key to the navigator.
    ///
    /// From Idle only the leader key does anything. From Pending every key
    /// resolves the chord, and the navigator is back to Idle afterwards unless
    /// the key was the leader again.
    pub fn handle_key(&mut self, key: Option<char>, now: Instant) -> ChordOutcome {
        match self.state {
            ChordState::Idle => {
                if key == Some(self.config.leader) {
                    self.press_leader(now)
                } else {
                    ChordOutcome::Discarded
                }
            }
            ChordState::Pending { expires_at } if now >= expires_at => {
                self.state = ChordState::Idle;
                debug!("chord expired before destination key");
                ChordOutcome::Expired
            }
            ChordState::Pending { .. } => {
                if key == Some(self.config.leader) {
                    return self.press_leader(now);
                }
                self.state = ChordState::Idle;
                match key.and_then(|c| self.config.destination_for(c)) {
                    Some(destination) => {
                        debug!(?destination, "chord navigation");
                        ChordOutcome::Navigate(destination)
                    }
                    None => ChordOutcome::Discarded,
                }
            }
        }
    }

    /// Drop a pending chord whose deadline has passed; returns true if it did
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.state {
            ChordState::Pending { expires_at } if now >= expires_at => {
                self.state = ChordState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Abandon any pending chord
    pub fn cancel(&mut self) {
        self.state = ChordState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn navigator() -> (ChordNavigator, Instant) {
        (ChordNavigator::new(ChordConfig::default()), Instant::now())
    }

    #[test]
    fn default_table_has_thirteen_unique_keys() {
        let config = ChordConfig::default();
        let mut keys: Vec<char> = config.bindings.iter().map(|b| b.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 13);
        assert!(!keys.contains(&config.leader));
    }

    #[test]
    fn leader_then_destination_navigates_and_returns_to_idle() {
        let (mut nav, t0) = navigator();
        assert_eq!(nav.handle_key(Some('g'), t0), ChordOutcome::Started);
        assert!(nav.is_pending(t0));
        assert_eq!(
            nav.handle_key(Some('t'), t0 + Duration::from_millis(300)),
            ChordOutcome::Navigate(Destination::Tasks)
        );
        assert_eq!(nav.state(), ChordState::Idle);
    }

    #[test]
    fn unmapped_second_key_is_discarded() {
        let (mut nav, t0) = navigator();
        nav.press_leader(t0);
        assert_eq!(nav.handle_key(Some('z'), t0), ChordOutcome::Discarded);
        assert_eq!(nav.state(), ChordState::Idle);
        assert_eq!(nav.handle_key(None, t0), ChordOutcome::Discarded);
    }

    #[test]
    fn no_second_key_within_timeout_returns_to_idle() {
        let (mut nav, t0) = navigator();
        nav.press_leader(t0);
        assert!(!nav.tick(t0 + Duration::from_millis(1499)));
        assert!(nav.tick(t0 + Duration::from_millis(1500)));
        assert_eq!(nav.state(), ChordState::Idle);
    }

    #[test]
    fn destination_key_after_deadline_does_not_navigate() {
        let (mut nav, t0) = navigator();
        nav.press_leader(t0);
        assert_eq!(
            nav.handle_key(Some('t'), t0 + Duration::from_millis(1600)),
            ChordOutcome::Expired
        );
        assert_eq!(nav.state(), ChordState::Idle);
    }

    #[test]
    fn second_leader_restarts_deadline_instead_of_stacking() {
        let (mut nav, t0) = navigator();
        nav.press_leader(t0);
        let t1 = t0 + Duration::from_millis(1000);
        assert_eq!(nav.handle_key(Some('g'), t1), ChordOutcome::Restarted);
        assert_eq!(
            nav.state(),
            ChordState::Pending {
                expires_at: t1 + Duration::from_millis(1500)
            }
        );
        // Still pending past the original deadline
        assert!(nav.is_pending(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn idle_navigator_ignores_non_leader_keys() {
        let (mut nav, t0) = navigator();
        assert_eq!(nav.handle_key(Some('t'), t0), ChordOutcome::Discarded);
        assert_eq!(nav.state(), ChordState::Idle);
    }
}
