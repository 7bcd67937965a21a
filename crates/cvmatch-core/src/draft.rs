//! Job description autosave
//!
//! Each keystroke schedules a save through [`Debouncer`]; only the most recent
//! schedule fires once input pauses. The browser drives the timer, the core
//! decides whether a fired timer is still current.

use std::cell::Cell;
use std::time::Duration;

use crate::config::AutosaveConfig;
use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Local storage key for the saved job description
pub const DRAFT_STORAGE_KEY: &str = "savedJobDescription";

/// Persisted copy of the job description field
pub struct JobDescriptionDraft<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> JobDescriptionDraft<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Saved text, if any non-empty text was saved
    pub fn restore(&self) -> Option<String> {
        self.store.get(&self.key).filter(|text| !text.is_empty())
    }

    pub fn save(&self, text: &str) -> Result<(), StorageError> {
        tracing::debug!(key = %self.key, chars = text.chars().count(), "Saving job description draft");
        self.store.set(&self.key, text)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        tracing::debug!(key = %self.key, "Clearing job description draft");
        self.store.remove(&self.key)
    }
}

/// Identifies one scheduled call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// Collapses bursts of calls into the last one
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: Cell<u64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Cell::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a call, superseding any pending one
    pub fn schedule(&self) -> DebounceTicket {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        DebounceTicket(next)
    }

    /// Whether a timer holding `ticket` should run its call
    pub fn is_current(&self, ticket: DebounceTicket) -> bool {
        self.generation.get() == ticket.0
    }

    /// Drop any pending call
    pub fn cancel(&self) {
        self.schedule();
    }
}

/// Debounced autosave of the job description field
pub struct DraftAutosave<S> {
    draft: JobDescriptionDraft<S>,
    debouncer: Debouncer,
}

impl<S: KeyValueStore> DraftAutosave<S> {
    pub fn new(store: S, config: &AutosaveConfig) -> Self {
        Self {
            draft: JobDescriptionDraft::new(store, config.storage_key.clone()),
            debouncer: Debouncer::new(config.debounce()),
        }
    }

    pub fn restore(&self) -> Option<String> {
        self.draft.restore()
    }

    /// Register an input event; run [`Self::fire`] with the ticket after [`Self::delay`]
    pub fn on_input(&self) -> DebounceTicket {
        self.debouncer.schedule()
    }

    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// Save `text` if no newer input arrived; returns whether it saved
    pub fn fire(&self, ticket: DebounceTicket, text: &str) -> Result<bool, StorageError> {
        if !self.debouncer.is_current(ticket) {
            return Ok(false);
        }
        self.draft.save(text)?;
        Ok(true)
    }

    /// Drop any pending save and forget the saved text
    pub fn clear(&self) -> Result<(), StorageError> {
        self.debouncer.cancel();
        self.draft.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::rc::Rc;

    #[test]
    fn test_save_then_reload_restores_text() {
        let store = Rc::new(MemoryStore::new());
        let draft = JobDescriptionDraft::new(Rc::clone(&store), DRAFT_STORAGE_KEY);
        draft.save("Looking for a Rust engineer").unwrap();

        // A fresh page load builds a new draft over the same storage
        let reloaded = JobDescriptionDraft::new(Rc::clone(&store), DRAFT_STORAGE_KEY);
        assert_eq!(
            reloaded.restore().as_deref(),
            Some("Looking for a Rust engineer")
        );
    }

    #[test]
    fn test_clear_removes_saved_value() {
        let store = Rc::new(MemoryStore::new());
        let draft = JobDescriptionDraft::new(Rc::clone(&store), DRAFT_STORAGE_KEY);
        draft.save("text").unwrap();
        draft.clear().unwrap();

        assert_eq!(draft.restore(), None);
        assert_eq!(store.get(DRAFT_STORAGE_KEY), None);
    }

    #[test]
    fn test_empty_saved_value_is_not_restored() {
        let draft = JobDescriptionDraft::new(MemoryStore::new(), DRAFT_STORAGE_KEY);
        draft.save("").unwrap();
        assert_eq!(draft.restore(), None);
    }

    #[test]
    fn test_only_latest_ticket_fires() {
        let debouncer = Debouncer::new(Duration::from_secs(1));
        let first = debouncer.schedule();
        let second = debouncer.schedule();
        let third = debouncer.schedule();

        assert!(!debouncer.is_current(first));
        assert!(!debouncer.is_current(second));
        assert!(debouncer.is_current(third));
    }

    #[test]
    fn test_autosave_saves_only_last_input() {
        let store = Rc::new(MemoryStore::new());
        let autosave = DraftAutosave::new(Rc::clone(&store), &AutosaveConfig::default());
        assert_eq!(autosave.delay(), Duration::from_secs(1));

        let first = autosave.on_input();
        let second = autosave.on_input();

        assert_eq!(autosave.fire(first, "Sen"), Ok(false));
        assert_eq!(store.get(DRAFT_STORAGE_KEY), None);

        assert_eq!(autosave.fire(second, "Senior engineer"), Ok(true));
        assert_eq!(autosave.restore().as_deref(), Some("Senior engineer"));
    }

    #[test]
    fn test_autosave_clear_cancels_pending_save() {
        let store = Rc::new(MemoryStore::new());
        let autosave = DraftAutosave::new(Rc::clone(&store), &AutosaveConfig::default());
        let ticket = autosave.on_input();
        autosave.clear().unwrap();

        assert_eq!(autosave.fire(ticket, "stale"), Ok(false));
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_invalidates_pending() {
        let debouncer = Debouncer::new(Duration::from_millis(250));
        let ticket = debouncer.schedule();
        debouncer.cancel();
        assert!(!debouncer.is_current(ticket));
        assert_eq!(debouncer.delay(), Duration::from_millis(250));
    }
}
