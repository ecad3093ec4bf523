//! Selected countries and debounced persistence scheduling.

use crate::geo::IsoCode;
use std::collections::BTreeSet;
use std::time::Duration;
use web_time::Instant;

/// Default quiet period before a changed selection is saved.
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(400);

/// Set of selected country codes.
pub type SelectionSet = BTreeSet<IsoCode>;

/// Whole-set save produced once the debounce window elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub codes: Vec<String>,
}

/// In-memory selection with a restartable save deadline.
///
/// Every mutation pushes the deadline back by the debounce window; the
/// frame loop polls for the resulting save. Nothing is scheduled until the
/// initial selection has been loaded.
#[derive(Debug)]
pub struct SelectionStore {
    selected: SelectionSet,
    debounce: Duration,
    deadline: Option<Instant>,
    loaded: bool,
    dirty: bool,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_DEBOUNCE)
    }
}

impl SelectionStore {
    pub fn new(debounce: Duration) -> Self {
        Self {
            selected: SelectionSet::new(),
            debounce,
            deadline: None,
            loaded: false,
            dirty: false,
        }
    }

    /// Flips membership of `iso`. Returns true if it is now selected.
    pub fn toggle(&mut self, iso: IsoCode, now: Instant) -> bool {
        let selected = if self.selected.remove(&iso) {
            false
        } else {
            self.selected.insert(iso);
            true
        };
        self.touch(now);
        selected
    }

    /// Empties the selection.
    pub fn clear(&mut self, now: Instant) {
        self.selected.clear();
        self.touch(now);
    }

    /// Replaces the selection with codes loaded from the backend.
    ///
    /// Does not schedule a save. Invalid codes are dropped.
    pub fn replace<S: AsRef<str>>(&mut self, codes: &[S]) {
        self.selected = codes
            .iter()
            .filter_map(|code| {
                let parsed = IsoCode::parse(code.as_ref());
                if parsed.is_none() {
                    log::warn!("Ignoring invalid country code '{}'", code.as_ref());
                }
                parsed
            })
            .collect();
    }

    /// Marks the initial load as finished. Changes made while loading are
    /// scheduled for saving now.
    pub fn mark_loaded(&mut self, now: Instant) {
        self.loaded = true;
        if self.dirty {
            self.deadline = Some(now + self.debounce);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Read-only snapshot of the selection.
    pub fn current_selection(&self) -> SelectionSet {
        self.selected.clone()
    }

    pub fn contains(&self, iso: &IsoCode) -> bool {
        self.selected.contains(iso)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// When the pending save becomes due, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the save request once the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        match self.deadline {
            Some(deadline) if now >= deadline => self.flush_now(),
            _ => None,
        }
    }

    /// Produces the save request immediately, cancelling the pending deadline.
    pub fn flush_now(&mut self) -> Option<SaveRequest> {
        if !self.loaded || !self.dirty {
            return None;
        }
        self.deadline = None;
        self.dirty = false;
        Some(SaveRequest {
            codes: self.selected.iter().map(|c| c.to_string()).collect(),
        })
    }

    fn touch(&mut self, now: Instant) {
        self.dirty = true;
        if self.loaded {
            self.deadline = Some(now + self.debounce);
        }
    }
}
