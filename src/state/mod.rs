//! Application state management.
//!
//! This module contains the state behind the country picker: the live map
//! view, the selected countries and the notifications shown to the user.

mod frame;
mod gesture;
mod map_view;
mod notification;
mod selection;

pub use gesture::{MAX_ZOOM, MIN_ZOOM};
pub use map_view::MapView;
pub use notification::{Notification, NotificationQueue};
pub use selection::SelectionStore;

use crate::config::AppConfig;
use crate::geo::{self, CountryCollection, GeoError, IsoCode};
use crate::storage::{FetchOutcome, SaveOutcome};
use eframe::egui::Pos2;
use web_time::Instant;

/// Root application state containing all sub-states.
pub struct AppState {
    /// Map view, present once the boundary data has loaded
    pub map: Option<MapView>,

    /// Why the boundary data could not be loaded
    pub geometry_error: Option<String>,

    /// Selected countries and pending save
    pub selection: SelectionStore,

    /// Messages waiting for the user
    pub notifications: NotificationQueue,

    min_zoom: f32,
    max_zoom: f32,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            map: None,
            geometry_error: None,
            selection: SelectionStore::new(config.save_debounce()),
            notifications: NotificationQueue::default(),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Loads boundary data from topology text.
    pub fn load_map(&mut self, topology: &str) {
        self.set_map(geo::load_topology(topology));
    }

    /// Installs decoded boundary data.
    ///
    /// On failure the map stays empty and the error is kept for display.
    pub fn set_map(&mut self, collection: Result<CountryCollection, GeoError>) {
        match collection {
            Ok(collection) => {
                log::info!("Loaded {} country features", collection.len());
                self.map = Some(MapView::new(collection, self.min_zoom, self.max_zoom));
                self.geometry_error = None;
            }
            Err(e) => {
                log::error!("Failed to load country boundaries: {}", e);
                self.map = None;
                self.geometry_error = Some(e.to_string());
            }
        }
    }

    /// True until the saved selection has been fetched (or failed to).
    pub fn is_loading(&self) -> bool {
        !self.selection.is_loaded()
    }

    /// Handles a tap at `pos` in viewport coordinates.
    ///
    /// Returns the toggled country and whether it is now selected. Taps on
    /// the ocean or on countries without a code do nothing.
    pub fn handle_tap(&mut self, pos: Pos2, now: Instant) -> Option<(IsoCode, bool)> {
        let entry = self.map.as_ref()?.hit(pos)?;
        let iso = entry.iso.clone()?;
        let selected = self.selection.toggle(iso.clone(), now);
        log::debug!(
            "{} {} ({})",
            if selected { "Selected" } else { "Deselected" },
            iso,
            entry.identity
        );
        Some((iso, selected))
    }

    /// Empties the selection.
    pub fn clear_selection(&mut self, now: Instant) {
        if !self.selection.is_empty() {
            self.selection.clear(now);
        }
    }

    /// Applies the result of the initial selection fetch.
    pub fn apply_fetch(&mut self, outcome: FetchOutcome, now: Instant) {
        match outcome {
            FetchOutcome::Loaded(codes) => {
                self.selection.replace(&codes);
                log::info!("Restored {} selected countries", self.selection.len());
            }
            FetchOutcome::Failed(e) => {
                self.notifications.push(Notification::error(e.to_string()));
            }
        }
        self.selection.mark_loaded(now);
    }

    /// Applies the result of a save. Failures of superseded saves are
    /// dropped since a newer save already carries the selection.
    pub fn apply_save(&mut self, outcome: SaveOutcome) {
        match outcome.result {
            Ok(()) => log::debug!("Save #{} completed", outcome.sequence),
            Err(e) if outcome.superseded => {
                log::debug!("Ignoring failure of superseded save #{}: {}", outcome.sequence, e);
            }
            Err(e) => self.notifications.push(Notification::error(e.to_string())),
        }
    }
}
