//! Persistence of the country selection.
//!
//! The selection is always stored as a whole set. On WASM targets the
//! application can talk to a remote HTTP service; an in-memory backend is
//! available everywhere for development and tests.

mod channel;
#[cfg(target_arch = "wasm32")]
mod http;

pub use channel::{FetchOutcome, PersistenceChannel, PersistenceEvent, SaveOutcome};
#[cfg(target_arch = "wasm32")]
pub use http::HttpBackend;

use crate::config::BackendConfig;
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Errors reported by a selection backend.
///
/// Every non-success response collapses into one error per operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Loading the saved selection failed.
    Fetch(String),
    /// Saving the selection failed.
    Save(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Fetch(msg) => write!(f, "Failed to fetch countries: {}", msg),
            PersistenceError::Save(msg) => write!(f, "Failed to save countries: {}", msg),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Remote store for the user's selected countries.
///
/// Note: This trait does not require `Send` bounds since WASM is single-threaded
/// and JS types cannot be sent between threads.
pub trait SelectionBackend {
    /// Loads the saved country codes.
    fn fetch_selection(&self) -> impl Future<Output = Result<Vec<String>, PersistenceError>>;

    /// Replaces the saved country codes with `codes`.
    fn save_selection(
        &self,
        codes: Vec<String>,
    ) -> impl Future<Output = Result<(), PersistenceError>>;
}

#[derive(Debug, Default)]
struct MemoryState {
    codes: Vec<String>,
    fail_fetch: bool,
    fail_save: bool,
}

/// A simple in-memory backend.
///
/// Data is not persisted across application restarts. Failures can be
/// switched on to exercise the error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryBackend {
    /// Creates a backend already holding `codes`.
    pub fn with_codes<S: Into<String>>(codes: impl IntoIterator<Item = S>) -> Self {
        let backend = Self::default();
        if let Ok(mut state) = backend.state.write() {
            state.codes = codes.into_iter().map(Into::into).collect();
        }
        backend
    }

    /// Demo data used when no remote service is configured.
    pub fn seeded() -> Self {
        Self::with_codes(["UKR", "USA"])
    }
}

#[cfg(test)]
impl MemoryBackend {
    pub fn set_fail_fetch(&self, fail: bool) {
        if let Ok(mut state) = self.state.write() {
            state.fail_fetch = fail;
        }
    }

    pub fn set_fail_save(&self, fail: bool) {
        if let Ok(mut state) = self.state.write() {
            state.fail_save = fail;
        }
    }

    /// Codes currently stored.
    pub fn stored(&self) -> Vec<String> {
        self.state
            .read()
            .map(|state| state.codes.clone())
            .unwrap_or_default()
    }
}

impl SelectionBackend for MemoryBackend {
    async fn fetch_selection(&self) -> Result<Vec<String>, PersistenceError> {
        let state = self
            .state
            .read()
            .map_err(|e| PersistenceError::Fetch(e.to_string()))?;
        if state.fail_fetch {
            return Err(PersistenceError::Fetch("backend unavailable".to_string()));
        }
        Ok(state.codes.clone())
    }

    async fn save_selection(&self, codes: Vec<String>) -> Result<(), PersistenceError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| PersistenceError::Save(e.to_string()))?;
        if state.fail_save {
            return Err(PersistenceError::Save("backend unavailable".to_string()));
        }
        state.codes = codes;
        Ok(())
    }
}

/// The backend chosen by the application configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredBackend {
    Memory(MemoryBackend),
    #[cfg(target_arch = "wasm32")]
    Http(HttpBackend),
}

impl ConfiguredBackend {
    pub fn from_config(config: &BackendConfig) -> Self {
        match config {
            BackendConfig::Memory => ConfiguredBackend::Memory(MemoryBackend::seeded()),
            #[cfg(target_arch = "wasm32")]
            BackendConfig::Http { base_url } => {
                log::info!("Persisting selection to {}", base_url);
                ConfiguredBackend::Http(HttpBackend::new(base_url.clone()))
            }
            #[cfg(not(target_arch = "wasm32"))]
            BackendConfig::Http { base_url } => {
                log::warn!(
                    "HTTP backend ({}) is only available on the web, using in-memory storage",
                    base_url
                );
                ConfiguredBackend::Memory(MemoryBackend::seeded())
            }
        }
    }
}

impl SelectionBackend for ConfiguredBackend {
    async fn fetch_selection(&self) -> Result<Vec<String>, PersistenceError> {
        match self {
            ConfiguredBackend::Memory(backend) => backend.fetch_selection().await,
            #[cfg(target_arch = "wasm32")]
            ConfiguredBackend::Http(backend) => backend.fetch_selection().await,
        }
    }

    async fn save_selection(&self, codes: Vec<String>) -> Result<(), PersistenceError> {
        match self {
            ConfiguredBackend::Memory(backend) => backend.save_selection(codes).await,
            #[cfg(target_arch = "wasm32")]
            ConfiguredBackend::Http(backend) => backend.save_selection(codes).await,
        }
    }
}
