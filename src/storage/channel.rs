//! Channel-based bridge between async persistence calls and egui's
//! synchronous update loop.
//!
//! Requests run detached (a worker thread on native, `spawn_local` on WASM)
//! and report back through an mpsc channel that the UI drains each frame.

use super::{PersistenceError, SelectionBackend};
use eframe::egui;
use std::future::Future;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Backends that can be moved into a detached task on this target.
#[cfg(not(target_arch = "wasm32"))]
pub trait SpawnableBackend: SelectionBackend + Send + 'static {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: SelectionBackend + Send + 'static> SpawnableBackend for T {}

/// Backends that can be moved into a detached task on this target.
#[cfg(target_arch = "wasm32")]
pub trait SpawnableBackend: SelectionBackend + 'static {}
#[cfg(target_arch = "wasm32")]
impl<T: SelectionBackend + 'static> SpawnableBackend for T {}

/// Result of the initial selection fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Vec<String>),
    Failed(PersistenceError),
}

/// Result of one save request.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub sequence: u64,
    pub result: Result<(), PersistenceError>,
    /// A newer save was issued after this one; its result wins.
    pub superseded: bool,
}

enum Message {
    Fetched(Result<Vec<String>, PersistenceError>),
    Saved {
        sequence: u64,
        result: Result<(), PersistenceError>,
    },
}

/// Completed persistence operation, as seen by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceEvent {
    Fetch(FetchOutcome),
    Save(SaveOutcome),
}

/// Dispatches fetch/save calls and collects their results.
pub struct PersistenceChannel {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    fetching: bool,
    /// Sequence number of the newest save issued
    latest_save: u64,
    /// Whether the newest save is still outstanding
    saving: bool,
}

impl Default for PersistenceChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceChannel {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            fetching: false,
            latest_save: 0,
            saving: false,
        }
    }

    /// Returns true while the newest save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Starts loading the saved selection.
    ///
    /// If a fetch is already in progress, this call is ignored.
    pub fn fetch<B: SpawnableBackend>(&mut self, ctx: egui::Context, backend: B) {
        if self.fetching {
            log::debug!("Fetch already in progress, ignoring request");
            return;
        }
        self.fetching = true;

        let sender = self.sender.clone();
        spawn_detached(move || async move {
            let result = backend.fetch_selection().await;
            let _ = sender.send(Message::Fetched(result));
            ctx.request_repaint();
        });
    }

    /// Starts saving `codes` as the whole selection. Earlier saves still in
    /// flight are not cancelled.
    ///
    /// Returns the sequence number of this save.
    pub fn save<B: SpawnableBackend>(
        &mut self,
        ctx: egui::Context,
        backend: B,
        codes: Vec<String>,
    ) -> u64 {
        self.latest_save += 1;
        self.saving = true;
        let sequence = self.latest_save;

        log::info!("Saving {} selected countries (#{})", codes.len(), sequence);

        let sender = self.sender.clone();
        spawn_detached(move || async move {
            let result = backend.save_selection(codes).await;
            let _ = sender.send(Message::Saved { sequence, result });
            ctx.request_repaint();
        });

        sequence
    }

    /// Non-blocking receive of the next completed operation.
    pub fn try_recv(&mut self) -> Option<PersistenceEvent> {
        let message = self.receiver.try_recv().ok()?;

        Some(match message {
            Message::Fetched(result) => {
                self.fetching = false;
                PersistenceEvent::Fetch(match result {
                    Ok(codes) => FetchOutcome::Loaded(codes),
                    Err(e) => FetchOutcome::Failed(e),
                })
            }
            Message::Saved { sequence, result } => {
                let superseded = sequence != self.latest_save;
                if superseded {
                    log::debug!(
                        "Save #{} finished after newer save #{}",
                        sequence,
                        self.latest_save
                    );
                } else {
                    self.saving = false;
                }
                PersistenceEvent::Save(SaveOutcome {
                    sequence,
                    result,
                    superseded,
                })
            }
        })
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_detached<F, Fut>(task: F)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()>,
{
    std::thread::spawn(move || pollster::block_on(task()));
}

#[cfg(target_arch = "wasm32")]
fn spawn_detached<F, Fut>(task: F)
where
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task());
}

#[cfg(test)]
impl PersistenceChannel {
    /// Returns true while the initial fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.fetching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;
    use std::time::{Duration, Instant};

    fn wait_for_event(channel: &mut PersistenceChannel) -> PersistenceEvent {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(event) = channel.try_recv() {
                return event;
            }
            assert!(Instant::now() < deadline, "timed out waiting for backend");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_fetch_reports_codes() {
        let mut channel = PersistenceChannel::new();
        channel.fetch(egui::Context::default(), MemoryBackend::seeded());
        assert!(channel.is_fetching());

        let event = wait_for_event(&mut channel);
        assert_eq!(
            event,
            PersistenceEvent::Fetch(FetchOutcome::Loaded(vec![
                "UKR".to_string(),
                "USA".to_string()
            ]))
        );
        assert!(!channel.is_fetching());
    }

    #[test]
    fn test_fetch_failure() {
        let backend = MemoryBackend::default();
        backend.set_fail_fetch(true);

        let mut channel = PersistenceChannel::new();
        channel.fetch(egui::Context::default(), backend);

        assert!(matches!(
            wait_for_event(&mut channel),
            PersistenceEvent::Fetch(FetchOutcome::Failed(PersistenceError::Fetch(_)))
        ));
    }

    #[test]
    fn test_save_writes_whole_set() {
        let backend = MemoryBackend::seeded();
        let mut channel = PersistenceChannel::new();
        let ctx = egui::Context::default();

        let sequence = channel.save(ctx, backend.clone(), vec!["FRA".to_string()]);
        assert!(channel.is_saving());

        match wait_for_event(&mut channel) {
            PersistenceEvent::Save(outcome) => {
                assert_eq!(outcome.sequence, sequence);
                assert!(outcome.result.is_ok());
                assert!(!outcome.superseded);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(!channel.is_saving());
        assert_eq!(backend.stored(), vec!["FRA".to_string()]);
    }

    #[test]
    fn test_older_save_is_superseded() {
        let backend = MemoryBackend::default();
        let mut channel = PersistenceChannel::new();
        let ctx = egui::Context::default();

        channel.save(ctx.clone(), backend.clone(), vec!["UKR".to_string()]);
        channel.save(ctx, backend, vec!["UKR".to_string(), "USA".to_string()]);

        let mut outcomes = [wait_for_event(&mut channel), wait_for_event(&mut channel)];
        outcomes.sort_by_key(|event| match event {
            PersistenceEvent::Save(outcome) => outcome.sequence,
            PersistenceEvent::Fetch(_) => 0,
        });

        assert!(matches!(&outcomes[0], PersistenceEvent::Save(o) if o.superseded));
        assert!(matches!(&outcomes[1], PersistenceEvent::Save(o) if !o.superseded));
        assert!(!channel.is_saving());
    }
}
