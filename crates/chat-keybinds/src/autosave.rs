//! Debounced write-through of overrides
//!
//! [`SaveDebouncer`] holds the timing rules and knows nothing about timers;
//! [`Autosave`] drives it from a tokio task. Bursts of edits collapse into
//! one write of the latest snapshot, and at most one write runs at a time.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::PersistenceError;
use crate::models::Overrides;
use crate::persistence::OverridesStore;

/// Receives the overrides to persist after every mutation
pub trait SaveScheduler: Send {
    /// Queue a snapshot, replacing any snapshot not yet written
    fn schedule(&self, overrides: Overrides);

    /// Write any queued snapshot now
    fn flush(&self) -> Result<(), PersistenceError>;
}

/// Timer-agnostic debounce state
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    pending: Option<Overrides>,
    deadline: Option<Instant>,
    in_flight: bool,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        SaveDebouncer {
            delay,
            pending: None,
            deadline: None,
            in_flight: false,
        }
    }

    /// Replace the pending snapshot and re-arm the timer
    pub fn schedule(&mut self, snapshot: Overrides, now: Instant) {
        self.pending = Some(snapshot);
        self.deadline = Some(now + self.delay);
    }

    /// The snapshot to write, if its quiet period elapsed and no write is
    /// in flight. Marks a write in flight.
    pub fn poll_ready(&mut self, now: Instant) -> Option<Overrides> {
        if self.in_flight {
            return None;
        }
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                let snapshot = self.pending.take();
                self.in_flight = snapshot.is_some();
                snapshot
            }
            _ => None,
        }
    }

    /// The in-flight write finished, successfully or not
    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    /// Take the pending snapshot immediately, bypassing the timer
    pub fn take_pending(&mut self) -> Option<Overrides> {
        self.deadline = None;
        self.pending.take()
    }

    /// When the timer should next fire
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.in_flight {
            None
        } else {
            self.deadline
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Outcome of the most recent write
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed(String),
}

struct Shared {
    debouncer: Mutex<SaveDebouncer>,
    /// Held for the duration of every write
    save_lock: Mutex<()>,
    notify: Notify,
    store: Arc<dyn OverridesStore>,
    status: watch::Sender<SaveStatus>,
}

impl Shared {
    /// Caller must hold `save_lock`
    fn write(&self, snapshot: &Overrides) -> Result<(), PersistenceError> {
        self.status.send_replace(SaveStatus::Saving);
        let result = self.store.save_overrides(snapshot);
        self.debouncer.lock().complete();

        match &result {
            Ok(()) => {
                tracing::debug!("Persisted {} keybind overrides", snapshot.len());
                self.status.send_replace(SaveStatus::Saved);
            }
            Err(e) => {
                tracing::warn!("Failed to persist keybind overrides: {}", e);
                self.status.send_replace(SaveStatus::Failed(e.to_string()));
            }
        }
        result
    }

    /// Write the pending snapshot if its timer elapsed. Runs on a blocking
    /// thread; polling under `save_lock` orders it against `flush`.
    fn save_ready(&self) {
        let _guard = self.save_lock.lock();
        let snapshot = self.debouncer.lock().poll_ready(Instant::now());
        if let Some(snapshot) = snapshot {
            // Failures are published on the status channel.
            let _ = self.write(&snapshot);
        }
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        let _guard = self.save_lock.lock();
        let snapshot = self.debouncer.lock().take_pending();
        match snapshot {
            Some(snapshot) => self.write(&snapshot),
            None => Ok(()),
        }
    }
}

/// Tokio-driven debounced saver
pub struct Autosave {
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl Autosave {
    /// Spawn the save task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(store: Arc<dyn OverridesStore>, delay: Duration) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        let shared = Arc::new(Shared {
            debouncer: Mutex::new(SaveDebouncer::new(delay)),
            save_lock: Mutex::new(()),
            notify: Notify::new(),
            store,
            status,
        });
        let task = tokio::spawn(run(Arc::clone(&shared)));

        Autosave {
            shared,
            task: Some(task),
        }
    }

    /// Subscribe to save outcomes
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    pub fn has_pending(&self) -> bool {
        self.shared.debouncer.lock().has_pending()
    }

    /// Flush the pending snapshot and stop the save task
    pub fn shutdown(mut self) -> Result<(), PersistenceError> {
        let result = self.shared.flush();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        result
    }
}

impl SaveScheduler for Autosave {
    fn schedule(&self, overrides: Overrides) {
        self.shared
            .debouncer
            .lock()
            .schedule(overrides, Instant::now());
        self.shared.notify.notify_one();
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        self.shared.flush()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if let Err(e) = self.shared.flush() {
                tracing::warn!("Dropped autosave could not flush overrides: {}", e);
            }
            task.abort();
        }
    }
}

async fn run(shared: Arc<Shared>) {
    loop {
        let deadline = shared.debouncer.lock().next_deadline();
        match deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {}
                    // Re-armed; recompute the deadline.
                    _ = shared.notify.notified() => continue,
                }
            }
            None => {
                shared.notify.notified().await;
                continue;
            }
        }

        // Stores do blocking I/O; keep it off the runtime's worker threads.
        let writer = Arc::clone(&shared);
        if let Err(e) = tokio::task::spawn_blocking(move || writer.save_ready()).await {
            tracing::warn!("Autosave write task failed: {}", e);
            shared.debouncer.lock().complete();
        }
    }
}

/// Writes every snapshot immediately, for hosts without a runtime
pub struct WriteThrough {
    store: Arc<dyn OverridesStore>,
    last_error: Mutex<Option<String>>,
}

impl WriteThrough {
    pub fn new(store: Arc<dyn OverridesStore>) -> Self {
        WriteThrough {
            store,
            last_error: Mutex::new(None),
        }
    }

    /// Message of the most recent failed write, cleared by a successful one
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }
}

impl SaveScheduler for WriteThrough {
    fn schedule(&self, overrides: Overrides) {
        let outcome = self.store.save_overrides(&overrides);
        let mut last_error = self.last_error.lock();
        match outcome {
            Ok(()) => *last_error = None,
            Err(e) => {
                tracing::warn!("Failed to persist keybind overrides: {}", e);
                *last_error = Some(e.to_string());
            }
        }
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        Ok(())
    }
}
