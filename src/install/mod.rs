//! Transient hosted install scripts. Entries are a hand-off buffer between
//! package generation and script download: keyed by a random short code,
//! served once if one-time, and swept on a fixed interval otherwise.

pub mod script;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct InstallEntry {
    pub script: String,
    pub filename: String,
    pub expires_at: DateTime<Utc>,
    pub one_time: bool,
}

/// Mutex-protected map of short code -> install entry.
pub struct InstallStore {
    entries: Mutex<HashMap<String, InstallEntry>>,
}

impl InstallStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, InstallEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Stores an entry and returns its random short code.
    pub fn insert(&self, entry: InstallEntry) -> String {
        let mut buf = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut buf);
        let code = hex::encode(buf);
        self.lock().insert(code.clone(), entry);
        code
    }

    /// Fetches an entry by code. One-time entries are removed in the same
    /// lock acquisition, before the expiry check, so a consumed-but-expired
    /// entry is gone either way. Returns `None` for unknown or expired
    /// codes.
    pub fn fetch(&self, code: &str) -> Option<InstallEntry> {
        let entry = {
            let mut entries = self.lock();
            let entry = entries.get(code).cloned()?;
            if entry.one_time {
                entries.remove(code);
            }
            entry
        };
        if Utc::now() > entry.expires_at {
            return None;
        }
        Some(entry)
    }

    /// Removes every expired entry. Called by the background sweeper.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for InstallStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle handle for the background sweep task. Started once per process
/// by the serve path; tests start and stop their own.
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub fn start(store: Arc<InstallStore>, interval: Duration) -> Self {
        let (shutdown, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            ticker.tick().await; // first tick fires immediately
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.sweep_expired();
                        if removed > 0 {
                            tracing::debug!("swept {removed} expired install entries");
                        }
                    }
                    _ = stopped.changed() => return,
                }
            }
        });
        Self { shutdown, handle }
    }

    /// Stops the sweep task and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
