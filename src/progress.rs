//! Process-local progress for long-running scrapes.
//!
//! Jobs write one entry per key (`international`, `profiles:women`, ...)
//! and pollers read snapshots. Entries live for the process and are never
//! persisted; a failed job leaves its entry in `Error` until the key is
//! reused.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    Idle,
    Running,
    Complete,
    Error,
}

/// Progress descriptor for one key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub percent: u8,
    pub current: usize,
    pub total: usize,
    pub status: ProgressStatus,
    pub current_item: Option<String>,
    pub error: Option<String>,
}

impl Progress {
    fn recompute(&mut self) {
        self.percent = if self.total == 0 {
            0
        } else {
            ((self.current.min(self.total) * 100) / self.total) as u8
        };
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, ProgressStatus::Complete | ProgressStatus::Error)
    }
}

/// Shared registry; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct ProgressRegistry {
    entries: Arc<RwLock<HashMap<String, Progress>>>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Progress>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Progress>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Reset `key` to running with a known total.
    pub fn start(&self, key: &str, total: usize) {
        let mut progress = Progress {
            total,
            status: ProgressStatus::Running,
            ..Default::default()
        };
        progress.recompute();
        self.write().insert(key.to_string(), progress);
    }

    /// Change the total once it is known.
    pub fn set_total(&self, key: &str, total: usize) {
        if let Some(p) = self.write().get_mut(key) {
            p.total = total;
            p.recompute();
        }
    }

    /// Record that work on item `current` (1-based) is starting.
    pub fn advance(&self, key: &str, current: usize, item: impl Into<String>) {
        let mut entries = self.write();
        let p = entries.entry(key.to_string()).or_default();
        p.status = ProgressStatus::Running;
        p.current = current;
        p.current_item = Some(item.into());
        p.recompute();
    }

    pub fn complete(&self, key: &str) {
        let mut entries = self.write();
        let p = entries.entry(key.to_string()).or_default();
        p.status = ProgressStatus::Complete;
        p.current = p.total;
        p.current_item = None;
        p.percent = 100;
    }

    pub fn fail(&self, key: &str, message: impl Into<String>) {
        let mut entries = self.write();
        let p = entries.entry(key.to_string()).or_default();
        p.status = ProgressStatus::Error;
        p.error = Some(message.into());
    }

    pub fn get(&self, key: &str) -> Option<Progress> {
        self.read().get(key).cloned()
    }

    /// Every entry, sorted by key.
    pub fn snapshot(&self) -> Vec<(String, Progress)> {
        let mut all: Vec<_> = self
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Run `fut` in the background under `key`.
    ///
    /// The entry is marked running before the task starts, then complete on
    /// `Ok` or error with the error text on `Err`. A panicking task is also
    /// recorded as an error.
    pub fn spawn_tracked<F, T, E>(&self, key: &str, fut: F) -> JoinHandle<Option<T>>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        if self.get(key).map(|p| p.status) != Some(ProgressStatus::Running) {
            self.start(key, 0);
        }
        let registry = self.clone();
        let key = key.to_string();

        tokio::spawn(async move {
            let inner = tokio::spawn(fut);
            match inner.await {
                Ok(Ok(value)) => {
                    registry.complete(&key);
                    info!("Background task '{}' finished", key);
                    Some(value)
                }
                Ok(Err(e)) => {
                    error!("Background task '{}' failed: {}", key, e);
                    registry.fail(&key, e.to_string());
                    None
                }
                Err(join_err) => {
                    error!("Background task '{}' aborted: {}", key, join_err);
                    registry.fail(&key, join_err.to_string());
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lifecycle() {
        let registry = ProgressRegistry::new();
        assert_eq!(registry.get("international"), None);

        registry.start("international", 4);
        registry.advance("international", 1, "India");
        let p = registry.get("international").unwrap();
        assert_eq!(p.status, ProgressStatus::Running);
        assert_eq!(p.percent, 25);
        assert_eq!(p.current_item.as_deref(), Some("India"));

        registry.complete("international");
        let p = registry.get("international").unwrap();
        assert_eq!(p.percent, 100);
        assert!(p.is_finished());
    }

    #[test]
    fn test_zero_total_has_zero_percent() {
        let registry = ProgressRegistry::new();
        registry.start("live", 0);
        registry.advance("live", 3, "x");
        assert_eq!(registry.get("live").unwrap().percent, 0);
    }

    #[tokio::test]
    async fn test_spawn_tracked_records_error() {
        let registry = ProgressRegistry::new();
        let handle = registry.spawn_tracked("profiles:women", async {
            Err::<(), _>("upstream returned HTTP 503")
        });
        assert_eq!(handle.await.unwrap(), None);

        let p = registry.get("profiles:women").unwrap();
        assert_eq!(p.status, ProgressStatus::Error);
        assert_eq!(p.error.as_deref(), Some("upstream returned HTTP 503"));
    }

    #[tokio::test]
    async fn test_spawn_tracked_completes() {
        let registry = ProgressRegistry::new();
        let handle = registry.spawn_tracked("teams", async { Ok::<_, String>(7) });
        assert_eq!(handle.await.unwrap(), Some(7));
        assert_eq!(
            registry.get("teams").unwrap().status,
            ProgressStatus::Complete
        );
        assert_eq!(registry.snapshot().len(), 1);
    }
}
