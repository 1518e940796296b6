use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Per-project mutual exclusion (spec §4.3.5, §9). The source serializes
/// I/O with a promise-chain trick; this uses the design notes' suggested
/// replacement instead: one `tokio::sync::Mutex` per project path,
/// allocated on demand, with idle entries purged so the map does not grow
/// without bound. Conceptually grounded on `csa-lock::SessionLock`'s
/// acquire/release shape, but in-process only — no `flock`, since this
/// mutex never needs to coordinate with other host processes (unlike
/// `csa-lock`, which guards a cross-process session directory).
#[derive(Default)]
pub struct ProjectMutexRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ProjectMutexRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `project`, allocating a fresh mutex if this
    /// is the first access. The returned guard serializes all I/O for
    /// this project until dropped.
    pub async fn lock(&self, project: &Path) -> OwnedMutexGuard<()> {
        let entry = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(project.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }

    /// Drops registry entries whose mutex is held only by the registry
    /// itself (no in-flight lock), bounding memory across long-running
    /// processes that touch many projects (spec §3.4: "ProjectMutex
    /// entries remove themselves after the tail future resolves").
    pub async fn purge_idle(&self) {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, arc| Arc::strong_count(arc) > 1);
    }

    #[cfg(test)]
    pub async fn tracked_project_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn serializes_access_to_the_same_project() {
        let registry = Arc::new(ProjectMutexRegistry::new());
        let project = PathBuf::from("/tmp/proj-a");
        let counter = Arc::new(AtomicU32::new(0));
        let mut handles = Vec::new();

        for _ in 0..10 {
            let registry = registry.clone();
            let project = project.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = registry.lock(&project).await;
                let before = counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                assert_eq!(counter.load(Ordering::SeqCst), before + 1);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn distinct_projects_do_not_contend() {
        let registry = Arc::new(ProjectMutexRegistry::new());
        let a = registry.lock(Path::new("/tmp/a")).await;
        let b = registry.lock(Path::new("/tmp/b")).await;
        drop(a);
        drop(b);
    }

    #[tokio::test]
    async fn purge_idle_drops_unreferenced_entries() {
        let registry = ProjectMutexRegistry::new();
        {
            let _g = registry.lock(Path::new("/tmp/a")).await;
        }
        assert_eq!(registry.tracked_project_count().await, 1);
        registry.purge_idle().await;
        assert_eq!(registry.tracked_project_count().await, 0);
    }
}
