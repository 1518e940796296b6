use crate::atomic::{read_json_opt, write_json_atomic};
use crate::buffer::{AnnotationBufferState, ManifestDebounceState, PushOutcome};
use crate::jsonl;
use crate::mutex::ProjectMutexRegistry;
use crate::paths;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use vibes_core::{AnnotationRecord, Manifest};

/// Owns every piece of shared mutable state the durable I/O layer needs:
/// per-project mutexes, annotation buffers, and manifest debounce maps
/// (spec §9: "Scope these into one `IoRuntime` value owned by the
/// coordinator; pass it by shared ownership to whatever needs it.").
///
/// Always used behind an `Arc` so background flush timers can hold a
/// clone of the runtime without borrowing it.
pub struct IoRuntime {
    mutexes: ProjectMutexRegistry,
    annotations: AsyncMutex<HashMap<PathBuf, AnnotationBufferState>>,
    manifests: AsyncMutex<HashMap<PathBuf, ManifestDebounceState>>,
}

impl IoRuntime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            mutexes: ProjectMutexRegistry::new(),
            annotations: AsyncMutex::new(HashMap::new()),
            manifests: AsyncMutex::new(HashMap::new()),
        })
    }

    /// `append_annotation` (spec §4.3.3): buffers without writing to disk,
    /// scheduling a flush per the 20-record/2-second rule.
    pub async fn append_annotation(self: &Arc<Self>, project: &Path, record: AnnotationRecord) {
        let outcome = {
            let mut states = self.annotations.lock().await;
            states.entry(project.to_path_buf()).or_default().push(record)
        };
        match outcome {
            PushOutcome::ThresholdReached => {
                let runtime = self.clone();
                let project = project.to_path_buf();
                tokio::spawn(async move {
                    if let Err(err) = runtime.flush_annotations(&project).await {
                        tracing::warn!(project = %project.display(), error = %err, "annotation flush failed");
                    }
                });
            }
            PushOutcome::Buffered {
                arm_timer: Some(generation),
            } => {
                let runtime = self.clone();
                let project = project.to_path_buf();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(
                        crate::buffer::ANNOTATION_FLUSH_INTERVAL_MS,
                    ))
                    .await;
                    let still_current = {
                        let states = runtime.annotations.lock().await;
                        states
                            .get(&project)
                            .map(|s| s.generation() == generation)
                            .unwrap_or(false)
                    };
                    if still_current {
                        if let Err(err) = runtime.flush_annotations(&project).await {
                            tracing::warn!(project = %project.display(), error = %err, "annotation flush failed");
                        }
                    }
                });
            }
            PushOutcome::Buffered { arm_timer: None } => {}
        }
    }

    /// `append_annotation_immediate` (spec §4.3.3): used for `session`
    /// start/end. Acquires the project mutex, drains any pending buffer
    /// first to preserve on-disk order, then appends the critical record.
    pub async fn append_annotation_immediate(&self, project: &Path, record: AnnotationRecord) {
        let _guard = self.mutexes.lock(project).await;
        let mut pending = {
            let mut states = self.annotations.lock().await;
            match states.get_mut(project) {
                Some(state) => state.take(),
                None => Vec::new(),
            }
        };
        pending.push(record);
        if let Err(err) = jsonl::append_lines(&paths::annotations_path(project), &pending) {
            tracing::warn!(project = %project.display(), error = %err, "immediate annotation append failed");
        }
    }

    /// Flushes the project's pending annotation buffer to disk, if any.
    pub async fn flush_annotations(&self, project: &Path) -> anyhow::Result<()> {
        let _guard = self.mutexes.lock(project).await;
        let pending = {
            let mut states = self.annotations.lock().await;
            match states.get_mut(project) {
                Some(state) if !state.is_empty() => state.take(),
                _ => return Ok(()),
            }
        };
        jsonl::append_lines(&paths::annotations_path(project), &pending)
    }

    /// `add_manifest_entry` (spec §4.3.4): write-if-absent into the
    /// pending map, re-arming the 500ms debounce on every call.
    pub async fn add_manifest_entry(
        self: &Arc<Self>,
        project: &Path,
        hash: String,
        entry: vibes_core::ManifestEntry,
    ) {
        let generation = {
            let mut states = self.manifests.lock().await;
            states.entry(project.to_path_buf()).or_default().insert(hash, entry)
        };
        let runtime = self.clone();
        let project = project.to_path_buf();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(crate::buffer::MANIFEST_DEBOUNCE_MS)).await;
            let still_current = {
                let states = runtime.manifests.lock().await;
                states
                    .get(&project)
                    .map(|s| s.generation() == generation)
                    .unwrap_or(false)
            };
            if still_current {
                if let Err(err) = runtime.flush_manifest(&project).await {
                    tracing::warn!(project = %project.display(), error = %err, "manifest flush failed");
                }
            }
        });
    }

    /// Read-modify-write flush of the pending manifest entries (spec
    /// §4.3.4): read current `manifest.json` (or start fresh), insert
    /// pending hashes write-if-absent, rewrite atomically.
    pub async fn flush_manifest(&self, project: &Path) -> anyhow::Result<()> {
        let _guard = self.mutexes.lock(project).await;
        let pending = {
            let mut states = self.manifests.lock().await;
            match states.get_mut(project) {
                Some(state) if !state.is_empty() => state.take(),
                _ => return Ok(()),
            }
        };
        let path = paths::manifest_path(project);
        let mut manifest = read_json_opt::<Manifest>(&path)?.unwrap_or_else(Manifest::new);
        for (hash, entry) in pending {
            manifest.insert_if_absent(hash, entry);
        }
        write_json_atomic(&path, &manifest)
    }

    /// `flush_all` (spec §4.3.6): best-effort global flush across every
    /// tracked project, run in parallel via a `JoinSet`; per-project
    /// errors are logged and do not fail the aggregate.
    pub async fn flush_all(self: &Arc<Self>) {
        let projects: Vec<PathBuf> = {
            let annotations = self.annotations.lock().await;
            let manifests = self.manifests.lock().await;
            let mut set: std::collections::HashSet<PathBuf> =
                annotations.keys().cloned().collect();
            set.extend(manifests.keys().cloned());
            set.into_iter().collect()
        };

        let mut joinset = tokio::task::JoinSet::new();
        for project in projects {
            let runtime = self.clone();
            joinset.spawn(async move {
                if let Err(err) = runtime.flush_annotations(&project).await {
                    tracing::warn!(project = %project.display(), error = %err, "flush_all: annotation flush failed");
                }
                if let Err(err) = runtime.flush_manifest(&project).await {
                    tracing::warn!(project = %project.display(), error = %err, "flush_all: manifest flush failed");
                }
            });
        }
        while joinset.join_next().await.is_some() {}
        self.mutexes.purge_idle().await;
    }
}
