use crate::state::{AnnotationRecordedEvent, SessionStats};
use crate::SessionState;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use vibes_core::builder::{build_session_end, build_session_start};
use vibes_core::{AnnotationRecord, AssuranceLevel, Clock, IdGen, ManifestEntry};
use vibes_io::IoRuntime;

type AnnotationCallback = dyn Fn(&str, AnnotationRecordedEvent) + Send + Sync;

/// Session Manager (C4). Owns the per-session state machine described in
/// spec §4.4; delegates all actual persistence to the shared `IoRuntime`
/// (C3). Grounded on `csa-session::manager`'s CRUD-style API, adapted
/// from TOML-persisted session state to purely in-memory `SessionState` —
/// this core never persists sessions themselves, only the manifest
/// entries and annotations they emit.
pub struct SessionManager {
    io: Arc<IoRuntime>,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    sessions: Mutex<HashMap<String, SessionState>>,
    on_annotation_recorded: Mutex<Option<Arc<AnnotationCallback>>>,
}

impl SessionManager {
    pub fn new(io: Arc<IoRuntime>, clock: Arc<dyn Clock>, id_gen: Arc<dyn IdGen>) -> Arc<Self> {
        Arc::new(Self {
            io,
            clock,
            id_gen,
            sessions: Mutex::new(HashMap::new()),
            on_annotation_recorded: Mutex::new(None),
        })
    }

    /// Installs (or clears, with `None`) the UI-notification callback
    /// (spec §4.7.5). Errors from the callback never propagate — it
    /// returns `()`, not a `Result`; a callback that panics is a caller
    /// bug, not something this layer catches, matching how the rest of
    /// this codebase treats programmer-error contract violations.
    pub async fn set_on_annotation_recorded(
        &self,
        callback: Option<Arc<AnnotationCallback>>,
    ) {
        *self.on_annotation_recorded.lock().await = callback;
    }

    /// `start_session` (spec §4.4). Refuses to restart an id that is
    /// already active (SPEC_FULL.md Open Question decision 2): returns
    /// the existing state unchanged and logs a warning, rather than
    /// overwriting it or emitting a second `start` record.
    #[allow(clippy::too_many_arguments)]
    pub async fn start_session(
        self: &Arc<Self>,
        host_session_id: &str,
        project: &Path,
        agent_type: &str,
        assurance_level: AssuranceLevel,
        environment_hash: Option<String>,
        description: Option<String>,
    ) -> SessionState {
        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get(host_session_id) {
            if existing.active {
                tracing::warn!(
                    host_session_id,
                    "start_session called for an already-active session; ignoring"
                );
                return existing.clone();
            }
        }

        let vibes_session_id = self.id_gen.new_session_id();
        let started_at = self.clock.now_iso8601();
        let record = build_session_start(
            self.clock.as_ref(),
            vibes_session_id.clone(),
            environment_hash.clone(),
            Some(assurance_level),
            description,
        );
        drop(sessions);
        self.io.append_annotation_immediate(project, record).await;

        let state = SessionState {
            host_session_id: host_session_id.to_string(),
            vibes_session_id,
            project: project.to_path_buf(),
            agent_type: agent_type.to_string(),
            assurance_level,
            environment_hash,
            annotation_count: 1,
            started_at,
            active: true,
        };
        self.sessions
            .lock()
            .await
            .insert(host_session_id.to_string(), state.clone());
        state
    }

    /// `end_session` (spec §4.4): no-op if unknown or already ended.
    /// Flushes buffered annotations before the immediate `end` write so
    /// invariant 3 (every `end` is preceded in file order by everything
    /// the session buffered) holds.
    pub async fn end_session(&self, host_session_id: &str) -> Option<SessionState> {
        let project = {
            let sessions = self.sessions.lock().await;
            match sessions.get(host_session_id) {
                Some(s) if s.active => s.project.clone(),
                _ => return None,
            }
        };

        if let Err(err) = self.io.flush_annotations(&project).await {
            tracing::warn!(host_session_id, error = %err, "pre-end flush failed");
        }

        let mut sessions = self.sessions.lock().await;
        let state = sessions.get_mut(host_session_id)?;
        if !state.active {
            return None;
        }
        let record = build_session_end(
            self.clock.as_ref(),
            state.vibes_session_id.clone(),
            state.environment_hash.clone(),
            Some(state.assurance_level),
        );
        state.active = false;
        let snapshot = state.clone();
        drop(sessions);

        self.io.append_annotation_immediate(&project, record).await;
        Some(snapshot)
    }

    /// `record_annotation` (spec §4.4): no-op if unknown/inactive;
    /// otherwise buffered append plus counter increment and the optional
    /// UI callback.
    pub async fn record_annotation(self: &Arc<Self>, host_session_id: &str, annotation: AnnotationRecord) {
        let (project, count) = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get_mut(host_session_id) {
                Some(s) if s.active => {
                    s.annotation_count += 1;
                    (s.project.clone(), s.annotation_count)
                }
                _ => return,
            }
        };

        self.io.append_annotation(&project, annotation.clone()).await;

        if let Some(callback) = self.on_annotation_recorded.lock().await.clone() {
            callback(
                host_session_id,
                AnnotationRecordedEvent {
                    count,
                    last_annotation: annotation,
                },
            );
        }
    }

    /// `record_manifest_entry` (spec §4.4): no-op if unknown/inactive.
    /// The annotation counter is *not* incremented — manifest entries are
    /// not annotations.
    pub async fn record_manifest_entry(self: &Arc<Self>, host_session_id: &str, hash: String, entry: ManifestEntry) {
        let project = {
            let sessions = self.sessions.lock().await;
            match sessions.get(host_session_id) {
                Some(s) if s.active => s.project.clone(),
                _ => return,
            }
        };
        self.io.add_manifest_entry(&project, hash, entry).await;
    }

    /// `update_environment_hash` (spec §4.4, Open Question 3): repoints
    /// the session at a new environment manifest entry in place. Any
    /// placeholder entry already on disk is left untouched and simply
    /// stops being referenced by future `line` annotations.
    pub async fn update_environment_hash(&self, host_session_id: &str, new_hash: String) {
        let mut sessions = self.sessions.lock().await;
        if let Some(state) = sessions.get_mut(host_session_id) {
            if state.active {
                state.environment_hash = Some(new_hash);
            }
        }
    }

    pub async fn get_session_stats(&self, host_session_id: &str) -> Option<SessionStats> {
        let sessions = self.sessions.lock().await;
        sessions.get(host_session_id).map(SessionStats::from)
    }

    pub async fn get_session(&self, host_session_id: &str) -> Option<SessionState> {
        self.sessions.lock().await.get(host_session_id).cloned()
    }

    /// Exposes the shared I/O runtime so callers (instrumenters, the
    /// coordinator, tests) can trigger flushes or blob writes without the
    /// session manager needing a pass-through method for every C3 op.
    pub fn io(&self) -> &Arc<IoRuntime> {
        &self.io
    }

    pub async fn is_active(&self, host_session_id: &str) -> bool {
        self.sessions
            .lock()
            .await
            .get(host_session_id)
            .map(|s| s.active)
            .unwrap_or(false)
    }
}
