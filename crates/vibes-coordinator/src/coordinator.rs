use crate::events::{ProcessEventEmitter, ProcessSpawnConfig, ToolExecutionHandler};
use crate::settings::SettingsStore;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use vibes_core::builder::build_environment_entry;
use vibes_core::{AnnotationRecord, AssuranceLevel, Clock, IdGen, SystemClock, UuidV4Gen};
use vibes_instrument::{
    ClaudeCodeInstrumenter, CodexInstrumenter, Instrumenter, OrchestrationInstrumenter,
    ToolExecutionEvent, UsageEvent,
};
use vibes_io::IoRuntime;
use vibes_session::{AnnotationRecordedEvent, SessionManager, SessionStats};

/// Agent types this core ships an instrumenter for out of the box
/// (spec §4.7.2 step 2: "for unknown agent types, the default is
/// enabled iff the type is in the known-instrumentable set").
const KNOWN_INSTRUMENTABLE: &[&str] = &["claude-code", "codex"];

const ANNOTATION_UPDATE_CHANNEL: &str = "vibes:annotation-update";

fn tool_name_for_agent_type(agent_type: &str) -> String {
    match agent_type {
        "claude-code" => "Claude Code".to_string(),
        "codex" => "Codex".to_string(),
        other => other.to_string(),
    }
}

/// POSIX errno values for EPERM / EACCES / EROFS. Matched directly
/// against `raw_os_error()` rather than pulling in `libc` for three
/// integers (the teacher's own PTY/sandbox code is the only place in
/// this workspace that needs `libc`, and that code has no SPEC_FULL.md
/// counterpart — see DESIGN.md's trimming notes).
const ERRNO_EPERM: i32 = 1;
const ERRNO_EACCES: i32 = 13;
const ERRNO_EROFS: i32 = 30;

fn is_permission_class(err: &std::io::Error) -> bool {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        return true;
    }
    matches!(err.raw_os_error(), Some(ERRNO_EPERM) | Some(ERRNO_EACCES) | Some(ERRNO_EROFS))
}

/// Non-fatal probe for `.ai-audit/` write access (spec §4.7.2 step 6):
/// creates the directory and a throwaway file inside it. Actual file
/// creation still happens lazily through the normal write path; this
/// only exists to surface permission errors before a session starts.
fn probe_writable(project: &Path) -> std::io::Result<()> {
    let audit_dir = vibes_io::paths::audit_dir(project);
    std::fs::create_dir_all(&audit_dir)?;
    let probe = audit_dir.join(".write-probe");
    std::fs::write(&probe, b"")?;
    std::fs::remove_file(&probe)
}

/// Coordinator (C6): subscribes to host process events, routes them to
/// the matching per-agent instrumenter, and auto-initializes
/// `.ai-audit/` on first contact with a project. Grounded on
/// `csa-executor::Executor`'s dispatch-by-tag shape (§4.7.4's "looks up
/// the session's agent type and dispatches to the matching
/// instrumenter" generalizes the same idea from "dispatch to an agent
/// provider" to "dispatch a host event to an instrumenter").
pub struct Coordinator {
    settings: Arc<dyn SettingsStore>,
    sessions: Arc<SessionManager>,
    io: Arc<IoRuntime>,
    clock: Arc<dyn Clock>,
    bridge: Arc<vibes_cli_bridge::CliBridge>,
    instrumenters: HashMap<String, Arc<dyn Instrumenter>>,
    orchestration: Arc<OrchestrationInstrumenter>,
    non_writable: Mutex<HashSet<PathBuf>>,
    auto_init_attempted: Mutex<HashSet<PathBuf>>,
    session_agent_type: Mutex<HashMap<String, String>>,
}

impl Coordinator {
    pub fn new(settings: Arc<dyn SettingsStore>, bridge: Arc<vibes_cli_bridge::CliBridge>) -> Arc<Self> {
        Self::with_dependencies(settings, bridge, Arc::new(SystemClock), Arc::new(UuidV4Gen))
    }

    /// Dependency-injected constructor (spec §9: "Clock and UUID
    /// injection... provide clock and UUID factory as injected
    /// dependencies"), used by tests that need deterministic
    /// `created_at`/session ids.
    pub fn with_dependencies(
        settings: Arc<dyn SettingsStore>,
        bridge: Arc<vibes_cli_bridge::CliBridge>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
    ) -> Arc<Self> {
        let io = IoRuntime::new();
        let sessions = SessionManager::new(io.clone(), clock.clone(), id_gen);

        let mut instrumenters: HashMap<String, Arc<dyn Instrumenter>> = HashMap::new();
        instrumenters.insert(
            "claude-code".to_string(),
            Arc::new(ClaudeCodeInstrumenter::new(sessions.clone(), io.clone(), clock.clone())),
        );
        instrumenters.insert(
            "codex".to_string(),
            Arc::new(CodexInstrumenter::new(sessions.clone(), io.clone(), clock.clone())),
        );

        let orchestration = Arc::new(OrchestrationInstrumenter::new(sessions.clone(), clock.clone()));

        Arc::new(Self {
            settings,
            sessions,
            io,
            clock,
            bridge,
            instrumenters,
            orchestration,
            non_writable: Mutex::new(HashSet::new()),
            auto_init_attempted: Mutex::new(HashSet::new()),
            session_agent_type: Mutex::new(HashMap::new()),
        })
    }

    /// `attach_to_process_events` (spec §4.7.1): installs handlers for
    /// `tool-execution`, `thinking-chunk`, `usage`. Each handler spawns
    /// the matching coordinator method, which already swallows its own
    /// errors at the public boundary (spec §7) — there is nothing for
    /// the handler itself to catch, so no error can propagate back
    /// through the emitter.
    pub fn attach_to_process_events(self: &Arc<Self>, emitter: &dyn ProcessEventEmitter) {
        if !self.settings.vibes_enabled() {
            return;
        }

        let this = self.clone();
        let handler: ToolExecutionHandler = Arc::new(move |session_id, event| {
            let this = this.clone();
            tokio::spawn(async move { this.handle_tool_execution(&session_id, event).await });
        });
        emitter.subscribe_tool_execution(handler);

        let this = self.clone();
        emitter.subscribe_thinking_chunk(Arc::new(move |session_id, text| {
            let this = this.clone();
            tokio::spawn(async move { this.handle_thinking_chunk(&session_id, &text).await });
        }));

        let this = self.clone();
        emitter.subscribe_usage(Arc::new(move |session_id, usage| {
            let this = this.clone();
            tokio::spawn(async move { this.handle_usage(&session_id, usage).await });
        }));
    }

    /// `handle_process_spawn` (spec §4.7.2).
    pub async fn handle_process_spawn(self: &Arc<Self>, host_session_id: &str, config: ProcessSpawnConfig) {
        if !self.settings.vibes_enabled() {
            return;
        }

        let enabled = self
            .settings
            .vibes_per_agent_enabled(&config.tool_type)
            .unwrap_or_else(|| KNOWN_INSTRUMENTABLE.contains(&config.tool_type.as_str()));
        if !enabled {
            return;
        }

        let Some(project) = config
            .project_path
            .clone()
            .or_else(|| config.cwd.clone())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
        else {
            return;
        };

        if self.is_project_unwritable(&project).await {
            return;
        }

        self.maybe_auto_init(&project).await;

        if let Err(err) = probe_writable(&project) {
            if is_permission_class(&err) {
                tracing::warn!(
                    project = %project.display(),
                    error = %err,
                    "project is not writable; suppressing further instrumentation"
                );
                self.non_writable.lock().await.insert(project.clone());
                return;
            }
            tracing::warn!(project = %project.display(), error = %err, "write-access probe failed (non-fatal)");
        }

        let assurance = config
            .assurance_level
            .unwrap_or_else(|| self.settings.vibes_assurance_level());
        self.sessions
            .start_session(
                host_session_id,
                &project,
                &config.tool_type,
                assurance,
                None,
                config.description.clone(),
            )
            .await;

        let tool_name = tool_name_for_agent_type(&config.tool_type);
        match build_environment_entry(self.clock.as_ref(), tool_name, "unknown", "unknown", "unknown", None, None) {
            Ok((entry, hash)) => {
                self.sessions
                    .record_manifest_entry(host_session_id, hash.clone(), entry)
                    .await;
                self.sessions.update_environment_hash(host_session_id, hash).await;
            }
            Err(err) => tracing::warn!(host_session_id, error = %err, "failed to build placeholder environment entry"),
        }

        self.session_agent_type
            .lock()
            .await
            .insert(host_session_id.to_string(), config.tool_type.clone());
    }

    async fn maybe_auto_init(&self, project: &Path) {
        {
            let mut attempted = self.auto_init_attempted.lock().await;
            if attempted.contains(project) {
                return;
            }
            attempted.insert(project.to_path_buf());
        }

        if vibes_io::init::is_initialized(project) || !self.settings.vibes_auto_init() {
            return;
        }

        let project_name = project
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let assurance = self.settings.vibes_assurance_level();

        let bridge_result = self.bridge.init(project, &project_name, assurance, None).await;
        if bridge_result.success {
            return;
        }
        if let Err(err) = vibes_io::init::init_directly(project, &project_name, assurance) {
            tracing::warn!(project = %project.display(), error = %err, "direct init fallback failed");
        }
    }

    /// `handle_process_exit` (spec §4.7.3).
    pub async fn handle_process_exit(&self, host_session_id: &str, _exit_code: i32) {
        if !self.sessions.is_active(host_session_id).await {
            return;
        }
        if let Some(instrumenter) = self.instrumenter_for(host_session_id).await {
            instrumenter.flush(host_session_id).await;
        }
        self.sessions.end_session(host_session_id).await;
        self.session_agent_type.lock().await.remove(host_session_id);
    }

    async fn instrumenter_for(&self, host_session_id: &str) -> Option<Arc<dyn Instrumenter>> {
        let agent_type = self.session_agent_type.lock().await.get(host_session_id).cloned()?;
        self.instrumenters.get(&agent_type).cloned()
    }

    /// §4.7.4 routing methods: unknown session ids and unknown agent
    /// types are no-ops.
    pub async fn handle_tool_execution(&self, host_session_id: &str, event: ToolExecutionEvent) {
        if let Some(instrumenter) = self.instrumenter_for(host_session_id).await {
            instrumenter.handle_tool_execution(host_session_id, event).await;
        }
    }

    pub async fn handle_thinking_chunk(&self, host_session_id: &str, text: &str) {
        if let Some(instrumenter) = self.instrumenter_for(host_session_id).await {
            instrumenter.handle_thinking_chunk(host_session_id, text).await;
        }
    }

    pub async fn handle_usage(&self, host_session_id: &str, usage: UsageEvent) {
        if let Some(instrumenter) = self.instrumenter_for(host_session_id).await {
            instrumenter.handle_usage(host_session_id, usage).await;
        }
    }

    pub async fn handle_prompt_sent(&self, host_session_id: &str, prompt_text: &str, context_files: Option<Vec<String>>) {
        if let Some(instrumenter) = self.instrumenter_for(host_session_id).await {
            instrumenter.handle_prompt(host_session_id, prompt_text, context_files).await;
        }
    }

    /// §4.7.5: installs (or clears) the UI notification sink. `safe_send`
    /// receives `(channel, payload)`; only positive events are ever sent
    /// (spec §7: "it receives only positive events").
    pub async fn set_notification_sink(
        self: &Arc<Self>,
        safe_send: Option<Arc<dyn Fn(&str, serde_json::Value) + Send + Sync>>,
    ) {
        match safe_send {
            Some(sink) => {
                self.sessions
                    .set_on_annotation_recorded(Some(Arc::new(move |session_id, event| {
                        let payload = annotation_update_payload(session_id, &event);
                        sink(ANNOTATION_UPDATE_CHANNEL, payload);
                    })))
                    .await;
            }
            None => self.sessions.set_on_annotation_recorded(None).await,
        }
    }

    pub async fn get_session_stats(&self, host_session_id: &str) -> Option<SessionStats> {
        self.sessions.get_session_stats(host_session_id).await
    }

    pub async fn is_project_unwritable(&self, project: &Path) -> bool {
        self.non_writable.lock().await.contains(project)
    }

    pub async fn clear_unwritable_project_cache(&self) {
        self.non_writable.lock().await.clear();
    }

    pub async fn clear_auto_init_cache(&self) {
        self.auto_init_attempted.lock().await.clear();
    }

    pub fn get_orchestration_instrumenter(&self) -> Arc<OrchestrationInstrumenter> {
        self.orchestration.clone()
    }

    /// Pass-through query to C7's one-shot missing-binary warning (no
    /// new bridge call is triggered by asking).
    pub fn notify_vibes_binary_missing(&self) -> bool {
        self.bridge.missing_binary_warned()
    }

    pub async fn flush_all(self: &Arc<Self>) {
        self.io.flush_all().await;
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }
}

fn annotation_update_payload(session_id: &str, event: &AnnotationRecordedEvent) -> serde_json::Value {
    let last = match &event.last_annotation {
        AnnotationRecord::Session(s) => serde_json::json!({
            "type": "session",
            "timestamp": s.timestamp,
        }),
        AnnotationRecord::Line(l) => serde_json::json!({
            "type": "line",
            "file_path": l.file_path,
            "action": l.action,
            "timestamp": l.timestamp,
        }),
    };
    serde_json::json!({
        "session_id": session_id,
        "annotation_count": event.count,
        "last_annotation": last,
    })
}
