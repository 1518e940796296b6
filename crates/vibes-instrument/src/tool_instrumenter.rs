//! Shared engine behind both agent instrumenters (C5a, C5b). Spec §4.5
//! says the two agents "differ only in the specific tool vocabulary; the
//! algorithm is identical" — so `ToolInstrumenter` takes a
//! `ToolVocabulary` and implements the algorithm once; `claude_code.rs`
//! and `codex.rs` are thin constructors over it.

use crate::events::{ToolExecutionEvent, UsageEvent};
use crate::extract::{extract_file_path, extract_line_range, extract_shell_command, is_excluded, normalize_path, truncate};
use crate::state::InstrumenterState;
use crate::vocab::ToolVocabulary;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use vibes_core::builder::{
    build_command_entry, build_line_annotation, build_prompt_entry, build_reasoning_entry_compressed,
    build_reasoning_entry_external, build_reasoning_entry_inline, choose_reasoning_encoding,
    ReasoningEncodingChoice,
};
use vibes_core::{AssuranceLevel, Clock, ProjectConfig};
use vibes_io::IoRuntime;
use vibes_session::SessionManager;

/// C5a/C5b shared instrumenter. One instance per agent type; sessions of
/// that agent type all route through the same instance, each tracked by
/// its own `InstrumenterState` keyed by `host_session_id` (spec §3.2).
pub struct ToolInstrumenter {
    sessions: Arc<SessionManager>,
    io: Arc<IoRuntime>,
    clock: Arc<dyn Clock>,
    vocab: ToolVocabulary,
    state: Mutex<HashMap<String, InstrumenterState>>,
    config_cache: Mutex<HashMap<PathBuf, ProjectConfig>>,
}

impl ToolInstrumenter {
    pub fn new(
        sessions: Arc<SessionManager>,
        io: Arc<IoRuntime>,
        clock: Arc<dyn Clock>,
        vocab: ToolVocabulary,
    ) -> Self {
        Self {
            sessions,
            io,
            clock,
            vocab,
            state: Mutex::new(HashMap::new()),
            config_cache: Mutex::new(HashMap::new()),
        }
    }

    async fn project_config(&self, project: &Path) -> ProjectConfig {
        if let Some(cached) = self.config_cache.lock().await.get(project) {
            return cached.clone();
        }
        let config = vibes_io::atomic::read_json_opt::<ProjectConfig>(&vibes_io::paths::config_path(project))
            .ok()
            .flatten()
            .unwrap_or_else(|| {
                ProjectConfig::new(
                    project
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    AssuranceLevel::Medium,
                )
            });
        self.config_cache
            .lock()
            .await
            .insert(project.to_path_buf(), config.clone());
        config
    }

    /// §4.5.4, step 1-2: validate shape and confirm the session is live.
    async fn active_session(&self, session_id: &str) -> Option<vibes_session::SessionState> {
        let session = self.sessions.get_session(session_id).await?;
        if !session.active {
            return None;
        }
        Some(session)
    }

    /// §4.5.4: the full per-event algorithm for `handle_tool_execution`.
    pub async fn handle_tool_execution(&self, session_id: &str, event: ToolExecutionEvent) {
        let Some(session) = self.active_session(session_id).await else {
            return;
        };
        if event.tool_name.is_empty() {
            tracing::warn!(session_id, "malformed tool_execution event: empty tool_name");
            return;
        }

        // Step 3: flush buffered reasoning first so it links to this
        // call's hash, not the next one.
        let reasoning_hash = self.flush_reasoning(session_id, &session).await;

        // Step 4: command_text.
        let shell = extract_shell_command(&event.input);
        let file_path_raw = extract_file_path(&event.input);
        let command_text = if let Some(cmd) = &shell {
            truncate(cmd, 200)
        } else if let Some(path) = &file_path_raw {
            format!("{}: {path}", event.tool_name)
        } else {
            event.tool_name.clone()
        };
        let command_type = self.vocab.command_type(&event.tool_name);

        // Step 5: record the command entry (manifest debounced).
        let built = build_command_entry(self.clock.as_ref(), command_text, command_type, None, None, None);
        let (entry, command_hash) = match built {
            Ok(built) => built,
            Err(err) => {
                tracing::warn!(session_id, error = %err, "failed to build command entry");
                return;
            }
        };
        self.sessions
            .record_manifest_entry(session_id, command_hash.clone(), entry)
            .await;

        // Step 6: file-modifying tools additionally emit a line annotation.
        let Some(action) = self.vocab.action(&event.tool_name) else {
            return;
        };
        let Some(file_path) = file_path_raw else {
            return;
        };
        let normalized = normalize_path(&file_path);

        let config = self.project_config(&session.project).await;
        if is_excluded(&normalized, &config.exclude_patterns) {
            return;
        }

        let Some(env_hash) = session.environment_hash.clone() else {
            return;
        };

        let (line_start, line_end) = extract_line_range(&event.input).unwrap_or((1, 1));
        let prompt_hash = if session.assurance_level != AssuranceLevel::Low {
            self.state
                .lock()
                .await
                .get(session_id)
                .and_then(|s| s.last_prompt_hash.clone())
        } else {
            None
        };

        let annotation = build_line_annotation(
            self.clock.as_ref(),
            normalized,
            line_start,
            line_end,
            env_hash,
            action,
            session.assurance_level,
            Some(command_hash),
            prompt_hash,
            reasoning_hash,
            Some(session.vibes_session_id.clone()),
            None,
        );
        self.sessions.record_annotation(session_id, annotation).await;
    }

    /// §4.5.5: reasoning is accumulated only at assurance `high`.
    pub async fn handle_thinking_chunk(&self, session_id: &str, text: &str) {
        let Some(session) = self.active_session(session_id).await else {
            return;
        };
        if !session.assurance_level.allows_reasoning() {
            return;
        }
        let mut states = self.state.lock().await;
        states.entry(session_id.to_string()).or_default().reasoning_buffer.push_str(text);
    }

    /// §4.5.6: sums `reasoning_tokens` across calls, caches first non-empty model name.
    pub async fn handle_usage(&self, session_id: &str, usage: UsageEvent) {
        if self.active_session(session_id).await.is_none() {
            return;
        }
        let mut states = self.state.lock().await;
        let entry = states.entry(session_id.to_string()).or_default();
        if let Some(tokens) = usage.reasoning_tokens {
            entry.reasoning_token_count += tokens;
        }
        if entry.model_name.is_none() {
            if let Some(name) = usage.model_name {
                if !name.is_empty() {
                    entry.model_name = Some(name);
                }
            }
        }
    }

    /// §4.5.7: no-op at `low`; otherwise records a prompt entry and
    /// stashes its hash for subsequent `line` annotations.
    pub async fn handle_prompt(&self, session_id: &str, prompt_text: &str, context_files: Option<Vec<String>>) {
        let Some(session) = self.active_session(session_id).await else {
            return;
        };
        if !session.assurance_level.allows_prompts() {
            return;
        }
        match build_prompt_entry(self.clock.as_ref(), prompt_text, None, context_files) {
            Ok((entry, hash)) => {
                self.sessions
                    .record_manifest_entry(session_id, hash.clone(), entry)
                    .await;
                let mut states = self.state.lock().await;
                states.entry(session_id.to_string()).or_default().last_prompt_hash = Some(hash);
            }
            Err(err) => tracing::warn!(session_id, error = %err, "failed to build prompt entry"),
        }
    }

    /// §4.5.8: only flushes buffered reasoning; the final text itself is
    /// never stored by the core.
    pub async fn handle_result(&self, session_id: &str, _final_text: &str) {
        if let Some(session) = self.active_session(session_id).await {
            self.flush_reasoning(session_id, &session).await;
        }
    }

    /// §4.5.9: flushes reasoning, then clears all per-session instrumenter
    /// state. Called by the coordinator on process exit.
    pub async fn flush(&self, session_id: &str) {
        if let Some(session) = self.sessions.get_session(session_id).await {
            self.flush_reasoning(session_id, &session).await;
        }
        self.state.lock().await.remove(session_id);
    }

    /// Flush path (§4.2/§4.5.5): choose an encoding, record the manifest
    /// entry, clear the text buffer and token counter (the model name
    /// cache survives — it belongs to the session, not the turn).
    /// Returns the hash of the recorded entry, if anything was flushed.
    async fn flush_reasoning(&self, session_id: &str, session: &vibes_session::SessionState) -> Option<String> {
        let (text, token_count, model) = {
            let mut states = self.state.lock().await;
            let entry = states.entry(session_id.to_string()).or_default();
            if entry.reasoning_buffer.is_empty() {
                return None;
            }
            let text = std::mem::take(&mut entry.reasoning_buffer);
            let tokens = entry.reasoning_token_count;
            entry.reasoning_token_count = 0;
            (text, tokens, entry.model_name.clone())
        };
        let token_count = if token_count > 0 { Some(token_count) } else { None };

        let config = self.project_config(&session.project).await;
        let choice = choose_reasoning_encoding(
            text.len() as u64,
            config.compress_reasoning_threshold_bytes,
            config.external_blob_threshold_bytes,
        );

        let built = match choice {
            ReasoningEncodingChoice::Inline => {
                build_reasoning_entry_inline(self.clock.as_ref(), text, token_count, model)
            }
            ReasoningEncodingChoice::Compressed => {
                build_reasoning_entry_compressed(self.clock.as_ref(), &text, token_count, model)
            }
            ReasoningEncodingChoice::External => {
                let blob_hash = vibes_core::hash_bytes(text.as_bytes());
                match vibes_io::blobs::write_reasoning_blob(&session.project, &blob_hash, text.as_bytes()) {
                    Ok(blob_path) => {
                        build_reasoning_entry_external(self.clock.as_ref(), blob_path, token_count, model)
                    }
                    Err(err) => {
                        tracing::warn!(session_id, error = %err, "failed to write reasoning blob");
                        return None;
                    }
                }
            }
        };

        match built {
            Ok((entry, hash)) => {
                self.sessions
                    .record_manifest_entry(session_id, hash.clone(), entry)
                    .await;
                Some(hash)
            }
            Err(err) => {
                tracing::warn!(session_id, error = %err, "failed to build reasoning entry");
                None
            }
        }
    }

    /// Exposes the I/O runtime for instrumenter constructors that also
    /// need direct access (none currently do; kept for symmetry with the
    /// coordinator's dependency wiring).
    pub fn io(&self) -> &Arc<IoRuntime> {
        &self.io
    }
}
