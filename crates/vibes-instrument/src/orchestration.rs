//! C5c: Orchestration Instrumenter (spec §4.6). Records higher-level
//! dispatch/complete/batch events for the orchestrator's own session,
//! distinct from the per-agent sessions tracked by C5a/C5b. Grounded on
//! the same `csa-hooks`-shaped event-table pattern as the other
//! instrumenters, generalized from "map a tool name" to "map a
//! subagent/task-delegation event" per SPEC_FULL.md's crate table.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use vibes_core::builder::{build_command_entry, build_prompt_entry};
use vibes_core::{Clock, CommandType};
use vibes_session::SessionManager;

pub struct OrchestrationInstrumenter {
    sessions: Arc<SessionManager>,
    clock: Arc<dyn Clock>,
}

impl OrchestrationInstrumenter {
    pub fn new(sessions: Arc<SessionManager>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    /// Agent spawn (§4.6): a `command` entry with `command_type =
    /// tool_use`, working directory set to the project. If a task
    /// description is given and assurance isn't `low`, also records it
    /// as a prompt.
    pub async fn record_agent_spawn(
        &self,
        session_id: &str,
        project: &Path,
        agent_type: &str,
        agent_id: &str,
        task_description: Option<String>,
    ) {
        let text = format!("dispatch {agent_type} agent [{agent_id}]");
        match build_command_entry(
            self.clock.as_ref(),
            text,
            CommandType::ToolUse,
            None,
            None,
            Some(project.display().to_string()),
        ) {
            Ok((entry, hash)) => self.sessions.record_manifest_entry(session_id, hash, entry).await,
            Err(err) => tracing::warn!(session_id, error = %err, "failed to build agent-spawn command entry"),
        }

        let Some(description) = task_description else {
            return;
        };
        let allows_prompts = self
            .sessions
            .get_session(session_id)
            .await
            .map(|s| s.assurance_level.allows_prompts())
            .unwrap_or(false);
        if !allows_prompts {
            return;
        }
        match build_prompt_entry(self.clock.as_ref(), description, Some("task_description".to_string()), None) {
            Ok((entry, hash)) => self.sessions.record_manifest_entry(session_id, hash, entry).await,
            Err(err) => tracing::warn!(session_id, error = %err, "failed to build agent-spawn prompt entry"),
        }
    }

    /// Agent complete (§4.6): exit code 0/1 by success, output summary
    /// including duration formatted to one decimal second.
    pub async fn record_agent_complete(&self, session_id: &str, agent_id: &str, success: bool, duration: Duration) {
        let exit_code = if success { 0 } else { 1 };
        let summary = format!("agent [{agent_id}] {} in {:.1}s", if success { "completed" } else { "failed" }, duration.as_secs_f64());
        match build_command_entry(
            self.clock.as_ref(),
            format!("agent [{agent_id}] complete"),
            CommandType::ToolUse,
            Some(exit_code),
            Some(summary),
            None,
        ) {
            Ok((entry, hash)) => self.sessions.record_manifest_entry(session_id, hash, entry).await,
            Err(err) => tracing::warn!(session_id, error = %err, "failed to build agent-complete command entry"),
        }
    }

    /// Batch run start (§4.6): describes count and agent type, document
    /// list as the output summary (truncated to 200 chars by the
    /// builder).
    pub async fn record_batch_start(&self, session_id: &str, count: usize, agent_type: &str, documents: &[String]) {
        let text = format!("batch run: {count} {agent_type} agents");
        let summary = documents.join(", ");
        match build_command_entry(self.clock.as_ref(), text, CommandType::ToolUse, None, Some(summary), None) {
            Ok((entry, hash)) => self.sessions.record_manifest_entry(session_id, hash, entry).await,
            Err(err) => tracing::warn!(session_id, error = %err, "failed to build batch-start command entry"),
        }
    }

    /// Batch run complete (§4.6): exit code 0, counts of completed
    /// documents and tasks.
    pub async fn record_batch_complete(&self, session_id: &str, completed_documents: usize, completed_tasks: usize) {
        let summary = format!("{completed_documents} documents, {completed_tasks} tasks completed");
        match build_command_entry(
            self.clock.as_ref(),
            "batch run complete",
            CommandType::ToolUse,
            Some(0),
            Some(summary),
            None,
        ) {
            Ok((entry, hash)) => self.sessions.record_manifest_entry(session_id, hash, entry).await,
            Err(err) => tracing::warn!(session_id, error = %err, "failed to build batch-complete command entry"),
        }
    }
}
