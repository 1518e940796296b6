//! C5a: the rich tool vocabulary agent instrumenter (SPEC_FULL.md
//! supplement 3 — a Claude-Code-shaped tool set). All of the actual
//! algorithm lives in `ToolInstrumenter`; this type only supplies the
//! vocabulary and implements `Instrumenter` so the coordinator can hold
//! it as a trait object alongside `CodexInstrumenter`.

use crate::events::{ToolExecutionEvent, UsageEvent};
use crate::instrumenter::Instrumenter;
use crate::tool_instrumenter::ToolInstrumenter;
use crate::vocab::claude_code_vocabulary;
use async_trait::async_trait;
use std::sync::Arc;
use vibes_core::Clock;
use vibes_io::IoRuntime;
use vibes_session::SessionManager;

pub struct ClaudeCodeInstrumenter {
    inner: ToolInstrumenter,
}

impl ClaudeCodeInstrumenter {
    pub fn new(sessions: Arc<SessionManager>, io: Arc<IoRuntime>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: ToolInstrumenter::new(sessions, io, clock, claude_code_vocabulary()),
        }
    }
}

#[async_trait]
impl Instrumenter for ClaudeCodeInstrumenter {
    async fn handle_tool_execution(&self, session_id: &str, event: ToolExecutionEvent) {
        self.inner.handle_tool_execution(session_id, event).await;
    }

    async fn handle_thinking_chunk(&self, session_id: &str, text: &str) {
        self.inner.handle_thinking_chunk(session_id, text).await;
    }

    async fn handle_usage(&self, session_id: &str, usage: UsageEvent) {
        self.inner.handle_usage(session_id, usage).await;
    }

    async fn handle_prompt(&self, session_id: &str, prompt_text: &str, context_files: Option<Vec<String>>) {
        self.inner.handle_prompt(session_id, prompt_text, context_files).await;
    }

    async fn handle_result(&self, session_id: &str, final_text: &str) {
        self.inner.handle_result(session_id, final_text).await;
    }

    async fn flush(&self, session_id: &str) {
        self.inner.flush(session_id).await;
    }
}
