//! The common contract (spec §4.5) all agent instrumenters expose to the
//! coordinator. `async_trait` mirrors the teacher's own use of it for
//! provider-style dispatch (`csa-executor`'s `Executor`/`Transport`
//! traits) — the coordinator holds instrumenters as `Arc<dyn
//! Instrumenter>` and routes events to whichever one matches a session's
//! agent type (§4.7.4), without caring which concrete tool vocabulary it
//! wraps.

use crate::events::{ToolExecutionEvent, UsageEvent};
use async_trait::async_trait;

#[async_trait]
pub trait Instrumenter: Send + Sync {
    async fn handle_tool_execution(&self, session_id: &str, event: ToolExecutionEvent);
    async fn handle_thinking_chunk(&self, session_id: &str, text: &str);
    async fn handle_usage(&self, session_id: &str, usage: UsageEvent);
    async fn handle_prompt(&self, session_id: &str, prompt_text: &str, context_files: Option<Vec<String>>);
    async fn handle_result(&self, session_id: &str, final_text: &str);
    async fn flush(&self, session_id: &str);
}
