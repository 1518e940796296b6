use std::sync::Arc;
use vibes_core::AssuranceLevel;
use vibes_instrument::{ToolExecutionEvent, UsageEvent};

/// Upstream process-spawn payload (spec §4.7.2). The host resolves
/// `project_path`/`cwd` and `tool_type` from its own process-spawning
/// layer (out of scope per spec §1); everything else is optional detail
/// the coordinator uses if present.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpawnConfig {
    pub tool_type: String,
    pub project_path: Option<String>,
    pub cwd: Option<String>,
    pub assurance_level: Option<AssuranceLevel>,
    pub description: Option<String>,
}

pub type ToolExecutionHandler = Arc<dyn Fn(String, ToolExecutionEvent) + Send + Sync>;
pub type ThinkingChunkHandler = Arc<dyn Fn(String, String) + Send + Sync>;
pub type UsageHandler = Arc<dyn Fn(String, UsageEvent) + Send + Sync>;

/// The narrow process-events interface this core consumes (spec §1,
/// §4.7.1): "the core only consumes a narrow `ProcessEvents` interface."
/// `process-spawn`/`process-exit`/`prompt-sent` are not subscribed here —
/// spec §4.7.1 only lists `tool-execution`, `thinking-chunk`, `usage` as
/// `attach_to_process_events` subscriptions; the other three are called
/// directly as coordinator methods per §6's exposed-interface list.
pub trait ProcessEventEmitter: Send + Sync {
    fn subscribe_tool_execution(&self, handler: ToolExecutionHandler);
    fn subscribe_thinking_chunk(&self, handler: ThinkingChunkHandler);
    fn subscribe_usage(&self, handler: UsageHandler);
}
