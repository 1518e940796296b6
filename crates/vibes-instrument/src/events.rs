//! Upstream event shapes consumed by the instrumenters (spec §4.5). These
//! are the parsed, language-neutral payloads the coordinator hands down
//! after translating whatever the host's process-events emitter produced;
//! this crate never touches raw stdio.

/// `handle_tool_execution`'s event payload. `input` is the tool call's
/// raw arguments, tolerant of missing/mis-shaped fields per spec §4.5.2 —
/// extraction functions in `extract.rs` never panic on an unexpected
/// shape, they just return `None`.
#[derive(Debug, Clone)]
pub struct ToolExecutionEvent {
    pub tool_name: String,
    pub input: serde_json::Value,
}

impl ToolExecutionEvent {
    pub fn new(tool_name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            input,
        }
    }
}

/// `handle_usage`'s event payload (spec §4.5.6). Only `reasoning_tokens`
/// and `model_name` are consumed by this core; `input_tokens`/
/// `output_tokens` are accepted for shape-fidelity with the upstream
/// event but are not part of the audit trail.
#[derive(Debug, Clone, Default)]
pub struct UsageEvent {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub reasoning_tokens: Option<u64>,
    pub model_name: Option<String>,
}
