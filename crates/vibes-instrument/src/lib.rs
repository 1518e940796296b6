//! Agent instrumenters (C5a, C5b, C5c): translate heterogeneous upstream
//! tool-call events into the canonical annotation vocabulary defined by
//! `vibes-core`, persisting through `vibes-session` and `vibes-io`.
//!
//! `ToolInstrumenter` implements the shared algorithm spec §4.5
//! describes once; `ClaudeCodeInstrumenter` and `CodexInstrumenter` are
//! thin constructors over it with different tool-name tables.
//! `OrchestrationInstrumenter` is a separate, simpler recorder for the
//! orchestrator's own session (spec §4.6).

pub mod claude_code;
pub mod codex;
pub mod events;
pub mod extract;
pub mod instrumenter;
pub mod orchestration;
pub mod state;
pub mod tool_instrumenter;
pub mod vocab;

pub use claude_code::ClaudeCodeInstrumenter;
pub use codex::CodexInstrumenter;
pub use events::{ToolExecutionEvent, UsageEvent};
pub use instrumenter::Instrumenter;
pub use orchestration::OrchestrationInstrumenter;
pub use tool_instrumenter::ToolInstrumenter;
pub use vocab::{claude_code_vocabulary, codex_vocabulary, ToolVocabulary};
