//! Coordinator (C6): the single entry point a host application wires its
//! process-events emitter into. Resolves project paths, auto-initializes
//! `.ai-audit/`, detects non-writable projects, and routes host events to
//! the matching per-agent instrumenter (spec §4.7).

pub mod coordinator;
pub mod events;
pub mod settings;

pub use coordinator::Coordinator;
pub use events::{ProcessEventEmitter, ProcessSpawnConfig};
pub use settings::{InMemorySettingsStore, SettingsStore};
