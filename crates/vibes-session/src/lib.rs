//! Session Manager (C4): per-session lifecycle state machine bridging the
//! pure builders in `vibes-core` and the durable I/O runtime in
//! `vibes-io`.

pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::{AnnotationRecordedEvent, SessionState, SessionStats};
