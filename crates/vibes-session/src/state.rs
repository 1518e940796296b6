use std::path::PathBuf;
use vibes_core::AssuranceLevel;

/// In-memory `SessionState` (spec §3.2): one per live agent process. The
/// host identifies the process by its own id (`host_session_id`, the key
/// callers pass to every coordinator/instrumenter method); the core
/// generates a separate UUID v4 (`vibes_session_id`) that is what
/// actually appears in `annotations.jsonl`'s `session_id` field.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub host_session_id: String,
    pub vibes_session_id: String,
    pub project: PathBuf,
    pub agent_type: String,
    pub assurance_level: AssuranceLevel,
    pub environment_hash: Option<String>,
    pub annotation_count: u64,
    pub started_at: String,
    pub active: bool,
}

/// `get_session_stats` result (SPEC_FULL.md supplement 1).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub session_id: String,
    pub agent_type: String,
    pub annotation_count: u64,
    pub active: bool,
    pub started_at: String,
}

impl From<&SessionState> for SessionStats {
    fn from(s: &SessionState) -> Self {
        Self {
            session_id: s.vibes_session_id.clone(),
            agent_type: s.agent_type.clone(),
            annotation_count: s.annotation_count,
            active: s.active,
            started_at: s.started_at.clone(),
        }
    }
}

/// Payload passed to the optional `on_annotation_recorded` callback
/// (spec §4.4).
#[derive(Debug, Clone)]
pub struct AnnotationRecordedEvent {
    pub count: u64,
    pub last_annotation: vibes_core::AnnotationRecord,
}
