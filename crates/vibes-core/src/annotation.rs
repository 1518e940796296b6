use serde::{Deserialize, Serialize};

/// A record in `annotations.jsonl` (spec §3.1): a `session` bracket event
/// or a `line` provenance record, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationRecord {
    Session(SessionAnnotation),
    Line(LineAnnotation),
}

impl AnnotationRecord {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            AnnotationRecord::Session(s) => Some(&s.session_id),
            AnnotationRecord::Line(l) => l.session_id.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    Start,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionAnnotation {
    pub event: SessionEvent,
    pub session_id: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assurance_level: Option<crate::config::AssuranceLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineAction {
    Create,
    Modify,
    Delete,
    Review,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineAnnotation {
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub environment_hash: String,
    pub action: LineAction,
    pub timestamp: String,
    pub assurance_level: crate::config::AssuranceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssuranceLevel;

    #[test]
    fn session_annotation_tags_with_type_and_event() {
        let rec = AnnotationRecord::Session(SessionAnnotation {
            event: SessionEvent::Start,
            session_id: "s1".into(),
            timestamp: "ts".into(),
            environment_hash: None,
            assurance_level: Some(AssuranceLevel::Medium),
            description: None,
        });
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["type"], "session");
        assert_eq!(v["event"], "start");
        assert!(v.get("description").is_none());
    }

    #[test]
    fn line_annotation_omits_absent_optionals() {
        let rec = AnnotationRecord::Line(LineAnnotation {
            file_path: "src/login.ts".into(),
            line_start: 1,
            line_end: 1,
            environment_hash: "a".repeat(64),
            action: LineAction::Create,
            timestamp: "ts".into(),
            assurance_level: AssuranceLevel::Medium,
            command_hash: None,
            prompt_hash: Some("b".repeat(64)),
            reasoning_hash: None,
            session_id: Some("s1".into()),
            commit_hash: None,
        });
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["type"], "line");
        assert!(v.get("command_hash").is_none());
        assert!(v.get("reasoning_hash").is_none());
        assert!(v.get("commit_hash").is_none());
        assert_eq!(v["prompt_hash"], "b".repeat(64));
    }

    #[test]
    fn session_id_accessor_reads_either_variant() {
        let line = AnnotationRecord::Line(LineAnnotation {
            file_path: "a".into(),
            line_start: 1,
            line_end: 1,
            environment_hash: "a".repeat(64),
            action: LineAction::Modify,
            timestamp: "ts".into(),
            assurance_level: AssuranceLevel::Low,
            command_hash: None,
            prompt_hash: None,
            reasoning_hash: None,
            session_id: Some("sx".into()),
            commit_hash: None,
        });
        assert_eq!(line.session_id(), Some("sx"));
    }
}
