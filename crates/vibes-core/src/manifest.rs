use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `.ai-audit/manifest.json` — mapping from 64-hex content hash to entry.
///
/// `entries` uses a `BTreeMap` rather than a hash map: key order is
/// irrelevant to semantics (spec §3.1) but a `BTreeMap` gives a stable,
/// diff-friendly serialization for free, matching
/// `csa_core::audit::AuditManifest::files`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub standard: String,
    pub version: String,
    #[serde(default)]
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self {
            standard: "VIBES".to_string(),
            version: "1.0".to_string(),
            entries: BTreeMap::new(),
        }
    }

    /// Write-if-absent insert per invariant 4 (manifest entries are immutable).
    /// Returns `true` if the entry was newly inserted.
    pub fn insert_if_absent(&mut self, hash: String, entry: ManifestEntry) -> bool {
        if self.entries.contains_key(&hash) {
            return false;
        }
        self.entries.insert(hash, entry);
        true
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ManifestEntry {
    Environment(EnvironmentEntry),
    Command(CommandEntry),
    Prompt(PromptEntry),
    Reasoning(ReasoningEntry),
}

impl ManifestEntry {
    /// The value of `created_at`, present on every variant, used by the
    /// canonicalizer (C1) to strip it before hashing.
    pub fn created_at(&self) -> &str {
        match self {
            ManifestEntry::Environment(e) => &e.created_at,
            ManifestEntry::Command(e) => &e.created_at,
            ManifestEntry::Prompt(e) => &e.created_at,
            ManifestEntry::Reasoning(e) => &e.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentEntry {
    pub tool_name: String,
    pub tool_version: String,
    pub model_name: String,
    pub model_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_parameters: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_extensions: Option<Vec<String>>,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Shell,
    FileWrite,
    FileRead,
    FileDelete,
    ApiCall,
    ToolUse,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandEntry {
    pub command_text: String,
    pub command_type: CommandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_output_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptEntry {
    pub prompt_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_context_files: Option<Vec<String>>,
    pub created_at: String,
}

/// The three mutually exclusive reasoning encodings (spec §3.1/§4.2).
/// Flattened onto `ReasoningEntry` so the on-disk shape is a flat object
/// with exactly one encoding's fields present, not a nested tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReasoningEncoding {
    Inline {
        reasoning_text: String,
    },
    Compressed {
        reasoning_text_compressed: String,
        compressed: bool,
    },
    External {
        external: bool,
        blob_path: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasoningEntry {
    #[serde(flatten)]
    pub encoding: ReasoningEncoding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_token_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_model: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_insert_if_absent_is_write_once() {
        let mut m = Manifest::new();
        let e1 = ManifestEntry::Command(CommandEntry {
            command_text: "ls".into(),
            command_type: CommandType::Shell,
            command_exit_code: Some(0),
            command_output_summary: None,
            working_directory: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        });
        let e2 = ManifestEntry::Command(CommandEntry {
            command_text: "rm -rf /".into(),
            command_type: CommandType::Shell,
            command_exit_code: Some(1),
            command_output_summary: None,
            working_directory: None,
            created_at: "2026-01-01T00:00:01.000Z".into(),
        });
        assert!(m.insert_if_absent("h1".into(), e1.clone()));
        assert!(!m.insert_if_absent("h1".into(), e2));
        assert_eq!(m.entries.get("h1"), Some(&e1));
    }

    #[test]
    fn command_type_serializes_snake_case() {
        let v = serde_json::to_value(CommandType::FileWrite).unwrap();
        assert_eq!(v, serde_json::json!("file_write"));
    }

    #[test]
    fn reasoning_inline_roundtrips_without_other_fields() {
        let entry = ReasoningEntry {
            encoding: ReasoningEncoding::Inline {
                reasoning_text: "hi".into(),
            },
            reasoning_token_count: Some(3),
            reasoning_model: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["reasoning_text"], "hi");
        assert!(v.get("reasoning_text_compressed").is_none());
        assert!(v.get("external").is_none());
        assert!(v.get("reasoning_model").is_none());
        let back: ReasoningEntry = serde_json::from_value(v).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn manifest_entry_tags_with_type_field() {
        let entry = ManifestEntry::Prompt(PromptEntry {
            prompt_text: "fix it".into(),
            prompt_type: None,
            prompt_context_files: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        });
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["type"], "prompt");
        assert_eq!(v["prompt_text"], "fix it");
        assert!(v.get("prompt_type").is_none());
    }

    #[test]
    fn created_at_accessor_covers_all_variants() {
        let env = ManifestEntry::Environment(EnvironmentEntry {
            tool_name: "t".into(),
            tool_version: "unknown".into(),
            model_name: "unknown".into(),
            model_version: "unknown".into(),
            model_parameters: None,
            tool_extensions: None,
            created_at: "ts".into(),
        });
        assert_eq!(env.created_at(), "ts");
    }
}
