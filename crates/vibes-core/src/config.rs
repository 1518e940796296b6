use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPRESS_THRESHOLD_BYTES: u64 = 10_240;
pub const DEFAULT_EXTERNAL_THRESHOLD_BYTES: u64 = 102_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssuranceLevel {
    Low,
    Medium,
    High,
}

impl AssuranceLevel {
    /// `medium` and `high` capture prompts; `low` does not (spec §8, invariant 6/7/8).
    pub fn allows_prompts(self) -> bool {
        self >= AssuranceLevel::Medium
    }

    /// Only `high` accumulates reasoning chunks.
    pub fn allows_reasoning(self) -> bool {
        self == AssuranceLevel::High
    }
}

/// `.ai-audit/config.json` (spec §3.1). Pattern grounded on `csa-config`'s
/// typed-struct-with-defaults approach; the on-disk format is JSON (not
/// the teacher's TOML) because the spec fixes the wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectConfig {
    pub standard: String,
    pub standard_version: String,
    pub assurance_level: AssuranceLevel,
    pub project_name: String,
    pub tracked_extensions: Vec<String>,
    pub exclude_patterns: Vec<String>,
    #[serde(default = "default_compress_threshold")]
    pub compress_reasoning_threshold_bytes: u64,
    #[serde(default = "default_external_threshold")]
    pub external_blob_threshold_bytes: u64,
}

fn default_compress_threshold() -> u64 {
    DEFAULT_COMPRESS_THRESHOLD_BYTES
}

fn default_external_threshold() -> u64 {
    DEFAULT_EXTERNAL_THRESHOLD_BYTES
}

impl ProjectConfig {
    pub fn new(project_name: impl Into<String>, assurance_level: AssuranceLevel) -> Self {
        Self {
            standard: "VIBES".to_string(),
            standard_version: "1.0".to_string(),
            assurance_level,
            project_name: project_name.into(),
            tracked_extensions: default_tracked_extensions(),
            exclude_patterns: default_exclude_patterns(),
            compress_reasoning_threshold_bytes: DEFAULT_COMPRESS_THRESHOLD_BYTES,
            external_blob_threshold_bytes: DEFAULT_EXTERNAL_THRESHOLD_BYTES,
        }
    }
}

pub fn default_tracked_extensions() -> Vec<String> {
    [
        ".ts", ".tsx", ".js", ".jsx", ".py", ".rs", ".go", ".java", ".rb", ".c", ".cpp", ".h",
        ".hpp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_exclude_patterns() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/dist/**",
        "**/.git/**",
        "**/target/**",
        "**/.ai-audit/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assurance_gating_matches_spec_invariants() {
        assert!(!AssuranceLevel::Low.allows_prompts());
        assert!(!AssuranceLevel::Low.allows_reasoning());
        assert!(AssuranceLevel::Medium.allows_prompts());
        assert!(!AssuranceLevel::Medium.allows_reasoning());
        assert!(AssuranceLevel::High.allows_prompts());
        assert!(AssuranceLevel::High.allows_reasoning());
    }

    #[test]
    fn assurance_level_serializes_lowercase() {
        let v = serde_json::to_value(AssuranceLevel::Medium).unwrap();
        assert_eq!(v, serde_json::json!("medium"));
    }

    #[test]
    fn project_config_defaults_populate_thresholds() {
        let cfg = ProjectConfig::new("demo", AssuranceLevel::High);
        assert_eq!(
            cfg.compress_reasoning_threshold_bytes,
            DEFAULT_COMPRESS_THRESHOLD_BYTES
        );
        assert_eq!(
            cfg.external_blob_threshold_bytes,
            DEFAULT_EXTERNAL_THRESHOLD_BYTES
        );
        assert!(!cfg.exclude_patterns.is_empty());
    }
}
