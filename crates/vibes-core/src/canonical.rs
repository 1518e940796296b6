use crate::error::CoreResult;
use crate::manifest::ManifestEntry;
use sha2::{Digest, Sha256};

/// Produces the canonical byte form of a manifest entry with `created_at`
/// removed (spec §4.1). `serde_json::Map` is backed by a `BTreeMap` in this
/// workspace (the `preserve_order` feature is never enabled), so
/// `serde_json::to_vec` already emits object keys in lexicographic order —
/// the canonical-form requirement falls out of the default serializer
/// rather than needing a custom one.
pub fn canonical_bytes(entry: &ManifestEntry) -> CoreResult<Vec<u8>> {
    let mut value = serde_json::to_value(entry)?;
    if let serde_json::Value::Object(map) = &mut value {
        map.remove("created_at");
    }
    Ok(serde_json::to_vec(&value)?)
}

/// Content hash (C1): 64 lowercase hex characters, SHA-256 over the
/// canonical form. Streamed through `Sha256` the way
/// `cli-sub-agent::audit::hash::hash_file` streams file bytes, except the
/// input here is already in memory and there is no `sha256:` prefix — the
/// spec's hash format is the bare hex digest.
pub fn hash_entry(entry: &ManifestEntry) -> CoreResult<String> {
    let bytes = canonical_bytes(entry)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA-256 hex digest of raw bytes, used to name blob sidecars
/// (`blobs/{hash}.blob`). Distinct from `hash_entry`: this hashes the
/// reasoning text itself, not a canonicalized manifest entry, since the
/// entry that references the blob path can't hash its own blob path.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{CommandEntry, CommandType};

    fn command(created_at: &str) -> ManifestEntry {
        ManifestEntry::Command(CommandEntry {
            command_text: "git status".into(),
            command_type: CommandType::Shell,
            command_exit_code: Some(0),
            command_output_summary: None,
            working_directory: Some("/repo".into()),
            created_at: created_at.into(),
        })
    }

    #[test]
    fn hash_is_64_lowercase_hex() {
        let h = hash_entry(&command("2026-01-01T00:00:00.000Z")).unwrap();
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_is_independent_of_created_at() {
        let h1 = hash_entry(&command("2026-01-01T00:00:00.000Z")).unwrap();
        let h2 = hash_entry(&command("2030-06-15T12:34:56.789Z")).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_changes_with_logical_content() {
        let h1 = hash_entry(&command("2026-01-01T00:00:00.000Z")).unwrap();
        let different = ManifestEntry::Command(CommandEntry {
            command_text: "git log".into(),
            ..match command("2026-01-01T00:00:00.000Z") {
                ManifestEntry::Command(c) => c,
                _ => unreachable!(),
            }
        });
        let h2 = hash_entry(&different).unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn canonical_bytes_excludes_created_at_key() {
        let bytes = canonical_bytes(&command("2026-01-01T00:00:00.000Z")).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(!text.contains("created_at"));
    }
}
