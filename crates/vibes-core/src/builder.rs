//! Pure constructors for manifest entries and annotation records (C2).
//! No I/O happens here — blob writing is a C3 concern; this module only
//! decides *which* reasoning encoding applies and builds the bytes for it.

use crate::annotation::{
    AnnotationRecord, LineAction, LineAnnotation, SessionAnnotation, SessionEvent,
};
use crate::canonical::hash_entry;
use crate::clock::Clock;
use crate::config::AssuranceLevel;
use crate::error::{CoreError, CoreResult};
use crate::manifest::{
    CommandEntry, CommandType, EnvironmentEntry, ManifestEntry, PromptEntry, ReasoningEncoding,
    ReasoningEntry,
};
use base64::Engine;
use std::io::Write;

/// `(entry, hash)` pair returned by every manifest-entry constructor.
pub type BuiltEntry = (ManifestEntry, String);

pub fn build_environment_entry(
    clock: &dyn Clock,
    tool_name: impl Into<String>,
    tool_version: impl Into<String>,
    model_name: impl Into<String>,
    model_version: impl Into<String>,
    model_parameters: Option<serde_json::Map<String, serde_json::Value>>,
    tool_extensions: Option<Vec<String>>,
) -> CoreResult<BuiltEntry> {
    let entry = ManifestEntry::Environment(EnvironmentEntry {
        tool_name: tool_name.into(),
        tool_version: tool_version.into(),
        model_name: model_name.into(),
        model_version: model_version.into(),
        model_parameters,
        tool_extensions,
        created_at: clock.now_iso8601(),
    });
    let hash = hash_entry(&entry)?;
    Ok((entry, hash))
}

pub fn build_command_entry(
    clock: &dyn Clock,
    command_text: impl Into<String>,
    command_type: CommandType,
    command_exit_code: Option<i32>,
    command_output_summary: Option<String>,
    working_directory: Option<String>,
) -> CoreResult<BuiltEntry> {
    let entry = ManifestEntry::Command(CommandEntry {
        command_text: truncate(&command_text.into(), 200),
        command_type,
        command_exit_code,
        command_output_summary: command_output_summary.map(|s| truncate(&s, 200)),
        working_directory,
        created_at: clock.now_iso8601(),
    });
    let hash = hash_entry(&entry)?;
    Ok((entry, hash))
}

pub fn build_prompt_entry(
    clock: &dyn Clock,
    prompt_text: impl Into<String>,
    prompt_type: Option<String>,
    prompt_context_files: Option<Vec<String>>,
) -> CoreResult<BuiltEntry> {
    let entry = ManifestEntry::Prompt(PromptEntry {
        prompt_text: prompt_text.into(),
        prompt_type,
        prompt_context_files,
        created_at: clock.now_iso8601(),
    });
    let hash = hash_entry(&entry)?;
    Ok((entry, hash))
}

/// Which of the three reasoning encodings applies to a chunk of text of
/// the given size, per spec §4.2's threshold algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEncodingChoice {
    Inline,
    Compressed,
    /// Caller must write a blob out-of-band (C3) and call
    /// `build_reasoning_entry_external`.
    External,
}

pub fn choose_reasoning_encoding(
    text_len_bytes: u64,
    compress_threshold_bytes: u64,
    external_threshold_bytes: u64,
) -> ReasoningEncodingChoice {
    if text_len_bytes > external_threshold_bytes {
        ReasoningEncodingChoice::External
    } else if text_len_bytes > compress_threshold_bytes {
        ReasoningEncodingChoice::Compressed
    } else {
        ReasoningEncodingChoice::Inline
    }
}

pub fn build_reasoning_entry_inline(
    clock: &dyn Clock,
    reasoning_text: impl Into<String>,
    reasoning_token_count: Option<u64>,
    reasoning_model: Option<String>,
) -> CoreResult<BuiltEntry> {
    let text = reasoning_text.into();
    if text.is_empty() {
        return Err(CoreError::EmptyReasoning);
    }
    let entry = ManifestEntry::Reasoning(ReasoningEntry {
        encoding: ReasoningEncoding::Inline {
            reasoning_text: text,
        },
        reasoning_token_count,
        reasoning_model,
        created_at: clock.now_iso8601(),
    });
    let hash = hash_entry(&entry)?;
    Ok((entry, hash))
}

/// Gzip-compresses and base64-encodes the text. Pure compute, no I/O —
/// the gzip/base64 stack is pulled in for this path specifically (the
/// teacher has no compression step; grounded on other pack repos, see
/// DESIGN.md).
pub fn build_reasoning_entry_compressed(
    clock: &dyn Clock,
    reasoning_text: &str,
    reasoning_token_count: Option<u64>,
    reasoning_model: Option<String>,
) -> CoreResult<BuiltEntry> {
    if reasoning_text.is_empty() {
        return Err(CoreError::EmptyReasoning);
    }
    let mut encoder =
        flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(reasoning_text.as_bytes())
        .map_err(CoreError::Compress)?;
    let gzipped = encoder.finish().map_err(CoreError::Compress)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(gzipped);

    let entry = ManifestEntry::Reasoning(ReasoningEntry {
        encoding: ReasoningEncoding::Compressed {
            reasoning_text_compressed: encoded,
            compressed: true,
        },
        reasoning_token_count,
        reasoning_model,
        created_at: clock.now_iso8601(),
    });
    let hash = hash_entry(&entry)?;
    Ok((entry, hash))
}

pub fn build_reasoning_entry_external(
    clock: &dyn Clock,
    blob_path: impl Into<String>,
    reasoning_token_count: Option<u64>,
    reasoning_model: Option<String>,
) -> CoreResult<BuiltEntry> {
    let entry = ManifestEntry::Reasoning(ReasoningEntry {
        encoding: ReasoningEncoding::External {
            external: true,
            blob_path: blob_path.into(),
        },
        reasoning_token_count,
        reasoning_model,
        created_at: clock.now_iso8601(),
    });
    let hash = hash_entry(&entry)?;
    Ok((entry, hash))
}

#[allow(clippy::too_many_arguments)]
pub fn build_session_start(
    clock: &dyn Clock,
    session_id: impl Into<String>,
    environment_hash: Option<String>,
    assurance_level: Option<AssuranceLevel>,
    description: Option<String>,
) -> AnnotationRecord {
    AnnotationRecord::Session(SessionAnnotation {
        event: SessionEvent::Start,
        session_id: session_id.into(),
        timestamp: clock.now_iso8601(),
        environment_hash,
        assurance_level,
        description,
    })
}

pub fn build_session_end(
    clock: &dyn Clock,
    session_id: impl Into<String>,
    environment_hash: Option<String>,
    assurance_level: Option<AssuranceLevel>,
) -> AnnotationRecord {
    AnnotationRecord::Session(SessionAnnotation {
        event: SessionEvent::End,
        session_id: session_id.into(),
        timestamp: clock.now_iso8601(),
        environment_hash,
        assurance_level,
        description: None,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn build_line_annotation(
    clock: &dyn Clock,
    file_path: impl Into<String>,
    line_start: u32,
    line_end: u32,
    environment_hash: impl Into<String>,
    action: LineAction,
    assurance_level: AssuranceLevel,
    command_hash: Option<String>,
    prompt_hash: Option<String>,
    reasoning_hash: Option<String>,
    session_id: Option<String>,
    commit_hash: Option<String>,
) -> AnnotationRecord {
    AnnotationRecord::Line(LineAnnotation {
        file_path: file_path.into(),
        line_start,
        line_end,
        environment_hash: environment_hash.into(),
        action,
        timestamp: clock.now_iso8601(),
        assurance_level,
        command_hash,
        prompt_hash,
        reasoning_hash,
        session_id,
        commit_hash,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    const CLOCK: FixedClock = FixedClock("2026-01-01T00:00:00.000Z");

    #[test]
    fn encoding_choice_respects_both_thresholds() {
        assert_eq!(
            choose_reasoning_encoding(100, 10_240, 102_400),
            ReasoningEncodingChoice::Inline
        );
        assert_eq!(
            choose_reasoning_encoding(10_240, 10_240, 102_400),
            ReasoningEncodingChoice::Inline
        );
        assert_eq!(
            choose_reasoning_encoding(10_241, 10_240, 102_400),
            ReasoningEncodingChoice::Compressed
        );
        assert_eq!(
            choose_reasoning_encoding(102_400, 10_240, 102_400),
            ReasoningEncodingChoice::Compressed
        );
        assert_eq!(
            choose_reasoning_encoding(102_401, 10_240, 102_400),
            ReasoningEncodingChoice::External
        );
    }

    #[test]
    fn command_entry_preserves_zero_exit_code() {
        let (entry, _) =
            build_command_entry(&CLOCK, "true", CommandType::Shell, Some(0), None, None).unwrap();
        match entry {
            ManifestEntry::Command(c) => assert_eq!(c.command_exit_code, Some(0)),
            _ => panic!("expected command entry"),
        }
    }

    #[test]
    fn command_text_truncates_to_200_chars_with_ellipsis() {
        let long = "x".repeat(250);
        let (entry, _) =
            build_command_entry(&CLOCK, long, CommandType::Shell, None, None, None).unwrap();
        match entry {
            ManifestEntry::Command(c) => {
                assert_eq!(c.command_text.chars().count(), 200);
                assert!(c.command_text.ends_with('\u{2026}'));
            }
            _ => panic!("expected command entry"),
        }
    }

    #[test]
    fn inline_reasoning_rejects_empty_text() {
        let err = build_reasoning_entry_inline(&CLOCK, "", None, None).unwrap_err();
        assert!(matches!(err, CoreError::EmptyReasoning));
    }

    #[test]
    fn compressed_reasoning_roundtrips_through_gzip_base64() {
        let text = "I need to create a file.".repeat(1000);
        let (entry, _) =
            build_reasoning_entry_compressed(&CLOCK, &text, Some(50), None).unwrap();
        let encoded = match entry {
            ManifestEntry::Reasoning(r) => match r.encoding {
                ReasoningEncoding::Compressed {
                    reasoning_text_compressed,
                    compressed,
                } => {
                    assert!(compressed);
                    reasoning_text_compressed
                }
                _ => panic!("expected compressed encoding"),
            },
            _ => panic!("expected reasoning entry"),
        };
        let gz_bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        let mut decoder = flate2::read::GzDecoder::new(&gz_bytes[..]);
        let mut out = String::new();
        std::io::Read::read_to_string(&mut decoder, &mut out).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn reasoning_entries_have_exactly_one_encoding_field_set() {
        let (entry, _) =
            build_reasoning_entry_external(&CLOCK, "blobs/abc.blob", None, None).unwrap();
        let v = serde_json::to_value(&entry).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().collect();
        assert!(keys.contains(&&"blob_path".to_string()));
        assert!(!keys.contains(&&"reasoning_text".to_string()));
        assert!(!keys.contains(&&"reasoning_text_compressed".to_string()));
    }

    #[test]
    fn session_start_and_end_are_tagged_with_matching_session_id() {
        let start = build_session_start(&CLOCK, "s1", None, Some(AssuranceLevel::Medium), None);
        let end = build_session_end(&CLOCK, "s1", Some("h".repeat(64)), Some(AssuranceLevel::Medium));
        assert_eq!(start.session_id(), Some("s1"));
        assert_eq!(end.session_id(), Some("s1"));
    }
}
