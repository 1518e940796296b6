//! End-to-end scenarios from spec.md §8 (S1-S4), driven directly against
//! `SessionManager` + `ClaudeCodeInstrumenter` without the coordinator —
//! these exercise C4/C5a/C3 wiring the way a host that already knows its
//! session id and agent type would use them.

use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;
use vibes_core::{AnnotationRecord, AssuranceLevel, Clock, FixedClock, FixedIdGen, LineAction, ManifestEntry};
use vibes_instrument::{ClaudeCodeInstrumenter, Instrumenter, ToolExecutionEvent, UsageEvent};
use vibes_io::IoRuntime;
use vibes_session::SessionManager;

fn harness(id: &'static str) -> (Arc<SessionManager>, ClaudeCodeInstrumenter) {
    let io = IoRuntime::new();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock("2026-01-01T00:00:00.000Z"));
    let sessions = SessionManager::new(io.clone(), clock.clone(), Arc::new(FixedIdGen(id)));
    let instrumenter = ClaudeCodeInstrumenter::new(sessions.clone(), io, clock);
    (sessions, instrumenter)
}

/// S1 — Medium-assurance single write.
#[tokio::test]
async fn s1_medium_assurance_single_write() {
    let (sessions, instr) = harness("11111111-1111-4111-8111-111111111111");
    let dir = tempdir().unwrap();

    sessions
        .start_session(
            "m1",
            dir.path(),
            "claude-code",
            AssuranceLevel::Medium,
            Some("e".repeat(64)),
            None,
        )
        .await;
    instr.handle_prompt("m1", "Fix login bug", None).await;
    instr
        .handle_tool_execution("m1", ToolExecutionEvent::new("Write", json!({"file_path": "src/login.ts"})))
        .await;
    sessions.end_session("m1").await;
    sessions.io().flush_all().await;

    let annotations = vibes_io::jsonl::read_all(&vibes_io::paths::annotations_path(dir.path())).unwrap();
    assert!(matches!(&annotations[0], AnnotationRecord::Session(s) if s.event == vibes_core::SessionEvent::Start));
    let line = match &annotations[1] {
        AnnotationRecord::Line(l) => l,
        _ => panic!("expected line annotation second"),
    };
    assert_eq!(line.file_path, "src/login.ts");
    assert_eq!(line.action, LineAction::Create);
    assert!(line.prompt_hash.is_some());
    assert!(matches!(&annotations[2], AnnotationRecord::Session(s) if s.event == vibes_core::SessionEvent::End));

    let manifest: vibes_core::Manifest =
        vibes_io::atomic::read_json_opt(&vibes_io::paths::manifest_path(dir.path())).unwrap().unwrap();
    assert_eq!(manifest.entries.len(), 2);
    assert!(manifest.entries.values().any(|e| matches!(e, ManifestEntry::Prompt(p) if p.prompt_text == "Fix login bug")));
    assert!(manifest
        .entries
        .values()
        .any(|e| matches!(e, ManifestEntry::Command(c) if c.command_text == "Write: src/login.ts")));
}

/// S2 — High-assurance reasoning capture, flushed before the command.
#[tokio::test]
async fn s2_high_assurance_reasoning_capture() {
    let (sessions, instr) = harness("22222222-2222-4222-8222-222222222222");
    let dir = tempdir().unwrap();

    sessions
        .start_session("h1", dir.path(), "claude-code", AssuranceLevel::High, Some("e".repeat(64)), None)
        .await;
    instr.handle_thinking_chunk("h1", "I need to ").await;
    instr.handle_thinking_chunk("h1", "create a file.").await;
    instr
        .handle_usage("h1", UsageEvent { reasoning_tokens: Some(50), ..Default::default() })
        .await;
    instr
        .handle_tool_execution("h1", ToolExecutionEvent::new("Write", json!({"file_path": "src/u.ts"})))
        .await;
    sessions.io().flush_all().await;

    let manifest: vibes_core::Manifest =
        vibes_io::atomic::read_json_opt(&vibes_io::paths::manifest_path(dir.path())).unwrap().unwrap();
    let reasoning = manifest
        .entries
        .values()
        .find_map(|e| match e {
            ManifestEntry::Reasoning(r) => Some(r),
            _ => None,
        })
        .expect("expected exactly one reasoning entry");
    assert_eq!(
        reasoning.encoding,
        vibes_core::ReasoningEncoding::Inline {
            reasoning_text: "I need to create a file.".to_string()
        }
    );
    assert_eq!(reasoning.reasoning_token_count, Some(50));

    let reasoning_hash = manifest
        .entries
        .iter()
        .find(|(_, e)| matches!(e, ManifestEntry::Reasoning(_)))
        .map(|(hash, _)| hash.clone())
        .unwrap();

    let annotations = vibes_io::jsonl::read_all(&vibes_io::paths::annotations_path(dir.path())).unwrap();
    let line = annotations
        .iter()
        .find_map(|a| match a {
            AnnotationRecord::Line(l) => Some(l),
            _ => None,
        })
        .expect("expected a line annotation");
    assert_eq!(line.reasoning_hash, Some(reasoning_hash));
}

/// S3 — Low-assurance suppression of prompts and reasoning.
#[tokio::test]
async fn s3_low_assurance_suppression() {
    let (sessions, instr) = harness("33333333-3333-4333-8333-333333333333");
    let dir = tempdir().unwrap();

    sessions
        .start_session("l1", dir.path(), "claude-code", AssuranceLevel::Low, Some("e".repeat(64)), None)
        .await;
    instr.handle_prompt("l1", "x", None).await;
    instr.handle_thinking_chunk("l1", "y").await;
    instr.handle_thinking_chunk("l1", "z").await;
    instr
        .handle_tool_execution("l1", ToolExecutionEvent::new("Write", json!({"file_path": "a.ts"})))
        .await;
    sessions.end_session("l1").await;
    sessions.io().flush_all().await;

    let manifest: vibes_core::Manifest =
        vibes_io::atomic::read_json_opt(&vibes_io::paths::manifest_path(dir.path())).unwrap().unwrap();
    let kinds: Vec<&str> = manifest
        .entries
        .values()
        .map(|e| match e {
            ManifestEntry::Environment(_) => "environment",
            ManifestEntry::Command(_) => "command",
            ManifestEntry::Prompt(_) => "prompt",
            ManifestEntry::Reasoning(_) => "reasoning",
        })
        .collect();
    assert!(!kinds.contains(&"prompt"));
    assert!(!kinds.contains(&"reasoning"));
    assert_eq!(kinds.iter().filter(|k| **k == "command").count(), 1);
}

/// S4 — Exclude pattern suppresses the line annotation, not the command.
#[tokio::test]
async fn s4_exclude_pattern_suppresses_line_only() {
    let (sessions, instr) = harness("44444444-4444-4444-8444-444444444444");
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join(".ai-audit")).unwrap();
    let config = vibes_core::ProjectConfig {
        exclude_patterns: vec!["**/dist/**".to_string()],
        ..vibes_core::ProjectConfig::new("demo", AssuranceLevel::Medium)
    };
    vibes_io::atomic::write_json_atomic(&vibes_io::paths::config_path(dir.path()), &config).unwrap();

    sessions
        .start_session("e1", dir.path(), "claude-code", AssuranceLevel::Medium, Some("e".repeat(64)), None)
        .await;
    instr
        .handle_tool_execution("e1", ToolExecutionEvent::new("Write", json!({"file_path": "dist/out.js"})))
        .await;
    sessions.io().flush_all().await;

    let annotations = vibes_io::jsonl::read_all(&vibes_io::paths::annotations_path(dir.path())).unwrap();
    assert!(annotations.iter().all(|a| !matches!(a, AnnotationRecord::Line(_))));

    let manifest: vibes_core::Manifest =
        vibes_io::atomic::read_json_opt(&vibes_io::paths::manifest_path(dir.path())).unwrap().unwrap();
    assert!(manifest.entries.values().any(|e| matches!(e, ManifestEntry::Command(_))));
}

/// S6 — Two sessions in two projects, 25 annotations each, interleaved.
/// Verifies the per-project mutex keeps each project's `annotations.jsonl`
/// self-consistent even when both sessions are driven concurrently.
#[tokio::test]
async fn s6_multi_project_isolation() {
    let io = IoRuntime::new();
    let clock: Arc<dyn Clock> = Arc::new(FixedClock("2026-01-01T00:00:00.000Z"));
    let sessions_a = SessionManager::new(io.clone(), clock.clone(), Arc::new(FixedIdGen("aaaaaaaa-aaaa-4aaa-8aaa-aaaaaaaaaaaa")));
    let sessions_b = SessionManager::new(io.clone(), clock.clone(), Arc::new(FixedIdGen("bbbbbbbb-bbbb-4bbb-8bbb-bbbbbbbbbbbb")));
    let instr_a = ClaudeCodeInstrumenter::new(sessions_a.clone(), io.clone(), clock.clone());
    let instr_b = ClaudeCodeInstrumenter::new(sessions_b.clone(), io.clone(), clock.clone());

    let dir_a = tempdir().unwrap();
    let dir_b = tempdir().unwrap();
    sessions_a
        .start_session("pa", dir_a.path(), "claude-code", AssuranceLevel::Medium, Some("e".repeat(64)), None)
        .await;
    sessions_b
        .start_session("pb", dir_b.path(), "claude-code", AssuranceLevel::Medium, Some("f".repeat(64)), None)
        .await;

    let task_a = async {
        for i in 0..25 {
            instr_a
                .handle_tool_execution("pa", ToolExecutionEvent::new("Write", json!({"file_path": format!("src/a{i}.ts")})))
                .await;
        }
    };
    let task_b = async {
        for i in 0..25 {
            instr_b
                .handle_tool_execution("pb", ToolExecutionEvent::new("Write", json!({"file_path": format!("src/b{i}.ts")})))
                .await;
        }
    };
    tokio::join!(task_a, task_b);

    sessions_a.end_session("pa").await;
    sessions_b.end_session("pb").await;
    io.flush_all().await;

    let annotations_a = vibes_io::jsonl::read_all(&vibes_io::paths::annotations_path(dir_a.path())).unwrap();
    let annotations_b = vibes_io::jsonl::read_all(&vibes_io::paths::annotations_path(dir_b.path())).unwrap();

    let lines_a: Vec<&str> = annotations_a
        .iter()
        .filter_map(|a| match a {
            AnnotationRecord::Line(l) => Some(l.file_path.as_str()),
            _ => None,
        })
        .collect();
    let lines_b: Vec<&str> = annotations_b
        .iter()
        .filter_map(|a| match a {
            AnnotationRecord::Line(l) => Some(l.file_path.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(lines_a.len(), 25);
    assert_eq!(lines_b.len(), 25);
    assert!(lines_a.iter().all(|p| p.starts_with("src/a")));
    assert!(lines_b.iter().all(|p| p.starts_with("src/b")));
    assert!(annotations_a
        .iter()
        .filter(|a| matches!(a, AnnotationRecord::Session(_)))
        .count()
        == 2);
}
