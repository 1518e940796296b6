//! Minimal driver that exercises the coordinator end-to-end against a
//! real directory: process-spawn, a prompt, a couple of tool
//! executions, process-exit. Useful for poking at `.ai-audit/` by hand
//! without wiring up a real host integration.

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use vibes_coordinator::{Coordinator, InMemorySettingsStore, ProcessSpawnConfig};
use vibes_instrument::ToolExecutionEvent;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()
        .ok();

    let project = match std::env::args().nth(1) {
        Some(path) => std::path::PathBuf::from(path),
        None => std::env::current_dir()?,
    };

    let settings = Arc::new(InMemorySettingsStore::default());
    let bridge = Arc::new(vibes_cli_bridge::CliBridge::new(None));
    let coordinator = Coordinator::new(settings, bridge);

    let host_session_id = "vibes-demo-session";
    coordinator
        .handle_process_spawn(
            host_session_id,
            ProcessSpawnConfig {
                tool_type: "claude-code".to_string(),
                project_path: Some(project.display().to_string()),
                description: Some("demo walkthrough".to_string()),
                ..Default::default()
            },
        )
        .await;

    coordinator
        .handle_prompt_sent(host_session_id, "Add a greeting helper", None)
        .await;
    coordinator
        .handle_tool_execution(
            host_session_id,
            ToolExecutionEvent::new("Write", json!({"file_path": "src/greeting.ts"})),
        )
        .await;
    coordinator
        .handle_tool_execution(
            host_session_id,
            ToolExecutionEvent::new("Bash", json!({"command": "cargo test"})),
        )
        .await;

    coordinator.handle_process_exit(host_session_id, 0).await;
    coordinator.flush_all().await;

    if let Some(stats) = coordinator.get_session_stats(host_session_id).await {
        println!(
            "session {} ({}): {} annotations, active={}",
            stats.session_id, stats.agent_type, stats.annotation_count, stats.active
        );
    }
    println!("wrote {}", vibes_io::paths::audit_dir(&project).display());

    Ok(())
}
