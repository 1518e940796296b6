use crate::locate::locate_binary;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use vibes_core::AssuranceLevel;

const INVOKE_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_OUTPUT_BYTES: usize = 5 * 1024 * 1024;

/// Result of any C7 operation (spec §4.8): "every operation returns
/// `{success, data?, error?}` — never throws." In a `Result`-style
/// language the natural shape is a plain struct rather than a `Result`,
/// since the *caller* never wants to match on `Err` — a failed bridge
/// call is data, not a propagated error (spec §7's propagation policy
/// applies to this bridge too).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeResult {
    pub success: bool,
    pub data: Option<String>,
    pub error: Option<String>,
}

impl BridgeResult {
    fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

pub enum ReportFormat {
    Markdown,
    Html,
    Json,
}

impl ReportFormat {
    fn as_arg(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

/// Cached resolution state: distinguishes "never looked" from "looked
/// and found nothing" so a negative result is cached too (spec §4.8:
/// "the first match is cached (negative result also cached)").
enum Resolution {
    Found(PathBuf),
    NotFound,
}

/// C7: External CLI Bridge. Optional and orthogonal to the write path —
/// every write-side operation goes through `vibes-io`/`vibes-session`
/// regardless of whether this binary is even installed. Grounded on
/// `csa-hooks::runner::run_hook`'s `Command` + timeout shape, adapted
/// from its synchronous poll loop to `tokio::process` + `tokio::time::
/// timeout` since this workspace already depends on tokio throughout.
pub struct CliBridge {
    custom_path: Option<String>,
    resolution: Mutex<Option<Resolution>>,
    missing_warned: AtomicBool,
}

impl CliBridge {
    pub fn new(custom_path: Option<String>) -> Self {
        Self {
            custom_path,
            resolution: Mutex::new(None),
            missing_warned: AtomicBool::new(false),
        }
    }

    /// Clears the cached binary location (spec §4.8: "the cache is
    /// explicitly clearable").
    pub async fn clear_cache(&self) {
        *self.resolution.lock().await = None;
    }

    /// Whether the one-shot "binary missing" warning has already fired
    /// this process, without triggering a new resolution attempt
    /// (SPEC_FULL.md supplement 2, backing the coordinator's
    /// `notify_vibes_binary_missing`).
    pub fn missing_binary_warned(&self) -> bool {
        self.missing_warned.load(Ordering::Relaxed)
    }

    async fn resolve(&self) -> Option<PathBuf> {
        let mut cached = self.resolution.lock().await;
        if let Some(resolution) = cached.as_ref() {
            return match resolution {
                Resolution::Found(path) => Some(path.clone()),
                Resolution::NotFound => None,
            };
        }
        let found = locate_binary(self.custom_path.as_deref());
        *cached = Some(match &found {
            Some(path) => Resolution::Found(path.clone()),
            None => Resolution::NotFound,
        });
        found
    }

    async fn invoke(&self, cwd: Option<&Path>, args: &[&str]) -> BridgeResult {
        let Some(binary) = self.resolve().await else {
            if !self.missing_warned.swap(true, Ordering::Relaxed) {
                tracing::warn!("vibescheck binary not found; analysis/query operations disabled");
            }
            return BridgeResult::err("vibescheck binary not found");
        };

        let mut command = tokio::process::Command::new(&binary);
        command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        let spawned = match command.spawn() {
            Ok(child) => child,
            Err(err) => return BridgeResult::err(format!("failed to spawn vibescheck: {err}")),
        };

        match tokio::time::timeout(INVOKE_TIMEOUT, spawned.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                let mut stdout = output.stdout;
                stdout.truncate(MAX_OUTPUT_BYTES);
                BridgeResult::ok(String::from_utf8_lossy(&stdout).into_owned())
            }
            Ok(Ok(output)) => {
                let mut stderr = output.stderr;
                stderr.truncate(MAX_OUTPUT_BYTES);
                BridgeResult::err(format!(
                    "vibescheck exited with {}: {}",
                    output.status.code().unwrap_or(-1),
                    String::from_utf8_lossy(&stderr)
                ))
            }
            Ok(Err(err)) => BridgeResult::err(format!("failed to run vibescheck: {err}")),
            Err(_) => BridgeResult::err("vibescheck timed out after 30s"),
        }
    }

    /// `init --project-name N --assurance-level L [--extensions e1,e2,...]`
    /// (spec §6). One of the two auto-init paths the coordinator tries
    /// before falling back to `vibes_io::init::init_directly`.
    pub async fn init(
        &self,
        project: &Path,
        project_name: &str,
        assurance_level: AssuranceLevel,
        extensions: Option<&[String]>,
    ) -> BridgeResult {
        let level = match assurance_level {
            AssuranceLevel::Low => "low",
            AssuranceLevel::Medium => "medium",
            AssuranceLevel::High => "high",
        };
        let joined_extensions;
        let mut args = vec!["init", "--project-name", project_name, "--assurance-level", level];
        if let Some(extensions) = extensions {
            joined_extensions = extensions.join(",");
            args.push("--extensions");
            args.push(&joined_extensions);
        }
        self.invoke(Some(project), &args).await
    }

    pub async fn build(&self, project: &Path) -> BridgeResult {
        self.invoke(Some(project), &["build"]).await
    }

    pub async fn stats(&self, project: &Path, file: Option<&str>) -> BridgeResult {
        match file {
            Some(file) => self.invoke(Some(project), &["stats", file]).await,
            None => self.invoke(Some(project), &["stats"]).await,
        }
    }

    pub async fn blame(&self, project: &Path, file: &str) -> BridgeResult {
        self.invoke(Some(project), &["blame", "--json", file]).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn log(
        &self,
        project: &Path,
        file: Option<&str>,
        model: Option<&str>,
        session: Option<&str>,
        limit: Option<u32>,
        json: bool,
    ) -> BridgeResult {
        let mut args = vec!["log".to_string()];
        if let Some(file) = file {
            args.push("--file".to_string());
            args.push(file.to_string());
        }
        if let Some(model) = model {
            args.push("--model".to_string());
            args.push(model.to_string());
        }
        if let Some(session) = session {
            args.push("--session".to_string());
            args.push(session.to_string());
        }
        if let Some(limit) = limit {
            args.push("--limit".to_string());
            args.push(limit.to_string());
        }
        if json {
            args.push("--json".to_string());
        }
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.invoke(Some(project), &refs).await
    }

    pub async fn coverage(&self, project: &Path, json: bool) -> BridgeResult {
        if json {
            self.invoke(Some(project), &["coverage", "--json"]).await
        } else {
            self.invoke(Some(project), &["coverage"]).await
        }
    }

    pub async fn report(&self, project: &Path, format: ReportFormat) -> BridgeResult {
        self.invoke(Some(project), &["report", "--format", format.as_arg()]).await
    }

    pub async fn sessions(&self, project: &Path) -> BridgeResult {
        self.invoke(Some(project), &["sessions", "--json"]).await
    }

    pub async fn models(&self, project: &Path) -> BridgeResult {
        self.invoke(Some(project), &["models", "--json"]).await
    }

    pub async fn version(&self) -> BridgeResult {
        self.invoke(None, &["--version"]).await
    }
}
