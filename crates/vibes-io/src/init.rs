use crate::atomic::{read_json_opt, write_json_atomic};
use crate::paths;
use anyhow::{Context, Result};
use std::path::Path;
use vibes_core::{AssuranceLevel, Manifest, ProjectConfig};

/// `init_directly` (spec §4.3.8): creates `.ai-audit/` and `blobs/`,
/// writes `config.json` from supplied parameters plus defaults, writes an
/// empty `manifest.json` if absent, and touches `annotations.jsonl`. Used
/// as the fallback auto-init path when the external `vibescheck` binary
/// (C7) is unavailable.
pub fn init_directly(
    project: &Path,
    project_name: &str,
    assurance_level: AssuranceLevel,
) -> Result<()> {
    std::fs::create_dir_all(paths::blobs_dir(project))
        .with_context(|| format!("failed to create .ai-audit tree under {}", project.display()))?;

    let config_path = paths::config_path(project);
    if !config_path.exists() {
        let config = ProjectConfig::new(project_name, assurance_level);
        write_json_atomic(&config_path, &config)?;
    }

    let manifest_path = paths::manifest_path(project);
    if read_json_opt::<Manifest>(&manifest_path)?.is_none() {
        write_json_atomic(&manifest_path, &Manifest::new())?;
    }

    let annotations_path = paths::annotations_path(project);
    if !annotations_path.exists() {
        std::fs::write(&annotations_path, b"")
            .with_context(|| format!("failed to touch {}", annotations_path.display()))?;
    }

    Ok(())
}

/// Probes for an already-initialized project without creating anything.
pub fn is_initialized(project: &Path) -> bool {
    paths::config_path(project).exists()
}
