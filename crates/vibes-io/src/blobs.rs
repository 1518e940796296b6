use crate::paths;
use anyhow::{Context, Result};
use std::path::Path;

/// `write_reasoning_blob` (spec §4.3.7): ensures `blobs/` exists and
/// writes `blobs/{hash}.blob`, returning the relative path the caller
/// passes to the external-reasoning manifest constructor.
pub fn write_reasoning_blob(project: &Path, hash: &str, bytes: &[u8]) -> Result<String> {
    let dir = paths::blobs_dir(project);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create blobs dir: {}", dir.display()))?;
    let path = paths::blob_path(project, hash);
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write blob: {}", path.display()))?;
    Ok(format!("blobs/{hash}.blob"))
}

pub fn read_reasoning_blob(project: &Path, hash: &str) -> Result<Vec<u8>> {
    let path = paths::blob_path(project, hash);
    std::fs::read(&path).with_context(|| format!("failed to read blob: {}", path.display()))
}
