use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Write-temp-fsync-rename (spec §4.3.1). The teacher's
/// `audit/io.rs::save()` does write-temp-then-rename without an explicit
/// fsync; this adds the fsync the spec calls for between write and
/// rename, since a torn write observed mid-rename is exactly what the
/// spec's atomicity guarantee is meant to rule out.
///
/// Output is tab-indented JSON with a trailing newline, per spec §6.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .with_context(|| format!("failed to serialize JSON for {}", path.display()))?;
    buf.push(b'\n');

    let tmp_path = tmp_path_for(path);
    {
        let mut file = File::create(&tmp_path)
            .with_context(|| format!("failed to open temp file: {}", tmp_path.display()))?;
        file.write_all(&buf)
            .with_context(|| format!("failed to write temp file: {}", tmp_path.display()))?;
        file.sync_all()
            .with_context(|| format!("failed to fsync temp file: {}", tmp_path.display()))?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename into place: {}", path.display()))?;
    Ok(())
}

/// Reads and parses a JSON file, returning `None` if it doesn't exist.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse JSON from {}", path.display()))?;
    Ok(Some(value))
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    std::path::PathBuf::from(s)
}
