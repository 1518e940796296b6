use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use vibes_core::AnnotationRecord;

/// Appends records to `annotations.jsonl` (spec §4.3.2). Opens in append
/// mode, never seeks or truncates, one JSON object per line. Grounded on
/// `csa-session::event_writer::EventWriter::append`'s buffered-write
/// shape, simplified since here the caller (the project mutex holder)
/// already guarantees serialized access — there is no separate internal
/// `BufWriter` kept open across calls.
pub fn append_lines(path: &Path, records: &[AnnotationRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open for append: {}", path.display()))?;

    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, record)
            .with_context(|| "failed to serialize annotation record")?;
        buf.push(b'\n');
    }
    file.write_all(&buf)
        .with_context(|| format!("failed to append to {}", path.display()))?;
    Ok(())
}

/// Reads back all annotation records, in file order. Used by tests and by
/// the read-side of round-trip checks; not on the hot write path.
pub fn read_all(path: &Path) -> Result<Vec<AnnotationRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).with_context(|| format!("failed to parse line: {line}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use vibes_core::builder::build_session_start;
    use vibes_core::clock::FixedClock;

    const CLOCK: FixedClock = FixedClock("2026-01-01T00:00:00.000Z");

    #[test]
    fn appends_are_newline_terminated_and_ordered() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".ai-audit/annotations.jsonl");
        let r1 = build_session_start(&CLOCK, "s1", None, None, None);
        let r2 = build_session_start(&CLOCK, "s2", None, None, None);
        append_lines(&path, &[r1.clone()]).unwrap();
        append_lines(&path, &[r2.clone()]).unwrap();

        let all = read_all(&path).unwrap();
        assert_eq!(all, vec![r1, r2]);
    }

    #[test]
    fn never_truncates_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("annotations.jsonl");
        let r1 = build_session_start(&CLOCK, "s1", None, None, None);
        append_lines(&path, &[r1.clone()]).unwrap();
        let before_len = std::fs::metadata(&path).unwrap().len();
        append_lines(&path, &[]).unwrap();
        let after_len = std::fs::metadata(&path).unwrap().len();
        assert_eq!(before_len, after_len);
    }

    #[test]
    fn read_all_on_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.jsonl");
        assert_eq!(read_all(&path).unwrap(), Vec::new());
    }
}
