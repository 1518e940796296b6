use std::path::{Path, PathBuf};

pub const AUDIT_DIR_NAME: &str = ".ai-audit";

pub fn audit_dir(project: &Path) -> PathBuf {
    project.join(AUDIT_DIR_NAME)
}

pub fn config_path(project: &Path) -> PathBuf {
    audit_dir(project).join("config.json")
}

pub fn manifest_path(project: &Path) -> PathBuf {
    audit_dir(project).join("manifest.json")
}

pub fn annotations_path(project: &Path) -> PathBuf {
    audit_dir(project).join("annotations.jsonl")
}

pub fn blobs_dir(project: &Path) -> PathBuf {
    audit_dir(project).join("blobs")
}

pub fn blob_path(project: &Path, hash: &str) -> PathBuf {
    blobs_dir(project).join(format!("{hash}.blob"))
}
