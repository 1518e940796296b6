//! Durable I/O layer (C3): atomic config/manifest writes, buffered and
//! debounced annotation/manifest persistence, per-project mutual
//! exclusion, and the blob sidecar writer.

pub mod atomic;
pub mod blobs;
pub mod buffer;
pub mod init;
pub mod jsonl;
pub mod mutex;
pub mod paths;
pub mod runtime;

pub use mutex::ProjectMutexRegistry;
pub use runtime::IoRuntime;
