//! Core types and pure builders for the VIBES audit trail: canonical
//! hashing (C1), manifest entry / annotation record types (§3.1), and the
//! constructors that turn agent events into those records (C2).
//!
//! This crate performs no I/O. The durable-write path lives in
//! `vibes-io`; session lifecycle and routing live in `vibes-session` and
//! `vibes-coordinator`.

pub mod annotation;
pub mod builder;
pub mod canonical;
pub mod clock;
pub mod config;
pub mod error;
pub mod manifest;

pub use annotation::{AnnotationRecord, LineAction, LineAnnotation, SessionAnnotation, SessionEvent};
pub use canonical::{canonical_bytes, hash_bytes, hash_entry};
pub use clock::{Clock, FixedClock, FixedIdGen, IdGen, SystemClock, UuidV4Gen};
pub use config::{AssuranceLevel, ProjectConfig};
pub use error::{CoreError, CoreResult};
pub use manifest::{
    CommandEntry, CommandType, EnvironmentEntry, Manifest, ManifestEntry, PromptEntry,
    ReasoningEncoding, ReasoningEntry,
};
