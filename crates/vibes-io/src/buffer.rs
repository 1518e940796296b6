use std::collections::BTreeMap;
use vibes_core::{AnnotationRecord, ManifestEntry};

pub const ANNOTATION_FLUSH_THRESHOLD: usize = 20;
pub const ANNOTATION_FLUSH_INTERVAL_MS: u64 = 2_000;
pub const MANIFEST_DEBOUNCE_MS: u64 = 500;

/// In-memory `ProjectBuffer` (spec §3.2): pending annotations for one
/// project, plus a generation counter used to implement "last-arm-wins"
/// debounce per the design notes (§9), since a real interval/timer
/// primitive isn't plumbed through this pure state type — the owning
/// runtime spawns the actual timer task and checks the generation on
/// fire.
#[derive(Debug, Default)]
pub struct AnnotationBufferState {
    pending: Vec<AnnotationRecord>,
    generation: u64,
}

pub enum PushOutcome {
    /// Buffer below threshold. `arm_timer` is `Some(generation)` exactly
    /// when this was the first record in an empty buffer — the caller
    /// should start a fresh flush timer for that generation; re-arming an
    /// already-running timer is a no-op per spec §4.3.3.
    Buffered { arm_timer: Option<u64> },
    /// Buffer reached the flush threshold; caller should flush now.
    ThresholdReached,
}

impl AnnotationBufferState {
    pub fn push(&mut self, record: AnnotationRecord) -> PushOutcome {
        let is_first = self.pending.is_empty();
        self.pending.push(record);
        if self.pending.len() >= ANNOTATION_FLUSH_THRESHOLD {
            PushOutcome::ThresholdReached
        } else if is_first {
            self.generation += 1;
            PushOutcome::Buffered {
                arm_timer: Some(self.generation),
            }
        } else {
            PushOutcome::Buffered { arm_timer: None }
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains all pending records, bumping the generation so any
    /// in-flight timer for the prior generation becomes a no-op.
    pub fn take(&mut self) -> Vec<AnnotationRecord> {
        self.generation += 1;
        std::mem::take(&mut self.pending)
    }
}

/// In-memory `ManifestDebounce` (spec §3.2): write-if-absent pending
/// entries for one project.
#[derive(Debug, Default)]
pub struct ManifestDebounceState {
    pending: BTreeMap<String, ManifestEntry>,
    generation: u64,
}

impl ManifestDebounceState {
    /// Write-if-absent insert into the pending map; always re-arms the
    /// debounce (bumps generation) per spec §4.3.4 ("each subsequent call
    /// resets the timer").
    pub fn insert(&mut self, hash: String, entry: ManifestEntry) -> u64 {
        self.pending.entry(hash).or_insert(entry);
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn take(&mut self) -> BTreeMap<String, ManifestEntry> {
        self.generation += 1;
        std::mem::take(&mut self.pending)
    }
}
