use chrono::SecondsFormat;
use uuid::Uuid;

/// Injected wall-clock source. Tests depend on deterministic `created_at`
/// values, so the session manager and annotation builder take this as a
/// dependency rather than calling `Utc::now()` directly (per spec §9,
/// "Clock and UUID injection").
pub trait Clock: Send + Sync {
    fn now_iso8601(&self) -> String;
}

/// Injected session/id generator, kept separate from `Clock` so tests can
/// fix time and ids independently.
pub trait IdGen: Send + Sync {
    fn new_session_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso8601(&self) -> String {
        chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV4Gen;

impl IdGen for UuidV4Gen {
    fn new_session_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Fixed clock/id-gen for deterministic tests, usable from downstream
/// crates' own test suites (not `#[cfg(test)]`-gated, since that
/// attribute does not cross crate boundaries).
pub struct FixedClock(pub &'static str);

impl Clock for FixedClock {
    fn now_iso8601(&self) -> String {
        self.0.to_string()
    }
}

pub struct FixedIdGen(pub &'static str);

impl IdGen for FixedIdGen {
    fn new_session_id(&self) -> String {
        self.0.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_emits_millisecond_precision_utc() {
        let ts = SystemClock.now_iso8601();
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('.'));
    }

    #[test]
    fn uuid_gen_emits_v4_format() {
        let id = UuidV4Gen.new_session_id();
        assert_eq!(id.len(), 36);
        assert_eq!(id.chars().nth(14), Some('4'));
    }
}
