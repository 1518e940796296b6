use std::collections::HashMap;
use std::sync::RwLock;
use vibes_core::AssuranceLevel;

/// The host settings store this core consumes (spec §6): a `get(key,
/// default)` operation recognizing `vibesEnabled`, `vibesAutoInit`,
/// `vibesAssuranceLevel`, `vibesPerAgentConfig`, `vibesCheckBinaryPath`.
/// Modeled here as a typed trait rather than a single stringly-keyed
/// getter — each recognized key gets its own method — following the
/// teacher's preference for typed config structs (`csa-config::
/// ProjectConfig`) over duck-typed lookups.
pub trait SettingsStore: Send + Sync {
    fn vibes_enabled(&self) -> bool;
    fn vibes_auto_init(&self) -> bool;
    fn vibes_assurance_level(&self) -> AssuranceLevel;

    /// Per-agent-type enablement (`vibesPerAgentConfig`). `None` means
    /// the host has no explicit entry for this agent type; the
    /// coordinator then falls back to "enabled iff the type is in the
    /// known-instrumentable set" per spec §4.7.2 step 2.
    fn vibes_per_agent_enabled(&self, agent_type: &str) -> Option<bool>;

    fn vibes_check_binary_path(&self) -> Option<String>;
}

/// In-memory settings store, grounded on `csa-config::ProjectConfig`'s
/// typed-struct-with-defaults pattern. Suitable for embedding in a host
/// application or for tests/the demo binary; a real desktop-shell host
/// would instead implement `SettingsStore` over its own settings panel
/// storage (out of this core's scope per spec §1).
pub struct InMemorySettingsStore {
    enabled: bool,
    auto_init: bool,
    assurance_level: AssuranceLevel,
    per_agent: RwLock<HashMap<String, bool>>,
    check_binary_path: Option<String>,
}

impl InMemorySettingsStore {
    pub fn new(enabled: bool, auto_init: bool, assurance_level: AssuranceLevel) -> Self {
        Self {
            enabled,
            auto_init,
            assurance_level,
            per_agent: RwLock::new(HashMap::new()),
            check_binary_path: None,
        }
    }

    pub fn with_per_agent(self, agent_type: impl Into<String>, enabled: bool) -> Self {
        self.per_agent.write().unwrap().insert(agent_type.into(), enabled);
        self
    }

    pub fn with_check_binary_path(mut self, path: impl Into<String>) -> Self {
        self.check_binary_path = Some(path.into());
        self
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new(true, true, AssuranceLevel::Medium)
    }
}

impl SettingsStore for InMemorySettingsStore {
    fn vibes_enabled(&self) -> bool {
        self.enabled
    }

    fn vibes_auto_init(&self) -> bool {
        self.auto_init
    }

    fn vibes_assurance_level(&self) -> AssuranceLevel {
        self.assurance_level
    }

    fn vibes_per_agent_enabled(&self, agent_type: &str) -> Option<bool> {
        self.per_agent.read().unwrap().get(agent_type).copied()
    }

    fn vibes_check_binary_path(&self) -> Option<String> {
        self.check_binary_path.clone()
    }
}
