//! External CLI Bridge (C7): locates and invokes the optional
//! `vibescheck` analysis binary for read-side queries (`stats`, `blame`,
//! `log`, `coverage`, `report`, `sessions`, `models`) and as one of two
//! paths the coordinator tries for project auto-init. Orthogonal to the
//! write path — every provenance write goes through `vibes-io`/
//! `vibes-session` whether or not this binary is even installed.

pub mod bridge;
pub mod locate;

pub use bridge::{BridgeResult, CliBridge, ReportFormat};
pub use locate::{locate_binary, VIBESCHECK_BIN};
