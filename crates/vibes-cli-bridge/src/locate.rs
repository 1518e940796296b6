use std::path::{Path, PathBuf};

/// The external analysis binary's name (spec §4.8, §6).
pub const VIBESCHECK_BIN: &str = "vibescheck";

/// Locates `vibescheck`, in the order spec §4.8 specifies: an explicit
/// custom path, then a platform-conventional install location, then the
/// system binary search path. Grounded on `csa-config::init`'s
/// `which::which_in` binary-discovery pattern; the conventional-location
/// check is new (the teacher only ever searches `PATH`) since this is the
/// only one of the three lookups specific to an optional external tool
/// the teacher never shells out to.
pub fn locate_binary(custom_path: Option<&str>) -> Option<PathBuf> {
    if let Some(custom) = custom_path {
        let path = Path::new(custom);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
    }

    if let Some(dirs) = directories::BaseDirs::new() {
        let conventional = dirs.executable_dir().unwrap_or_else(|| dirs.data_local_dir());
        let candidate = conventional.join(VIBESCHECK_BIN);
        if candidate.is_file() {
            return Some(candidate);
        }
    }

    let system_path = std::env::var_os("PATH")?;
    which::which_in(VIBESCHECK_BIN, Some(system_path), ".").ok()
}
