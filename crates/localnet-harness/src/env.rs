//! Environment overrides consumed by the harness.

use tracing::warn;

/// Selects a specific keystore entry as the treasury account.
pub const TREASURY_INDEX_VAR: &str = "LOCALNET_TREASURY_INDEX";

/// When set (to anything but `0`/`false`), temp directories survive
/// teardown for debugging.
pub const RETAIN_DIRS_VAR: &str = "LOCALNET_RETAIN_DIRS";

/// Overrides read from the process environment at harness start.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvOverrides {
    /// Forced treasury keystore index, if any.
    pub treasury_index: Option<usize>,
    /// Keep working/temp directories after teardown.
    pub retain_dirs: bool,
}

impl EnvOverrides {
    /// Reads the overrides from the environment.
    pub fn from_env() -> Self {
        let treasury_index = match std::env::var(TREASURY_INDEX_VAR) {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(index) => Some(index),
                Err(_) => {
                    warn!(value = %raw, "ignoring unparsable {TREASURY_INDEX_VAR}");
                    None
                }
            },
            Err(_) => None,
        };

        let retain_dirs = std::env::var(RETAIN_DIRS_VAR)
            .map(|raw| !matches!(raw.as_str(), "" | "0" | "false"))
            .unwrap_or(false);

        Self { treasury_index, retain_dirs }
    }
}
