//! Path Utilities
//!
//! Resolution of the per-user configuration directory.

use std::path::PathBuf;

use crate::error::{StoreError, StoreResult};

/// Environment variable that replaces the default config directory.
pub const HOME_ENV: &str = "MODEL_FETCHER_HOME";

/// Directory name under the user's home.
const DIR_NAME: &str = ".openai_model_fetcher";

/// File holding the whole profile set.
pub const PROFILES_FILE: &str = "profiles.json";

/// Get the config directory (`~/.openai_model_fetcher/` unless overridden)
pub fn config_dir() -> StoreResult<PathBuf> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| StoreError::Storage("Could not determine home directory".to_string()))?;
    Ok(home.join(DIR_NAME))
}
