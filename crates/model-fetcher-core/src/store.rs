//! Profile Store
//!
//! File-based profile storage at `~/.openai_model_fetcher/`. The whole set
//! lives in `profiles.json` and every save rewrites it through a temp file
//! and a rename, so the file on disk is always the last completed save.
//!
//! Older installs kept one `<name>.json` file per profile in the same
//! directory. Those are imported on load until the first save writes a
//! current `profiles.json`. A legacy profile named "profiles" occupies that
//! path itself, so a `profiles.json` without a `version` is read as legacy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::paths::{self, PROFILES_FILE};
use crate::profile::{Profile, ProfileSet};

const STORE_VERSION: u32 = 1;
const TMP_SUFFIX: &str = "tmp";

// ── On-disk layout ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    profiles: ProfileSet,
}

/// Per-profile file written by older versions. `base_url` and `api_key`
/// were always written, so JSON without them is not a profile.
#[derive(Debug, Deserialize)]
struct LegacyProfile {
    base_url: String,
    api_key: String,
    #[serde(default)]
    last_updated: Option<String>,
}

// ── ProfileStore ────────────────────────────────────────────────────────────

pub struct ProfileStore {
    /// Base directory: `~/.openai_model_fetcher/`
    base_dir: PathBuf,
    /// Serializes read-modify-write cycles on the profiles file
    lock: Mutex<()>,
}

impl ProfileStore {
    /// Open the store in the default per-user directory.
    pub fn open_default() -> StoreResult<Self> {
        Self::open(paths::config_dir()?)
    }

    /// Open the store rooted at `base_dir`, creating the directory if needed.
    pub fn open(base_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .map_err(|e| StoreError::storage(&format!("Failed to create {:?}", base_dir), e))?;

        info!("Profile store opened at {:?}", base_dir);
        Ok(Self {
            base_dir,
            lock: Mutex::new(()),
        })
    }

    /// Directory holding the profile data.
    pub fn location(&self) -> &Path {
        &self.base_dir
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.base_dir.join(PROFILES_FILE)
    }

    /// Read the saved set. Missing data yields an empty set.
    pub fn load(&self) -> StoreResult<ProfileSet> {
        let _guard = self.guard();
        self.read_set()
    }

    /// Replace the saved set with `profiles`.
    pub fn save(&self, profiles: &ProfileSet) -> StoreResult<()> {
        let _guard = self.guard();
        self.write_set(profiles)
    }

    /// Add a profile. Fails with `DuplicateName` if the name is taken.
    pub fn add(&self, profile: Profile) -> StoreResult<ProfileSet> {
        self.modify(|set| set.add(profile))
    }

    /// Remove a profile. Fails with `NotFound` and leaves the file untouched
    /// if no profile has that name.
    pub fn remove(&self, name: &str) -> StoreResult<ProfileSet> {
        self.modify(|set| set.remove(name).map(|_| ()))
    }

    /// Make `name` the only active profile.
    pub fn set_active(&self, name: &str) -> StoreResult<ProfileSet> {
        self.modify(|set| set.set_active(name))
    }

    /// Edit the endpoint and/or key of an existing profile.
    pub fn update(
        &self,
        name: &str,
        base_url: Option<&str>,
        api_key: Option<&str>,
    ) -> StoreResult<ProfileSet> {
        self.modify(|set| set.update(name, base_url, api_key).map(|_| ()))
    }

    /// Delete every saved profile, including legacy per-profile files.
    /// Other JSON files in the directory are left alone.
    pub fn clear(&self) -> StoreResult<()> {
        let _guard = self.guard();
        for path in self.legacy_files()? {
            if load_legacy_profile(&path).is_err() {
                continue;
            }
            fs::remove_file(&path)
                .map_err(|e| StoreError::storage(&format!("Failed to delete {:?}", path), e))?;
        }
        self.write_set(&ProfileSet::new())?;
        info!("Cleared all profiles in {:?}", self.base_dir);
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────────────

    fn guard(&self) -> MutexGuard<'_, ()> {
        match self.lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Profile store lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn modify<F>(&self, f: F) -> StoreResult<ProfileSet>
    where
        F: FnOnce(&mut ProfileSet) -> StoreResult<()>,
    {
        let _guard = self.guard();
        let mut set = self.read_set()?;
        f(&mut set)?;
        self.write_set(&set)?;
        Ok(set)
    }

    fn read_set(&self) -> StoreResult<ProfileSet> {
        let path = self.profiles_path();
        if !path.exists() {
            return self.import_legacy();
        }

        let data = fs::read_to_string(&path)
            .map_err(|e| StoreError::storage(&format!("Failed to read {:?}", path), e))?;
        let value: Value = serde_json::from_str(&data)
            .map_err(|e| StoreError::storage(&format!("Failed to parse {:?}", path), e))?;

        if value.get("version").is_none() && is_legacy_profile(&value) {
            debug!("{:?} is a legacy profile file", path);
            return self.import_legacy();
        }

        let file: StoreFile = serde_json::from_value(value)
            .map_err(|e| StoreError::storage(&format!("Failed to parse {:?}", path), e))?;

        if file.version != STORE_VERSION {
            return Err(StoreError::Storage(format!(
                "Unsupported profile file version {} in {:?}",
                file.version, path
            )));
        }

        // Re-run the set invariants on whatever was on disk.
        ProfileSet::from_profiles(file.profiles.into_iter().collect())
            .map_err(|e| StoreError::storage(&format!("Corrupt profile data in {:?}", path), e))
    }

    fn write_set(&self, profiles: &ProfileSet) -> StoreResult<()> {
        let path = self.profiles_path();
        let tmp_path = path.with_extension(format!("json.{}", TMP_SUFFIX));

        let file = StoreFile {
            version: STORE_VERSION,
            profiles: profiles.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::storage("Failed to serialize profiles", e))?;

        let write_tmp = || -> std::io::Result<()> {
            let mut out = fs::File::create(&tmp_path)?;
            out.write_all(json.as_bytes())?;
            out.sync_all()
        };
        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(StoreError::storage(&format!("Failed to write {:?}", tmp_path), e));
        }

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::storage(&format!("Failed to replace {:?}", path), e)
        })?;

        debug!("Saved {} profiles to {:?}", profiles.len(), path);
        Ok(())
    }

    /// Every `*.json` file in the directory. Callers decide per file
    /// whether it holds a legacy profile.
    fn legacy_files(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.base_dir)
            .map_err(|e| StoreError::storage(&format!("Failed to read {:?}", self.base_dir), e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::storage("Failed to read entry", e))?;
            let path = entry.path();
            let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
            if path.is_file() && is_json {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn import_legacy(&self) -> StoreResult<ProfileSet> {
        let mut set = ProfileSet::new();
        for path in self.legacy_files()? {
            match load_legacy_profile(&path) {
                Ok(profile) => {
                    if let Err(e) = set.add(profile) {
                        warn!("Skipping legacy profile {:?}: {}", path, e);
                    }
                }
                Err(e) => warn!("Skipping legacy profile {:?}: {}", path, e),
            }
        }

        if !set.is_empty() {
            info!("Imported {} legacy profiles from {:?}", set.len(), self.base_dir);
        }
        Ok(set)
    }
}

fn load_legacy_profile(path: &Path) -> Result<Profile, String> {
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("file name is not valid UTF-8")?;
    let data = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    let legacy: LegacyProfile =
        serde_json::from_str(&data).map_err(|e| format!("Not a profile file: {}", e))?;

    let mut profile =
        Profile::new(name, &legacy.base_url, &legacy.api_key).map_err(|e| e.to_string())?;

    if let Some(ts) = legacy.last_updated.as_deref().and_then(parse_legacy_timestamp) {
        profile.last_updated = ts;
    }
    Ok(profile)
}

fn is_legacy_profile(value: &Value) -> bool {
    LegacyProfile::deserialize(value).is_ok()
}

/// Legacy timestamps were local ISO-8601 without an offset.
fn parse_legacy_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_timestamp() {
        assert!(parse_legacy_timestamp("2024-05-01T12:30:45.123456").is_some());
        assert!(parse_legacy_timestamp("2024-05-01T12:30:45+08:00").is_some());
        assert!(parse_legacy_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_legacy_shape_requires_credentials() {
        assert!(is_legacy_profile(&serde_json::json!({"base_url": "", "api_key": ""})));
        assert!(!is_legacy_profile(&serde_json::json!({"name": "x", "version": "1.0.0"})));
        assert!(!is_legacy_profile(&serde_json::json!({"version": 1, "profiles": []})));
        assert!(!is_legacy_profile(&serde_json::json!({"base_url": "https://h"})));
    }

    #[test]
    fn test_tmp_path_sits_next_to_store() {
        let store = ProfileStore {
            base_dir: PathBuf::from("/nonexistent/mf"),
            lock: Mutex::new(()),
        };
        let path = store.profiles_path();
        assert_eq!(path, PathBuf::from("/nonexistent/mf/profiles.json"));
        assert_eq!(
            path.with_extension(format!("json.{}", TMP_SUFFIX)),
            PathBuf::from("/nonexistent/mf/profiles.json.tmp")
        );
    }
}
