//! Profile management
//!
//! A profile is a named endpoint + API key pair. [`ProfileSet`] owns the
//! collection and keeps two invariants on every mutation: names are unique
//! and at most one profile is active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::validate_url;
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

impl Profile {
    /// Build a validated, inactive profile. Name and URL are trimmed; an
    /// empty base URL is allowed so a profile can be created before it is
    /// filled in.
    pub fn new(name: &str, base_url: &str, api_key: &str) -> StoreResult<Self> {
        let profile = Self {
            name: name.trim().to_string(),
            base_url: base_url.trim().to_string(),
            api_key: api_key.trim().to_string(),
            is_active: false,
            last_updated: Utc::now(),
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> StoreResult<()> {
        validate_name(&self.name)?;
        if !self.base_url.is_empty() && !validate_url(&self.base_url) {
            return Err(StoreError::InvalidProfile(format!(
                "base URL must be an absolute http(s) URL: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Whether the profile has an endpoint to fetch from.
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidProfile("name must not be empty".to_string()));
    }
    if name != name.trim() {
        return Err(StoreError::InvalidProfile(format!(
            "name must not have surrounding whitespace: {:?}",
            name
        )));
    }
    if name.contains(|c: char| c == '/' || c == '\\') || name == "." || name == ".." {
        return Err(StoreError::InvalidProfile(format!("name is not a valid identifier: {}", name)));
    }
    Ok(())
}

// ── ProfileSet ──────────────────────────────────────────────────────────────

/// The full set of saved profiles, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet {
    profiles: Vec<Profile>,
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw profiles, rejecting duplicates and a second
    /// active flag.
    pub fn from_profiles(profiles: Vec<Profile>) -> StoreResult<Self> {
        let mut set = Self::new();
        let mut active = None;
        for profile in profiles {
            if profile.is_active {
                if let Some(first) = &active {
                    return Err(StoreError::InvalidProfile(format!(
                        "profiles {} and {} are both active",
                        first, profile.name
                    )));
                }
                active = Some(profile.name.clone());
            }
            set.add(profile)?;
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn active(&self) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.is_active)
    }

    /// Append a profile. An active incoming profile takes the active flag
    /// from whichever profile held it.
    pub fn add(&mut self, profile: Profile) -> StoreResult<()> {
        profile.validate()?;
        if self.contains(&profile.name) {
            return Err(StoreError::DuplicateName(profile.name));
        }
        if profile.is_active {
            self.clear_active();
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Remove a profile by name, returning it.
    pub fn remove(&mut self, name: &str) -> StoreResult<Profile> {
        let idx = self
            .profiles
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Ok(self.profiles.remove(idx))
    }

    /// Make `name` the only active profile.
    pub fn set_active(&mut self, name: &str) -> StoreResult<()> {
        if !self.contains(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        for profile in &mut self.profiles {
            profile.is_active = profile.name == name;
        }
        Ok(())
    }

    /// Replace the endpoint and/or key of an existing profile.
    pub fn update(
        &mut self,
        name: &str,
        base_url: Option<&str>,
        api_key: Option<&str>,
    ) -> StoreResult<&Profile> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let mut edited = profile.clone();
        if let Some(url) = base_url {
            edited.base_url = url.trim().to_string();
        }
        if let Some(key) = api_key {
            edited.api_key = key.trim().to_string();
        }
        edited.validate()?;
        edited.last_updated = Utc::now();
        *profile = edited;
        Ok(&*profile)
    }

    pub fn clear(&mut self) {
        self.profiles.clear();
    }

    fn clear_active(&mut self) {
        for profile in &mut self.profiles {
            profile.is_active = false;
        }
    }
}

impl IntoIterator for ProfileSet {
    type Item = Profile;
    type IntoIter = std::vec::IntoIter<Profile>;

    fn into_iter(self) -> Self::IntoIter {
        self.profiles.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile::new(name, "https://api.example.com/v1", "sk-test").unwrap()
    }

    fn active_names(set: &ProfileSet) -> Vec<&str> {
        set.iter().filter(|p| p.is_active).map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_new_trims_and_validates() {
        let p = Profile::new("  work ", " https://api.openai.com/v1 ", " sk-1 ").unwrap();
        assert_eq!(p.name, "work");
        assert_eq!(p.base_url, "https://api.openai.com/v1");
        assert_eq!(p.api_key, "sk-1");
        assert!(!p.is_active);

        assert!(Profile::new("blank-url", "", "").is_ok());
        assert!(matches!(Profile::new("  ", "", ""), Err(StoreError::InvalidProfile(_))));
        assert!(matches!(Profile::new("a/b", "", ""), Err(StoreError::InvalidProfile(_))));
        assert!(matches!(
            Profile::new("bad-url", "ftp://example.com", ""),
            Err(StoreError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_duplicate_add_leaves_existing() {
        let mut set = ProfileSet::new();
        set.add(profile("a")).unwrap();

        let other = Profile::new("a", "https://other.example.com", "sk-other").unwrap();
        let err = set.add(other).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName(ref n) if n == "a"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("a").unwrap().base_url, "https://api.example.com/v1");
    }

    #[test]
    fn test_set_active_is_exclusive() {
        let mut set = ProfileSet::new();
        set.add(profile("a")).unwrap();
        set.add(profile("b")).unwrap();
        assert!(set.active().is_none());

        set.set_active("b").unwrap();
        set.set_active("a").unwrap();
        assert_eq!(active_names(&set), vec!["a"]);

        assert!(matches!(set.set_active("zzz"), Err(StoreError::NotFound(_))));
        assert_eq!(active_names(&set), vec!["a"]);
    }

    #[test]
    fn test_adding_active_profile_takes_flag() {
        let mut set = ProfileSet::new();
        set.add(profile("a")).unwrap();
        set.set_active("a").unwrap();

        let mut b = profile("b");
        b.is_active = true;
        set.add(b).unwrap();
        assert_eq!(active_names(&set), vec!["b"]);
    }

    #[test]
    fn test_remove_missing_is_not_found() {
        let mut set = ProfileSet::new();
        set.add(profile("a")).unwrap();
        let before = set.clone();

        assert!(matches!(set.remove("missing"), Err(StoreError::NotFound(_))));
        assert_eq!(set, before);

        let removed = set.remove("a").unwrap();
        assert_eq!(removed.name, "a");
        assert!(set.is_empty());
    }

    #[test]
    fn test_update_validates_before_writing() {
        let mut set = ProfileSet::new();
        set.add(profile("a")).unwrap();

        let updated = set.update("a", None, Some("sk-new")).unwrap();
        assert_eq!(updated.api_key, "sk-new");
        assert_eq!(updated.base_url, "https://api.example.com/v1");

        assert!(set.update("a", Some("not a url"), None).is_err());
        assert_eq!(set.get("a").unwrap().base_url, "https://api.example.com/v1");
        assert!(matches!(set.update("b", None, None), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_from_profiles_rejects_two_active() {
        let mut a = profile("a");
        let mut b = profile("b");
        a.is_active = true;
        b.is_active = true;
        assert!(ProfileSet::from_profiles(vec![a, b]).is_err());
    }
}
