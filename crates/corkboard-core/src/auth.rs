use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::ANONYMOUS_NAME;

/// The signed-in identity as the messaging feature reads it: a stable uid
/// and an optional display name. Everything else about accounts belongs
/// to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub display_name: Option<String>,
}

impl Identity {
    /// Display name, falling back to the placeholder when the identity
    /// has none.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_NAME)
    }
}

/// Identity persisted to a JSON file under the data dir, so a returning
/// user skips the login prompt.
pub struct SessionStorage {
    path: PathBuf,
    identity: Option<Identity>,
}

impl SessionStorage {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let path = data_dir.as_ref().join("session.json");
        let identity = Self::load_from_file(&path);
        Self { path, identity }
    }

    fn load_from_file(path: &Path) -> Option<Identity> {
        let contents = fs::read_to_string(path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    pub fn current(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Create and persist a fresh identity with a random uid. An empty
    /// display name is stored as absent and renders as the placeholder.
    pub fn sign_in(&mut self, display_name: &str) -> Result<Identity> {
        let trimmed = display_name.trim();
        let identity = Identity {
            uid: Uuid::new_v4().to_string(),
            display_name: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        };
        let json = serde_json::to_string_pretty(&identity)?;
        fs::write(&self.path, json)?;
        self.identity = Some(identity.clone());
        Ok(identity)
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sign_in_and_reload() {
        let dir = tempdir().unwrap();
        let mut storage = SessionStorage::new(dir.path());
        assert!(storage.current().is_none());

        let identity = storage.sign_in("Ada").unwrap();
        assert_eq!(identity.name(), "Ada");

        // A fresh storage over the same dir sees the stored identity.
        let reloaded = SessionStorage::new(dir.path());
        assert_eq!(reloaded.current(), Some(&identity));
    }

    #[test]
    fn test_sign_out_clears_stored_identity() {
        let dir = tempdir().unwrap();
        let mut storage = SessionStorage::new(dir.path());
        storage.sign_in("Ada").unwrap();

        storage.sign_out();
        assert!(storage.current().is_none());
        assert!(SessionStorage::new(dir.path()).current().is_none());
    }

    #[test]
    fn test_blank_display_name_uses_placeholder() {
        let dir = tempdir().unwrap();
        let mut storage = SessionStorage::new(dir.path());
        let identity = storage.sign_in("   ").unwrap();
        assert_eq!(identity.display_name, None);
        assert_eq!(identity.name(), ANONYMOUS_NAME);
    }
}
