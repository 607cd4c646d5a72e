use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// The access/refresh token pair issued by the backend.
///
/// Both tokens are always persisted and cleared together. A session
/// document missing either field does not parse and is treated as if no
/// session exists at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Persistent storage for the token pair.
///
/// The session file is the single source of truth for authentication
/// state: absence of the file means unauthenticated. Writes go through a
/// temporary file and a rename so observers never see a half-written pair.
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Load the persisted token pair, if any. Pure read.
    pub fn load(&self) -> Result<Option<TokenPair>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        match serde_json::from_str::<TokenPair>(&contents) {
            Ok(pair) => Ok(Some(pair)),
            Err(e) => {
                // A session file without both tokens is an invalid state
                warn!(error = %e, "Session file is not a complete token pair, ignoring");
                Ok(None)
            }
        }
    }

    /// Persist a token pair, replacing any existing one atomically.
    pub fn save(&self, pair: &TokenPair) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(pair)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &path).context("Failed to replace session file")?;
        Ok(())
    }

    /// Remove the persisted token pair. Idempotent.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = SessionStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }
    }

    #[test]
    fn test_load_without_session_file() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_dir, store) = store();
        store.save(&pair("A1", "R1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair("A1", "R1")));
    }

    #[test]
    fn test_save_replaces_both_tokens() {
        let (_dir, store) = store();
        store.save(&pair("A1", "R1")).unwrap();
        store.save(&pair("A2", "R2")).unwrap();
        assert_eq!(store.load().unwrap(), Some(pair("A2", "R2")));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (_dir, store) = store();
        store.save(&pair("A1", "R1")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing an already-empty store must not fail
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_partial_pair_is_treated_as_absent() {
        let (dir, store) = store();
        // An access token without a refresh token is an invalid state
        std::fs::write(dir.path().join("session.json"), r#"{"access_token": "A1"}"#).unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
