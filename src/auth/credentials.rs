use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "nutritrack";

/// Keychain handle for one account's remembered password.
///
/// Used by `login --remember` so subsequent logins can re-authenticate
/// without prompting. Tokens themselves are never stored here; they live
/// in the session file managed by `SessionStore`.
pub struct CredentialStore {
    username: String,
}

impl CredentialStore {
    pub fn for_user(username: &str) -> Self {
        Self {
            username: username.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.username).context("Failed to create keyring entry")
    }

    /// Remember the password in the OS keychain
    pub fn store(&self, password: &str) -> Result<()> {
        self.entry()?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    /// Retrieve the remembered password, if any
    pub fn load(&self) -> Option<String> {
        self.entry().ok().and_then(|e| e.get_password().ok())
    }

    /// Drop the remembered password. Not having one is not an error.
    pub fn forget(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}
