//! Collaborators the client consumes but does not own: the signed-in user and
//! the location of recorded answers on disk.

use crate::types::User;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::RwLock;
use uuid::Uuid;

/// Persistence for the signed-in user.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<User>;
    fn set(&self, user: User) -> Result<()>;
    fn clear(&self) -> Result<()>;

    fn is_signed_in(&self) -> bool {
        self.get().is_some()
    }
}

/// Process-local store; forgets the user on restart.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    user: RwLock<Option<User>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, user: User) -> Result<()> {
        *self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(user);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}

#[cfg(feature = "keyring-store")]
pub use keyring_store::KeyringCredentialStore;

#[cfg(feature = "keyring-store")]
mod keyring_store {
    use super::CredentialStore;
    use crate::types::User;
    use crate::{Error, ErrorContext, Result};
    use keyring::Entry;
    use tracing::warn;

    /// Stores the user as JSON in the OS keychain.
    pub struct KeyringCredentialStore {
        service: String,
        account: String,
    }

    impl KeyringCredentialStore {
        pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
            Self {
                service: service.into(),
                account: account.into(),
            }
        }

        fn entry(&self) -> Result<Entry> {
            Entry::new(&self.service, &self.account).map_err(|e| keyring_error("open", e))
        }
    }

    impl Default for KeyringCredentialStore {
        fn default() -> Self {
            Self::new("englishapp", "current-user")
        }
    }

    fn keyring_error(op: &str, e: keyring::Error) -> Error {
        Error::configuration_with_context(
            format!("keyring {} failed: {}", op, e),
            ErrorContext::new().with_source("keyring_store"),
        )
    }

    impl CredentialStore for KeyringCredentialStore {
        fn get(&self) -> Option<User> {
            let raw = self.entry().ok()?.get_password().ok()?;
            match serde_json::from_str(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(service = self.service.as_str(), error = %e, "discarding unreadable stored user");
                    None
                }
            }
        }

        fn set(&self, user: User) -> Result<()> {
            let raw = serde_json::to_string(&user).map_err(|e| {
                Error::configuration_with_context(
                    format!("cannot encode user: {}", e),
                    ErrorContext::new().with_source("keyring_store"),
                )
            })?;
            self.entry()?
                .set_password(&raw)
                .map_err(|e| keyring_error("write", e))
        }

        fn clear(&self) -> Result<()> {
            match self.entry()?.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(keyring_error("delete", e)),
            }
        }
    }
}

/// Resolves where the recording for a question lives.
#[async_trait]
pub trait AnswerFileProvider: Send + Sync {
    async fn answer_path(&self, session_id: Uuid, question_id: i64) -> Result<PathBuf>;
}

/// Recordings laid out as `<root>/<session_id>/<question_id>.<extension>`.
#[derive(Debug, Clone)]
pub struct DirectoryAnswerFiles {
    root: PathBuf,
    extension: String,
}

impl DirectoryAnswerFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: "m4a".to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

#[async_trait]
impl AnswerFileProvider for DirectoryAnswerFiles {
    async fn answer_path(&self, session_id: Uuid, question_id: i64) -> Result<PathBuf> {
        Ok(self
            .root
            .join(session_id.to_string())
            .join(format!("{}.{}", question_id, self.extension)))
    }
}
