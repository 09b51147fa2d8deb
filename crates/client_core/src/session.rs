//! Signed-in user state shared by every component that issues
//! authenticated requests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::domain::User;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info};

use crate::error::ClientError;

/// Key the user record is stored under.
pub const SESSION_KEY: &str = "currentUser";

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<User>, ClientError>;
    async fn save(&self, user: &User) -> Result<(), ClientError>;
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Persists the user record as a JSON file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<User>, ClientError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, user: &User) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let raw = serde_json::to_vec_pretty(user)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
}

impl MemorySessionStore {
    pub fn with_user(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<User>, ClientError> {
        Ok(self.user.lock().await.clone())
    }

    async fn save(&self, user: &User) -> Result<(), ClientError> {
        *self.user.lock().await = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.user.lock().await = None;
        Ok(())
    }
}

pub struct SessionContext {
    store: Box<dyn SessionStore>,
    user: RwLock<Option<User>>,
}

impl SessionContext {
    /// Restores the last signed-in user. An unreadable record is logged and
    /// treated as signed out.
    pub async fn load(store: impl SessionStore + 'static) -> Self {
        let user = match store.load().await {
            Ok(user) => user,
            Err(err) => {
                error!("session: failed to load stored user: {err}");
                None
            }
        };
        if let Some(user) = &user {
            info!("session: restored user_id={}", user.id);
        }
        Self {
            store: Box::new(store),
            user: RwLock::new(user),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.user.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.user.read().await.is_some()
    }

    pub async fn bearer_token(&self) -> Result<String, ClientError> {
        self.user
            .read()
            .await
            .as_ref()
            .map(|user| user.token.clone())
            .ok_or(ClientError::NotAuthenticated)
    }

    /// Replaces the signed-in user and persists it. The in-memory session is
    /// updated even when persisting fails.
    pub async fn set_user(&self, user: User) -> Result<(), ClientError> {
        *self.user.write().await = Some(user.clone());
        self.store.save(&user).await.inspect_err(|err| {
            error!("session: failed to save user_id={}: {err}", user.id);
        })
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        let previous = self.user.write().await.take();
        if let Some(user) = previous {
            info!("session: signed out user_id={}", user.id);
        }
        self.store.clear().await
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
