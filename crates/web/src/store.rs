//! User accounts kept outside the framing core.
//!
//! [`JsonFileUserStore`] keeps every user in one JSON array file. Each
//! operation reads the whole file, and `append` writes it back through a
//! temporary file and a rename. A mutex serializes these read-modify-write
//! cycles, so concurrent connections never interleave them.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub fname: String,
    pub lname: String,
}

impl User {
    pub fn new(fname: impl Into<String>, lname: impl Into<String>) -> Self {
        Self { fname: fname.into(), lname: lname.into() }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("user file {path:?} io error: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("user file {path:?} is not a json user list: {source}")]
    Json { path: PathBuf, source: serde_json::Error },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Returns true if a user with both the same first and last name exists.
    async fn lookup(&self, user: &User) -> Result<bool, StoreError>;

    /// Appends `user` unless it already exists; returns whether it was added.
    async fn append(&self, user: User) -> Result<bool, StoreError>;
}

#[derive(Debug)]
pub struct JsonFileUserStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<User>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "user file not found, starting empty");
                return Ok(Vec::new());
            }
            Err(source) => return Err(StoreError::Io { path: self.path.clone(), source }),
        };

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json { path: self.path.clone(), source })
    }

    async fn save(&self, users: &[User]) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(users).map_err(|source| StoreError::Json { path: self.path.clone(), source })?;

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, bytes).await.map_err(|source| StoreError::Io { path: tmp_path.clone(), source })?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|source| StoreError::Io { path: self.path.clone(), source })
    }
}

#[async_trait]
impl UserStore for JsonFileUserStore {
    async fn lookup(&self, user: &User) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.contains(user))
    }

    async fn append(&self, user: User) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;

        let mut users = self.load().await?;
        if users.contains(&user) {
            return Ok(false);
        }

        info!(fname = %user.fname, lname = %user.lname, "adding user");
        users.push(user);
        self.save(&users).await?;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self { users: Mutex::new(users.into_iter().collect()) }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn lookup(&self, user: &User) -> Result<bool, StoreError> {
        Ok(self.users.lock().await.contains(user))
    }

    async fn append(&self, user: User) -> Result<bool, StoreError> {
        let mut users = self.users.lock().await;
        if users.contains(&user) {
            return Ok(false);
        }
        users.push(user);
        Ok(true)
    }
}
