use std::{
    io::ErrorKind,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use async_trait::async_trait;
use fs4::tokio::AsyncFileExt;
use tokio::fs::File;
use tracing::debug;

use crate::{fs::operations::write_atomically, ledger::entities::Ledger};

#[cfg(test)]
use mockall::automock;

/// Interface for abstracting the persisted key-value store. The ledger is always read and written
/// as a whole.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Acquires the write lock that must be held over a whole load-modify-store cycle.
    async fn lock(&self) -> Result<WriteGuard>;

    /// Reads the stored ledger. A store that was never written yields an empty ledger.
    async fn load(&self) -> Result<Ledger>;

    async fn store(&self, ledger: &Ledger) -> Result<()>;
}

#[async_trait]
impl<T> LedgerStorage for T
where
    T: Deref + Send + Sync,
    T::Target: LedgerStorage,
{
    async fn lock(&self) -> Result<WriteGuard> {
        self.deref().lock().await
    }

    async fn load(&self) -> Result<Ledger> {
        self.deref().load().await
    }

    async fn store(&self, ledger: &Ledger) -> Result<()> {
        self.deref().store(ledger).await
    }
}

/// Held while a ledger is being rewritten. Dropping the guard closes the lock file, which
/// releases the lock as well, [WriteGuard::release] just does it eagerly.
#[derive(Debug)]
pub struct WriteGuard {
    file: Option<File>,
}

impl WriteGuard {
    /// A guard for stores that have nothing to lock.
    pub fn unlocked() -> Self {
        Self { file: None }
    }

    pub async fn release(self) -> Result<()> {
        if let Some(file) = self.file {
            file.unlock_async().await?;
        }
        Ok(())
    }
}

/// The main realization of [LedgerStorage]: a single JSON document next to a lock file.
pub struct JsonFileStorage {
    path: PathBuf,
    lock_path: PathBuf,
}

impl JsonFileStorage {
    pub const FILE_NAME: &'static str = "ledger.json";

    /// Creates a storage for `dir/ledger.json`, creating the directory if needed.
    pub fn new(dir: &Path) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(Self::FILE_NAME),
            lock_path: dir.join(format!("{}.lock", Self::FILE_NAME)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LedgerStorage for JsonFileStorage {
    async fn lock(&self) -> Result<WriteGuard> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .await
            .with_context(|| format!("Failed to open lock file {:?}", self.lock_path))?;
        file.lock_exclusive()?;
        Ok(WriteGuard { file: Some(file) })
    }

    async fn load(&self) -> Result<Ledger> {
        debug!("Loading ledger from {:?}", self.path);
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("Ledger at {:?} is not valid json", self.path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Ledger::default()),
            Err(e) => Err(e).with_context(|| format!("Failed to read {:?}", self.path)),
        }
    }

    async fn store(&self, ledger: &Ledger) -> Result<()> {
        let contents = serde_json::to_vec(ledger)?;
        write_atomically(&self.path, &contents)
            .await
            .with_context(|| format!("Failed to write {:?}", self.path))
    }
}
