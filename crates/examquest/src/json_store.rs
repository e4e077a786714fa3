//! # JSON Document Store
//!
//! One JSON file per user under a data directory:
//!
//! ```json
//! {
//!   "gacha": { "cards": { "5": { "ur1": 1 } }, "shards": 3, "totalPulls": 11, ... },
//!   "balance": 40,
//!   "displayName": "Minh"
//! }
//! ```
//!
//! Fields other than `gacha` and `balance` belong to other parts of the app
//! and are carried through every write untouched.
//!
//! ## Write Protocol
//!
//! ```text
//! save(user)
//!   1. Read current document (keeps balance and foreign fields)
//!   2. Write <user>.json.tmp, fsync
//!   3. rename over <user>.json          <- failures here: not applied
//!   4. fsync the directory (unix)       <- failures here: indeterminate
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use examquest_gacha::{Ledger, LedgerStore, LedgerWrite, StoreError};

use crate::error::{AppError, AppResult};

/// A user's stored document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    /// Gacha ledger.
    #[serde(default)]
    pub gacha: Ledger,
    /// Coin balance.
    #[serde(default)]
    pub balance: u64,
    /// Fields owned by the rest of the app.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// File-backed [`LedgerStore`].
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be created.
    pub fn open(root: impl AsRef<Path>) -> AppResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| AppError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding a user's document.
    ///
    /// Characters outside `[A-Za-z0-9_-]` are hex-escaped so any user id
    /// maps to one file inside the data directory.
    #[must_use]
    pub fn path_for(&self, user: &str) -> PathBuf {
        let mut name = String::with_capacity(user.len() + 5);
        for byte in user.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("~{byte:02x}"));
            }
        }
        if name.is_empty() {
            name.push('~');
        }
        name.push_str(".json");
        self.root.join(name)
    }

    /// Reads a user's full document.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` or `AppError::Json` if the file exists but
    /// cannot be read or parsed.
    pub fn document(&self, user: &str) -> AppResult<Option<UserDocument>> {
        let path = self.path_for(user);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(AppError::Io { path, source }),
        }
    }

    /// Stored coin balance, zero for a new user.
    ///
    /// # Errors
    ///
    /// As [`document`](Self::document).
    pub fn balance(&self, user: &str) -> AppResult<u64> {
        Ok(self.document(user)?.map_or(0, |doc| doc.balance))
    }

    /// Overwrites a user's coin balance, leaving the ledger as stored.
    ///
    /// # Errors
    ///
    /// As [`document`](Self::document), or `AppError::Io` if the write fails.
    pub fn set_balance(&self, user: &str, balance: u64) -> AppResult<()> {
        let _guard = self.write_lock.lock();
        let mut doc = self.document(user)?.unwrap_or_default();
        doc.balance = balance;
        let path = self.path_for(user);
        self.replace(&path, &doc).map_err(|(_, source)| AppError::Io { path, source })
    }

    /// Writes `doc` to a temp file and renames it over `path`.
    ///
    /// The error carries whether the rename had already happened.
    fn replace(&self, path: &Path, doc: &UserDocument) -> Result<(), (bool, io::Error)> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|err| (false, io::Error::from(err)))?;
        let tmp = path.with_extension("json.tmp");

        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&tmp, path)) {
            fs::remove_file(&tmp).ok();
            return Err((false, err));
        }

        sync_dir(&self.root).map_err(|err| (true, err))
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

impl LedgerStore for JsonFileStore {
    fn load(&self, user: &str) -> Result<Option<Ledger>, StoreError> {
        self.document(user)
            .map(|doc| doc.map(|doc| doc.gacha))
            .map_err(|err| StoreError::not_applied(err.to_string()))
    }

    fn save(&self, user: &str, write: LedgerWrite<'_>) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();

        let mut doc = self
            .document(user)
            .map_err(|err| StoreError::not_applied(err.to_string()))?
            .unwrap_or_default();
        doc.gacha = write.ledger.clone();
        if let Some(balance) = write.balance {
            doc.balance = balance;
        }

        let path = self.path_for(user);
        self.replace(&path, &doc).map_err(|(renamed, err)| {
            let message = format!("{}: {err}", path.display());
            if renamed {
                StoreError::indeterminate(message)
            } else {
                StoreError::not_applied(message)
            }
        })?;

        tracing::debug!(user, path = %path.display(), balance = doc.balance, "document written");
        Ok(())
    }
}
