//! # Ledger Store
//!
//! The gacha core never talks to a database client. It reads and writes
//! whole ledgers through [`LedgerStore`]:
//!
//! - `load` returns the user's ledger, or `None` for a new user
//! - `save` replaces the ledger (and, for pulls, the currency balance) in one
//!   write that must apply fully or not at all
//!
//! There is no concurrency token. Two writers for the same user race and the
//! later write wins.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::StoreError;
use crate::ledger::Ledger;

/// One document write.
#[derive(Clone, Copy, Debug)]
pub struct LedgerWrite<'a> {
    /// The full ledger.
    pub ledger: &'a Ledger,
    /// New currency balance, or `None` to leave it untouched.
    pub balance: Option<u64>,
}

/// Load/save access to per-user ledger documents.
pub trait LedgerStore {
    /// Reads the user's ledger. `Ok(None)` means the user has none yet.
    ///
    /// # Errors
    ///
    /// Returns the store client's error.
    fn load(&self, user: &str) -> Result<Option<Ledger>, StoreError>;

    /// Persists the ledger and optional balance as one write.
    ///
    /// # Errors
    ///
    /// Returns the store client's error, flagged indeterminate when the write
    /// may have applied.
    fn save(&self, user: &str, write: LedgerWrite<'_>) -> Result<(), StoreError>;
}

impl<S: LedgerStore + ?Sized> LedgerStore for &S {
    fn load(&self, user: &str) -> Result<Option<Ledger>, StoreError> {
        (**self).load(user)
    }

    fn save(&self, user: &str, write: LedgerWrite<'_>) -> Result<(), StoreError> {
        (**self).save(user, write)
    }
}

impl<S: LedgerStore + ?Sized> LedgerStore for Arc<S> {
    fn load(&self, user: &str) -> Result<Option<Ledger>, StoreError> {
        (**self).load(user)
    }

    fn save(&self, user: &str, write: LedgerWrite<'_>) -> Result<(), StoreError> {
        (**self).save(user, write)
    }
}

// ============================================================================
// Closure-backed store
// ============================================================================

/// A store built from a load/save pair of closures.
///
/// ```rust,ignore
/// let store = FnStore::new(
///     |user| firestore.get_gacha(user),
///     |user, write| firestore.set_gacha(user, write.ledger, write.balance),
/// );
/// ```
pub struct FnStore<L, S> {
    load: L,
    save: S,
}

impl<L, S> FnStore<L, S>
where
    L: Fn(&str) -> Result<Option<Ledger>, StoreError>,
    S: Fn(&str, LedgerWrite<'_>) -> Result<(), StoreError>,
{
    /// Wraps the two collaborator functions.
    pub const fn new(load: L, save: S) -> Self {
        Self { load, save }
    }
}

impl<L, S> LedgerStore for FnStore<L, S>
where
    L: Fn(&str) -> Result<Option<Ledger>, StoreError>,
    S: Fn(&str, LedgerWrite<'_>) -> Result<(), StoreError>,
{
    fn load(&self, user: &str) -> Result<Option<Ledger>, StoreError> {
        (self.load)(user)
    }

    fn save(&self, user: &str, write: LedgerWrite<'_>) -> Result<(), StoreError> {
        (self.save)(user, write)
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// A stored user document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredDocument {
    /// Gacha ledger.
    pub ledger: Ledger,
    /// Currency balance.
    pub balance: u64,
}

/// In-memory document store.
///
/// Thread-safe, with optional fault injection for exercising failure paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, StoredDocument>>,
    pending_failure: Mutex<Option<StoreError>>,
    writes: RwLock<u64>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a user document.
    #[must_use]
    pub fn with_user(self, user: &str, ledger: Ledger, balance: u64) -> Self {
        self.documents
            .write()
            .insert(user.to_string(), StoredDocument { ledger, balance });
        self
    }

    /// Copy of a user's document.
    #[must_use]
    pub fn document(&self, user: &str) -> Option<StoredDocument> {
        self.documents.read().get(user).cloned()
    }

    /// Stored currency balance.
    #[must_use]
    pub fn balance(&self, user: &str) -> Option<u64> {
        self.documents.read().get(user).map(|doc| doc.balance)
    }

    /// Writes applied so far.
    #[must_use]
    pub fn writes(&self) -> u64 {
        *self.writes.read()
    }

    /// Makes the next `save` fail with `error` without applying.
    ///
    /// An indeterminate error still applies the write, the way a lost
    /// acknowledgement does.
    pub fn fail_next_save(&self, error: StoreError) {
        *self.pending_failure.lock() = Some(error);
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, user: &str) -> Result<Option<Ledger>, StoreError> {
        Ok(self.documents.read().get(user).map(|doc| doc.ledger.clone()))
    }

    fn save(&self, user: &str, write: LedgerWrite<'_>) -> Result<(), StoreError> {
        let failure = self.pending_failure.lock().take();
        if let Some(err) = &failure {
            if !err.is_indeterminate() {
                return Err(err.clone());
            }
        }

        {
            let mut documents = self.documents.write();
            let doc = documents.entry(user.to_string()).or_default();
            doc.ledger = write.ledger.clone();
            if let Some(balance) = write.balance {
                doc.balance = balance;
            }
        }
        *self.writes.write() += 1;

        failure.map_or(Ok(()), Err)
    }
}
