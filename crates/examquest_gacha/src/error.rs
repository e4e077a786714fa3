//! # Gacha Error Types
//!
//! All errors that can occur in the gacha system.
//!
//! Every operation returns [`GachaResult`]. Nothing is retried inside the
//! crate; the caller decides whether a failure is worth another attempt.

use thiserror::Error;

use crate::card::{CardId, CollectionId};

/// Whether a failed write may still have reached the document store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteStatus {
    /// The store rejected the write; nothing durable changed.
    NotApplied,
    /// The acknowledgement was lost. The write may or may not have applied.
    Indeterminate,
}

/// Error reported by a [`LedgerStore`](crate::store::LedgerStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("store failure ({status:?}): {message}")]
pub struct StoreError {
    /// Whether the write may have applied.
    pub status: WriteStatus,
    /// Message from the underlying store client.
    pub message: String,
}

impl StoreError {
    /// A failure that definitely left the stored document untouched.
    #[must_use]
    pub fn not_applied(message: impl Into<String>) -> Self {
        Self {
            status: WriteStatus::NotApplied,
            message: message.into(),
        }
    }

    /// A failure where the write may have applied server-side.
    #[must_use]
    pub fn indeterminate(message: impl Into<String>) -> Self {
        Self {
            status: WriteStatus::Indeterminate,
            message: message.into(),
        }
    }

    /// Returns true if the caller cannot know whether the write applied.
    #[inline]
    #[must_use]
    pub const fn is_indeterminate(&self) -> bool {
        matches!(self.status, WriteStatus::Indeterminate)
    }
}

/// Errors that can occur in the gacha system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GachaError {
    /// The currency balance does not cover the pull.
    #[error("insufficient currency: need {required}, have {available}")]
    InsufficientCurrency {
        /// Cost of the requested pull.
        required: u64,
        /// Balance supplied by the caller.
        available: u64,
    },

    /// The shard balance does not cover the exchange.
    #[error("insufficient shards: need {required}, have {available}")]
    InsufficientShards {
        /// Exchange cost.
        required: u64,
        /// Current shard balance.
        available: u64,
    },

    /// The card is already in the user's collection.
    #[error("card {card} already owned in collection {collection}")]
    AlreadyOwned {
        /// Collection the card belongs to.
        collection: CollectionId,
        /// The owned card.
        card: CardId,
    },

    /// The card is not a top-tier card of the collection's pool.
    #[error("card {card} cannot be exchanged in collection {collection}")]
    NotExchangeable {
        /// Collection the exchange targeted.
        collection: CollectionId,
        /// The requested card.
        card: CardId,
    },

    /// A roll was requested against an empty card pool.
    #[error("card pool is empty")]
    EmptyPool,

    /// Pull counts other than 1 and 10 are not offered.
    #[error("invalid pull count: {0} (expected 1 or 10)")]
    InvalidPullCount(u32),

    /// Invalid configuration file or rarity table.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The document store failed to load or persist the ledger.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl GachaError {
    /// Returns true if the failure may have left a durable mutation behind.
    ///
    /// Only an indeterminate store failure can do that; every other kind is
    /// raised before the write is attempted.
    #[must_use]
    pub const fn may_have_applied(&self) -> bool {
        match self {
            Self::Persistence(err) => err.is_indeterminate(),
            _ => false,
        }
    }
}

/// Result type for gacha operations.
pub type GachaResult<T> = Result<T, GachaError>;
