//! # ExamQuest Gacha
//!
//! The collectible-card pull engine behind the ExamQuest quiz trainer.
//!
//! ## Design Principles
//!
//! 1. **Storage-agnostic** - The ledger is loaded and saved through a
//!    load/save pair ([`LedgerStore`]); no database client lives here
//! 2. **Injected randomness** - Every roll takes a caller-supplied `Rng`
//! 3. **One document per user** - The ledger is read in full, mutated in
//!    memory and written back in one write
//! 4. **Reject before mutating** - Currency, shard and ownership checks run
//!    before the ledger is touched
//!
//! ## Example
//!
//! ```rust,ignore
//! use examquest_gacha::{GachaService, MemoryStore, PullCount};
//! use rand::SeedableRng;
//!
//! let service = GachaService::new(MemoryStore::new());
//! let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
//!
//! let outcome = service.pull("user-1", 5, &pool, PullCount::Ten, coins, &mut rng)?;
//! for roll in &outcome.results {
//!     println!("{} {} new={}", roll.rarity, roll.card_id, roll.is_new);
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod card;
pub mod claim;
pub mod config;
pub mod error;
pub mod exchange;
pub mod ledger;
pub mod rarity;
pub mod roll;
pub mod service;
pub mod session;
pub mod stats;
pub mod store;

pub use card::{Card, CardId, CardMedia, CollectionId};
pub use claim::{ClaimStatus, ClaimedReward, RewardCandidate, RewardKind};
pub use config::{GachaConfig, TierConfig, COST_PER_ROLL, EXCHANGE_COST, PITY_THRESHOLD};
pub use error::{GachaError, GachaResult, StoreError, WriteStatus};
pub use exchange::{exchange_card, exchange_from_pool, ExchangeOutcome};
pub use ledger::{CollectionProgress, Ledger, TierProgress};
pub use rarity::Rarity;
pub use roll::{roll, Roll};
pub use service::GachaService;
pub use session::{PullCount, PullOutcome, RollResult};
pub use stats::{simulate, PullStatistics};
pub use store::{FnStore, LedgerStore, LedgerWrite, MemoryStore, StoredDocument};
