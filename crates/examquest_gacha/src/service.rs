//! # Gacha Service
//!
//! The entry point the quiz app calls. Each operation is one
//! read-modify-write of the user's document:
//!
//! ```text
//! caller ──> pull() / exchange() / claim()
//!              1. Validate inputs (no I/O)
//!              2. Load ledger (default if absent)
//!              3. Mutate the in-memory copy
//!              4. Persist ledger (+ balance) as one write
//!              5. Return outcome or error
//! ```
//!
//! ## Failure Semantics
//!
//! Validation failures happen before the load, so nothing is written.
//! A store failure is returned as `GachaError::Persistence`; nothing is
//! retried. When the store flags the failure as indeterminate the write may
//! have landed anyway (see [`GachaError::may_have_applied`]).
//!
//! There is no lock or version check: concurrent operations for the same
//! user race and the later write wins.

use rand::Rng;

use crate::card::{Card, CollectionId};
use crate::claim::{claim_reward, ClaimStatus, RewardCandidate};
use crate::config::GachaConfig;
use crate::error::{GachaError, GachaResult};
use crate::exchange::{exchange_card, exchange_from_pool, ExchangeOutcome};
use crate::ledger::Ledger;
use crate::session::{run_session, PullCount, PullOutcome};
use crate::store::{LedgerStore, LedgerWrite};

/// Gacha operations over a ledger store.
pub struct GachaService<S> {
    config: GachaConfig,
    store: S,
}

impl<S: LedgerStore> GachaService<S> {
    /// Creates a service with the built-in balance values.
    pub fn new(store: S) -> Self {
        Self {
            config: GachaConfig::default(),
            store,
        }
    }

    /// Creates a service with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if the configuration fails validation.
    pub fn with_config(config: GachaConfig, store: S) -> GachaResult<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GachaConfig {
        &self.config
    }

    /// Underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Reads a user's ledger, or the empty default for a new user.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::Persistence` if the store read fails.
    pub fn inventory(&self, user: &str) -> GachaResult<Ledger> {
        Ok(self.store.load(user)?.unwrap_or_default())
    }

    /// Buys and performs a pull.
    ///
    /// `balance` is the user's current coin balance as known to the caller.
    /// The new balance is written together with the ledger.
    ///
    /// # Errors
    ///
    /// - `GachaError::InsufficientCurrency` if `balance` does not cover the pull
    /// - `GachaError::EmptyPool` if the collection has no cards
    /// - `GachaError::Persistence` if loading or saving fails
    pub fn pull<R: Rng + ?Sized>(
        &self,
        user: &str,
        collection: CollectionId,
        pool: &[Card],
        count: PullCount,
        balance: u64,
        rng: &mut R,
    ) -> GachaResult<PullOutcome> {
        let rolls = count.rolls();
        let cost = self.config.roll_cost(rolls);
        if balance < cost {
            return Err(GachaError::InsufficientCurrency {
                required: cost,
                available: balance,
            });
        }

        let mut ledger = self.inventory(user)?;
        let results = run_session(&mut ledger, collection, pool, rolls, &self.config, rng)?;
        let new_balance = balance - cost;

        self.persist(user, &ledger, Some(new_balance))?;

        let outcome = PullOutcome {
            results,
            new_balance,
            shards: ledger.shards(),
            pity: ledger.pity(collection),
            total_pulls: ledger.total_pulls(),
        };

        tracing::info!(
            user,
            collection,
            rolls,
            new_cards = outcome.new_cards().count(),
            shards_gained = outcome.shards_gained(),
            pity = outcome.pity,
            "pull complete"
        );

        Ok(outcome)
    }

    /// Exchanges shards for an unowned card.
    ///
    /// The card id is taken as given; [`exchange_from_pool`](Self::exchange_from_pool)
    /// also checks it against the collection's pool.
    ///
    /// # Errors
    ///
    /// - `GachaError::AlreadyOwned` if the card is already owned
    /// - `GachaError::InsufficientShards` if the shard balance is too low
    /// - `GachaError::Persistence` if loading or saving fails
    pub fn exchange(&self, user: &str, collection: CollectionId, card: &str) -> GachaResult<ExchangeOutcome> {
        let mut ledger = self.inventory(user)?;
        let outcome = exchange_card(&mut ledger, collection, card, self.config.exchange_cost)?;

        self.persist(user, &ledger, None)?;

        tracing::info!(user, collection, card, shards = outcome.shards, "exchange complete");
        Ok(outcome)
    }

    /// Exchanges shards for an unowned top-tier card of `pool`.
    ///
    /// # Errors
    ///
    /// - `GachaError::AlreadyOwned` if the card is already owned
    /// - `GachaError::NotExchangeable` if the card is not a top-tier card of `pool`
    /// - `GachaError::InsufficientShards` if the shard balance is too low
    /// - `GachaError::Persistence` if loading or saving fails
    pub fn exchange_from_pool(
        &self,
        user: &str,
        collection: CollectionId,
        pool: &[Card],
        card: &str,
    ) -> GachaResult<ExchangeOutcome> {
        let mut ledger = self.inventory(user)?;
        let outcome = exchange_from_pool(&mut ledger, collection, pool, card, self.config.exchange_cost)?;

        self.persist(user, &ledger, None)?;

        tracing::info!(user, collection, card, shards = outcome.shards, "exchange complete");
        Ok(outcome)
    }

    /// Claims a collection reward.
    ///
    /// Returns `false` without writing if the reward was already claimed.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::Persistence` if loading or saving fails.
    pub fn claim(&self, user: &str, collection: CollectionId, reward: &RewardCandidate) -> GachaResult<bool> {
        let mut ledger = self.inventory(user)?;
        if !claim_reward(&mut ledger, collection, reward) {
            tracing::debug!(user, collection, image = %reward.image, "reward already claimed");
            return Ok(false);
        }

        self.persist(user, &ledger, None)?;

        tracing::info!(user, collection, image = %reward.image, "reward claimed");
        Ok(true)
    }

    /// Claims every reward independently.
    ///
    /// Each reward gets its own read-modify-write; a failure on one does not
    /// stop the others.
    pub fn claim_all(
        &self,
        user: &str,
        collection: CollectionId,
        rewards: &[RewardCandidate],
    ) -> Vec<ClaimStatus> {
        rewards
            .iter()
            .map(|reward| match self.claim(user, collection, reward) {
                Ok(true) => ClaimStatus::Claimed,
                Ok(false) => ClaimStatus::AlreadyClaimed,
                Err(err) => ClaimStatus::Failed(err),
            })
            .collect()
    }

    fn persist(&self, user: &str, ledger: &Ledger, balance: Option<u64>) -> GachaResult<()> {
        self.store
            .save(user, LedgerWrite { ledger, balance })
            .map_err(|err| {
                tracing::warn!(
                    user,
                    error = %err,
                    indeterminate = err.is_indeterminate(),
                    "ledger write failed"
                );
                GachaError::Persistence(err)
            })
    }
}
