//! # Inventory Ledger
//!
//! The per-user gacha document: owned cards, shard balance, pull count,
//! pity counters and claimed rewards.
//!
//! The ledger is read in full, mutated in memory and written back in full.
//! Operations work on a copy; nothing here talks to the store.
//!
//! ## Invariants
//!
//! - A card key, once present, is never removed
//! - `shards` is unsigned; spending checks the balance before mutating
//! - `total_pulls` only grows

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::card::{Card, CardId, CollectionId};
use crate::claim::ClaimedReward;
use crate::config::GachaConfig;
use crate::error::{GachaError, GachaResult};
use crate::rarity::Rarity;

/// Owned cards of one collection, keyed by card id.
pub type OwnedCards = BTreeMap<CardId, u32>;

/// The per-user gacha document.
///
/// Ordered maps keep the serialized form stable: two equal ledgers always
/// produce identical bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ledger {
    #[serde(deserialize_with = "deserialize_cards")]
    cards: BTreeMap<CollectionId, OwnedCards>,
    shards: u64,
    total_pulls: u64,
    pity_counters: BTreeMap<CollectionId, u32>,
    rewards: Vec<ClaimedReward>,
}

impl Ledger {
    /// Creates an empty ledger (the default for a new user).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shard balance when restoring a ledger.
    #[must_use]
    pub const fn with_shards(mut self, shards: u64) -> Self {
        self.shards = shards;
        self
    }

    /// Sets a pity counter when restoring a ledger.
    #[must_use]
    pub fn with_pity(mut self, collection: CollectionId, pity: u32) -> Self {
        self.pity_counters.insert(collection, pity);
        self
    }

    /// Adds an owned card when restoring a ledger. Counts below 1 are stored as 1.
    #[must_use]
    pub fn with_card(mut self, collection: CollectionId, card: impl Into<CardId>, count: u32) -> Self {
        self.cards
            .entry(collection)
            .or_default()
            .insert(card.into(), count.max(1));
        self
    }

    /// Current shard balance.
    #[inline]
    #[must_use]
    pub const fn shards(&self) -> u64 {
        self.shards
    }

    /// Rolls performed across all collections.
    #[inline]
    #[must_use]
    pub const fn total_pulls(&self) -> u64 {
        self.total_pulls
    }

    /// Consecutive rolls without a top-tier card in this collection.
    ///
    /// Stops at `pity_threshold - 1` when the pool has no top-tier card to force.
    #[inline]
    #[must_use]
    pub fn pity(&self, collection: CollectionId) -> u32 {
        self.pity_counters.get(&collection).copied().unwrap_or(0)
    }

    /// Rolls left until the top tier is guaranteed, counting the forced roll.
    #[must_use]
    pub fn pulls_until_guarantee(&self, collection: CollectionId, config: &GachaConfig) -> u32 {
        config
            .pity_threshold
            .saturating_sub(self.pity(collection))
            .max(1)
    }

    /// Owned cards of a collection, if the user ever touched it.
    #[must_use]
    pub fn cards(&self, collection: CollectionId) -> Option<&OwnedCards> {
        self.cards.get(&collection)
    }

    /// Collections with at least one entry.
    pub fn collections(&self) -> impl Iterator<Item = CollectionId> + '_ {
        self.cards.keys().copied()
    }

    /// How many times the card has been obtained (0 if not owned).
    #[must_use]
    pub fn owned_count(&self, collection: CollectionId, card: &str) -> u32 {
        self.cards
            .get(&collection)
            .and_then(|owned| owned.get(card))
            .copied()
            .unwrap_or(0)
    }

    /// Returns true if the card is in the collection. A present key means owned.
    #[inline]
    #[must_use]
    pub fn owns(&self, collection: CollectionId, card: &str) -> bool {
        self.cards
            .get(&collection)
            .is_some_and(|owned| owned.contains_key(card))
    }

    /// Claimed rewards, oldest first.
    #[must_use]
    pub fn rewards(&self) -> &[ClaimedReward] {
        &self.rewards
    }

    /// Returns true if the reward image was already claimed for this collection.
    #[must_use]
    pub fn has_reward(&self, collection: CollectionId, image: &str) -> bool {
        self.rewards
            .iter()
            .any(|r| r.collection_id == collection && r.image == image)
    }

    /// Ownership summary of a collection against its catalog pool.
    #[must_use]
    pub fn collection_progress(&self, collection: CollectionId, pool: &[Card]) -> CollectionProgress {
        let mut seen = BTreeSet::new();
        let mut by_rarity: BTreeMap<Rarity, TierProgress> = BTreeMap::new();

        for card in pool {
            if !seen.insert(card.id()) {
                continue;
            }
            let tier = by_rarity.entry(card.rarity).or_default();
            tier.total += 1;
            if self.owns(collection, card.id()) {
                tier.owned += 1;
            }
        }

        let owned = by_rarity.values().map(|t| t.owned).sum();
        let total = by_rarity.values().map(|t| t.total).sum();

        CollectionProgress {
            collection,
            owned,
            total,
            by_rarity,
        }
    }

    /// Unowned top-tier cards of the pool, in pool order.
    #[must_use]
    pub fn exchange_candidates<'a>(&self, collection: CollectionId, pool: &'a [Card]) -> Vec<&'a Card> {
        let mut seen = BTreeSet::new();
        pool.iter()
            .filter(|card| card.rarity.is_top() && !self.owns(collection, card.id()))
            .filter(|card| seen.insert(card.id()))
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutations used by the pull session, exchange and claim operations
    // ------------------------------------------------------------------

    /// Makes sure the collection has a card map and a pity counter.
    pub(crate) fn ensure_collection(&mut self, collection: CollectionId) {
        self.cards.entry(collection).or_default();
        self.pity_counters.entry(collection).or_insert(0);
    }

    /// Records a rolled card. Returns true if it was new.
    pub(crate) fn record_card(&mut self, collection: CollectionId, card: &str) -> bool {
        let owned = self.cards.entry(collection).or_default();
        match owned.get_mut(card) {
            Some(count) => {
                *count = count.saturating_add(1);
                false
            }
            None => {
                owned.insert(card.to_string(), 1);
                true
            }
        }
    }

    /// Grants a card outright (exchange). The caller checks ownership first.
    pub(crate) fn grant_card(&mut self, collection: CollectionId, card: &str) {
        self.cards
            .entry(collection)
            .or_default()
            .insert(card.to_string(), 1);
    }

    pub(crate) fn set_pity(&mut self, collection: CollectionId, pity: u32) {
        self.pity_counters.insert(collection, pity);
    }

    pub(crate) fn add_shards(&mut self, amount: u64) {
        self.shards = self.shards.saturating_add(amount);
    }

    /// Deducts shards, refusing to go below zero.
    pub(crate) fn spend_shards(&mut self, amount: u64) -> GachaResult<u64> {
        if self.shards < amount {
            return Err(GachaError::InsufficientShards {
                required: amount,
                available: self.shards,
            });
        }
        self.shards -= amount;
        Ok(self.shards)
    }

    pub(crate) fn add_pulls(&mut self, rolls: u32) {
        self.total_pulls = self.total_pulls.saturating_add(u64::from(rolls));
    }

    pub(crate) fn push_reward(&mut self, reward: ClaimedReward) {
        self.rewards.push(reward);
    }
}

/// Reads owned-card maps, storing counts below 1 as 1.
fn deserialize_cards<'de, D>(deserializer: D) -> Result<BTreeMap<CollectionId, OwnedCards>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut cards = BTreeMap::<CollectionId, OwnedCards>::deserialize(deserializer)?;
    for count in cards.values_mut().flat_map(BTreeMap::values_mut) {
        *count = (*count).max(1);
    }
    Ok(cards)
}

/// Owned/total counts for one tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TierProgress {
    /// Distinct cards owned.
    pub owned: u32,
    /// Distinct cards in the pool.
    pub total: u32,
}

/// Ownership summary of one collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionProgress {
    /// The collection summarized.
    pub collection: CollectionId,
    /// Distinct pool cards owned.
    pub owned: u32,
    /// Distinct cards in the pool.
    pub total: u32,
    /// Breakdown per tier present in the pool.
    pub by_rarity: BTreeMap<Rarity, TierProgress>,
}

impl CollectionProgress {
    /// Returns true once every pool card is owned. An empty pool is never complete.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total > 0 && self.owned == self.total
    }

    /// Completion in whole percent, rounded down.
    #[must_use]
    pub const fn percent(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            self.owned * 100 / self.total
        }
    }
}
