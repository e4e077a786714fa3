//! # Pull Session
//!
//! Consecutive rolls against one collection of an in-memory ledger.
//!
//! The session threads the pity counter from roll to roll, converts
//! duplicates into shards and bumps the pull counter. It never touches the
//! store: [`GachaService::pull`](crate::service::GachaService::pull) loads the
//! ledger, runs the session on the copy and persists the result.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::card::{Card, CardId, CollectionId};
use crate::config::GachaConfig;
use crate::error::{GachaError, GachaResult};
use crate::ledger::Ledger;
use crate::rarity::Rarity;
use crate::roll::{next_pity, roll};

/// Number of rolls bought in one pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PullCount {
    /// One roll.
    Single,
    /// Ten rolls.
    Ten,
}

impl PullCount {
    /// Rolls performed.
    #[inline]
    #[must_use]
    pub const fn rolls(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Ten => 10,
        }
    }
}

impl TryFrom<u32> for PullCount {
    type Error = GachaError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        match count {
            1 => Ok(Self::Single),
            10 => Ok(Self::Ten),
            other => Err(GachaError::InvalidPullCount(other)),
        }
    }
}

/// Outcome of one roll inside a pull.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    /// Card key.
    pub card_id: CardId,
    /// Card tier.
    pub rarity: Rarity,
    /// First copy of this card.
    pub is_new: bool,
    /// Shards granted for a duplicate (0 for new cards).
    pub shards_gained: u64,
    /// Produced by the pity override.
    pub forced_by_pity: bool,
}

/// Successful pull.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PullOutcome {
    /// One entry per roll, in roll order.
    pub results: Vec<RollResult>,
    /// Currency balance after paying for the pull.
    pub new_balance: u64,
    /// Shard balance after duplicates were converted.
    pub shards: u64,
    /// Pity counter of the collection after the last roll.
    pub pity: u32,
    /// Lifetime roll count.
    pub total_pulls: u64,
}

impl PullOutcome {
    /// Cards obtained for the first time.
    pub fn new_cards(&self) -> impl Iterator<Item = &RollResult> {
        self.results.iter().filter(|r| r.is_new)
    }

    /// Shards granted by this pull.
    #[must_use]
    pub fn shards_gained(&self) -> u64 {
        self.results.iter().map(|r| r.shards_gained).sum()
    }
}

/// Runs `rolls` rolls against `ledger`.
///
/// Updates owned cards, the collection's pity counter, the shard balance and
/// the lifetime pull count. The pool is checked before anything is touched,
/// so an error leaves the ledger unchanged.
///
/// # Errors
///
/// Returns `GachaError::EmptyPool` if `pool` is empty.
pub fn run_session<R: Rng + ?Sized>(
    ledger: &mut Ledger,
    collection: CollectionId,
    pool: &[Card],
    rolls: u32,
    config: &GachaConfig,
    rng: &mut R,
) -> GachaResult<Vec<RollResult>> {
    if pool.is_empty() {
        return Err(GachaError::EmptyPool);
    }

    ledger.ensure_collection(collection);

    let mut results = Vec::with_capacity(rolls as usize);
    let mut shards_total = 0u64;
    let mut pity = ledger.pity(collection);

    for _ in 0..rolls {
        let drawn = roll(pool, pity, config, rng)?;
        let card = drawn.card;

        let is_new = ledger.record_card(collection, card.id());
        let shards_gained = if is_new {
            0
        } else {
            config.duplicate_shards(card.rarity)
        };
        shards_total = shards_total.saturating_add(shards_gained);

        pity = next_pity(pity, drawn.pity_consumed, config);

        tracing::debug!(
            collection,
            card = card.id(),
            rarity = %card.rarity,
            is_new,
            pity,
            forced = drawn.forced_by_pity,
            "roll"
        );

        results.push(RollResult {
            card_id: card.card_img.clone(),
            rarity: card.rarity,
            is_new,
            shards_gained,
            forced_by_pity: drawn.forced_by_pity,
        });
    }

    ledger.set_pity(collection, pity);
    ledger.add_shards(shards_total);
    ledger.add_pulls(rolls);

    Ok(results)
}
