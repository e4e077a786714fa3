//! # Shard Exchange
//!
//! Duplicates turn into shards; shards buy one chosen top-tier card the user
//! does not own yet. The exchange is independent of pity and roll history.

use crate::card::{Card, CardId, CollectionId};
use crate::error::{GachaError, GachaResult};
use crate::ledger::Ledger;

/// Successful exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeOutcome {
    /// The card granted.
    pub card_id: CardId,
    /// Shard balance after paying.
    pub shards: u64,
}

/// Spends `cost` shards on `card`.
///
/// Both checks run before anything is mutated, so a rejected exchange leaves
/// the ledger exactly as it was. The card id is not checked against any
/// pool; use [`exchange_from_pool`] when the catalog is at hand.
///
/// # Errors
///
/// - `GachaError::AlreadyOwned` if the card is already in the collection
/// - `GachaError::InsufficientShards` if the balance is below `cost`
pub fn exchange_card(
    ledger: &mut Ledger,
    collection: CollectionId,
    card: &str,
    cost: u64,
) -> GachaResult<ExchangeOutcome> {
    if ledger.owns(collection, card) {
        return Err(GachaError::AlreadyOwned {
            collection,
            card: card.to_string(),
        });
    }

    let shards = ledger.spend_shards(cost)?;
    ledger.grant_card(collection, card);

    Ok(ExchangeOutcome {
        card_id: card.to_string(),
        shards,
    })
}

/// Like [`exchange_card`], but only for top-tier cards of `pool`.
///
/// # Errors
///
/// - `GachaError::AlreadyOwned` if the card is already in the collection
/// - `GachaError::NotExchangeable` if `pool` has no top-tier card with this id
/// - `GachaError::InsufficientShards` if the balance is below `cost`
pub fn exchange_from_pool(
    ledger: &mut Ledger,
    collection: CollectionId,
    pool: &[Card],
    card: &str,
    cost: u64,
) -> GachaResult<ExchangeOutcome> {
    if ledger.owns(collection, card) {
        return Err(GachaError::AlreadyOwned {
            collection,
            card: card.to_string(),
        });
    }
    if !pool.iter().any(|c| c.id() == card && c.rarity.is_top()) {
        return Err(GachaError::NotExchangeable {
            collection,
            card: card.to_string(),
        });
    }
    exchange_card(ledger, collection, card, cost)
}
