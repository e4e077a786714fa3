//! # Roll Engine
//!
//! One weighted draw from a collection's card pool.
//!
//! ## Algorithm
//!
//! ```text
//! pity >= threshold - 1 ?
//!   ├─ yes, pool has top-tier cards ──> uniform pick among them (forced)
//!   └─ no (or no top-tier cards) ─────> draw in [0, 10000) bp
//!                                        walk rate table -> tier
//!                                        uniform pick within tier
//!                                        (whole pool if tier is empty)
//! ```
//!
//! The engine has no side effects. Randomness comes from the caller, so a
//! seeded generator reproduces the same rolls.

use rand::Rng;

use crate::card::Card;
use crate::config::{GachaConfig, RATE_SCALE_BP};
use crate::error::{GachaError, GachaResult};

/// Result of a single roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roll<'a> {
    /// The drawn card.
    pub card: &'a Card,
    /// True whenever the card is top tier; the pity counter resets.
    pub pity_consumed: bool,
    /// True if the pity override produced the card.
    pub forced_by_pity: bool,
}

/// Draws one card from `pool`.
///
/// # Errors
///
/// Returns `GachaError::EmptyPool` if `pool` is empty.
pub fn roll<'a, R: Rng + ?Sized>(
    pool: &'a [Card],
    pity: u32,
    config: &GachaConfig,
    rng: &mut R,
) -> GachaResult<Roll<'a>> {
    if pool.is_empty() {
        return Err(GachaError::EmptyPool);
    }

    if pity >= config.pity_trigger() {
        if let Some(card) = pick_where(pool, rng, |c| c.rarity.is_top()) {
            return Ok(Roll {
                card,
                pity_consumed: true,
                forced_by_pity: true,
            });
        }
        tracing::warn!(
            pity,
            pool_size = pool.len(),
            "pity threshold reached but pool has no top-tier card, rolling normally"
        );
    }

    let draw = rng.gen_range(0..RATE_SCALE_BP);
    let tier = config.tier_for_draw(draw);

    let card = tier
        .and_then(|rarity| pick_where(pool, rng, |c| c.rarity == rarity))
        .unwrap_or_else(|| &pool[rng.gen_range(0..pool.len())]);

    Ok(Roll {
        card,
        pity_consumed: card.rarity.is_top(),
        forced_by_pity: false,
    })
}

/// Pity counter after a roll.
///
/// Resets on a top-tier card, otherwise advances. The counter never passes
/// `threshold - 1`, which keeps it below the threshold even when a pool has
/// no top-tier card to force.
#[inline]
#[must_use]
pub fn next_pity(pity: u32, pity_consumed: bool, config: &GachaConfig) -> u32 {
    if pity_consumed {
        0
    } else {
        pity.saturating_add(1).min(config.pity_trigger())
    }
}

/// Uniform pick among the cards matching `pred`, without allocating.
fn pick_where<'a, R, F>(pool: &'a [Card], rng: &mut R, pred: F) -> Option<&'a Card>
where
    R: Rng + ?Sized,
    F: Fn(&Card) -> bool,
{
    let matching = pool.iter().filter(|c| pred(*c)).count();
    if matching == 0 {
        return None;
    }
    let index = rng.gen_range(0..matching);
    pool.iter().filter(|c| pred(*c)).nth(index)
}
