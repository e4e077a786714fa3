//! # Pull Statistics
//!
//! Monte Carlo runs of the roll engine, used to check a rarity table and a
//! catalog before they go live.

use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

use crate::card::Card;
use crate::config::GachaConfig;
use crate::error::{GachaError, GachaResult};
use crate::rarity::Rarity;
use crate::roll::{next_pity, roll};

/// Statistics from a pull simulation.
#[derive(Clone, Debug, Default)]
pub struct PullStatistics {
    /// Rolls performed.
    pub total_rolls: u64,
    /// Cards drawn per tier.
    pub rarity_counts: BTreeMap<Rarity, u64>,
    /// Top-tier cards produced by the pity override.
    pub forced_by_pity: u64,
    /// Distinct cards seen.
    pub distinct_cards: usize,
    /// Longest run of rolls without a top-tier card.
    pub longest_drought: u32,
    /// Roll on which every pool card had been drawn at least once.
    pub completed_at: Option<u64>,
}

impl PullStatistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of rolls that landed on `rarity`, as a percentage.
    #[must_use]
    pub fn rate_percent(&self, rarity: Rarity) -> f64 {
        if self.total_rolls == 0 {
            return 0.0;
        }
        let count = self.rarity_counts.get(&rarity).copied().unwrap_or(0);
        (count as f64 / self.total_rolls as f64) * 100.0
    }
}

/// Rolls `rolls` times against `pool`, threading pity like a real session.
///
/// # Errors
///
/// Returns `GachaError::EmptyPool` if `pool` is empty.
pub fn simulate<R: Rng + ?Sized>(
    pool: &[Card],
    rolls: u64,
    config: &GachaConfig,
    rng: &mut R,
) -> GachaResult<PullStatistics> {
    if pool.is_empty() {
        return Err(GachaError::EmptyPool);
    }

    let pool_size = pool.iter().map(Card::id).collect::<BTreeSet<_>>().len();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut stats = PullStatistics::new();
    let mut pity = 0u32;
    let mut drought = 0u32;

    for i in 0..rolls {
        let drawn = roll(pool, pity, config, rng)?;

        stats.total_rolls += 1;
        *stats.rarity_counts.entry(drawn.card.rarity).or_insert(0) += 1;
        if drawn.forced_by_pity {
            stats.forced_by_pity += 1;
        }

        if drawn.pity_consumed {
            drought = 0;
        } else {
            drought += 1;
            stats.longest_drought = stats.longest_drought.max(drought);
        }
        pity = next_pity(pity, drawn.pity_consumed, config);

        if seen.insert(drawn.card.id()) && seen.len() == pool_size {
            stats.completed_at = Some(i + 1);
        }
    }

    stats.distinct_cards = seen.len();
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool() -> Vec<Card> {
        vec![
            Card::new("n1", Rarity::Common),
            Card::new("r1", Rarity::Rare),
            Card::new("sr1", Rarity::SuperRare),
            Card::new("ur1", Rarity::UltraRare),
        ]
    }

    #[test]
    fn test_drought_never_reaches_threshold() {
        let config = GachaConfig {
            pity_threshold: 20,
            ..GachaConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        let stats = simulate(&pool(), 20_000, &config, &mut rng).unwrap();

        assert_eq!(stats.total_rolls, 20_000);
        assert!(stats.longest_drought < config.pity_threshold);
        assert!(stats.forced_by_pity > 0, "a 1% tier with pity 20 must trigger pity");
        assert_eq!(stats.distinct_cards, 4);
        assert!(stats.completed_at.is_some());
    }

    #[test]
    fn test_rates_sum_to_100_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let stats = simulate(&pool(), 5_000, &GachaConfig::default(), &mut rng).unwrap();

        let total: f64 = Rarity::ALL.iter().map(|r| stats.rate_percent(*r)).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(simulate(&[], 10, &GachaConfig::default(), &mut rng).is_err());
    }
}
