//! # Gacha Configuration
//!
//! The rarity table and the currency constants.
//!
//! The defaults are the live balance values and are compiled in. A TOML file
//! with the same shape can override them for simulations:
//!
//! ```toml
//! cost_per_roll = 10
//! pity_threshold = 200
//! exchange_cost = 145
//!
//! [[tiers]]
//! rarity = 40
//! rate_bp = 100
//! duplicate_shards = 15
//! ```
//!
//! Drop rates are expressed in basis points (`10_000` = 100%). The tier list
//! is walked in declared order when a roll picks its tier.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GachaError, GachaResult};
use crate::rarity::Rarity;

/// Coins charged per single roll.
pub const COST_PER_ROLL: u64 = 10;

/// Rolls without an ultra rare before the next one is forced.
pub const PITY_THRESHOLD: u32 = 200;

/// Shards spent to exchange for one unowned ultra rare.
pub const EXCHANGE_COST: u64 = 145;

/// 100% in basis points.
pub const RATE_SCALE_BP: u32 = 10_000;

/// One row of the rarity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierConfig {
    /// The tier this row configures.
    pub rarity: Rarity,
    /// Drop rate in basis points.
    pub rate_bp: u32,
    /// Shards granted when a card of this tier is rolled again.
    pub duplicate_shards: u64,
}

impl TierConfig {
    /// Creates a rarity table row.
    #[must_use]
    pub const fn new(rarity: Rarity, rate_bp: u32, duplicate_shards: u64) -> Self {
        Self {
            rarity,
            rate_bp,
            duplicate_shards,
        }
    }
}

/// Default rarity table, rarest first.
pub const DEFAULT_TIERS: [TierConfig; 4] = [
    TierConfig::new(Rarity::UltraRare, 100, 15), // 1%
    TierConfig::new(Rarity::SuperRare, 900, 5),  // 9%
    TierConfig::new(Rarity::Rare, 2_500, 1),     // 25%
    TierConfig::new(Rarity::Common, 6_500, 0),   // 65%
];

/// Complete gacha balance configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GachaConfig {
    /// Coins per roll.
    pub cost_per_roll: u64,
    /// Pity threshold (see [`PITY_THRESHOLD`]).
    pub pity_threshold: u32,
    /// Shards per exchange.
    pub exchange_cost: u64,
    /// Rarity table in walk order.
    pub tiers: Vec<TierConfig>,
}

impl Default for GachaConfig {
    fn default() -> Self {
        Self {
            cost_per_roll: COST_PER_ROLL,
            pity_threshold: PITY_THRESHOLD,
            exchange_cost: EXCHANGE_COST,
            tiers: DEFAULT_TIERS.to_vec(),
        }
    }
}

impl GachaConfig {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` on a parse error or a table that
    /// fails [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> GachaResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| GachaError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if the file cannot be read or is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> GachaResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GachaError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks the rarity table and constants.
    ///
    /// # Errors
    ///
    /// Returns `GachaError::InvalidConfig` if:
    /// - the drop rates do not sum to exactly 100%
    /// - a tier appears twice
    /// - the top tier is missing
    /// - the pity threshold is zero
    pub fn validate(&self) -> GachaResult<()> {
        if self.pity_threshold == 0 {
            return Err(GachaError::InvalidConfig(
                "pity threshold must be at least 1".to_string(),
            ));
        }

        let total = self.total_rate_bp();
        if total != u64::from(RATE_SCALE_BP) {
            return Err(GachaError::InvalidConfig(format!(
                "drop rates sum to {total} bp, expected {RATE_SCALE_BP}"
            )));
        }

        for (i, tier) in self.tiers.iter().enumerate() {
            if self.tiers[..i].iter().any(|t| t.rarity == tier.rarity) {
                return Err(GachaError::InvalidConfig(format!(
                    "rarity {} listed twice",
                    tier.rarity.code()
                )));
            }
        }

        if self.tier(Rarity::TOP).is_none() {
            return Err(GachaError::InvalidConfig(format!(
                "rarity table has no {} tier",
                Rarity::TOP
            )));
        }

        Ok(())
    }

    /// Sum of all drop rates in basis points.
    #[must_use]
    pub fn total_rate_bp(&self) -> u64 {
        self.tiers.iter().map(|t| u64::from(t.rate_bp)).sum()
    }

    /// Looks up the table row for a tier.
    #[must_use]
    pub fn tier(&self, rarity: Rarity) -> Option<&TierConfig> {
        self.tiers.iter().find(|t| t.rarity == rarity)
    }

    /// Shards granted for a duplicate of this tier (0 if not configured).
    #[inline]
    #[must_use]
    pub fn duplicate_shards(&self, rarity: Rarity) -> u64 {
        self.tier(rarity).map_or(0, |t| t.duplicate_shards)
    }

    /// Picks the tier for a draw in `[0, RATE_SCALE_BP)`.
    ///
    /// Walks the table in declared order and returns the first tier whose
    /// cumulative rate exceeds the draw.
    #[must_use]
    pub fn tier_for_draw(&self, draw_bp: u32) -> Option<Rarity> {
        let mut cumulative = 0u64;
        for tier in &self.tiers {
            cumulative += u64::from(tier.rate_bp);
            if u64::from(draw_bp) < cumulative {
                return Some(tier.rarity);
            }
        }
        None
    }

    /// Total coin cost of `rolls` rolls.
    #[inline]
    #[must_use]
    pub const fn roll_cost(&self, rolls: u32) -> u64 {
        self.cost_per_roll.saturating_mul(rolls as u64)
    }

    /// Pity value at which the next roll is forced to the top tier.
    #[inline]
    #[must_use]
    pub const fn pity_trigger(&self) -> u32 {
        self.pity_threshold.saturating_sub(1)
    }
}
