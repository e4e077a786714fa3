//! # Rarity Tiers
//!
//! Cards carry an integer rarity code supplied by the external catalog:
//!
//! | Code | Tier        | Short |
//! |------|-------------|-------|
//! | 10   | Common      | N     |
//! | 20   | Rare        | R     |
//! | 30   | Super rare  | SR    |
//! | 40   | Ultra rare  | UR    |
//!
//! Ultra rare is the top tier: it is the tier the pity counter guarantees and
//! the tier shards can be exchanged for.

use serde::{Deserialize, Serialize};

use crate::error::GachaError;

/// Rarity tier of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(u16)]
pub enum Rarity {
    /// N - code 10.
    Common = 10,
    /// R - code 20.
    Rare = 20,
    /// SR - code 30.
    SuperRare = 30,
    /// UR - code 40.
    UltraRare = 40,
}

impl Rarity {
    /// The tier guaranteed by pity and offered by the exchange.
    pub const TOP: Self = Self::UltraRare;

    /// All tiers, lowest first.
    pub const ALL: [Self; 4] = [Self::Common, Self::Rare, Self::SuperRare, Self::UltraRare];

    /// Catalog code for this tier.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Parses a catalog code. Unknown codes yield `None`.
    #[inline]
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            10 => Some(Self::Common),
            20 => Some(Self::Rare),
            30 => Some(Self::SuperRare),
            40 => Some(Self::UltraRare),
            _ => None,
        }
    }

    /// Short label shown on the pull screen.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Common => "N",
            Self::Rare => "R",
            Self::SuperRare => "SR",
            Self::UltraRare => "UR",
        }
    }

    /// Returns true for the top tier.
    #[inline]
    #[must_use]
    pub fn is_top(self) -> bool {
        self == Self::TOP
    }
}

impl TryFrom<u16> for Rarity {
    type Error = GachaError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code)
            .ok_or_else(|| GachaError::InvalidConfig(format!("unknown rarity code {code}")))
    }
}

impl From<Rarity> for u16 {
    fn from(rarity: Rarity) -> Self {
        rarity.code()
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}
