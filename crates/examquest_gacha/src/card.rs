//! # Cards
//!
//! Card records come from an external per-collection catalog and are
//! read-only to the gacha engine.

use serde::{Deserialize, Serialize};

use crate::rarity::Rarity;

/// Card key within a collection (the catalog's `cardImg`).
pub type CardId = String;

/// Numeric collection identifier.
pub type CollectionId = u32;

/// Optional media shown when a card is revealed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMedia {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Full-size artwork URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Reveal animation URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// A collectible card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Card key, unique within its collection.
    pub card_img: CardId,
    /// Rarity tier.
    pub rarity: Rarity,
    /// Media references.
    #[serde(flatten)]
    pub media: CardMedia,
}

impl Card {
    /// Creates a card without media.
    #[must_use]
    pub fn new(card_img: impl Into<CardId>, rarity: Rarity) -> Self {
        Self {
            card_img: card_img.into(),
            rarity,
            media: CardMedia::default(),
        }
    }

    /// Card key.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.card_img
    }
}
