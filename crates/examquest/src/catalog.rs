//! # Card Catalog
//!
//! Collections, their card pools and their completion rewards, loaded from a
//! JSON export of the admin catalog:
//!
//! ```json
//! {
//!   "collections": [
//!     {
//!       "id": 5,
//!       "name": "Quản lý phạm vi",
//!       "cards": [{ "cardImg": "scope_n1.png", "rarity": 10 }],
//!       "rewards": [{ "image": "scope_badge.png", "name": "Scope Keeper", "typeCode": 1001 }]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use examquest_gacha::{Card, CollectionId, Rarity, RewardCandidate};

use crate::error::{AppError, AppResult};

/// One themed card collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Collection id.
    pub id: CollectionId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Card pool, in catalog order.
    pub cards: Vec<Card>,
    /// Rewards unlocked by completing the collection.
    #[serde(default)]
    pub rewards: Vec<RewardCandidate>,
}

impl Collection {
    /// The pool handed to the roll engine.
    #[must_use]
    pub fn pool(&self) -> &[Card] {
        &self.cards
    }

    /// Number of cards of a tier.
    #[must_use]
    pub fn count(&self, rarity: Rarity) -> usize {
        self.cards.iter().filter(|c| c.rarity == rarity).count()
    }
}

/// All collections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Collections in catalog order.
    pub collections: Vec<Collection>,
}

impl Catalog {
    /// Parses and validates a catalog.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Json` on malformed input (including unknown rarity
    /// codes) and `AppError::InvalidCatalog` if validation fails.
    pub fn from_json_str(source: &str) -> AppResult<Self> {
        let catalog: Self = serde_json::from_str(source)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Loads and validates a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    /// Looks up a collection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UnknownCollection` if the id is not in the catalog.
    pub fn collection(&self, id: CollectionId) -> AppResult<&Collection> {
        self.collections
            .iter()
            .find(|c| c.id == id)
            .ok_or(AppError::UnknownCollection(id))
    }

    /// Rejects duplicate collection ids, empty pools and duplicate card keys.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidCatalog` describing the first problem found.
    pub fn validate(&self) -> AppResult<()> {
        let mut ids = HashSet::new();
        for collection in &self.collections {
            if !ids.insert(collection.id) {
                return Err(AppError::InvalidCatalog(format!(
                    "collection {} listed twice",
                    collection.id
                )));
            }
            if collection.cards.is_empty() {
                return Err(AppError::InvalidCatalog(format!(
                    "collection {} has no cards",
                    collection.id
                )));
            }

            let mut keys = HashSet::new();
            for card in &collection.cards {
                if !keys.insert(card.id()) {
                    return Err(AppError::InvalidCatalog(format!(
                        "card {} listed twice in collection {}",
                        card.id(),
                        collection.id
                    )));
                }
            }

            if collection.count(Rarity::TOP) == 0 {
                tracing::warn!(
                    collection = collection.id,
                    "collection has no {} card; pity cannot be honoured",
                    Rarity::TOP
                );
            }
        }
        Ok(())
    }
}
