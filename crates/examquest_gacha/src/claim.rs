//! # Reward Claims
//!
//! Completing a collection unlocks cosmetic rewards (avatars, frames,
//! badges). Each reward image can be claimed once per collection.

use serde::{Deserialize, Serialize};

use crate::card::CollectionId;
use crate::error::GachaError;
use crate::ledger::Ledger;

/// Reward type codes used by the reward catalog.
pub mod codes {
    /// Avatar reward.
    pub const AVATAR: u32 = 1000;
    /// Avatar frame reward.
    pub const FRAME: u32 = 3;
    /// Badge reward.
    pub const BADGE: u32 = 1001;
}

/// What a claimed reward unlocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardKind {
    /// Profile avatar.
    Avatar,
    /// Avatar frame.
    Frame,
    /// Profile badge.
    Badge,
}

impl RewardKind {
    /// Classifies a catalog type code. Unknown codes become badges.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            codes::AVATAR => Self::Avatar,
            codes::FRAME => Self::Frame,
            _ => Self::Badge,
        }
    }
}

/// A reward offered by a collection, as supplied by the reward catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardCandidate {
    /// Reward image key; identifies the reward within its collection.
    pub image: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Catalog type code (see [`codes`]).
    pub type_code: u32,
}

impl RewardCandidate {
    /// Creates a reward candidate.
    #[must_use]
    pub fn new(image: impl Into<String>, name: impl Into<String>, type_code: u32) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            type_code,
        }
    }
}

/// A reward recorded in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedReward {
    /// Classified reward type.
    #[serde(rename = "type")]
    pub kind: RewardKind,
    /// Collection that granted it.
    pub collection_id: CollectionId,
    /// Reward image key.
    pub image: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Per-reward result of a bulk claim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimStatus {
    /// Newly recorded and persisted.
    Claimed,
    /// Already in the ledger; nothing written.
    AlreadyClaimed,
    /// Loading or persisting failed for this reward only.
    Failed(GachaError),
}

impl ClaimStatus {
    /// Returns true if this call recorded the reward.
    #[inline]
    #[must_use]
    pub const fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed)
    }
}

/// Appends the reward unless the (collection, image) pair is already claimed.
///
/// Returns true if the ledger changed.
pub fn claim_reward(ledger: &mut Ledger, collection: CollectionId, reward: &RewardCandidate) -> bool {
    if ledger.has_reward(collection, &reward.image) {
        return false;
    }

    ledger.push_reward(ClaimedReward {
        kind: RewardKind::from_code(reward.type_code),
        collection_id: collection,
        image: reward.image.clone(),
        name: reward.name.clone(),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_kind_classification() {
        assert_eq!(RewardKind::from_code(1000), RewardKind::Avatar);
        assert_eq!(RewardKind::from_code(3), RewardKind::Frame);
        assert_eq!(RewardKind::from_code(1001), RewardKind::Badge);
        assert_eq!(RewardKind::from_code(7), RewardKind::Badge);
    }

    #[test]
    fn test_claim_is_idempotent_per_collection() {
        let mut ledger = Ledger::new();
        let frame = RewardCandidate::new("frame_gold.png", "Gold frame", codes::FRAME);

        assert!(claim_reward(&mut ledger, 2, &frame));
        assert!(!claim_reward(&mut ledger, 2, &frame));
        assert_eq!(ledger.rewards().len(), 1);
        assert_eq!(ledger.rewards()[0].kind, RewardKind::Frame);

        // Same image, different collection: a separate reward.
        assert!(claim_reward(&mut ledger, 3, &frame));
        assert_eq!(ledger.rewards().len(), 2);
    }

    #[test]
    fn test_claimed_reward_document_shape() {
        let reward = ClaimedReward {
            kind: RewardKind::Avatar,
            collection_id: 4,
            image: "pm_owl.png".to_string(),
            name: "PM Owl".to_string(),
        };
        let json = serde_json::to_value(&reward).unwrap();
        assert_eq!(json["type"], "avatar");
        assert_eq!(json["collectionId"], 4);
        assert_eq!(json["image"], "pm_owl.png");
    }
}
