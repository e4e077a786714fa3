//! # Gacha Property Tests
//!
//! Invariants that must hold for every seed, table and call sequence:
//!
//! 1. Valid rarity tables sum to 100% and cover every draw
//! 2. A pity counter at the trigger always yields a top-tier card
//! 3. The stored pity counter stays below the threshold
//! 4. Claims are idempotent per (collection, image)
//! 5. Exchanges never overdraw and rejected ones change nothing

use examquest_gacha::config::RATE_SCALE_BP;
use examquest_gacha::{
    roll, Card, GachaConfig, GachaService, Ledger, MemoryStore, PullCount, Rarity, RewardCandidate,
    TierConfig,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn pool(commons: usize, rares: usize, ultras: usize) -> Vec<Card> {
    let mut cards = Vec::new();
    for i in 0..commons {
        cards.push(Card::new(format!("n{i}"), Rarity::Common));
    }
    for i in 0..rares {
        cards.push(Card::new(format!("r{i}"), Rarity::Rare));
    }
    for i in 0..ultras {
        cards.push(Card::new(format!("ur{i}"), Rarity::UltraRare));
    }
    cards
}

/// Four rates in basis points that sum to 100%.
fn rate_split() -> impl Strategy<Value = [u32; 4]> {
    prop::array::uniform3(0..=RATE_SCALE_BP).prop_map(|mut cuts| {
        cuts.sort_unstable();
        [
            cuts[0],
            cuts[1] - cuts[0],
            cuts[2] - cuts[1],
            RATE_SCALE_BP - cuts[2],
        ]
    })
}

proptest! {
    #[test]
    fn rate_tables_cover_every_draw(rates in rate_split(), draw in 0..RATE_SCALE_BP) {
        let config = GachaConfig {
            tiers: vec![
                TierConfig::new(Rarity::UltraRare, rates[0], 15),
                TierConfig::new(Rarity::SuperRare, rates[1], 5),
                TierConfig::new(Rarity::Rare, rates[2], 1),
                TierConfig::new(Rarity::Common, rates[3], 0),
            ],
            ..GachaConfig::default()
        };

        prop_assert!(config.validate().is_ok());
        prop_assert_eq!(config.total_rate_bp(), u64::from(RATE_SCALE_BP));
        prop_assert!(config.tier_for_draw(draw).is_some());
    }

    #[test]
    fn pity_trigger_always_yields_top_tier(
        seed in any::<u64>(),
        pity in 199u32..5_000,
        commons in 0usize..6,
        rares in 0usize..6,
        ultras in 1usize..4,
    ) {
        let config = GachaConfig::default();
        let cards = pool(commons, rares, ultras);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let drawn = roll(&cards, pity, &config, &mut rng).unwrap();

        prop_assert_eq!(drawn.card.rarity, Rarity::UltraRare);
        prop_assert!(drawn.pity_consumed);
    }

    #[test]
    fn pity_counter_stays_below_threshold(
        seed in any::<u64>(),
        threshold in 1u32..40,
        ultras in 0usize..2,
        pulls in prop::collection::vec(prop::bool::ANY, 1..12),
    ) {
        let config = GachaConfig { pity_threshold: threshold, ..GachaConfig::default() };
        let cards = pool(3, 2, ultras);
        let service = GachaService::with_config(config, MemoryStore::new()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let mut balance = u64::MAX / 2;
        for ten in pulls {
            let count = if ten { PullCount::Ten } else { PullCount::Single };
            let before = service.inventory("p").unwrap().pity(1);
            prop_assert!(before < threshold);

            let outcome = service.pull("p", 1, &cards, count, balance, &mut rng).unwrap();
            balance = outcome.new_balance;

            prop_assert!(outcome.pity < threshold);
            if ultras > 0 && before + count.rolls() >= threshold {
                prop_assert!(outcome.results.iter().any(|r| r.rarity == Rarity::UltraRare));
            }
        }
    }

    #[test]
    fn claims_are_idempotent(picks in prop::collection::vec((1u32..3, 0usize..4), 1..20)) {
        let service = GachaService::new(MemoryStore::new());
        let images = ["a.png", "b.png", "c.png", "d.png"];

        for (collection, image) in &picks {
            let reward = RewardCandidate::new(images[*image], "", 1001);
            service.claim("c", *collection, &reward).unwrap();
        }

        let ledger = service.inventory("c").unwrap();
        let mut pairs: Vec<(u32, &str)> = ledger
            .rewards()
            .iter()
            .map(|r| (r.collection_id, r.image.as_str()))
            .collect();
        let claimed = pairs.len();
        pairs.sort_unstable();
        pairs.dedup();
        prop_assert_eq!(pairs.len(), claimed);

        let mut expected: Vec<(u32, &str)> = picks.iter().map(|(c, i)| (*c, images[*i])).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(claimed, expected.len());
    }

    #[test]
    fn exchange_never_overdraws(shards in 0u64..400, owned in any::<bool>()) {
        let mut ledger = Ledger::new().with_shards(shards);
        if owned {
            ledger = ledger.with_card(1, "ur1", 1);
        }
        let store = MemoryStore::new().with_user("x", ledger.clone(), 0);
        let service = GachaService::new(store);
        let cost = service.config().exchange_cost;

        match service.exchange("x", 1, "ur1") {
            Ok(outcome) => {
                prop_assert!(!owned);
                prop_assert!(shards >= cost);
                prop_assert_eq!(outcome.shards, shards - cost);
            }
            Err(_) => {
                prop_assert!(owned || shards < cost);
                let after = service.inventory("x").unwrap();
                prop_assert_eq!(
                    serde_json::to_vec(&after).unwrap(),
                    serde_json::to_vec(&ledger).unwrap()
                );
            }
        }
    }
}
