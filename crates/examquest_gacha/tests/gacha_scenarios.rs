//! # Gacha Scenario Tests
//!
//! End-to-end pull, exchange and claim flows through `GachaService` and the
//! in-memory store.
//!
//! Run with: cargo test -p examquest_gacha --test gacha_scenarios

use examquest_gacha::claim::codes;
use examquest_gacha::{
    Card, GachaError, GachaService, Ledger, LedgerStore, MemoryStore, PullCount, Rarity,
    RewardCandidate, PITY_THRESHOLD,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

// ============================================================================
// PITY
// ============================================================================

#[test]
fn pity_at_threshold_forces_ultra_rare() {
    assert_eq!(PITY_THRESHOLD, 200);

    let pool = vec![Card::new("n1", Rarity::Common), Card::new("ur1", Rarity::UltraRare)];
    let store = MemoryStore::new().with_user("u1", Ledger::new().with_pity(5, 199), 1_000);
    let service = GachaService::new(store);

    let outcome = service
        .pull("u1", 5, &pool, PullCount::Single, 1_000, &mut rng(31))
        .unwrap();

    assert_eq!(outcome.results[0].card_id, "ur1");
    assert_eq!(outcome.results[0].rarity, Rarity::UltraRare);
    assert!(outcome.results[0].forced_by_pity);
    assert_eq!(outcome.pity, 0);
    assert_eq!(service.inventory("u1").unwrap().pity(5), 0);
}

#[test]
fn pity_is_tracked_per_collection() {
    let pool = vec![Card::new("n1", Rarity::Common), Card::new("ur1", Rarity::UltraRare)];
    let ledger = Ledger::new().with_pity(5, 199).with_pity(6, 10);
    let service = GachaService::new(MemoryStore::new().with_user("u1", ledger, 1_000));

    let outcome = service
        .pull("u1", 6, &pool, PullCount::Single, 1_000, &mut rng(8))
        .unwrap();

    let ledger = service.inventory("u1").unwrap();
    assert_eq!(ledger.pity(5), 199, "other collection untouched");
    assert_eq!(ledger.pity(6), outcome.pity);
}

// ============================================================================
// DUPLICATES
// ============================================================================

#[test]
fn duplicate_rare_grants_one_shard() {
    let pool = vec![Card::new("r1", Rarity::Rare)];
    let ledger = Ledger::new().with_card(3, "r1", 1);
    let service = GachaService::new(MemoryStore::new().with_user("u2", ledger, 10));
    assert_eq!(service.config().duplicate_shards(Rarity::Rare), 1);

    let outcome = service
        .pull("u2", 3, &pool, PullCount::Single, 10, &mut rng(4))
        .unwrap();

    let result = &outcome.results[0];
    assert_eq!(result.card_id, "r1");
    assert!(!result.is_new);
    assert_eq!(result.shards_gained, 1);
    assert_eq!(outcome.shards, 1);

    let ledger = service.inventory("u2").unwrap();
    assert_eq!(ledger.shards(), 1);
    assert_eq!(ledger.owned_count(3, "r1"), 2);
}

#[test]
fn zero_count_entry_counts_as_owned_everywhere() {
    let ledger: Ledger =
        serde_json::from_str(r#"{"cards": {"1": {"r1": 0}}, "shards": 200}"#).unwrap();
    let service = GachaService::new(MemoryStore::new().with_user("v", ledger, 10));

    let exchange = service.exchange("v", 1, "r1");
    assert!(matches!(exchange, Err(GachaError::AlreadyOwned { collection: 1, .. })));
    assert_eq!(service.store().writes(), 0);

    let pool = vec![Card::new("r1", Rarity::Rare)];
    let outcome = service
        .pull("v", 1, &pool, PullCount::Single, 10, &mut rng(6))
        .unwrap();
    assert!(!outcome.results[0].is_new);
    assert_eq!(outcome.results[0].shards_gained, 1);
    assert_eq!(service.inventory("v").unwrap().owned_count(1, "r1"), 2);
}

// ============================================================================
// EXCHANGE
// ============================================================================

#[test]
fn exchange_without_enough_shards_changes_nothing() {
    let ledger = Ledger::new().with_shards(100).with_card(1, "n1", 2);
    let service = GachaService::new(MemoryStore::new().with_user("u3", ledger, 40));
    let before = serde_json::to_vec(&service.inventory("u3").unwrap()).unwrap();

    let result = service.exchange("u3", 1, "ur9");

    assert_eq!(
        result,
        Err(GachaError::InsufficientShards {
            required: 145,
            available: 100
        })
    );
    let after = serde_json::to_vec(&service.inventory("u3").unwrap()).unwrap();
    assert_eq!(before, after);
    assert_eq!(service.store().writes(), 0);
}

#[test]
fn exchange_after_saving_up_shards() {
    let pool = vec![
        Card::new("n1", Rarity::Common),
        Card::new("ur1", Rarity::UltraRare),
        Card::new("ur2", Rarity::UltraRare),
    ];
    let ledger = Ledger::new().with_shards(145).with_card(9, "ur1", 1);
    let service = GachaService::new(MemoryStore::new().with_user("u4", ledger, 0));

    let candidates: Vec<String> = service
        .inventory("u4")
        .unwrap()
        .exchange_candidates(9, &pool)
        .iter()
        .map(|c| c.card_img.clone())
        .collect();
    assert_eq!(candidates, vec!["ur2".to_string()]);

    let outcome = service.exchange("u4", 9, "ur2").unwrap();
    assert_eq!(outcome.shards, 0);

    let again = service.exchange("u4", 9, "ur2");
    assert!(matches!(again, Err(GachaError::AlreadyOwned { .. })));
}

// ============================================================================
// PULL ACCOUNTING
// ============================================================================

#[test]
fn ten_pull_with_exact_balance() {
    let pool = vec![
        Card::new("n1", Rarity::Common),
        Card::new("r1", Rarity::Rare),
        Card::new("sr1", Rarity::SuperRare),
        Card::new("ur1", Rarity::UltraRare),
    ];
    let service = GachaService::new(MemoryStore::new());

    service
        .pull("u5", 2, &pool, PullCount::Single, 10, &mut rng(1))
        .unwrap();
    let before = service.inventory("u5").unwrap().total_pulls();

    let outcome = service
        .pull("u5", 2, &pool, PullCount::Ten, 100, &mut rng(2))
        .unwrap();

    assert_eq!(outcome.new_balance, 0);
    assert_eq!(outcome.results.len(), 10);
    assert_eq!(outcome.total_pulls, before + 10);
    assert_eq!(service.store().balance("u5"), Some(0));
}

#[test]
fn total_pulls_sum_across_collections() {
    let pool = vec![Card::new("n1", Rarity::Common), Card::new("ur1", Rarity::UltraRare)];
    let service = GachaService::new(MemoryStore::new());
    let mut r = rng(12);

    let mut balance = 1_000;
    for (collection, count) in [(1, PullCount::Ten), (2, PullCount::Single), (1, PullCount::Ten)] {
        balance = service
            .pull("u6", collection, &pool, count, balance, &mut r)
            .unwrap()
            .new_balance;
    }

    let ledger = service.inventory("u6").unwrap();
    assert_eq!(ledger.total_pulls(), 21);
    assert_eq!(balance, 1_000 - 210);

    let owned: u32 = ledger.collections().map(|c| ledger.cards(c).unwrap().values().sum::<u32>()).sum();
    assert_eq!(owned, 21);
}

#[test]
fn empty_pool_is_rejected_before_writing() {
    let service = GachaService::new(MemoryStore::new());
    let result = service.pull("u7", 1, &[], PullCount::Single, 10, &mut rng(0));
    assert_eq!(result, Err(GachaError::EmptyPool));
    assert_eq!(service.store().writes(), 0);
}

// ============================================================================
// CLAIMS
// ============================================================================

#[test]
fn claiming_twice_records_once() {
    let service = GachaService::new(MemoryStore::new());
    let badge = RewardCandidate::new("pmp_master.png", "PMP Master", codes::BADGE);

    assert_eq!(service.claim("u8", 4, &badge), Ok(true));
    assert_eq!(service.claim("u8", 4, &badge), Ok(false));

    let ledger = service.inventory("u8").unwrap();
    assert_eq!(ledger.rewards().len(), 1);
    assert!(ledger.has_reward(4, "pmp_master.png"));
    assert_eq!(service.store().writes(), 1);
}

#[test]
fn store_can_be_shared_by_reference() {
    let store = MemoryStore::new();
    let service = GachaService::new(&store);
    service
        .claim("u9", 1, &RewardCandidate::new("a.png", "A", codes::AVATAR))
        .unwrap();

    assert!(store.load("u9").unwrap().is_some());
}
