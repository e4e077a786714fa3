//! # Gacha Simulator
//!
//! Runs real pulls for one user against a catalog collection, persisting to
//! the JSON document store, and optionally a large offline simulation of the
//! same pool.
//!
//! ## Usage
//!
//! ```bash
//! gacha_sim --catalog data/catalog.json --collection 5 --user minh --ten --pulls 3
//! gacha_sim --collection 5 --simulate 1000000 --seed 42
//! RUST_LOG=debug gacha_sim --balance 1000 --pulls 20
//! ```

use examquest::{AppError, AppResult, Catalog, Collection, JsonFileStore};
use examquest_gacha::{
    simulate, ClaimStatus, GachaConfig, GachaError, GachaService, PullCount, PullOutcome, Rarity,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

struct Args {
    config: Option<PathBuf>,
    catalog: PathBuf,
    collection: Option<u32>,
    user: String,
    data: PathBuf,
    pulls: u32,
    ten: bool,
    seed: Option<u64>,
    balance: Option<u64>,
    simulate: u64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: None,
            catalog: PathBuf::from("data/catalog.json"),
            collection: None,
            user: "demo".to_string(),
            data: PathBuf::from("data/users"),
            pulls: 1,
            ten: false,
            seed: None,
            balance: None,
            simulate: 0,
        }
    }
}

fn print_usage() {
    println!("Usage: gacha_sim [OPTIONS]");
    println!();
    println!("Options:");
    println!("      --config <FILE>        Gacha balance TOML (default: built-in values)");
    println!("      --catalog <FILE>       Card catalog JSON (default: data/catalog.json)");
    println!("  -c, --collection <ID>      Collection to pull from (default: first in catalog)");
    println!("  -u, --user <ID>            User document to pull for (default: demo)");
    println!("  -d, --data <DIR>           User document directory (default: data/users)");
    println!("  -n, --pulls <N>            Number of pulls to buy (default: 1)");
    println!("      --ten                  Buy ten-pulls instead of single pulls");
    println!("  -s, --seed <SEED>          RNG seed (default: clock)");
    println!("  -b, --balance <COINS>      Set the user's coin balance first");
    println!("      --simulate <ROLLS>     Also run an offline simulation of N rolls");
    println!("  -h, --help                 Show this help");
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> AppResult<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| AppError::InvalidArgument(format!("{flag} needs a value")))
}

fn number<T: std::str::FromStr>(raw: &str, flag: &str) -> AppResult<T> {
    raw.parse()
        .map_err(|_| AppError::InvalidArgument(format!("{flag}: '{raw}' is not a number")))
}

/// Parses the command line. `Ok(None)` means help was printed.
fn parse_args(args: &[String]) -> AppResult<Option<Args>> {
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => {
                parsed.config = Some(PathBuf::from(value(args, i, flag)?));
                i += 1;
            }
            "--catalog" => {
                parsed.catalog = PathBuf::from(value(args, i, flag)?);
                i += 1;
            }
            "--collection" | "-c" => {
                parsed.collection = Some(number(value(args, i, flag)?, flag)?);
                i += 1;
            }
            "--user" | "-u" => {
                parsed.user = value(args, i, flag)?.to_string();
                i += 1;
            }
            "--data" | "-d" => {
                parsed.data = PathBuf::from(value(args, i, flag)?);
                i += 1;
            }
            "--pulls" | "-n" => {
                parsed.pulls = number(value(args, i, flag)?, flag)?;
                i += 1;
            }
            "--ten" => parsed.ten = true,
            "--seed" | "-s" => {
                parsed.seed = Some(number(value(args, i, flag)?, flag)?);
                i += 1;
            }
            "--balance" | "-b" => {
                parsed.balance = Some(number(value(args, i, flag)?, flag)?);
                i += 1;
            }
            "--simulate" => {
                parsed.simulate = number(value(args, i, flag)?, flag)?;
                i += 1;
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            other => {
                return Err(AppError::InvalidArgument(format!("unknown option {other}")));
            }
        }
        i += 1;
    }

    Ok(Some(parsed))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() ^ u64::from(d.subsec_nanos()))
}

fn print_pull(index: u32, outcome: &PullOutcome) {
    println!("┌─ PULL {index} ──────────────────────────────────────────────────────");
    for result in &outcome.results {
        let mut notes = Vec::new();
        if result.is_new {
            notes.push("NEW".to_string());
        }
        if result.shards_gained > 0 {
            notes.push(format!("+{} shards", result.shards_gained));
        }
        if result.forced_by_pity {
            notes.push("pity".to_string());
        }
        println!("│ {:<3} {:<24} {}", result.rarity, result.card_id, notes.join(", "));
    }
    println!(
        "│ coins: {}  shards: {}  pity: {}  total pulls: {}",
        outcome.new_balance, outcome.shards, outcome.pity, outcome.total_pulls
    );
    println!("└──────────────────────────────────────────────────────────────────");
}

fn print_simulation(collection: &Collection, rolls: u64, config: &GachaConfig, seed: u64) -> AppResult<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let stats = simulate(collection.pool(), rolls, config, &mut rng)?;

    println!("┌─ SIMULATION ({rolls} rolls) ──────────────────────────────────────");
    for rarity in Rarity::ALL.iter().rev() {
        let configured = config.tier(*rarity).map_or(0.0, |t| f64::from(t.rate_bp) / 100.0);
        println!(
            "│ {:<3} {:>10}  {:>7.3}%  (table {:.2}%)",
            rarity,
            stats.rarity_counts.get(rarity).copied().unwrap_or(0),
            stats.rate_percent(*rarity),
            configured
        );
    }
    println!("│ Forced by pity:     {}", stats.forced_by_pity);
    println!("│ Longest drought:    {}", stats.longest_drought);
    println!("│ Distinct cards:     {} / {}", stats.distinct_cards, collection.pool().len());
    match stats.completed_at {
        Some(roll) => println!("│ Completed at roll:  {roll}"),
        None => println!("│ Completed at roll:  never"),
    }
    println!("└──────────────────────────────────────────────────────────────────");
    println!();
    Ok(())
}

fn run() -> AppResult<()> {
    let raw: Vec<String> = std::env::args().collect();
    let Some(args) = parse_args(&raw)? else {
        return Ok(());
    };

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         EXAMQUEST GACHA SIMULATOR                                ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let config = match &args.config {
        Some(path) => GachaConfig::from_toml_file(path)?,
        None => GachaConfig::default(),
    };
    let catalog = Catalog::from_json_file(&args.catalog)?;
    let collection = match args.collection {
        Some(id) => catalog.collection(id)?,
        None => catalog
            .collections
            .first()
            .ok_or_else(|| AppError::InvalidCatalog("catalog has no collections".to_string()))?,
    };
    let seed = args.seed.unwrap_or_else(clock_seed);
    let count = if args.ten { PullCount::Ten } else { PullCount::Single };

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Collection:         {} ({})", collection.id, collection.name);
    println!("│ Pool size:          {}", collection.pool().len());
    println!("│ User:               {}", args.user);
    println!("│ Pulls:              {} x {}", args.pulls, count.rolls());
    println!("│ Cost per roll:      {}", config.cost_per_roll);
    println!("│ Pity threshold:     {}", config.pity_threshold);
    println!("│ Seed:               {seed}");
    println!("└──────────────────────────────────────────────────────────────────┘");
    println!();

    if args.simulate > 0 {
        print_simulation(collection, args.simulate, &config, seed)?;
    }

    let store = JsonFileStore::open(&args.data)?;
    if let Some(balance) = args.balance {
        store.set_balance(&args.user, balance)?;
    }
    let service = GachaService::with_config(config, &store)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for index in 1..=args.pulls {
        let balance = store.balance(&args.user)?;
        match service.pull(&args.user, collection.id, collection.pool(), count, balance, &mut rng) {
            Ok(outcome) => print_pull(index, &outcome),
            Err(err @ GachaError::InsufficientCurrency { .. }) => {
                println!("Stopping: {err}");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    println!();

    let ledger = service.inventory(&args.user)?;
    let progress = ledger.collection_progress(collection.id, collection.pool());
    let exchange_cost = service.config().exchange_cost;

    println!("┌─ INVENTORY ─────────────────────────────────────────────────────┐");
    println!(
        "│ Collection:         {} / {} ({}%)",
        progress.owned,
        progress.total,
        progress.percent()
    );
    for (rarity, tier) in progress.by_rarity.iter().rev() {
        println!("│   {:<3}               {} / {}", rarity, tier.owned, tier.total);
    }
    println!("│ Shards:             {} (exchange costs {exchange_cost})", ledger.shards());
    println!(
        "│ Pity:               {} ({} rolls to guaranteed {})",
        ledger.pity(collection.id),
        ledger.pulls_until_guarantee(collection.id, service.config()),
        Rarity::TOP
    );
    println!("│ Total pulls:        {}", ledger.total_pulls());
    let candidates = ledger.exchange_candidates(collection.id, collection.pool());
    if !candidates.is_empty() {
        let names: Vec<&str> = candidates.iter().map(|c| c.id()).collect();
        println!("│ Exchangeable:       {}", names.join(", "));
    }
    println!("└──────────────────────────────────────────────────────────────────┘");

    if progress.is_complete() && !collection.rewards.is_empty() {
        println!();
        let statuses = service.claim_all(&args.user, collection.id, &collection.rewards);
        for (reward, status) in collection.rewards.iter().zip(&statuses) {
            match status {
                ClaimStatus::Claimed => println!("Reward claimed: {}", reward.name),
                ClaimStatus::AlreadyClaimed => println!("Reward already owned: {}", reward.name),
                ClaimStatus::Failed(err) => println!("Reward {} failed: {err}", reward.name),
            }
        }
        let claimed = statuses.iter().filter(|s| s.is_claimed()).count();
        println!("{claimed} of {} rewards claimed this run", statuses.len());
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "gacha_sim failed");
            ExitCode::FAILURE
        }
    }
}
