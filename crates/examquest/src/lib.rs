//! # ExamQuest
//!
//! Application wiring for the gacha engine in [`examquest_gacha`]:
//!
//! - [`JsonFileStore`]: per-user JSON documents implementing `LedgerStore`
//! - [`Catalog`]: collections, card pools and completion rewards
//! - `gacha_sim`: a command-line pull simulator over both
//!
//! ```rust,ignore
//! let catalog = Catalog::from_json_file("data/catalog.json")?;
//! let store = JsonFileStore::open("data/users")?;
//! let service = GachaService::new(&store);
//!
//! let scope = catalog.collection(5)?;
//! let balance = store.balance("minh")?;
//! let outcome = service.pull("minh", scope.id, scope.pool(), PullCount::Ten, balance, &mut rng)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod error;
pub mod json_store;

pub use catalog::{Catalog, Collection};
pub use error::{AppError, AppResult};
pub use json_store::{JsonFileStore, UserDocument};
