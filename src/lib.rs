pub mod ai;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod email;
pub mod lifecycle;
pub mod logging;
pub mod models;
pub mod notify;
pub mod seed;
pub mod store;
pub mod utils;
pub mod validation;
pub mod views;

pub use config::Config;
pub use lifecycle::{Planner, PlannerError};
pub use models::{Draft, DraftItem, Item, ItemCategory, ItemFields, Money, Reminder, Transaction};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use utils::Profile;
