pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryStore, JsonFileStore};
pub use config::AppConfig;
pub use core::{
    discovery::find_group, service::GroupService, stats::group_stats, stats::StatusFilter,
};
pub use domain::model::{BillingPeriod, Flat, FlatNumber, GroupStats, Payment, PaymentMode};
pub use utils::error::{GroupError, Result};
