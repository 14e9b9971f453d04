pub mod adjacency;
pub mod audit;
pub mod discovery;
pub mod placement;
pub mod report;
pub mod service;
pub mod stats;

pub use crate::domain::model::{BillingPeriod, Flat, FlatNumber, GroupStats, Payment};
pub use crate::domain::ports::{ChangeSet, ConfigProvider, FlatStore, PaymentStore};
pub use crate::utils::error::Result;
