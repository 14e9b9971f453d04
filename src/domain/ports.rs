use crate::domain::model::{BillingPeriod, Flat, FlatNumber, GroupingMode, Payment};
use crate::utils::error::{GroupError, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlatWrite {
    Create {
        flat: Flat,
    },
    UpdateConnections {
        flat_number: FlatNumber,
        connected_flats: Vec<FlatNumber>,
        expected_version: u64,
    },
}

impl FlatWrite {
    pub fn flat_number(&self) -> &FlatNumber {
        match self {
            FlatWrite::Create { flat } => &flat.flat_number,
            FlatWrite::UpdateConnections { flat_number, .. } => flat_number,
        }
    }
}

/// Writes that a [`FlatStore`] applies all together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    writes: Vec<FlatWrite>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(mut self, flat: Flat) -> Self {
        self.writes.push(FlatWrite::Create { flat });
        self
    }

    pub fn update(
        mut self,
        flat_number: FlatNumber,
        connected_flats: Vec<FlatNumber>,
        expected_version: u64,
    ) -> Self {
        self.writes.push(FlatWrite::UpdateConnections {
            flat_number,
            connected_flats,
            expected_version,
        });
        self
    }

    pub fn writes(&self) -> &[FlatWrite] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

impl IntoIterator for ChangeSet {
    type Item = FlatWrite;
    type IntoIter = std::vec::IntoIter<FlatWrite>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}

#[async_trait]
pub trait FlatStore: Send + Sync {
    /// All flats in ascending flat number order.
    async fn list_flats(&self) -> Result<Vec<Flat>>;

    async fn find_flat(&self, flat_number: &FlatNumber) -> Result<Option<Flat>>;

    /// Validates every write against the stored versions, then applies them.
    /// On error nothing has been written. Returns the flats as stored.
    async fn apply(&self, changes: ChangeSet) -> Result<Vec<Flat>>;

    async fn create_flat(&self, flat: Flat) -> Result<Flat> {
        let flat_number = flat.flat_number.clone();
        self.apply(ChangeSet::new().create(flat))
            .await?
            .pop()
            .ok_or_else(|| GroupError::not_found(flat_number.as_str()))
    }

    async fn update_connections(
        &self,
        flat_number: &FlatNumber,
        connected_flats: Vec<FlatNumber>,
        expected_version: u64,
    ) -> Result<Flat> {
        self.apply(ChangeSet::new().update(
            flat_number.clone(),
            connected_flats,
            expected_version,
        ))
        .await?
        .pop()
        .ok_or_else(|| GroupError::not_found(flat_number.as_str()))
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn list_payments(&self) -> Result<Vec<Payment>>;

    /// Rejects a second payment for the same flat, month and year.
    async fn insert_payment(&self, payment: Payment) -> Result<Payment>;

    /// Removes the payment of one flat for one period and returns it.
    async fn delete_payment(
        &self,
        flat_number: &FlatNumber,
        period: &BillingPeriod,
    ) -> Result<Payment>;
}

pub trait ConfigProvider: Send + Sync {
    fn store_path(&self) -> &str;
    fn group_target_size(&self) -> usize;
    fn grouping_mode(&self) -> GroupingMode;
    fn default_amount(&self) -> u32;
}
