use crate::adapters::document::Document;
use crate::domain::model::{BillingPeriod, Flat, FlatNumber, Payment};
use crate::domain::ports::{ChangeSet, FlatStore, PaymentStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Store kept entirely in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    document: Arc<RwLock<Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(document: Document) -> Self {
        Self {
            document: Arc::new(RwLock::new(document.sorted())),
        }
    }

    pub async fn snapshot(&self) -> Document {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl FlatStore for InMemoryStore {
    async fn list_flats(&self) -> Result<Vec<Flat>> {
        Ok(self.document.read().await.flats.clone())
    }

    async fn find_flat(&self, flat_number: &FlatNumber) -> Result<Option<Flat>> {
        Ok(self
            .document
            .read()
            .await
            .find_flat(flat_number.as_str())
            .cloned())
    }

    async fn apply(&self, changes: ChangeSet) -> Result<Vec<Flat>> {
        let mut document = self.document.write().await;
        document.apply(changes)
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn list_payments(&self) -> Result<Vec<Payment>> {
        Ok(self.document.read().await.payments.clone())
    }

    async fn insert_payment(&self, payment: Payment) -> Result<Payment> {
        let mut document = self.document.write().await;
        document.insert_payment(payment)
    }

    async fn delete_payment(
        &self,
        flat_number: &FlatNumber,
        period: &BillingPeriod,
    ) -> Result<Payment> {
        let mut document = self.document.write().await;
        document.delete_payment(flat_number, period)
    }
}
