use crate::adapters::document::Document;
use crate::domain::model::{BillingPeriod, Flat, FlatNumber, Payment};
use crate::domain::ports::{ChangeSet, FlatStore, PaymentStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Store backed by one JSON file. Each change reads the file, applies the
/// change in memory and replaces the file through a rename.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => {
                let document: Document = serde_json::from_slice(&data)?;
                tracing::debug!("Loaded store from {}", self.path.display());
                Ok(document.sorted())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No store at {}, starting empty", self.path.display());
                Ok(Document::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, document: &Document) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(document)?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &data).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        tracing::debug!(
            "Wrote store ({} bytes) to {}",
            data.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl FlatStore for JsonFileStore {
    async fn list_flats(&self) -> Result<Vec<Flat>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.flats)
    }

    async fn find_flat(&self, flat_number: &FlatNumber) -> Result<Option<Flat>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.find_flat(flat_number.as_str()).cloned())
    }

    async fn apply(&self, changes: ChangeSet) -> Result<Vec<Flat>> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let written = document.apply(changes)?;
        self.save(&document).await?;
        Ok(written)
    }
}

#[async_trait]
impl PaymentStore for JsonFileStore {
    async fn list_payments(&self) -> Result<Vec<Payment>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.payments)
    }

    async fn insert_payment(&self, payment: Payment) -> Result<Payment> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let payment = document.insert_payment(payment)?;
        self.save(&document).await?;
        Ok(payment)
    }

    async fn delete_payment(
        &self,
        flat_number: &FlatNumber,
        period: &BillingPeriod,
    ) -> Result<Payment> {
        let _guard = self.lock.lock().await;
        let mut document = self.load().await?;
        let payment = document.delete_payment(flat_number, period)?;
        self.save(&document).await?;
        Ok(payment)
    }
}
