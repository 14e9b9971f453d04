use crate::domain::model::{BillingPeriod, Flat, FlatNumber, Payment};
use crate::domain::ports::{ChangeSet, FlatWrite};
use crate::utils::error::{GroupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Everything a store holds. Flats are kept sorted by flat number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub flats: Vec<Flat>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl Document {
    /// Restores flat number order on data read from outside, e.g. a
    /// hand-edited store file. Lookups rely on it.
    pub fn sorted(mut self) -> Self {
        self.flats.sort_by(|a, b| a.flat_number.cmp(&b.flat_number));
        self
    }

    pub fn find_flat(&self, flat_number: &str) -> Option<&Flat> {
        self.position(flat_number).ok().map(|i| &self.flats[i])
    }

    fn position(&self, flat_number: &str) -> std::result::Result<usize, usize> {
        self.flats
            .binary_search_by(|flat| flat.flat_number.as_str().cmp(flat_number))
    }

    /// Checks the whole change set first so a rejected batch leaves the
    /// document untouched.
    pub fn apply(&mut self, changes: ChangeSet) -> Result<Vec<Flat>> {
        self.check(&changes)?;

        let mut written = Vec::with_capacity(changes.len());
        for write in changes {
            match write {
                FlatWrite::Create { mut flat } => {
                    flat.version = 0;
                    let at = self
                        .position(flat.flat_number.as_str())
                        .unwrap_or_else(|at| at);
                    self.flats.insert(at, flat.clone());
                    written.push(flat);
                }
                FlatWrite::UpdateConnections {
                    flat_number,
                    connected_flats,
                    ..
                } => {
                    let at = self
                        .position(flat_number.as_str())
                        .map_err(|_| GroupError::not_found(flat_number.as_str()))?;
                    let flat = &mut self.flats[at];
                    flat.connected_flats = connected_flats;
                    flat.version += 1;
                    written.push(flat.clone());
                }
            }
        }

        Ok(written)
    }

    fn check(&self, changes: &ChangeSet) -> Result<()> {
        let mut seen: HashSet<&FlatNumber> = HashSet::new();

        for write in changes.writes() {
            let flat_number = write.flat_number();
            if !seen.insert(flat_number) {
                return Err(GroupError::validation(format!(
                    "Flat {} is written twice in one change",
                    flat_number
                )));
            }

            match write {
                FlatWrite::Create { flat } => {
                    if self.find_flat(flat.flat_number.as_str()).is_some() {
                        return Err(GroupError::DuplicateFlat {
                            flat: flat.flat_number.to_string(),
                        });
                    }
                }
                FlatWrite::UpdateConnections {
                    flat_number,
                    expected_version,
                    ..
                } => {
                    let stored = self
                        .find_flat(flat_number.as_str())
                        .ok_or_else(|| GroupError::not_found(flat_number.as_str()))?;
                    if stored.version != *expected_version {
                        return Err(GroupError::Conflict {
                            flat: flat_number.to_string(),
                            expected: *expected_version,
                            found: stored.version,
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub fn insert_payment(&mut self, payment: Payment) -> Result<Payment> {
        let duplicate = self.payments.iter().any(|p| {
            p.flat_number == payment.flat_number
                && p.month == payment.month
                && p.year == payment.year
        });
        if duplicate {
            return Err(GroupError::DuplicatePayment {
                flat: payment.flat_number.to_string(),
                month: payment.month.clone(),
                year: payment.year,
            });
        }

        self.payments.push(payment.clone());
        Ok(payment)
    }

    pub fn delete_payment(
        &mut self,
        flat_number: &FlatNumber,
        period: &BillingPeriod,
    ) -> Result<Payment> {
        let at = self
            .payments
            .iter()
            .position(|p| p.covers(flat_number.as_str(), period))
            .ok_or_else(|| GroupError::PaymentNotFound {
                flat: flat_number.to_string(),
                month: period.month_name().to_string(),
                year: period.year,
            })?;
        Ok(self.payments.remove(at))
    }
}
