use crate::domain::model::{BillingPeriod, Flat, FlatNumber, FlatStatus, GroupStats, Payment};
use crate::utils::error::{GroupError, Result};
use chrono::Month;
use std::str::FromStr;

/// Paid and due counts for a set of flats. `due` is always `total - paid`.
pub fn group_stats<F>(members: &[FlatNumber], has_paid: F) -> GroupStats
where
    F: Fn(&FlatNumber) -> bool,
{
    let paid = members.iter().filter(|&member| has_paid(member)).count();
    GroupStats {
        total: members.len(),
        paid,
        due: members.len() - paid,
    }
}

/// Building-wide totals for the dashboard header.
pub fn collection_summary<F>(flats: &[Flat], has_paid: F) -> GroupStats
where
    F: Fn(&FlatNumber) -> bool,
{
    let paid = flats
        .iter()
        .filter(|flat| has_paid(&flat.flat_number))
        .count();
    GroupStats {
        total: flats.len(),
        paid,
        due: flats.len() - paid,
    }
}

/// Read-only view over recorded payments.
#[derive(Debug, Clone, Default)]
pub struct PaymentLedger {
    payments: Vec<Payment>,
}

impl PaymentLedger {
    pub fn new(payments: Vec<Payment>) -> Self {
        Self { payments }
    }

    pub fn has_paid(&self, flat: &str, period: &BillingPeriod) -> bool {
        self.payments.iter().any(|p| p.covers(flat, period))
    }

    pub fn paid_predicate<'a>(
        &'a self,
        period: &'a BillingPeriod,
    ) -> impl Fn(&FlatNumber) -> bool + 'a {
        move |flat| self.has_paid(flat.as_str(), period)
    }

    pub fn total_paid(&self, flat: &str) -> u64 {
        self.payments
            .iter()
            .filter(|p| p.flat_number.as_str() == flat)
            .map(|p| u64::from(p.amount))
            .sum()
    }

    /// Payments of one flat, newest billing period first.
    pub fn history(&self, flat: &str) -> Vec<&Payment> {
        let mut history: Vec<&Payment> = self
            .payments
            .iter()
            .filter(|p| p.flat_number.as_str() == flat)
            .collect();
        history.sort_by(|a, b| b.period().cmp(&a.period()).then(b.paid_on.cmp(&a.paid_on)));
        history
    }

    /// Payments matching `filter`. One flat's payments come newest period
    /// first, the full list most recently paid first.
    pub fn query(&self, filter: &PaymentFilter) -> Vec<&Payment> {
        let mut found: Vec<&Payment> = match &filter.flat_number {
            Some(flat) => self.history(flat.as_str()),
            None => {
                let mut all: Vec<&Payment> = self.payments.iter().collect();
                all.sort_by(|a, b| b.paid_on.cmp(&a.paid_on));
                all
            }
        };
        found.retain(|p| filter.matches(p));
        found
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub flat_number: Option<FlatNumber>,
    pub month: Option<Month>,
    pub year: Option<i32>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        let flat = self
            .flat_number
            .as_ref()
            .map_or(true, |flat| payment.flat_number == *flat);
        let month = self
            .month
            .map_or(true, |month| payment.month == month.name());
        let year = self.year.map_or(true, |year| payment.year == year);
        flat && month && year
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Paid,
    Due,
}

impl StatusFilter {
    pub fn matches(&self, paid: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Paid => paid,
            StatusFilter::Due => !paid,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "paid" => Ok(StatusFilter::Paid),
            "due" => Ok(StatusFilter::Due),
            other => Err(GroupError::validation(format!(
                "Unknown filter '{}'. Use all, paid or due",
                other
            ))),
        }
    }
}

/// Dashboard list filtering: payment status plus a case-insensitive search
/// on the flat number.
pub fn filter_flats(
    flats: Vec<FlatStatus>,
    filter: StatusFilter,
    search: Option<&str>,
) -> Vec<FlatStatus> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    flats
        .into_iter()
        .filter(|flat| filter.matches(flat.paid))
        .filter(|flat| match &needle {
            Some(needle) => flat.flat_number.as_str().to_lowercase().contains(needle),
            None => true,
        })
        .collect()
}
