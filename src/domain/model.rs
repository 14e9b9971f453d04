use crate::utils::error::{GroupError, Result};
use chrono::{DateTime, Datelike, Local, Month, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Label of a flat, e.g. `101`. Trimmed and never empty once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatNumber(String);

impl FlatNumber {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(GroupError::validation("Flat number is required"));
        }
        if trimmed.chars().any(|c| c.is_control() || c == ',') {
            return Err(GroupError::validation(format!(
                "Flat number '{}' contains invalid characters",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn leading_number(&self) -> Option<u64> {
        let digits: String = self.0.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    /// Orders `9` before `10`; labels without a leading number sort last.
    pub fn numeric_cmp(&self, other: &Self) -> Ordering {
        match (self.leading_number(), other.leading_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl FromStr for FlatNumber {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FlatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl Borrow<str> for FlatNumber {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FlatNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flat {
    pub flat_number: FlatNumber,
    #[serde(default)]
    pub connected_flats: Vec<FlatNumber>,
    #[serde(default)]
    pub version: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Flat {
    pub fn new(flat_number: FlatNumber, connected_flats: Vec<FlatNumber>) -> Self {
        Self {
            flat_number,
            connected_flats,
            version: 0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMode {
    Cash,
    #[default]
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    Cheque,
    Online,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 5] = [
        PaymentMode::Cash,
        PaymentMode::Upi,
        PaymentMode::BankTransfer,
        PaymentMode::Cheque,
        PaymentMode::Online,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Upi => "UPI",
            PaymentMode::BankTransfer => "Bank Transfer",
            PaymentMode::Cheque => "Cheque",
            PaymentMode::Online => "Online",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for PaymentMode {
    type Err = GroupError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace() && *c != '-' && *c != '_').collect();
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.label().replace(' ', "").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                GroupError::validation(format!(
                    "Unknown payment mode '{}'. Valid modes: {}",
                    s,
                    PaymentMode::ALL.map(|m| m.label()).join(", ")
                ))
            })
    }
}

/// A month of a year for which maintenance is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    #[serde(with = "month_name")]
    pub month: Month,
    pub year: i32,
}

impl BillingPeriod {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    pub fn parse(month: &str, year: i32) -> Result<Self> {
        let month = parse_month(month)?;
        Ok(Self { month, year })
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn containing(date: NaiveDate) -> Self {
        let month = Month::try_from(date.month() as u8).unwrap_or(Month::January);
        Self {
            month,
            year: date.year(),
        }
    }

    pub fn month_name(&self) -> &'static str {
        self.month.name()
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}

impl PartialOrd for BillingPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BillingPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.month.number_from_month().cmp(&other.month.number_from_month()))
    }
}

pub fn parse_month(raw: &str) -> Result<Month> {
    raw.trim()
        .parse::<Month>()
        .map_err(|_| GroupError::validation(format!("Unknown month '{}'", raw)))
}

mod month_name {
    use chrono::Month;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(month.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Month, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse::<Month>()
            .map_err(|_| serde::de::Error::custom(format!("unknown month '{}'", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub flat_number: FlatNumber,
    pub month: String,
    pub year: i32,
    pub amount: u32,
    pub paid_on: NaiveDate,
    pub payment_mode: PaymentMode,
}

impl Payment {
    pub fn new(
        flat_number: FlatNumber,
        period: BillingPeriod,
        amount: u32,
        payment_mode: PaymentMode,
        paid_on: NaiveDate,
    ) -> Result<Self> {
        if amount == 0 {
            return Err(GroupError::validation("Payment amount must be positive"));
        }
        Ok(Self {
            flat_number,
            month: period.month_name().to_string(),
            year: period.year,
            amount,
            paid_on,
            payment_mode,
        })
    }

    /// `None` when the stored month name is not a real month.
    pub fn period(&self) -> Option<BillingPeriod> {
        parse_month(&self.month)
            .ok()
            .map(|month| BillingPeriod::new(month, self.year))
    }

    pub fn covers(&self, flat: &str, period: &BillingPeriod) -> bool {
        self.flat_number.as_str() == flat
            && self.year == period.year
            && self.period().is_some_and(|p| p.month == period.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupingMode {
    #[default]
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "sequential")]
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupStats {
    pub total: usize,
    pub paid: usize,
    pub due: usize,
}

/// What `seed` put into an empty store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub flats: usize,
    pub payments: usize,
}

/// What the flat details page shows for one flat's group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub flat: FlatNumber,
    pub period: BillingPeriod,
    pub members: Vec<FlatNumber>,
    pub connected: Vec<FlatNumber>,
    pub stats: GroupStats,
    pub total_paid: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub index: usize,
    pub members: Vec<FlatNumber>,
    pub stats: GroupStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatStatus {
    pub flat_number: FlatNumber,
    pub connected_flats: Vec<FlatNumber>,
    pub group: usize,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub period: BillingPeriod,
    pub summary: GroupStats,
    pub groups: Vec<GroupSummary>,
    pub flats: Vec<FlatStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_number_is_trimmed_and_required() {
        assert_eq!(FlatNumber::parse("  101 ").unwrap().as_str(), "101");
        assert!(FlatNumber::parse("   ").is_err());
        assert!(FlatNumber::parse("101,102").is_err());
    }

    #[test]
    fn test_numeric_cmp_orders_by_leading_number() {
        let mut flats: Vec<FlatNumber> = ["1001", "B2", "99", "101", "101A"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        flats.sort_by(|a, b| a.numeric_cmp(b));
        let labels: Vec<&str> = flats.iter().map(|f| f.as_str()).collect();
        assert_eq!(labels, vec!["99", "101", "101A", "1001", "B2"]);
    }

    #[test]
    fn test_payment_mode_parsing() {
        assert_eq!("upi".parse::<PaymentMode>().unwrap(), PaymentMode::Upi);
        assert_eq!(
            "bank transfer".parse::<PaymentMode>().unwrap(),
            PaymentMode::BankTransfer
        );
        assert_eq!(
            "BankTransfer".parse::<PaymentMode>().unwrap(),
            PaymentMode::BankTransfer
        );
        assert!("barter".parse::<PaymentMode>().is_err());
    }

    #[test]
    fn test_payment_serializes_like_the_document_store() {
        let payment = Payment::new(
            "101".parse().unwrap(),
            BillingPeriod::parse("january", 2024).unwrap(),
            1500,
            PaymentMode::BankTransfer,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        )
        .unwrap();

        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["flatNumber"], "101");
        assert_eq!(json["month"], "January");
        assert_eq!(json["paymentMode"], "Bank Transfer");
        assert_eq!(json["paidOn"], "2024-01-10");
    }

    #[test]
    fn test_payment_covers_only_its_period() {
        let period = BillingPeriod::parse("February", 2024).unwrap();
        let payment = Payment::new(
            "101".parse().unwrap(),
            period,
            1500,
            PaymentMode::Cash,
            NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
        )
        .unwrap();

        assert!(payment.covers("101", &period));
        assert!(!payment.covers("102", &period));
        assert!(!payment.covers("101", &BillingPeriod::parse("March", 2024).unwrap()));
        assert!(!payment.covers("101", &BillingPeriod::parse("February", 2023).unwrap()));
    }

    #[test]
    fn test_zero_amount_is_rejected() {
        let result = Payment::new(
            "101".parse().unwrap(),
            BillingPeriod::parse("May", 2024).unwrap(),
            0,
            PaymentMode::Cash,
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        );
        assert!(matches!(result, Err(GroupError::Validation { .. })));
    }

    #[test]
    fn test_billing_period_ordering_and_display() {
        let jan = BillingPeriod::parse("Jan", 2024).unwrap();
        let dec = BillingPeriod::parse("December", 2023).unwrap();
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "January 2024");
        assert_eq!(
            BillingPeriod::containing(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()),
            BillingPeriod::new(Month::July, 2024)
        );
    }
}
