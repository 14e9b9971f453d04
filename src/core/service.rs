use crate::core::adjacency::AdjacencyModel;
use crate::core::audit::{audit, AdjacencyIssue};
use crate::core::discovery::{find_group, partition, sequential_groups};
use crate::core::placement::{place_new_flat, Placement, DEFAULT_TARGET_SIZE};
use crate::core::stats::{
    collection_summary, filter_flats, group_stats, PaymentFilter, PaymentLedger, StatusFilter,
};
use crate::domain::model::{
    BillingPeriod, Flat, FlatNumber, FlatStatus, GroupSummary, GroupView, GroupingMode, Overview,
    Payment, PaymentMode, SeedSummary,
};
use crate::domain::ports::{ChangeSet, ConfigProvider, FlatStore, PaymentStore};
use crate::utils::error::{GroupError, Result};
use chrono::NaiveDate;

const SAMPLE_FLATS: [&str; 8] = ["101", "102", "103", "201", "202", "203", "301", "302"];

/// Flat grouping operations on top of a store.
pub struct GroupService<S> {
    store: S,
    target_size: usize,
    grouping_mode: GroupingMode,
    default_amount: u32,
}

impl<S> GroupService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            target_size: DEFAULT_TARGET_SIZE,
            grouping_mode: GroupingMode::default(),
            default_amount: 1500,
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self {
            store,
            target_size: config.group_target_size(),
            grouping_mode: config.grouping_mode(),
            default_amount: config.default_amount(),
        }
    }

    pub fn with_target_size(mut self, target_size: usize) -> Self {
        self.target_size = target_size;
        self
    }

    pub fn with_grouping_mode(mut self, grouping_mode: GroupingMode) -> Self {
        self.grouping_mode = grouping_mode;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }

    pub fn default_amount(&self) -> u32 {
        self.default_amount
    }
}

impl<S: FlatStore> GroupService<S> {
    async fn snapshot(&self) -> Result<(Vec<Flat>, AdjacencyModel)> {
        let flats = self.store.list_flats().await?;
        let model = AdjacencyModel::from_flats(&flats);
        tracing::debug!("Loaded {} flats", flats.len());
        Ok((flats, model))
    }

    async fn require_flat(&self, flat_number: &FlatNumber) -> Result<Flat> {
        self.store
            .find_flat(flat_number)
            .await?
            .ok_or_else(|| GroupError::not_found(flat_number.as_str()))
    }

    pub async fn list_flats(&self) -> Result<Vec<Flat>> {
        self.store.list_flats().await
    }

    /// Creates a flat and joins it to the first group with room, writing the
    /// new flat and every joined member in one change.
    pub async fn create_flat(&self, flat_number: &str) -> Result<Flat> {
        let flat_number = FlatNumber::parse(flat_number)?;
        let (flats, mut model) = self.snapshot().await?;

        if model.contains(flat_number.as_str()) {
            tracing::warn!("Rejected duplicate flat {}", flat_number);
            return Err(GroupError::DuplicateFlat {
                flat: flat_number.to_string(),
            });
        }

        let placement = place_new_flat(&mut model, &flat_number, self.target_size);
        let changes = placement_changes(&flats, &model, &placement);
        let written = self.store.apply(changes).await?;

        if placement.is_alone() {
            tracing::info!("Created flat {} in a new group", flat_number);
        } else {
            tracing::info!(
                "Created flat {} and joined it to {}",
                flat_number,
                join_labels(&placement.joined)
            );
        }

        written
            .into_iter()
            .find(|flat| flat.flat_number == flat_number)
            .ok_or_else(|| GroupError::not_found(flat_number.as_str()))
    }

    /// Links `source` to every target in both directions. Nothing is written
    /// unless all flats exist.
    pub async fn connect_flats(&self, source: &str, targets: &[String]) -> Result<Vec<Flat>> {
        let source = FlatNumber::parse(source)?;
        let targets = targets
            .iter()
            .map(|t| FlatNumber::parse(t))
            .collect::<Result<Vec<_>>>()?;

        if targets.is_empty() {
            return Err(GroupError::validation("At least one target flat is required"));
        }
        if targets.contains(&source) {
            return Err(GroupError::validation(format!(
                "Flat {} cannot be connected to itself",
                source
            )));
        }

        let (flats, mut model) = self.snapshot().await?;
        if let Some(missing) = std::iter::once(&source)
            .chain(targets.iter())
            .find(|flat| !model.contains(flat.as_str()))
        {
            tracing::warn!("Connect {} rejected: flat {} does not exist", source, missing);
            return Err(GroupError::not_found(missing.as_str()));
        }

        let mut touched: Vec<FlatNumber> = Vec::new();
        for target in &targets {
            if model.connect(&source, target) {
                for flat in [&source, target] {
                    if !touched.contains(flat) {
                        touched.push(flat.clone());
                    }
                }
            }
        }

        if touched.is_empty() {
            tracing::info!("Flat {} is already connected to {}", source, join_labels(&targets));
            let mut unchanged = Vec::with_capacity(targets.len() + 1);
            for flat in std::iter::once(&source).chain(targets.iter()) {
                unchanged.push(self.require_flat(flat).await?);
            }
            return Ok(unchanged);
        }

        let mut changes = ChangeSet::new();
        for flat in &touched {
            changes = changes.update(
                flat.clone(),
                model.connections_of(flat.as_str()),
                stored_version(&flats, flat),
            );
        }
        let written = self.store.apply(changes).await?;

        tracing::info!("Connected flat {} to {}", source, join_labels(&targets));
        Ok(written)
    }

    pub async fn find_group(&self, start: &str) -> Result<Vec<FlatNumber>> {
        let start = FlatNumber::parse(start)?;
        let (_, model) = self.snapshot().await?;
        Ok(find_group(&model, &start))
    }

    pub async fn audit(&self) -> Result<Vec<AdjacencyIssue>> {
        let (_, model) = self.snapshot().await?;
        let issues = audit(&model, self.target_size);
        if issues.is_empty() {
            tracing::info!("No adjacency issues in {} flats", model.flats().count());
        } else {
            tracing::warn!("Found {} adjacency issues", issues.len());
        }
        Ok(issues)
    }

    fn groups_for(&self, flats: &[Flat], model: &AdjacencyModel) -> Vec<Vec<FlatNumber>> {
        let mut order: Vec<&FlatNumber> = flats.iter().map(|f| &f.flat_number).collect();
        order.sort_by(|a, b| a.numeric_cmp(b));

        match self.grouping_mode {
            GroupingMode::Connected => partition(model, order),
            GroupingMode::Sequential => {
                let numbers: Vec<FlatNumber> = order.into_iter().cloned().collect();
                sequential_groups(&numbers, self.target_size)
            }
        }
    }
}

impl<S: FlatStore + PaymentStore> GroupService<S> {
    async fn ledger(&self) -> Result<PaymentLedger> {
        Ok(PaymentLedger::new(self.store.list_payments().await?))
    }

    /// Group of one flat with its payment status for `period`.
    pub async fn group_view(&self, flat_number: &str, period: BillingPeriod) -> Result<GroupView> {
        let flat_number = FlatNumber::parse(flat_number)?;
        self.require_flat(&flat_number).await?;

        let (_, model) = self.snapshot().await?;
        let ledger = self.ledger().await?;

        let members = find_group(&model, &flat_number);
        let stats = group_stats(&members, ledger.paid_predicate(&period));
        let connected = members
            .iter()
            .filter(|member| **member != flat_number)
            .cloned()
            .collect();

        Ok(GroupView {
            total_paid: ledger.total_paid(flat_number.as_str()),
            flat: flat_number,
            period,
            members,
            connected,
            stats,
        })
    }

    pub async fn overview(
        &self,
        period: BillingPeriod,
        filter: StatusFilter,
        search: Option<&str>,
    ) -> Result<Overview> {
        let (flats, model) = self.snapshot().await?;
        let ledger = self.ledger().await?;
        let has_paid = ledger.paid_predicate(&period);

        let summary = collection_summary(&flats, &has_paid);
        let groups: Vec<GroupSummary> = self
            .groups_for(&flats, &model)
            .into_iter()
            .enumerate()
            .map(|(i, members)| GroupSummary {
                index: i + 1,
                stats: group_stats(&members, &has_paid),
                members,
            })
            .collect();

        let statuses = flats
            .iter()
            .map(|flat| FlatStatus {
                flat_number: flat.flat_number.clone(),
                connected_flats: flat.connected_flats.clone(),
                group: groups
                    .iter()
                    .find(|g| g.members.contains(&flat.flat_number))
                    .map(|g| g.index)
                    .unwrap_or(0),
                paid: has_paid(&flat.flat_number),
            })
            .collect();

        Ok(Overview {
            period,
            summary,
            groups,
            flats: filter_flats(statuses, filter, search),
        })
    }

    pub async fn record_payment(&self, payment: Payment) -> Result<Payment> {
        self.require_flat(&payment.flat_number).await?;
        let payment = self.store.insert_payment(payment).await?;
        tracing::info!(
            "Recorded {} payment of {} for flat {} ({} {})",
            payment.payment_mode,
            payment.amount,
            payment.flat_number,
            payment.month,
            payment.year
        );
        Ok(payment)
    }

    /// Payments matching `filter`. A flat named in the filter must exist.
    pub async fn payments(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        if let Some(flat_number) = &filter.flat_number {
            self.require_flat(flat_number).await?;
        }
        let ledger = self.ledger().await?;
        Ok(ledger.query(filter).into_iter().cloned().collect())
    }

    pub async fn delete_payment(&self, flat_number: &str, period: BillingPeriod) -> Result<Payment> {
        let flat_number = FlatNumber::parse(flat_number)?;
        let payment = self.store.delete_payment(&flat_number, &period).await?;
        tracing::info!("Deleted payment of flat {} for {}", flat_number, period);
        Ok(payment)
    }

    /// Fills an empty store with the sample building.
    pub async fn seed(&self) -> Result<SeedSummary> {
        let existing = self.store.list_flats().await?;
        if !existing.is_empty() || !self.store.list_payments().await?.is_empty() {
            return Err(GroupError::validation(
                "Store already has data; seed only runs on an empty store",
            ));
        }

        for flat_number in SAMPLE_FLATS {
            self.create_flat(flat_number).await?;
        }

        let samples = [
            ("101", "January", 2024, (2024, 1, 5), PaymentMode::Upi),
            ("101", "February", 2024, (2024, 2, 3), PaymentMode::Cash),
            ("102", "January", 2024, (2024, 1, 10), PaymentMode::BankTransfer),
        ];
        for (flat, month, year, (y, m, d), mode) in samples {
            let paid_on = NaiveDate::from_ymd_opt(y, m, d)
                .ok_or_else(|| GroupError::validation("invalid sample date"))?;
            let payment = Payment::new(
                FlatNumber::parse(flat)?,
                BillingPeriod::parse(month, year)?,
                self.default_amount,
                mode,
                paid_on,
            )?;
            self.record_payment(payment).await?;
        }

        tracing::info!(
            "Seeded {} flats and {} payments",
            SAMPLE_FLATS.len(),
            samples.len()
        );
        Ok(SeedSummary {
            flats: SAMPLE_FLATS.len(),
            payments: samples.len(),
        })
    }
}

fn stored_version(flats: &[Flat], flat_number: &FlatNumber) -> u64 {
    flats
        .iter()
        .find(|flat| flat.flat_number == *flat_number)
        .map(|flat| flat.version)
        .unwrap_or(0)
}

fn placement_changes(flats: &[Flat], model: &AdjacencyModel, placement: &Placement) -> ChangeSet {
    let new_flat = Flat::new(
        placement.flat_number.clone(),
        model.connections_of(placement.flat_number.as_str()),
    );

    placement
        .joined
        .iter()
        .fold(ChangeSet::new().create(new_flat), |changes, member| {
            changes.update(
                member.clone(),
                model.connections_of(member.as_str()),
                stored_version(flats, member),
            )
        })
}

fn join_labels(flats: &[FlatNumber]) -> String {
    flats
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::document::Document;
    use crate::adapters::InMemoryStore;
    use crate::domain::model::GroupStats;
    use chrono::Month;

    fn n(label: &str) -> FlatNumber {
        label.parse().unwrap()
    }

    async fn service_with(lists: &[(&str, &[&str])]) -> GroupService<InMemoryStore> {
        let store = InMemoryStore::new();
        let mut changes = ChangeSet::new();
        for (flat, links) in lists {
            changes = changes.create(Flat::new(n(flat), links.iter().map(|l| n(l)).collect()));
        }
        store.apply(changes).await.unwrap();
        GroupService::new(store)
    }

    async fn links(service: &GroupService<InMemoryStore>, flat: &str) -> Vec<String> {
        service
            .store()
            .find_flat(&n(flat))
            .await
            .unwrap()
            .unwrap()
            .connected_flats
            .iter()
            .map(|f| f.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_create_joins_existing_pair() {
        let service = service_with(&[("101", &["102"]), ("102", &["101"])]).await;

        let created = service.create_flat("104").await.unwrap();

        assert_eq!(created.connected_flats, vec![n("101"), n("102")]);
        assert_eq!(links(&service, "101").await, vec!["102", "104"]);
        assert_eq!(links(&service, "102").await, vec!["101", "104"]);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_before_placing() {
        let service = service_with(&[("101", &[])]).await;

        let result = service.create_flat(" 101 ").await;

        assert!(matches!(result, Err(GroupError::DuplicateFlat { .. })));
        assert!(links(&service, "101").await.is_empty());
    }

    #[tokio::test]
    async fn test_connect_rejects_missing_target_without_writes() {
        let service = service_with(&[("105", &[]), ("106", &[])]).await;
        let before = service.store().snapshot().await;

        let result = service
            .connect_flats("105", &["106".to_string(), "107".to_string()])
            .await;

        assert!(matches!(result, Err(GroupError::NotFound { flat }) if flat == "107"));
        assert_eq!(service.store().snapshot().await, before);
    }

    #[tokio::test]
    async fn test_connect_mirrors_links() {
        let service = service_with(&[("105", &[]), ("106", &[]), ("107", &[])]).await;

        let written = service
            .connect_flats("105", &["106".to_string(), "107".to_string()])
            .await
            .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(links(&service, "105").await, vec!["106", "107"]);
        assert_eq!(links(&service, "106").await, vec!["105"]);
        assert_eq!(links(&service, "107").await, vec!["105"]);
    }

    #[tokio::test]
    async fn test_connect_repairs_one_way_link() {
        let service = service_with(&[("101", &["102"]), ("102", &[])]).await;

        service.connect_flats("101", &["102".to_string()]).await.unwrap();

        assert_eq!(links(&service, "101").await, vec!["102"]);
        assert_eq!(links(&service, "102").await, vec!["101"]);
        assert!(service.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_validates_arguments() {
        let service = service_with(&[("101", &[])]).await;

        assert!(matches!(
            service.connect_flats("101", &[]).await,
            Err(GroupError::Validation { .. })
        ));
        assert!(matches!(
            service.connect_flats("101", &["101".to_string()]).await,
            Err(GroupError::Validation { .. })
        ));
        assert!(matches!(
            service.connect_flats("999", &["101".to_string()]).await,
            Err(GroupError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_group_view_reports_stats() {
        let service = service_with(&[("101", &["102"]), ("102", &["101"]), ("103", &[])]).await;
        let period = BillingPeriod::parse("January", 2024).unwrap();
        service
            .record_payment(
                Payment::new(
                    n("101"),
                    period,
                    1500,
                    PaymentMode::Upi,
                    NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
                )
                .unwrap(),
            )
            .await
            .unwrap();

        let view = service.group_view("102", period).await.unwrap();

        assert_eq!(view.members, vec![n("102"), n("101")]);
        assert_eq!(view.connected, vec![n("101")]);
        assert_eq!(
            view.stats,
            GroupStats {
                total: 2,
                paid: 1,
                due: 1
            }
        );
        assert_eq!(view.total_paid, 0);

        assert!(matches!(
            service.group_view("999", period).await,
            Err(GroupError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_payment_for_unknown_flat_is_rejected() {
        let service = service_with(&[("101", &[])]).await;
        let payment = Payment::new(
            n("999"),
            BillingPeriod::parse("March", 2024).unwrap(),
            1500,
            PaymentMode::Cash,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
        .unwrap();

        assert!(matches!(
            service.record_payment(payment).await,
            Err(GroupError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_sequential_mode_chunks_by_number() {
        let service = service_with(&[
            ("1001", &[]),
            ("101", &["1001"]),
            ("102", &[]),
            ("99", &[]),
        ])
        .await
        .with_grouping_mode(GroupingMode::Sequential);

        let overview = service
            .overview(
                BillingPeriod::parse("May", 2024).unwrap(),
                StatusFilter::All,
                None,
            )
            .await
            .unwrap();

        let groups: Vec<Vec<String>> = overview
            .groups
            .iter()
            .map(|g| g.members.iter().map(|m| m.to_string()).collect())
            .collect();
        assert_eq!(groups, vec![vec!["99", "101", "102"], vec!["1001"]]);
    }

    fn legacy_store(lists: &[(&str, &[&str])]) -> InMemoryStore {
        InMemoryStore::from_document(Document {
            flats: lists
                .iter()
                .map(|(flat, links)| Flat::new(n(flat), links.iter().map(|l| n(l)).collect()))
                .collect(),
            payments: vec![],
        })
    }

    #[tokio::test]
    async fn test_create_over_dangling_link_skips_missing_flat() {
        let service = GroupService::new(legacy_store(&[("101", &["999"])]));

        let created = service.create_flat("102").await.unwrap();
        assert_eq!(created.connected_flats, vec![n("101")]);
        assert_eq!(links(&service, "101").await, vec!["999", "102"]);

        let next = service.create_flat("201").await.unwrap();
        assert_eq!(next.connected_flats, vec![n("102"), n("101")]);
        assert!(service.store().find_flat(&n("999")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_stale_link_to_itself() {
        let service = GroupService::new(legacy_store(&[("101", &["104"])]));

        let created = service.create_flat("104").await.unwrap();

        assert_eq!(created.connected_flats, vec![n("101")]);
        assert_eq!(links(&service, "101").await, vec!["104"]);
        assert!(service.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_writes_over_unordered_asymmetric_data() {
        let service = GroupService::new(legacy_store(&[
            ("301", &[]),
            ("102", &[]),
            ("201", &[]),
            ("101", &["102"]),
        ]));
        assert_eq!(service.audit().await.unwrap().len(), 1);

        service.connect_flats("101", &["102".to_string()]).await.unwrap();
        assert_eq!(links(&service, "102").await, vec!["101"]);

        let created = service.create_flat("401").await.unwrap();
        assert_eq!(created.connected_flats, vec![n("101"), n("102")]);
        assert!(service.audit().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_smaller_target_pairs_flats() {
        let service = GroupService::new(InMemoryStore::new()).with_target_size(2);
        assert_eq!(service.target_size(), 2);

        for flat in ["101", "102", "103", "104"] {
            service.create_flat(flat).await.unwrap();
        }

        assert_eq!(links(&service, "101").await, vec!["102"]);
        assert_eq!(links(&service, "103").await, vec!["104"]);
    }

    #[tokio::test]
    async fn test_seed_reports_what_it_added() {
        let service = GroupService::new(InMemoryStore::new());

        let summary = service.seed().await.unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                flats: 8,
                payments: 3
            }
        );
    }

    #[tokio::test]
    async fn test_payment_filters_and_deletion() {
        let service = GroupService::new(InMemoryStore::new());
        service.seed().await.unwrap();

        let january = PaymentFilter {
            month: Some(Month::January),
            year: Some(2024),
            ..PaymentFilter::default()
        };
        let flats: Vec<String> = service
            .payments(&january)
            .await
            .unwrap()
            .iter()
            .map(|p| p.flat_number.to_string())
            .collect();
        assert_eq!(flats, vec!["102", "101"]);

        let period = BillingPeriod::parse("January", 2024).unwrap();
        let removed = service.delete_payment("101", period).await.unwrap();
        assert_eq!(removed.payment_mode, PaymentMode::Upi);

        let view = service.group_view("101", period).await.unwrap();
        assert_eq!(view.stats.paid, 1);
        assert_eq!(view.total_paid, 1500);

        assert!(matches!(
            service.delete_payment("101", period).await,
            Err(GroupError::PaymentNotFound { .. })
        ));
        assert!(matches!(
            service
                .payments(&PaymentFilter {
                    flat_number: Some(n("999")),
                    ..PaymentFilter::default()
                })
                .await,
            Err(GroupError::NotFound { .. })
        ));
    }
}
