//! SyncService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};

    use fx_types::{
        AppError, CurrencyDirectory, CurrencyReferenceRow, DateInput, DateWindow, FetchError,
        ProviderCode, RateObservation, RateRepository, RateSource, RawRateRow, RawReferenceRow,
        ReferenceRepository, ReferenceSource, RenderedReport, RepoError, ReportError,
        ReportRenderer, StoredRate, SyncRequest, UpsertOutcome,
    };

    use crate::SyncService;
    use crate::outbound::SvgChartRenderer;

    const EURO: ProviderCode = ProviderCode::new(52170);

    /// Simple in-memory repository for testing the service layer.
    ///
    /// Enforces the same key contract as the SQL adapters.
    #[derive(Default)]
    pub struct MockRepo {
        rates: Mutex<HashMap<(ProviderCode, NaiveDate), StoredRate>>,
        references: Mutex<BTreeMap<(String, String), CurrencyReferenceRow>>,
        writes: AtomicUsize,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self::default()
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        fn rate_count(&self) -> usize {
            self.rates.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RateRepository for MockRepo {
        async fn get_rate(
            &self,
            key: ProviderCode,
            date: NaiveDate,
        ) -> Result<Option<StoredRate>, RepoError> {
            Ok(self.rates.lock().unwrap().get(&(key, date)).cloned())
        }

        async fn insert_rate(
            &self,
            key: ProviderCode,
            obs: &RateObservation,
        ) -> Result<StoredRate, RepoError> {
            let mut rates = self.rates.lock().unwrap();
            if rates.contains_key(&(key, obs.date)) {
                return Err(RepoError::DuplicateKey(format!("{} {}", key, obs.date)));
            }
            let stored = StoredRate::from_parts(key, obs.clone(), Utc::now());
            rates.insert((key, obs.date), stored.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(stored)
        }

        async fn update_rate(
            &self,
            key: ProviderCode,
            date: NaiveDate,
            obs: &RateObservation,
        ) -> Result<StoredRate, RepoError> {
            let mut rates = self.rates.lock().unwrap();
            let slot = rates.get_mut(&(key, date)).ok_or(RepoError::NotFound)?;
            *slot = StoredRate::from_parts(key, obs.clone(), Utc::now());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(slot.clone())
        }

        async fn list_rates(&self, key: Option<ProviderCode>) -> Result<Vec<StoredRate>, RepoError> {
            let mut rows: Vec<StoredRate> = self
                .rates
                .lock()
                .unwrap()
                .values()
                .filter(|r| key.is_none_or(|k| r.currency_key == k))
                .cloned()
                .collect();
            rows.sort_by_key(|r| (r.date, r.currency_key.value()));
            Ok(rows)
        }

        async fn list_rates_in_window(
            &self,
            key: ProviderCode,
            window: DateWindow,
        ) -> Result<Vec<StoredRate>, RepoError> {
            let rows = self.list_rates(Some(key)).await?;
            Ok(rows.into_iter().filter(|r| window.contains(r.date)).collect())
        }
    }

    #[async_trait]
    impl ReferenceRepository for MockRepo {
        async fn upsert_reference(
            &self,
            row: &CurrencyReferenceRow,
        ) -> Result<UpsertOutcome, RepoError> {
            let mut refs = self.references.lock().unwrap();
            let key = (row.country.clone(), row.currency_name.clone());
            let outcome = match refs.get(&key) {
                None => UpsertOutcome::Inserted,
                Some(existing) if existing == row => return Ok(UpsertOutcome::Unchanged),
                Some(_) => UpsertOutcome::Updated,
            };
            refs.insert(key, row.clone());
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(outcome)
        }

        async fn list_references(&self) -> Result<Vec<CurrencyReferenceRow>, RepoError> {
            Ok(self.references.lock().unwrap().values().cloned().collect())
        }
    }

    /// Rate source that serves whatever rows the test put in it.
    #[derive(Default)]
    struct ScriptedRates {
        rows: Mutex<Vec<RawRateRow>>,
        calls: AtomicUsize,
    }

    impl ScriptedRates {
        fn with_rows(rows: Vec<RawRateRow>) -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(rows),
                calls: AtomicUsize::new(0),
            })
        }

        fn set_rows(&self, rows: Vec<RawRateRow>) {
            *self.rows.lock().unwrap() = rows;
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateSource for ScriptedRates {
        async fn fetch_rates(
            &self,
            _code: ProviderCode,
            _window: DateWindow,
        ) -> Result<Vec<RawRateRow>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct ScriptedReference {
        rows: Vec<RawReferenceRow>,
        calls: AtomicUsize,
    }

    impl ScriptedReference {
        fn standard() -> Arc<Self> {
            Arc::new(Self {
                rows: vec![
                    RawReferenceRow::new("Germany", "Euro", "EUR", "978"),
                    RawReferenceRow::new("Zimbabwe", "US Dollar", "USD", "840"),
                    RawReferenceRow::new("", "Nameless", "XXX", "999"),
                ],
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReferenceSource for ScriptedReference {
        async fn fetch_reference_table(&self) -> Result<Vec<RawReferenceRow>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    /// Never answers within any sane timeout.
    struct StalledSource;

    #[async_trait]
    impl RateSource for StalledSource {
        async fn fetch_rates(
            &self,
            _code: ProviderCode,
            _window: DateWindow,
        ) -> Result<Vec<RawRateRow>, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }
    }

    struct DownSource;

    #[async_trait]
    impl RateSource for DownSource {
        async fn fetch_rates(
            &self,
            _code: ProviderCode,
            _window: DateWindow,
        ) -> Result<Vec<RawRateRow>, FetchError> {
            Err(FetchError::Unavailable("HTTP 503".into()))
        }
    }

    struct BrokenRenderer;

    impl ReportRenderer for BrokenRenderer {
        fn render(
            &self,
            _code: ProviderCode,
            _rows: &[StoredRate],
        ) -> Result<RenderedReport, ReportError> {
            Err(ReportError::Render("no canvas".into()))
        }
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn raw(day: u32, rate: &str) -> RawRateRow {
        RawRateRow::new(format!("{:02}.01.2024", day), "1", rate, "0")
    }

    fn euro_request(start: u32, end: u32) -> SyncRequest {
        SyncRequest {
            country: "Euro".into(),
            start_date: DateInput::from(jan(start)),
            end_date: DateInput::from(jan(end)),
        }
    }

    fn service_with(
        rates: Arc<dyn RateSource>,
        reference: Arc<dyn ReferenceSource>,
    ) -> SyncService<MockRepo> {
        SyncService::new(
            MockRepo::new(),
            Arc::new(CurrencyDirectory::builtin()),
            rates,
            reference,
            Arc::new(SvgChartRenderer::new()),
        )
    }

    fn three_euro_days() -> Vec<RawRateRow> {
        vec![raw(1, "99,1919"), raw(2, "99,5000"), raw(3, "98,9000")]
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reconciliation through the service
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_first_sync_inserts_window() {
        let rates = ScriptedRates::with_rows(three_euro_days());
        let service = service_with(rates, ScriptedReference::standard());

        let response = service.synchronize(euro_request(1, 3)).await.unwrap();

        assert_eq!(response.provider_code, EURO);
        assert_eq!(response.summary.inserted, 3);
        assert_eq!(response.summary.updated, 0);
        assert_eq!(response.summary.unchanged, 0);
        assert_eq!(response.rate_rows.len(), 3);
        assert!(response.rate_rows.windows(2).all(|w| w[0].date < w[1].date));
        assert!(response.report_id.is_some());
    }

    #[tokio::test]
    async fn test_resync_is_idempotent() {
        let rates = ScriptedRates::with_rows(three_euro_days());
        let service = service_with(rates, ScriptedReference::standard());

        service.synchronize(euro_request(1, 3)).await.unwrap();
        let writes_after_first = service.repo().writes();
        let second = service.synchronize(euro_request(1, 3)).await.unwrap();

        assert_eq!(second.summary.inserted, 0);
        assert_eq!(second.summary.updated, 0);
        assert_eq!(second.summary.unchanged, 3);
        assert_eq!(second.summary.reference_upserted, 0);
        assert_eq!(service.repo().writes(), writes_after_first);
        assert_eq!(service.repo().rate_count(), 3);
    }

    #[tokio::test]
    async fn test_republished_value_updates_exactly_one_row() {
        let rates = ScriptedRates::with_rows(three_euro_days());
        let service = service_with(rates.clone(), ScriptedReference::standard());

        service.synchronize(euro_request(1, 3)).await.unwrap();
        service.synchronize(euro_request(1, 3)).await.unwrap();

        rates.set_rows(vec![raw(1, "99,1919"), raw(2, "99,7777"), raw(3, "98,9000")]);
        let third = service.synchronize(euro_request(1, 3)).await.unwrap();

        assert_eq!(third.summary.inserted, 0);
        assert_eq!(third.summary.updated, 1);
        assert_eq!(third.summary.unchanged, 2);

        let stored = service.repo().get_rate(EURO, jan(2)).await.unwrap().unwrap();
        assert_eq!(stored.rate.to_string(), "99.7777");
        assert_eq!(service.repo().rate_count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_row_is_skipped_not_fatal() {
        let mut rows: Vec<RawRateRow> = (1..=10).map(|d| raw(d, "99,0000")).collect();
        rows.push(RawRateRow::new("32.01.2024", "1", "99,0000", "0"));
        let service = service_with(ScriptedRates::with_rows(rows), ScriptedReference::standard());

        let response = service.synchronize(euro_request(1, 11)).await.unwrap();

        assert_eq!(response.summary.inserted, 10);
        assert_eq!(response.summary.skipped, 1);
        assert_eq!(response.parse_failures.len(), 1);
        assert_eq!(response.parse_failures[0].raw.date, "32.01.2024");
    }

    #[tokio::test]
    async fn test_concurrent_syncs_for_one_currency_do_not_collide() {
        let rates = ScriptedRates::with_rows(three_euro_days());
        let service = Arc::new(service_with(rates, ScriptedReference::standard()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.synchronize(euro_request(1, 3)).await })
            })
            .collect();

        let mut inserted = 0;
        for handle in handles {
            let response = handle.await.unwrap().unwrap();
            inserted += response.summary.inserted;
        }

        assert_eq!(inserted, 3);
        assert_eq!(service.repo().rate_count(), 3);
    }

    #[tokio::test]
    async fn test_same_date_for_two_currencies_is_two_rows() {
        let rates = ScriptedRates::with_rows(vec![raw(2, "99,0000")]);
        let service = service_with(rates, ScriptedReference::standard());

        service.synchronize(euro_request(2, 2)).await.unwrap();
        let usd = SyncRequest {
            country: "US Dollar".into(),
            start_date: DateInput::from(jan(2)),
            end_date: DateInput::from(jan(2)),
        };
        let response = service.synchronize(usd).await.unwrap();

        assert_eq!(response.summary.inserted, 1);
        assert_eq!(service.repo().rate_count(), 2);
        assert_eq!(service.list_rates(Some(EURO)).await.unwrap().len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reference table
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_reference_rows_upsert_once() {
        let service = service_with(
            ScriptedRates::with_rows(three_euro_days()),
            ScriptedReference::standard(),
        );

        let first = service.synchronize(euro_request(1, 3)).await.unwrap();
        assert_eq!(first.summary.reference_upserted, 2);
        assert_eq!(first.summary.reference_skipped, 1);
        assert_eq!(first.reference_rows.len(), 2);
        assert_eq!(first.reference_rows[0].country, "Germany");

        let second = service.synchronize(euro_request(1, 3)).await.unwrap();
        assert_eq!(second.summary.reference_upserted, 0);
        assert_eq!(second.reference_rows, first.reference_rows);
    }

    #[tokio::test]
    async fn test_store_references_counts_outcomes() {
        let service = service_with(
            ScriptedRates::with_rows(Vec::new()),
            ScriptedReference::standard(),
        );
        let rows = vec![RawReferenceRow::new("Germany", "Euro", "EUR", "978")];
        let first = service.store_references(&rows).await.unwrap();
        assert_eq!(first.inserted, 1);

        let changed = vec![RawReferenceRow::new("Germany", "Euro", "EUR", "979")];
        let second = service.store_references(&changed).await.unwrap();
        assert_eq!(second.updated, 1);

        let third = service.store_references(&changed).await.unwrap();
        assert_eq!(third.unchanged, 1);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Failures before and during I/O
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_unknown_country_fails_before_any_io() {
        let rates = ScriptedRates::with_rows(three_euro_days());
        let reference = ScriptedReference::standard();
        let service = service_with(rates.clone(), reference.clone());

        let req = SyncRequest {
            country: "Atlantis".into(),
            ..euro_request(1, 3)
        };
        let result = service.synchronize(req).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(rates.calls(), 0);
        assert_eq!(reference.calls(), 0);
        assert_eq!(service.repo().writes(), 0);
    }

    #[tokio::test]
    async fn test_reversed_window_fails_before_any_io() {
        let rates = ScriptedRates::with_rows(three_euro_days());
        let service = service_with(rates.clone(), ScriptedReference::standard());

        let result = service.synchronize(euro_request(3, 1)).await;

        assert!(matches!(result, Err(AppError::InvalidRange(_))));
        assert_eq!(rates.calls(), 0);
        assert_eq!(service.repo().writes(), 0);
    }

    #[tokio::test]
    async fn test_window_before_archive_is_invalid_range() {
        let service = service_with(
            ScriptedRates::with_rows(Vec::new()),
            ScriptedReference::standard(),
        );
        let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();

        let result = service.validate_window(start, jan(1));
        assert!(matches!(result, Err(AppError::InvalidRange(_))));
    }

    #[tokio::test]
    async fn test_malformed_date_is_bad_request() {
        let service = service_with(
            ScriptedRates::with_rows(Vec::new()),
            ScriptedReference::standard(),
        );
        let req = SyncRequest {
            country: "Euro".into(),
            start_date: DateInput::Text("yesterday".into()),
            end_date: DateInput::from(jan(3)),
        };

        let result = service.synchronize(req).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_source_times_out() {
        let service = service_with(Arc::new(StalledSource), ScriptedReference::standard())
            .with_fetch_timeout(Duration::from_millis(50));

        let result = service.synchronize(euro_request(1, 3)).await;

        assert!(matches!(result, Err(AppError::FetchTimeout(_))));
        assert_eq!(service.repo().rate_count(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_source_is_reported() {
        let service = service_with(Arc::new(DownSource), ScriptedReference::standard());

        let result = service.synchronize(euro_request(1, 3)).await;

        assert!(matches!(result, Err(AppError::FetchUnavailable(_))));
        assert_eq!(service.repo().writes(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reports
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_render_failure_still_persists_rates() {
        let service = SyncService::new(
            MockRepo::new(),
            Arc::new(CurrencyDirectory::builtin()),
            ScriptedRates::with_rows(three_euro_days()),
            ScriptedReference::standard(),
            Arc::new(BrokenRenderer),
        );

        let response = service.synchronize(euro_request(1, 3)).await.unwrap();

        assert!(response.report_id.is_none());
        assert_eq!(response.summary.inserted, 3);
        assert!(service.reports().is_empty());
    }

    #[tokio::test]
    async fn test_report_is_retrievable_until_superseded() {
        let service = service_with(
            ScriptedRates::with_rows(three_euro_days()),
            ScriptedReference::standard(),
        );

        let first = service.synchronize(euro_request(1, 3)).await.unwrap();
        let first_id = first.report_id.unwrap();
        let artifact = service.get_report(first_id).unwrap();
        assert_eq!(artifact.report.content_type, "image/svg+xml");
        assert_eq!(artifact.provider_code, EURO);

        let second = service.synchronize(euro_request(1, 3)).await.unwrap();
        assert!(service.get_report(second.report_id.unwrap()).is_ok());
        assert!(matches!(
            service.get_report(first_id),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_currencies_comes_from_directory() {
        let service = service_with(
            ScriptedRates::with_rows(Vec::new()),
            ScriptedReference::standard(),
        );
        let currencies = service.list_currencies();
        assert_eq!(currencies.len(), service.directory().len());
        assert!(currencies.iter().any(|c| c.provider_code == EURO));
    }
}
