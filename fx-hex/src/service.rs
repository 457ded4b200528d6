//! Synchronization Application Service
//!
//! Orchestrates one synchronization as explicit stages:
//! resolve → validate window → fetch → store references → reconcile rates →
//! read back → render. Contains NO infrastructure logic; every collaborator
//! is injected through a port.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use uuid::Uuid;

use fx_types::{
    AppError, CurrencyDirectory, CurrencyReferenceRow, DateWindow, DirectoryEntry, FetchError,
    ProviderCalendar, ProviderCode, RateSource, RawRateRow, RawReferenceRow, ReferenceSource,
    ReportRenderer, Repository, StoredRate, SyncRequest, SyncResponse, SyncSummary,
    UpsertOutcome,
};

use crate::reconcile::Reconciler;
use crate::reports::{ReportArchive, ReportArtifact};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Counters from storing one fetched reference table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceSummary {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

/// Application service for rate synchronization.
///
/// Generic over `R: Repository` - the store adapter is injected at compile
/// time; sources and the renderer are trait objects chosen at startup.
pub struct SyncService<R: Repository> {
    repo: R,
    directory: Arc<CurrencyDirectory>,
    rate_source: Arc<dyn RateSource>,
    reference_source: Arc<dyn ReferenceSource>,
    renderer: Arc<dyn ReportRenderer>,
    reconciler: Reconciler,
    reports: ReportArchive,
    fetch_timeout: Duration,
}

impl<R: Repository> SyncService<R> {
    pub fn new(
        repo: R,
        directory: Arc<CurrencyDirectory>,
        rate_source: Arc<dyn RateSource>,
        reference_source: Arc<dyn ReferenceSource>,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            repo,
            directory,
            rate_source,
            reference_source,
            renderer,
            reconciler: Reconciler::new(),
            reports: ReportArchive::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bounds each outbound fetch by `timeout`.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn directory(&self) -> &CurrencyDirectory {
        &self.directory
    }

    pub fn reports(&self) -> &ReportArchive {
        &self.reports
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Stages
    // ─────────────────────────────────────────────────────────────────────────────

    /// Resolves a country or currency display name. Pure lookup, no I/O.
    pub fn resolve(&self, name: &str) -> Result<ProviderCode, AppError> {
        self.directory.resolve(name).map_err(Into::into)
    }

    /// Validates a requested window against ordering and the provider calendar.
    pub fn validate_window(&self, start: NaiveDate, end: NaiveDate) -> Result<DateWindow, AppError> {
        let window = DateWindow::new(start, end)?;
        let calendar = ProviderCalendar::current();
        for date in [start, end] {
            if !calendar.contains(date) {
                return Err(AppError::InvalidRange(format!(
                    "{} is outside the archive calendar {}..{}",
                    date, calendar.earliest, calendar.latest
                )));
            }
        }
        Ok(window)
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        tokio::time::timeout(self.fetch_timeout, fut)
            .await
            .map_err(|_| FetchError::Timeout(self.fetch_timeout))?
    }

    async fn fetch_rates(
        &self,
        code: ProviderCode,
        window: DateWindow,
    ) -> Result<Vec<RawRateRow>, AppError> {
        self.bounded(self.rate_source.fetch_rates(code, window))
            .await
            .map_err(|e| {
                tracing::warn!(code = %code, error = %e, "rate fetch failed");
                AppError::from(e)
            })
    }

    async fn fetch_reference(&self) -> Result<Vec<RawReferenceRow>, AppError> {
        self.bounded(self.reference_source.fetch_reference_table())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "reference fetch failed");
                AppError::from(e)
            })
    }

    /// Validates the window, then fetches raw rate rows under the fetch timeout.
    #[tracing::instrument(skip(self), fields(code = %code))]
    pub async fn fetch_window(
        &self,
        code: ProviderCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawRateRow>, AppError> {
        let window = self.validate_window(start, end)?;
        self.fetch_rates(code, window).await
    }

    /// Validates and upserts a fetched reference table by natural key.
    #[tracing::instrument(skip_all, fields(rows = raw.len()))]
    pub async fn store_references(&self, raw: &[RawReferenceRow]) -> Result<ReferenceSummary, AppError> {
        let mut summary = ReferenceSummary::default();
        for raw_row in raw {
            let row = match CurrencyReferenceRow::from_raw(raw_row) {
                Ok(row) => row,
                Err(e) => {
                    tracing::debug!(row = ?raw_row, error = %e, "skipping reference row");
                    summary.skipped += 1;
                    continue;
                }
            };
            match self.repo.upsert_reference(&row).await? {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
                UpsertOutcome::Unchanged => summary.unchanged += 1,
            }
        }
        Ok(summary)
    }

    /// Renders and archives a chart. Failures are logged and yield no handle.
    async fn render_report(&self, code: ProviderCode, rows: &[StoredRate]) -> Option<Uuid> {
        let renderer = Arc::clone(&self.renderer);
        let rows = rows.to_vec();
        match tokio::task::spawn_blocking(move || renderer.render(code, &rows)).await {
            Ok(Ok(report)) => Some(self.reports.store(code, report)),
            Ok(Err(e)) => {
                tracing::warn!(code = %code, error = %e, "report rendering failed");
                None
            }
            Err(e) => {
                tracing::error!(code = %code, error = %e, "report rendering task panicked");
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Synchronization
    // ─────────────────────────────────────────────────────────────────────────────

    /// Synchronizes one currency over a date window.
    ///
    /// Unknown names and invalid windows fail before any fetch or store call.
    #[tracing::instrument(skip(self, req), fields(country = %req.country))]
    pub async fn synchronize(&self, req: SyncRequest) -> Result<SyncResponse, AppError> {
        let code = self.resolve(&req.country)?;
        let window = self.validate_window(req.start_date.to_date()?, req.end_date.to_date()?)?;

        let (raw_rates, raw_reference) =
            tokio::try_join!(self.fetch_rates(code, window), self.fetch_reference())?;

        let reference = self.store_references(&raw_reference).await?;
        let reconciled = self
            .reconciler
            .reconcile(&self.repo, code, window, &raw_rates)
            .await?;

        let reference_rows = self.repo.list_references().await?;
        let report_id = self.render_report(code, &reconciled.rows).await;

        let summary = SyncSummary {
            inserted: reconciled.inserted,
            updated: reconciled.updated,
            unchanged: reconciled.unchanged,
            skipped: reconciled.failures.len(),
            reference_upserted: reference.inserted + reference.updated,
            reference_skipped: reference.skipped,
        };
        tracing::info!(?summary, "synchronization complete");

        Ok(SyncResponse {
            country: req.country.trim().to_string(),
            provider_code: code,
            window,
            summary,
            parse_failures: reconciled.failures,
            reference_rows,
            rate_rows: reconciled.rows,
            report_id,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn list_currencies(&self) -> Vec<DirectoryEntry> {
        self.directory.entries().to_vec()
    }

    pub async fn list_references(&self) -> Result<Vec<CurrencyReferenceRow>, AppError> {
        self.repo.list_references().await.map_err(Into::into)
    }

    /// Lists stored rates, optionally for one currency.
    pub async fn list_rates(&self, key: Option<ProviderCode>) -> Result<Vec<StoredRate>, AppError> {
        self.repo.list_rates(key).await.map_err(Into::into)
    }

    pub fn get_report(&self, id: Uuid) -> Result<Arc<ReportArtifact>, AppError> {
        self.reports
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Report {}", id)))
    }
}
