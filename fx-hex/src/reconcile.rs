//! Rate reconciliation engine.
//!
//! Brings the rate store in line with a freshly fetched batch of raw rows:
//! each parsed observation is inserted when its `(key, date)` is new,
//! rewritten when the stored values differ, and left alone otherwise.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use fx_types::{
    AppError, DateWindow, ParseFailure, ProviderCode, RateObservation, RateRepository, RawRateRow,
    RepoError, StoredRate,
};

/// Outcome of one reconciliation call.
#[derive(Debug, Clone, Default)]
pub struct ReconcileResult {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failures: Vec<ParseFailure>,
    /// Stored rows for the key inside the window, ordered by date
    pub rows: Vec<StoredRate>,
}

/// Serializes reconciliation per currency key.
///
/// Calls for different keys proceed in parallel; calls for the same key run
/// one at a time, so the get-then-insert sequence never races itself.
#[derive(Default)]
pub struct Reconciler {
    locks: DashMap<ProviderCode, Arc<Mutex<()>>>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: ProviderCode) -> Arc<Mutex<()>> {
        self.locks.entry(key).or_default().clone()
    }

    /// Reconciles `raw_rows` for `key` and reads back the window.
    #[tracing::instrument(skip(self, repo, raw_rows), fields(key = %key, window = %window, fetched = raw_rows.len()))]
    pub async fn reconcile<R>(
        &self,
        repo: &R,
        key: ProviderCode,
        window: DateWindow,
        raw_rows: &[RawRateRow],
    ) -> Result<ReconcileResult, AppError>
    where
        R: RateRepository + ?Sized,
    {
        let mut result = ReconcileResult::default();

        // Parsing needs no store access, keep it outside the critical section.
        let mut observations = Vec::with_capacity(raw_rows.len());
        for raw in raw_rows {
            match RateObservation::parse(raw) {
                Ok(obs) => observations.push(obs),
                Err(e) => {
                    tracing::warn!(row = ?raw, error = %e, "skipping unparseable rate row");
                    result.failures.push(ParseFailure {
                        raw: raw.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        for obs in &observations {
            if !window.contains(obs.date) {
                tracing::debug!(date = %obs.date, "source returned a row outside the window");
            }

            match repo.get_rate(key, obs.date).await.map_err(store_violation)? {
                None => {
                    repo.insert_rate(key, obs).await.map_err(store_violation)?;
                    result.inserted += 1;
                }
                Some(stored) if stored.observation().same_values(obs) => {
                    result.unchanged += 1;
                }
                Some(stored) => {
                    tracing::info!(
                        date = %obs.date,
                        old_rate = %stored.rate,
                        new_rate = %obs.rate,
                        "source republished a different value"
                    );
                    repo.update_rate(key, obs.date, obs)
                        .await
                        .map_err(store_violation)?;
                    result.updated += 1;
                }
            }
        }

        result.rows = repo
            .list_rates_in_window(key, window)
            .await
            .map_err(store_violation)?;

        tracing::info!(
            inserted = result.inserted,
            updated = result.updated,
            unchanged = result.unchanged,
            skipped = result.failures.len(),
            "reconciled"
        );

        Ok(result)
    }
}

/// Maps store errors, logging contract violations that the lock should rule out.
fn store_violation(err: RepoError) -> AppError {
    match &err {
        RepoError::DuplicateKey(_) | RepoError::NotFound => {
            tracing::error!(error = %err, "rate store contract violated during reconciliation");
            AppError::Internal(format!("store contract violated: {}", err))
        }
        _ => err.into(),
    }
}
