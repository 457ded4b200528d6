//! In-memory archive of rendered reports.
//!
//! Only the latest report per currency is retained; rendering a new one for
//! the same currency evicts its predecessor.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use fx_types::{ProviderCode, RenderedReport};

/// A stored report and its provenance.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    pub id: Uuid,
    pub provider_code: ProviderCode,
    pub created_at: DateTime<Utc>,
    pub report: RenderedReport,
}

#[derive(Default)]
pub struct ReportArchive {
    by_id: DashMap<Uuid, Arc<ReportArtifact>>,
    latest: DashMap<ProviderCode, Uuid>,
}

impl ReportArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a report and returns its handle.
    pub fn store(&self, provider_code: ProviderCode, report: RenderedReport) -> Uuid {
        let id = Uuid::new_v4();
        let artifact = Arc::new(ReportArtifact {
            id,
            provider_code,
            created_at: Utc::now(),
            report,
        });
        self.by_id.insert(id, artifact);

        if let Some(previous) = self.latest.insert(provider_code, id) {
            self.by_id.remove(&previous);
        }
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<ReportArtifact>> {
        self.by_id.get(&id).map(|entry| entry.value().clone())
    }

    pub fn latest_for(&self, provider_code: ProviderCode) -> Option<Arc<ReportArtifact>> {
        let id = *self.latest.get(&provider_code)?;
        self.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
