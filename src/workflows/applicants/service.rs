use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info};

use super::domain::{fields, FieldMap, ShortlistStatus, Table};
use super::enrichment::{CompletionClient, CompletionError, EnrichmentClient, RetryPolicy};
use super::repository::{Filter, Record, RecordRepository, RepositoryError};
use super::shortlist::{ShortlistConfig, ShortlistDecision, ShortlistEngine, ShortlistOutcome};
use super::snapshot::{applicant_id_of, SnapshotSync, SyncError};

/// Policy knobs for one batch pass.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub shortlist: ShortlistConfig,
    pub retry: RetryPolicy,
    /// Delay inserted between applicants to respect downstream rate limits.
    pub pacing: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            shortlist: ShortlistConfig::default(),
            retry: RetryPolicy::default(),
            pacing: Duration::from_secs(1),
        }
    }
}

/// Totals reported after a batch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub selected: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Sequential batch driver: compress, persist, shortlist, enrich — one
/// applicant at a time, isolating failures per applicant.
pub struct ApplicantPipeline<R, C> {
    repository: Arc<R>,
    sync: SnapshotSync<R>,
    engine: ShortlistEngine,
    enrichment: EnrichmentClient<C>,
    pacing: Duration,
}

impl<R, C> ApplicantPipeline<R, C>
where
    R: RecordRepository + 'static,
    C: CompletionClient + 'static,
{
    pub fn new(repository: Arc<R>, llm: Arc<C>, config: PipelineConfig) -> Self {
        Self {
            sync: SnapshotSync::new(repository.clone()),
            engine: ShortlistEngine::new(config.shortlist),
            enrichment: EnrichmentClient::new(llm, config.retry),
            pacing: config.pacing,
            repository,
        }
    }

    /// Run one pass over every applicant still needing work: those with a
    /// blank stored snapshot or a status still at the initial sentinel.
    /// Individual failures are logged with the applicant id and never abort
    /// the batch.
    pub fn process_pending(&self) -> Result<BatchReport, PipelineError> {
        let selection = Filter::any([
            Filter::eq(fields::COMPRESSED_PROFILE, ""),
            Filter::eq(
                fields::SHORTLIST_STATUS,
                ShortlistStatus::NotEvaluated.label(),
            ),
        ]);
        let pending = self.repository.find_all(Table::Applicants, &selection)?;

        if pending.is_empty() {
            info!("no applicants need processing");
            return Ok(BatchReport::default());
        }

        let mut report = BatchReport {
            selected: pending.len(),
            ..BatchReport::default()
        };

        for (index, applicant) in pending.iter().enumerate() {
            match self.process_applicant(applicant) {
                Ok(()) => report.processed += 1,
                Err(err) => {
                    report.failed += 1;
                    let id = applicant.text(fields::APPLICANT_ID).unwrap_or("<unknown>");
                    error!(applicant = id, %err, "applicant processing failed");
                }
            }
            if index + 1 < pending.len() && !self.pacing.is_zero() {
                thread::sleep(self.pacing);
            }
        }

        info!(
            selected = report.selected,
            processed = report.processed,
            failed = report.failed,
            "processing run complete"
        );
        Ok(report)
    }

    /// Compress, persist the snapshot, shortlist, then enrich (unless a
    /// score is already stored). The steps commit independently: a late
    /// failure leaves earlier writes in place for the next run to pick up.
    fn process_applicant(&self, applicant: &Record) -> Result<(), PipelineError> {
        let applicant_id = applicant_id_of(applicant)?;
        info!(applicant = %applicant_id, "processing applicant");

        let snapshot = self.sync.compress(applicant)?;
        let snapshot_json = snapshot.to_json().map_err(PipelineError::SnapshotEncode)?;

        let mut update = FieldMap::new();
        update.insert(
            fields::COMPRESSED_PROFILE.to_string(),
            Value::String(snapshot_json.clone()),
        );
        self.repository
            .update(Table::Applicants, &applicant.id, update)?;

        let outcome = self.engine.assess(&snapshot);
        info!(applicant = %applicant_id, decision = ?outcome.decision, "shortlist decision");
        self.persist_outcome(applicant, &outcome)?;

        // Memoization guard: a record already carrying a model score is not
        // sent back to the completion service.
        if applicant.field(fields::LLM_SCORE).is_none() {
            let review = self.enrichment.review(&snapshot_json)?;
            if !review.is_empty() {
                self.repository
                    .update(Table::Applicants, &applicant.id, review.into_fields())?;
            }
        }

        Ok(())
    }

    fn persist_outcome(
        &self,
        applicant: &Record,
        outcome: &ShortlistOutcome,
    ) -> Result<(), PipelineError> {
        if outcome.decision == ShortlistDecision::Shortlisted {
            let mut lead = FieldMap::new();
            lead.insert(
                fields::APPLICANT_ID.to_string(),
                applicant
                    .field(fields::APPLICANT_ID)
                    .cloned()
                    .unwrap_or(Value::Null),
            );
            lead.insert(
                fields::SCORE_REASON.to_string(),
                Value::String(outcome.reasons.join("\n")),
            );
            self.repository.create(Table::ShortlistedLeads, lead)?;
        }

        let mut update = FieldMap::new();
        update.insert(
            fields::SHORTLIST_STATUS.to_string(),
            Value::String(outcome.decision.status().label().to_string()),
        );
        self.repository
            .update(Table::Applicants, &applicant.id, update)?;
        Ok(())
    }
}

/// Error raised while processing a single applicant.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("could not encode snapshot: {0}")]
    SnapshotEncode(#[source] serde_json::Error),
}
