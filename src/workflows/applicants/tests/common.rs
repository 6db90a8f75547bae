use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use crate::workflows::applicants::domain::{fields, ApplicantSnapshot, FieldMap, RecordId, Table};
use crate::workflows::applicants::enrichment::{CompletionClient, CompletionError, RetryPolicy};
use crate::workflows::applicants::repository::{Filter, Record, RecordRepository, RepositoryError};
use crate::workflows::applicants::service::{ApplicantPipeline, PipelineConfig};
use crate::workflows::applicants::shortlist::ShortlistConfig;

/// Sample model response in the documented line-oriented format.
pub(super) const SAMPLE_REVIEW: &str =
    "Summary: Strong candidate\nScore: 8\nIssues: None\nFollow-Ups:\n- Q1\n- Q2";

#[derive(Default)]
pub(super) struct MemoryRepository {
    tables: Mutex<HashMap<Table, Vec<Record>>>,
    sequence: AtomicU64,
}

impl MemoryRepository {
    pub(super) fn rows(&self, table: Table) -> Vec<Record> {
        self.tables
            .lock()
            .expect("repository mutex poisoned")
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    pub(super) fn seed(&self, table: Table, fields: FieldMap) -> Record {
        let record = Record {
            id: self.next_id(),
            fields,
        };
        self.tables
            .lock()
            .expect("repository mutex poisoned")
            .entry(table)
            .or_default()
            .push(record.clone());
        record
    }

    fn next_id(&self) -> RecordId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        RecordId(format!("rec{id:06}"))
    }
}

impl RecordRepository for MemoryRepository {
    fn find_first(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Option<Record>, RepositoryError> {
        Ok(self
            .rows(table)
            .into_iter()
            .find(|record| filter.matches(&record.fields)))
    }

    fn find_all(&self, table: Table, filter: &Filter) -> Result<Vec<Record>, RepositoryError> {
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|record| filter.matches(&record.fields))
            .collect())
    }

    fn create(&self, table: Table, fields: FieldMap) -> Result<Record, RepositoryError> {
        Ok(self.seed(table, fields))
    }

    fn update(
        &self,
        table: Table,
        id: &RecordId,
        fields: FieldMap,
    ) -> Result<Record, RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let records = guard.entry(table).or_default();
        let record = records
            .iter_mut()
            .find(|record| record.id == *id)
            .ok_or(RepositoryError::NotFound)?;
        for (name, value) in fields {
            record.fields.insert(name, value);
        }
        Ok(record.clone())
    }

    fn batch_create(
        &self,
        table: Table,
        rows: Vec<FieldMap>,
    ) -> Result<Vec<Record>, RepositoryError> {
        Ok(rows.into_iter().map(|fields| self.seed(table, fields)).collect())
    }

    fn batch_delete(&self, table: Table, ids: &[RecordId]) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("repository mutex poisoned");
        let records = guard.entry(table).or_default();
        records.retain(|record| !ids.contains(&record.id));
        Ok(())
    }
}

/// Completion fake that replays scripted responses and counts every call.
/// An exhausted script keeps failing, which doubles as a permanently broken
/// service.
#[derive(Default)]
pub(super) struct ScriptedCompletionClient {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: AtomicU64,
}

impl ScriptedCompletionClient {
    pub(super) fn with_responses(
        responses: Vec<Result<String, CompletionError>>,
    ) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU64::new(0),
        }
    }

    pub(super) fn always_failing() -> Self {
        Self::default()
    }

    pub(super) fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

impl CompletionClient for ScriptedCompletionClient {
    fn generate(&self, _prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.responses
            .lock()
            .expect("script mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("scripted failure".to_string())))
    }
}

pub(super) fn field_map(pairs: &[(&str, Value)]) -> FieldMap {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

pub(super) fn zero_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

pub(super) fn test_pipeline(
    repository: Arc<MemoryRepository>,
    llm: Arc<ScriptedCompletionClient>,
) -> ApplicantPipeline<MemoryRepository, ScriptedCompletionClient> {
    ApplicantPipeline::new(
        repository,
        llm,
        PipelineConfig {
            shortlist: ShortlistConfig::default(),
            retry: zero_retry(),
            pacing: Duration::ZERO,
        },
    )
}

pub(super) fn seed_applicant(repository: &MemoryRepository, id: &str) -> Record {
    repository.seed(
        Table::Applicants,
        field_map(&[
            (fields::APPLICANT_ID, json!(id)),
            (fields::SHORTLIST_STATUS, json!("Not Evaluated")),
        ]),
    )
}

/// Child rows for an applicant who clears all three rules: five years at a
/// non-tier-1 employer, $80/hr USD at 25 hrs/wk, located in the United
/// States.
pub(super) fn seed_qualified_children(repository: &MemoryRepository, id: &str) {
    repository.seed(
        Table::PersonalDetails,
        field_map(&[
            (fields::APPLICANT_ID, json!(id)),
            ("Full Name", json!("Ada Lovelace")),
            (fields::LOCATION, json!("United States")),
        ]),
    );
    repository.seed(
        Table::WorkExperience,
        field_map(&[
            (fields::APPLICANT_ID, json!(id)),
            (fields::COMPANY, json!("Initech")),
            (fields::START_DATE, json!("2019-01-01")),
            (fields::END_DATE, json!("2024-01-01")),
        ]),
    );
    repository.seed(
        Table::SalaryPreferences,
        field_map(&[
            (fields::APPLICANT_ID, json!(id)),
            (fields::PREFERRED_RATE, json!(80)),
            (fields::CURRENCY, json!("USD")),
            (fields::AVAILABILITY, json!(25)),
        ]),
    );
}

/// The snapshot equivalent of [`seed_qualified_children`], join key already
/// stripped.
pub(super) fn qualified_snapshot() -> ApplicantSnapshot {
    ApplicantSnapshot {
        personal: field_map(&[
            ("Full Name", json!("Ada Lovelace")),
            (fields::LOCATION, json!("United States")),
        ]),
        experience: vec![field_map(&[
            (fields::COMPANY, json!("Initech")),
            (fields::START_DATE, json!("2019-01-01")),
            (fields::END_DATE, json!("2024-01-01")),
        ])],
        salary: field_map(&[
            (fields::PREFERRED_RATE, json!(80)),
            (fields::CURRENCY, json!("USD")),
            (fields::AVAILABILITY, json!(25)),
        ]),
    }
}
