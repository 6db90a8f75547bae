use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::domain::{fields, ApplicantId, ApplicantSnapshot, FieldMap, RecordId, Table};
use super::repository::{Filter, Record, RecordRepository, RepositoryError};

/// Bidirectional sync between the normalized child tables and the canonical
/// snapshot.
pub struct SnapshotSync<R> {
    repository: Arc<R>,
}

impl<R: RecordRepository> SnapshotSync<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Fold an applicant's child records into one canonical snapshot.
    ///
    /// Reads first-match personal and salary records and every experience
    /// record for the applicant's join key, stripping the join key from each
    /// payload. Read-only; persisting the snapshot text is the caller's job.
    pub fn compress(&self, applicant: &Record) -> Result<ApplicantSnapshot, SyncError> {
        let applicant_id = applicant_id_of(applicant)?;
        let filter = Filter::eq(fields::APPLICANT_ID, applicant_id.as_str());

        let personal = self
            .repository
            .find_first(Table::PersonalDetails, &filter)?
            .map(|record| record.fields)
            .unwrap_or_default();
        let experience = self
            .repository
            .find_all(Table::WorkExperience, &filter)?
            .into_iter()
            .map(|record| record.fields)
            .collect::<Vec<_>>();
        let salary = self
            .repository
            .find_first(Table::SalaryPreferences, &filter)?
            .map(|record| record.fields)
            .unwrap_or_default();

        let mut snapshot = ApplicantSnapshot {
            personal,
            experience,
            salary,
        };
        strip_join_key(&mut snapshot);
        Ok(snapshot)
    }

    /// Upsert a snapshot back into the normalized child tables.
    ///
    /// Personal and salary are one-to-one upserts keyed by the join key; a
    /// non-empty experience list is a full replace (delete all existing
    /// entries, then recreate). Each step is idempotent on its own; a store
    /// failure aborts the remainder without cleanup.
    pub fn decompress(
        &self,
        applicant_id: &ApplicantId,
        snapshot: &ApplicantSnapshot,
    ) -> Result<(), SyncError> {
        if !snapshot.personal.is_empty() {
            self.upsert_child(Table::PersonalDetails, applicant_id, &snapshot.personal)?;
        }
        if !snapshot.salary.is_empty() {
            self.upsert_child(Table::SalaryPreferences, applicant_id, &snapshot.salary)?;
        }
        if !snapshot.experience.is_empty() {
            self.replace_experience(applicant_id, &snapshot.experience)?;
        }
        Ok(())
    }

    /// Standalone decompression entry: load the stored snapshot text for an
    /// applicant, parse it, and apply it to the child tables.
    ///
    /// A missing applicant and an applicant without snapshot data are
    /// reported as distinct errors.
    pub fn restore(&self, applicant_id: &ApplicantId) -> Result<ApplicantSnapshot, SyncError> {
        let filter = Filter::eq(fields::APPLICANT_ID, applicant_id.as_str());
        let applicant = self
            .repository
            .find_first(Table::Applicants, &filter)?
            .ok_or_else(|| SyncError::ApplicantNotFound(applicant_id.clone()))?;

        let text = applicant
            .text(fields::COMPRESSED_PROFILE)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| SyncError::MissingSnapshot(applicant_id.clone()))?;

        let snapshot = ApplicantSnapshot::from_json(text).map_err(SyncError::MalformedSnapshot)?;
        self.decompress(applicant_id, &snapshot)?;
        Ok(snapshot)
    }

    fn upsert_child(
        &self,
        table: Table,
        applicant_id: &ApplicantId,
        payload: &FieldMap,
    ) -> Result<(), SyncError> {
        let filter = Filter::eq(fields::APPLICANT_ID, applicant_id.as_str());
        let linked = with_join_key(payload, applicant_id);

        match self.repository.find_first(table, &filter)? {
            Some(existing) => {
                info!(table = table.name(), applicant = %applicant_id, "updating child record");
                self.repository.update(table, &existing.id, linked)?;
            }
            None => {
                info!(table = table.name(), applicant = %applicant_id, "creating child record");
                self.repository.create(table, linked)?;
            }
        }
        Ok(())
    }

    fn replace_experience(
        &self,
        applicant_id: &ApplicantId,
        entries: &[FieldMap],
    ) -> Result<(), SyncError> {
        let filter = Filter::eq(fields::APPLICANT_ID, applicant_id.as_str());
        let existing = self.repository.find_all(Table::WorkExperience, &filter)?;
        if !existing.is_empty() {
            let ids = existing
                .iter()
                .map(|record| record.id.clone())
                .collect::<Vec<_>>();
            info!(count = ids.len(), applicant = %applicant_id, "deleting stale experience records");
            self.repository.batch_delete(Table::WorkExperience, &ids)?;
        }

        let rows = entries
            .iter()
            .map(|entry| with_join_key(entry, applicant_id))
            .collect::<Vec<_>>();
        info!(count = rows.len(), applicant = %applicant_id, "creating experience records");
        self.repository.batch_create(Table::WorkExperience, rows)?;
        Ok(())
    }
}

fn with_join_key(payload: &FieldMap, applicant_id: &ApplicantId) -> FieldMap {
    let mut linked = payload.clone();
    linked.insert(
        fields::APPLICANT_ID.to_string(),
        Value::String(applicant_id.0.clone()),
    );
    linked
}

fn strip_join_key(snapshot: &mut ApplicantSnapshot) {
    snapshot.personal.remove(fields::APPLICANT_ID);
    snapshot.salary.remove(fields::APPLICANT_ID);
    for entry in &mut snapshot.experience {
        entry.remove(fields::APPLICANT_ID);
    }
}

/// Read the join key off an applicant record. Numeric identifiers are
/// accepted and carried as their decimal rendering.
pub(crate) fn applicant_id_of(record: &Record) -> Result<ApplicantId, SyncError> {
    match record.field(fields::APPLICANT_ID) {
        Some(Value::String(id)) if !id.is_empty() => Ok(ApplicantId(id.clone())),
        Some(Value::Number(id)) => Ok(ApplicantId(id.to_string())),
        _ => Err(SyncError::MissingJoinKey(record.id.clone())),
    }
}

/// Errors raised while moving data between the two shapes.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("applicant {0} not found")]
    ApplicantNotFound(ApplicantId),
    #[error("applicant {0} has no snapshot data")]
    MissingSnapshot(ApplicantId),
    #[error("applicant record {0:?} is missing its identifier")]
    MissingJoinKey(RecordId),
    #[error("stored snapshot is not valid JSON: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
