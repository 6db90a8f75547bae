//! Applicant aggregate synchronization, shortlisting, and LLM enrichment.
//!
//! One applicant's data lives in two shapes at once: normalized child tables
//! (personal details, work experience, salary preferences) and a canonical
//! JSON snapshot stored on the applicant record. The modules here keep the
//! shapes in sync in both directions, apply the shortlisting policy, and
//! attach a qualitative model review to each profile.

pub mod domain;
pub mod enrichment;
pub mod repository;
pub mod service;
pub mod shortlist;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use domain::{ApplicantId, ApplicantSnapshot, FieldMap, RecordId, ShortlistStatus, Table};
pub use enrichment::{
    CompletionClient, CompletionError, EnrichmentClient, ProfileReview, RetryPolicy,
};
pub use repository::{Filter, Record, RecordRepository, RepositoryError};
pub use service::{ApplicantPipeline, BatchReport, PipelineConfig, PipelineError};
pub use shortlist::{ShortlistConfig, ShortlistDecision, ShortlistEngine, ShortlistOutcome};
pub use snapshot::{SnapshotSync, SyncError};
