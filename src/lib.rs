//! Batch pipeline keeping one applicant aggregate in two shapes at once:
//! normalized child tables and a canonical JSON profile stored on the
//! applicant record. Provides bidirectional sync between the shapes, a
//! deterministic shortlisting policy, and LLM-backed profile enrichment.

pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;
