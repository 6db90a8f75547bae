//! Workflow implementations grouped by business capability.

pub mod applicants;
