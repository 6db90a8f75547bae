use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Loose field payload used by the schemaless record store.
pub type FieldMap = Map<String, Value>;

/// External applicant identifier, assigned outside this system, used as the
/// join key linking child records to their parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicantId(pub String);

impl ApplicantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned identifier of one record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

/// Tables making up the applicant aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Applicants,
    PersonalDetails,
    WorkExperience,
    SalaryPreferences,
    ShortlistedLeads,
}

impl Table {
    pub const fn name(self) -> &'static str {
        match self {
            Table::Applicants => "Applicants",
            Table::PersonalDetails => "Personal Details",
            Table::WorkExperience => "Work Experience",
            Table::SalaryPreferences => "Salary Preferences",
            Table::ShortlistedLeads => "Shortlisted Leads",
        }
    }
}

/// Field names used across the store's tables.
pub mod fields {
    /// Join key correlating child records with their applicant.
    pub const APPLICANT_ID: &str = "Applicant ID";
    /// Snapshot text stored on the applicant record.
    pub const COMPRESSED_PROFILE: &str = "Compressed JSON";
    pub const SHORTLIST_STATUS: &str = "Shortlist Status";
    pub const SCORE_REASON: &str = "Score Reason";
    pub const LLM_SUMMARY: &str = "LLM Summary";
    pub const LLM_SCORE: &str = "LLM Score";
    pub const LLM_FOLLOW_UPS: &str = "LLM Follow-Ups";

    pub const LOCATION: &str = "Location";
    pub const COMPANY: &str = "Company";
    pub const START_DATE: &str = "Start";
    pub const END_DATE: &str = "End";
    pub const PREFERRED_RATE: &str = "Preferred Rate";
    pub const CURRENCY: &str = "Currency";
    pub const AVAILABILITY: &str = "Availability (hrs/wk)";
}

/// Shortlist state tracked on the applicant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortlistStatus {
    NotEvaluated,
    Shortlisted,
    NotAFit,
}

impl ShortlistStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ShortlistStatus::NotEvaluated => "Not Evaluated",
            ShortlistStatus::Shortlisted => "Shortlisted",
            ShortlistStatus::NotAFit => "Not a fit",
        }
    }

    /// Unknown labels fold back to the initial sentinel.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Shortlisted" => ShortlistStatus::Shortlisted,
            "Not a fit" => ShortlistStatus::NotAFit,
            _ => ShortlistStatus::NotEvaluated,
        }
    }
}

/// Canonical denormalized profile for one applicant.
///
/// Exactly three top-level keys. Child payloads stay raw field maps so
/// descriptive fields the pipeline does not interpret survive a round-trip;
/// the join key is never stored inside them. Empty children encode as `{}`
/// or `[]`, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicantSnapshot {
    #[serde(default)]
    pub personal: FieldMap,
    #[serde(default)]
    pub experience: Vec<FieldMap>,
    #[serde(default)]
    pub salary: FieldMap,
}

impl ApplicantSnapshot {
    /// Storage encoding of the snapshot: human-readable UTF-8 JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
