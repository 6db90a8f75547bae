mod config;
pub(crate) mod rules;

pub use config::ShortlistConfig;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantSnapshot, ShortlistStatus};
use rules::assess_rules;

/// Stateless evaluator applying the shortlisting policy to a snapshot.
pub struct ShortlistEngine {
    config: ShortlistConfig,
}

impl ShortlistEngine {
    pub fn new(config: ShortlistConfig) -> Self {
        Self { config }
    }

    /// Pure decision over the canonical snapshot: the three rules combined
    /// with logical AND, plus the reason trail for every satisfied branch.
    pub fn assess(&self, snapshot: &ApplicantSnapshot) -> ShortlistOutcome {
        let signals = assess_rules(snapshot, &self.config);
        let decision = if signals.experience_ok && signals.compensation_ok && signals.location_ok {
            ShortlistDecision::Shortlisted
        } else {
            ShortlistDecision::NotAFit
        };

        ShortlistOutcome {
            decision,
            reasons: signals.reasons,
        }
    }
}

/// Final decision over the ANDed rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShortlistDecision {
    Shortlisted,
    NotAFit,
}

impl ShortlistDecision {
    pub const fn status(self) -> ShortlistStatus {
        match self {
            ShortlistDecision::Shortlisted => ShortlistStatus::Shortlisted,
            ShortlistDecision::NotAFit => ShortlistStatus::NotAFit,
        }
    }
}

/// Decision plus the human-readable reasons for satisfied rule branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistOutcome {
    pub decision: ShortlistDecision,
    pub reasons: Vec<String>,
}
