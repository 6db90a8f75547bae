use serde_json::Value;

use super::super::domain::{fields, FieldMap};

/// Structured fields extracted from a model review.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileReview {
    pub summary: Option<String>,
    pub score: Option<i64>,
    pub follow_ups: Option<String>,
}

impl ProfileReview {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.score.is_none() && self.follow_ups.is_none()
    }

    /// Field payload for the single persistence update. Empty reviews must
    /// not be written; callers check [`ProfileReview::is_empty`] first.
    pub fn into_fields(self) -> FieldMap {
        let mut map = FieldMap::new();
        if let Some(summary) = self.summary {
            map.insert(fields::LLM_SUMMARY.to_string(), Value::String(summary));
        }
        if let Some(score) = self.score {
            map.insert(fields::LLM_SCORE.to_string(), Value::from(score));
        }
        if let Some(follow_ups) = self.follow_ups {
            map.insert(fields::LLM_FOLLOW_UPS.to_string(), Value::String(follow_ups));
        }
        map
    }
}

const FOLLOW_UPS_MARKER: &str = "Follow-Ups:";

/// Parse the line-oriented review format.
///
/// The text splits at the first `Follow-Ups:` marker; without one the whole
/// response is the main section and follow-ups stay empty. The `Issues:`
/// line is recognized and dropped on purpose: the applicant record has no
/// destination field for it.
pub fn parse_review(content: &str) -> ProfileReview {
    let (main, follow_ups) = match content.find(FOLLOW_UPS_MARKER) {
        Some(index) => {
            let after = &content[index + FOLLOW_UPS_MARKER.len()..];
            (&content[..index], Some(after.trim().to_string()))
        }
        None => (content, None),
    };

    let mut review = ProfileReview {
        follow_ups,
        ..ProfileReview::default()
    };

    for line in main.trim().lines() {
        if let Some(rest) = line.strip_prefix("Summary:") {
            review.summary = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Score:") {
            review.score = Some(parse_score(rest.trim()));
        } else if line.starts_with("Issues:") {
            // Recognized but dropped: the applicant record has no issues field.
        }
    }

    review
}

/// A pure digit string parses to its value; anything else degrades to 0.
fn parse_score(text: &str) -> i64 {
    if !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit()) {
        text.parse().unwrap_or(0)
    } else {
        0
    }
}

/// Fixed request template sent to the completion service.
pub fn build_prompt(profile_json: &str) -> String {
    format!(
        "You are a highly experienced recruiting analyst. Your task is to evaluate a candidate's profile provided in JSON format.\n\
         Analyze the data and provide four specific things in your response:\n\
         1. A concise professional summary of the applicant in 75 words or less.\n\
         2. An overall quality score from 1 to 10, where 10 is outstanding.\n\
         3. A list of any significant data gaps, inconsistencies, or red flags you notice.\n\
         4. A list of up to three insightful follow-up questions to ask the candidate to clarify their profile.\n\
         \n\
         Here is the applicant's JSON profile:\n\
         {profile_json}\n\
         \n\
         Return your response in the following exact format, with each item on a new line:\n\
         Summary: <Your summary text here>\n\
         Score: <A single integer from 1-10>\n\
         Issues: <A comma-separated list of issues, or 'None'>\n\
         Follow-Ups:\n\
         - <Question 1>\n\
         - <Question 2>"
    )
}
