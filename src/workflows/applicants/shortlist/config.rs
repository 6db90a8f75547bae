use serde::{Deserialize, Serialize};

/// Shortlisting policy: thresholds and allow-lists behind the three rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistConfig {
    pub minimum_total_years: f64,
    pub maximum_hourly_rate: f64,
    pub required_currency: String,
    pub minimum_weekly_hours: f64,
    /// Employers treated as an automatic pass for the experience rule,
    /// compared case-insensitively against the full company name.
    pub tier_one_companies: Vec<String>,
    /// Region names and abbreviations matched as substrings of the
    /// lower-cased location.
    pub approved_regions: Vec<String>,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            minimum_total_years: 4.0,
            maximum_hourly_rate: 100.0,
            required_currency: "USD".to_string(),
            minimum_weekly_hours: 20.0,
            tier_one_companies: [
                "google",
                "meta",
                "openai",
                "amazon",
                "apple",
                "netflix",
                "microsoft",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            approved_regions: [
                "us",
                "usa",
                "united states",
                "canada",
                "uk",
                "united kingdom",
                "germany",
                "india",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
        }
    }
}
