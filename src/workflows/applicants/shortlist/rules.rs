use chrono::NaiveDate;
use serde_json::Value;

use super::super::domain::{fields, ApplicantSnapshot, FieldMap};
use super::config::ShortlistConfig;

pub(crate) struct RuleSignals {
    pub experience_ok: bool,
    pub compensation_ok: bool,
    pub location_ok: bool,
    pub reasons: Vec<String>,
}

/// Apply the three rule predicates to a snapshot. Each satisfied branch
/// appends its own reason; missing or mistyped fields fail the affected rule
/// instead of raising.
pub(crate) fn assess_rules(snapshot: &ApplicantSnapshot, config: &ShortlistConfig) -> RuleSignals {
    let mut reasons = Vec::new();

    let total_years = total_experience_years(&snapshot.experience);
    let tier_one = snapshot.experience.iter().any(|entry| {
        text(entry, fields::COMPANY)
            .map(|company| {
                let company = company.to_lowercase();
                config.tier_one_companies.iter().any(|name| *name == company)
            })
            .unwrap_or(false)
    });

    // Both experience branches may fire; each carries its own reason.
    let mut experience_ok = false;
    if total_years >= config.minimum_total_years {
        experience_ok = true;
        reasons.push(format!(
            "Met experience threshold with {total_years:.1} years."
        ));
    }
    if tier_one {
        experience_ok = true;
        reasons.push("Has experience at a Tier-1 company.".to_string());
    }

    // A missing preferred rate reads as infinitely high and fails the rule.
    let rate = number(&snapshot.salary, fields::PREFERRED_RATE).unwrap_or(f64::INFINITY);
    let currency = text(&snapshot.salary, fields::CURRENCY).unwrap_or("");
    let availability = number(&snapshot.salary, fields::AVAILABILITY).unwrap_or(0.0);

    let compensation_ok = rate <= config.maximum_hourly_rate
        && currency == config.required_currency
        && availability >= config.minimum_weekly_hours;
    if compensation_ok {
        reasons.push(format!(
            "Compensation expectations are within budget (Rate: ${rate}/hr, Availability: {availability} hrs/wk)."
        ));
    }

    let location = text(&snapshot.personal, fields::LOCATION).unwrap_or("");
    let lowered = location.to_lowercase();
    let location_ok = config
        .approved_regions
        .iter()
        .any(|region| lowered.contains(region.as_str()));
    if location_ok {
        reasons.push(format!("Located in an approved region: {location}."));
    }

    RuleSignals {
        experience_ok,
        compensation_ok,
        location_ok,
        reasons,
    }
}

/// Sum of employment durations in years. Entries missing either date, or
/// whose dates do not parse as `%Y-%m-%d`, contribute nothing.
pub(crate) fn total_experience_years(entries: &[FieldMap]) -> f64 {
    entries
        .iter()
        .filter_map(|entry| {
            let start = parse_date(text(entry, fields::START_DATE)?)?;
            let end = parse_date(text(entry, fields::END_DATE)?)?;
            Some((end - start).num_days() as f64 / 365.25)
        })
        .sum()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn text<'a>(map: &'a FieldMap, name: &str) -> Option<&'a str> {
    map.get(name).and_then(Value::as_str)
}

fn number(map: &FieldMap, name: &str) -> Option<f64> {
    map.get(name).and_then(Value::as_f64)
}
