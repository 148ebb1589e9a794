use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::segments;

/// Risk bands over the additive total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_total_score(total_score: i64) -> Self {
        if total_score <= 17 {
            RiskLevel::Low
        } else if total_score <= 28 {
            RiskLevel::Medium
        } else if total_score <= 39 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk (Level 1)",
            RiskLevel::Medium => "Medium Risk (Level 2)",
            RiskLevel::High => "High Risk (Level 3)",
            RiskLevel::VeryHigh => "Very High Risk (Level 4)",
        }
    }

    /// Probation period, depending on the client's sentence length.
    pub fn probation_period(&self, sentenced_two_years_or_less: bool) -> &'static str {
        match (self, sentenced_two_years_or_less) {
            (RiskLevel::Low | RiskLevel::Medium, true) => "6 months",
            (RiskLevel::Low | RiskLevel::Medium, false) => "1 year",
            (RiskLevel::High, true) => "1 year",
            (RiskLevel::High, false) => "2 years",
            (RiskLevel::VeryHigh, true) => "2 years",
            (RiskLevel::VeryHigh, false) => "3 years",
        }
    }

    pub fn supervision_frequency(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Once in 2 months",
            RiskLevel::Medium => "Once a month",
            RiskLevel::High => "Twice a month",
            RiskLevel::VeryHigh => "Twice a month",
        }
    }
}

/// Final computed record, written once after all 8 segments are confirmed
/// complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub total_score: i64,
    pub risk_level: RiskLevel,
    pub saved_at: DateTime<Utc>,
}

impl AssessmentResult {
    pub fn new(total_score: i64) -> Self {
        let result = AssessmentResult {
            total_score,
            risk_level: RiskLevel::from_total_score(total_score),
            saved_at: Utc::now(),
        };
        info!("📊 Assessment result computed: score {} → {}", total_score, result.risk_level.label());
        result
    }
}

fn answer_score(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        // Radio values arrive as strings; anything non-numeric scores zero
        Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// Sum every radio answer value across one segment's record. Only fields
/// carrying the segment's own prefix count toward the score.
pub fn segment_score(segment: u8, record: &Map<String, Value>) -> i64 {
    let prefix = segments::field_prefix(segment);
    record
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(_, value)| answer_score(value))
        .sum()
}

/// Additive total over the whole master record.
pub fn total_score(master: &Map<String, Value>) -> i64 {
    (1..=segments::SEGMENT_COUNT)
        .map(|segment| {
            master
                .get(&segments::storage_key(segment))
                .and_then(Value::as_object)
                .map(|record| segment_score(segment, record))
                .unwrap_or(0)
        })
        .sum()
}
