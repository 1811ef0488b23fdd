//! Outcome estimator
//!
//! Looks up historical stops that share every attribute of a new stop and
//! reports the most common violation and outcome among them. Matching is
//! exact and categorical: gender compares by canonical form (`M`, `male`
//! and `Male` are the same), everything else must be equal. Ties go to the label seen first in record order.
//!
//! ```text
//!   snapshot ──► filter(gender, age, search, drugs, duration) ──► mode(violation)
//!                                                             └─► mode(outcome)
//!                      (empty or unlabeled) ──► ("speeding", "warning")
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::StopRecord;
use crate::models::stop::{bool_from_flag, gender_key, normalize_gender};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const FALLBACK_VIOLATION: &str = "speeding";
pub const FALLBACK_OUTCOME: &str = "warning";

// ============================================================================
// TYPES
// ============================================================================

/// Attributes a caller supplies to request an estimate. All are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct QueryFeatures {
    #[validate(length(min = 1, max = 10))]
    pub gender: String,
    #[validate(range(min = 16, max = 100, message = "driver age must be between 16 and 100"))]
    pub age: i32,
    #[serde(deserialize_with = "bool_from_flag")]
    pub search_conducted: bool,
    #[serde(deserialize_with = "bool_from_flag")]
    pub drugs_related_stop: bool,
    #[validate(length(min = 1, max = 50))]
    pub stop_duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub violation: String,
    pub outcome: String,
}

/// Passthrough fields echoed into the summary text; never used for matching
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionContext {
    pub stop_date: Option<String>,
    pub stop_time: Option<String>,
    pub country_name: Option<String>,
    pub vehicle_number: Option<String>,
}

// ============================================================================
// ESTIMATION
// ============================================================================

impl QueryFeatures {
    pub fn matches(&self, record: &StopRecord) -> bool {
        record
            .driver_gender
            .as_deref()
            .is_some_and(|g| gender_key(g) == gender_key(&self.gender))
            && record.driver_age == Some(self.age)
            && record.search_conducted == self.search_conducted
            && record.drugs_related_stop == self.drugs_related_stop
            && record.stop_duration.as_deref() == Some(self.stop_duration.as_str())
    }
}

impl Estimate {
    pub fn fallback() -> Self {
        Self {
            violation: FALLBACK_VIOLATION.to_string(),
            outcome: FALLBACK_OUTCOME.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.violation == FALLBACK_VIOLATION && self.outcome == FALLBACK_OUTCOME
    }

    pub fn describe(&self, features: &QueryFeatures, context: &PredictionContext) -> String {
        let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "unknown".to_string());

        format!(
            "A {}-year-old {} driver in {} was stopped for {} at {} on {}. \
             {} and the stop was {}drug-related. Stop duration: {}. Vehicle number: {}. \
             Predicted violation: {}. Predicted outcome: {}.",
            features.age,
            gender_word(&features.gender),
            field(&context.country_name),
            self.violation,
            field(&context.stop_time),
            field(&context.stop_date),
            if features.search_conducted { "A search was conducted" } else { "No search was conducted" },
            if features.drugs_related_stop { "" } else { "not " },
            features.stop_duration,
            field(&context.vehicle_number),
            self.violation,
            self.outcome,
        )
    }
}

/// Most common violation and outcome among records matching `features`.
///
/// Never fails: no match, or a match set with no labels, yields
/// [`Estimate::fallback`].
pub fn estimate(records: &[StopRecord], features: &QueryFeatures) -> Estimate {
    let matched: Vec<&StopRecord> = records.iter().filter(|r| features.matches(r)).collect();

    if matched.is_empty() {
        return Estimate::fallback();
    }

    let violation = mode(matched.iter().filter_map(|r| r.violation.as_deref()));
    let outcome = mode(matched.iter().filter_map(|r| r.stop_outcome.as_deref()));

    match (violation, outcome) {
        (Some(violation), Some(outcome)) => Estimate {
            violation: violation.to_string(),
            outcome: outcome.to_string(),
        },
        _ => Estimate::fallback(),
    }
}

/// Most frequent value; on equal counts the earliest-seen value wins.
pub fn mode<'a, I>(values: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    // value -> (first index, count)
    let mut tally: HashMap<&'a str, (usize, usize)> = HashMap::new();
    for (index, value) in values.into_iter().enumerate() {
        tally.entry(value).or_insert((index, 0)).1 += 1;
    }

    tally
        .into_iter()
        .max_by(|(_, (first_a, count_a)), (_, (first_b, count_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

fn gender_word(gender: &str) -> &str {
    match normalize_gender(gender) {
        Some("M") => "male",
        Some("F") => "female",
        _ => gender,
    }
}
