//! Traffic stop model

use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, PgPool};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use validator::{Validate, ValidationError};

/// Upper bound for any caller-supplied row limit
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StopRecord {
    pub stop_id: i64,
    pub stop_date: Option<NaiveDate>,
    pub stop_time: Option<NaiveTime>,
    pub country_name: Option<String>,
    pub driver_gender: Option<String>,
    pub driver_age: Option<i32>,
    pub driver_race: Option<String>,
    pub violation: Option<String>,
    pub search_conducted: bool,
    pub is_arrested: bool,
    pub drugs_related_stop: bool,
    pub stop_duration: Option<String>,
    pub stop_outcome: Option<String>,
    pub vehicle_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Log-entry payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewStopRecord {
    pub stop_date: NaiveDate,
    #[serde(default = "default_stop_time")]
    pub stop_time: NaiveTime,
    #[validate(length(min = 1, max = 100, message = "country name is required"))]
    pub country_name: String,
    #[validate(custom(function = "validate_gender"))]
    pub driver_gender: String,
    #[validate(range(min = 16, max = 100, message = "driver age must be between 16 and 100"))]
    pub driver_age: i32,
    #[validate(length(max = 50))]
    pub driver_race: Option<String>,
    #[validate(length(min = 1, max = 100, message = "violation is required"))]
    pub violation: String,
    #[serde(deserialize_with = "bool_from_flag")]
    pub search_conducted: bool,
    #[serde(deserialize_with = "bool_from_flag")]
    pub is_arrested: bool,
    #[serde(deserialize_with = "bool_from_flag")]
    pub drugs_related_stop: bool,
    #[validate(length(max = 50))]
    pub stop_duration: Option<String>,
    #[validate(length(max = 50))]
    pub stop_outcome: Option<String>,
    #[validate(length(min = 1, max = 50, message = "vehicle number is required"))]
    pub vehicle_number: String,
}

/// Quick search query
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchFilter {
    pub vehicle_number: Option<String>,
    pub gender: Option<String>,
    pub limit: Option<i64>,
}

impl SearchFilter {
    /// Vehicle substring, or `None` when blank
    pub fn vehicle_term(&self) -> Option<&str> {
        self.vehicle_number
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Gender filter; blank and "Any" both mean unfiltered
    pub fn gender_term(&self) -> Option<&str> {
        self.gender
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case("any"))
    }
}

fn default_stop_time() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// Canonical stored form of a driver gender: `"M"` or `"F"`.
///
/// Accepts the letter or the word in any case; anything else is `None`.
pub fn normalize_gender(value: &str) -> Option<&'static str> {
    match value.trim().to_ascii_lowercase().as_str() {
        "m" | "male" => Some("M"),
        "f" | "female" => Some("F"),
        _ => None,
    }
}

/// Comparison key for a gender value: the canonical form when recognised,
/// otherwise the lowercased text
pub fn gender_key(value: &str) -> String {
    normalize_gender(value)
        .map(str::to_string)
        .unwrap_or_else(|| value.trim().to_ascii_lowercase())
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    match normalize_gender(value) {
        Some(_) => Ok(()),
        None => {
            let mut err = ValidationError::new("gender");
            err.message = Some("driver gender must be M or F".into());
            Err(err)
        }
    }
}

/// Accepts `true`/`false` as well as the 0/1 encoding used by the forms
pub(crate) fn bool_from_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Text(s) if s == "0" || s.eq_ignore_ascii_case("false") => Ok(false),
        Flag::Text(s) if s == "1" || s.eq_ignore_ascii_case("true") => Ok(true),
        _ => Err(serde::de::Error::custom("expected a boolean or 0/1")),
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn clamp_limit(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

impl StopRecord {
    pub async fn create(pool: &PgPool, data: NewStopRecord) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, StopRecord>(
            r#"
            INSERT INTO traffic_stops (
                stop_date, stop_time, country_name, driver_gender, driver_age, driver_race,
                violation, search_conducted, is_arrested, drugs_related_stop,
                stop_duration, stop_outcome, vehicle_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#
        )
        .bind(data.stop_date)
        .bind(data.stop_time)
        .bind(data.country_name.trim())
        .bind(normalize_gender(&data.driver_gender).unwrap_or(data.driver_gender.trim()))
        .bind(data.driver_age)
        .bind(&data.driver_race)
        .bind(data.violation.trim())
        .bind(data.search_conducted)
        .bind(data.is_arrested)
        .bind(data.drugs_related_stop)
        .bind(&data.stop_duration)
        .bind(&data.stop_outcome)
        .bind(data.vehicle_number.trim())
        .fetch_one(pool)
        .await
    }

    /// Latest rows, newest first
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StopRecord>(
            "SELECT * FROM traffic_stops ORDER BY created_at DESC, stop_id DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn search(pool: &PgPool, filter: &SearchFilter, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        let vehicle = filter.vehicle_term().map(escape_like);

        sqlx::query_as::<_, StopRecord>(
            r#"
            SELECT * FROM traffic_stops
            WHERE ($1::text IS NULL OR vehicle_number ILIKE '%' || $1 || '%' ESCAPE '\')
              AND ($2::text IS NULL OR
                   CASE LOWER(TRIM(driver_gender))
                       WHEN 'm' THEN 'M' WHEN 'male' THEN 'M'
                       WHEN 'f' THEN 'F' WHEN 'female' THEN 'F'
                       ELSE LOWER(TRIM(driver_gender))
                   END = $2)
            ORDER BY created_at DESC, stop_id DESC
            LIMIT $3
            "#
        )
        .bind(vehicle)
        .bind(filter.gender_term().map(gender_key))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Every row in insertion order; feeds the estimator snapshot
    pub async fn load_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, StopRecord>("SELECT * FROM traffic_stops ORDER BY stop_id")
            .fetch_all(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> serde_json::Value {
        json!({
            "stop_date": "2024-03-01",
            "stop_time": "08:15:00",
            "country_name": "Canada",
            "driver_gender": "M",
            "driver_age": 34,
            "violation": "Speeding",
            "search_conducted": 0,
            "is_arrested": false,
            "drugs_related_stop": "1",
            "vehicle_number": "TN01AB1234"
        })
    }

    #[test]
    fn test_flags_accept_ints_and_bools() {
        let record: NewStopRecord = serde_json::from_value(payload()).unwrap();
        assert!(!record.search_conducted);
        assert!(!record.is_arrested);
        assert!(record.drugs_related_stop);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_flag_rejects_other_numbers() {
        let mut body = payload();
        body["is_arrested"] = json!(2);
        assert!(serde_json::from_value::<NewStopRecord>(body).is_err());
    }

    #[test]
    fn test_stop_time_defaults_to_noon() {
        let mut body = payload();
        body.as_object_mut().unwrap().remove("stop_time");
        let record: NewStopRecord = serde_json::from_value(body).unwrap();
        assert_eq!(record.stop_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn test_age_out_of_range_rejected() {
        for age in [15, 101] {
            let mut body = payload();
            body["driver_age"] = json!(age);
            let record: NewStopRecord = serde_json::from_value(body).unwrap();
            let errors = record.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("driver_age"));
        }
    }

    #[test]
    fn test_gender_validation() {
        for ok in ["M", "f", "Male", "FEMALE"] {
            assert!(validate_gender(ok).is_ok(), "{ok} should be accepted");
        }
        for bad in ["", "X", "unknown"] {
            assert!(validate_gender(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_blank_required_text_rejected() {
        let mut body = payload();
        body["vehicle_number"] = json!("");
        let record: NewStopRecord = serde_json::from_value(body).unwrap();
        assert!(record.validate().unwrap_err().field_errors().contains_key("vehicle_number"));
    }

    #[test]
    fn test_gender_aliases_share_one_key() {
        assert_eq!(normalize_gender(" male "), Some("M"));
        assert_eq!(normalize_gender("m"), Some("M"));
        assert_eq!(normalize_gender("FEMALE"), Some("F"));
        assert_eq!(normalize_gender("x"), None);

        assert_eq!(gender_key("Male"), gender_key("M"));
        assert_eq!(gender_key("f"), gender_key("Female"));
        assert_ne!(gender_key("M"), gender_key("F"));
        assert_eq!(gender_key(" Other "), "other");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("AB12"), "AB12");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_search_filter_terms() {
        let filter = SearchFilter {
            vehicle_number: Some("  ".to_string()),
            gender: Some("Any".to_string()),
            limit: None,
        };
        assert_eq!(filter.vehicle_term(), None);
        assert_eq!(filter.gender_term(), None);

        let filter = SearchFilter {
            vehicle_number: Some(" TN01 ".to_string()),
            gender: Some("F".to_string()),
            limit: None,
        };
        assert_eq!(filter.vehicle_term(), Some("TN01"));
        assert_eq!(filter.gender_term(), Some("F"));
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, 20), 20);
        assert_eq!(clamp_limit(Some(0), 20), 1);
        assert_eq!(clamp_limit(Some(5000), 20), MAX_PAGE_SIZE);
    }
}
