//! Arrest/search likelihood among similar stops

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use super::stop::gender_key;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LikelihoodQuery {
    #[validate(range(min = 16, max = 100, message = "driver age must be between 16 and 100"))]
    pub driver_age: i32,
    #[validate(length(min = 1, max = 10))]
    pub driver_gender: String,
    #[validate(length(min = 1, max = 100))]
    pub violation: String,
    #[validate(length(min = 1, max = 100))]
    pub country_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct LikelihoodCounts {
    pub total_stops: i64,
    pub total_arrests: i64,
    pub total_searches: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikelihoodStats {
    pub found: bool,
    pub total_stops: i64,
    pub arrest_rate: f64,
    pub search_rate: f64,
    pub message: String,
}

impl LikelihoodCounts {
    pub async fn fetch(pool: &PgPool, query: &LikelihoodQuery) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, LikelihoodCounts>(
            r#"
            SELECT
                COUNT(*) AS total_stops,
                COUNT(*) FILTER (WHERE is_arrested) AS total_arrests,
                COUNT(*) FILTER (WHERE search_conducted) AS total_searches
            FROM traffic_stops
            WHERE driver_age = $1
              AND CASE LOWER(TRIM(driver_gender))
                      WHEN 'm' THEN 'M' WHEN 'male' THEN 'M'
                      WHEN 'f' THEN 'F' WHEN 'female' THEN 'F'
                      ELSE LOWER(TRIM(driver_gender))
                  END = $2
              AND violation = $3
              AND country_name = $4
            "#
        )
        .bind(query.driver_age)
        .bind(gender_key(&query.driver_gender))
        .bind(query.violation.trim())
        .bind(query.country_name.trim())
        .fetch_one(pool)
        .await
    }
}

impl From<LikelihoodCounts> for LikelihoodStats {
    fn from(counts: LikelihoodCounts) -> Self {
        if counts.total_stops <= 0 {
            return Self {
                found: false,
                total_stops: 0,
                arrest_rate: 0.0,
                search_rate: 0.0,
                message: "No similar records found. Try adjusting your input.".to_string(),
            };
        }

        let arrest_rate = percentage(counts.total_arrests, counts.total_stops);
        let search_rate = percentage(counts.total_searches, counts.total_stops);

        Self {
            found: true,
            total_stops: counts.total_stops,
            arrest_rate,
            search_rate,
            message: format!(
                "Out of {} similar stops: Arrest Rate = {}%, Search Rate = {}%",
                counts.total_stops, arrest_rate, search_rate
            ),
        }
    }
}

fn percentage(part: i64, total: i64) -> f64 {
    let raw = part as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}
