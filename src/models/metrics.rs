//! Dashboard summary metrics

use serde::Serialize;
use sqlx::{FromRow, PgPool};

pub const METRICS_SQL: &str = r#"
    SELECT
        COUNT(*) AS total_stops,
        COUNT(*) FILTER (WHERE is_arrested) AS total_arrests,
        COUNT(*) FILTER (WHERE drugs_related_stop) AS drug_related_stops,
        COUNT(*) FILTER (WHERE search_conducted) AS searches_conducted
    FROM traffic_stops
"#;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct SummaryMetrics {
    pub total_stops: i64,
    pub total_arrests: i64,
    pub drug_related_stops: i64,
    pub searches_conducted: i64,
}

impl SummaryMetrics {
    pub async fn fetch(pool: &PgPool) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SummaryMetrics>(METRICS_SQL)
            .fetch_one(pool)
            .await
    }
}
