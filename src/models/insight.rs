//! Canned analytical reports
//!
//! Each report is a fixed query with no user input. Rows come back as JSON
//! objects aggregated server-side, so every report shares one decoder
//! regardless of its column set.

use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    DrugVehicles,
    SearchedVehicles,
    ArrestRateByAge,
    GenderRace,
    StopsByHour,
    CountryViolation,
}

#[derive(Debug, Serialize)]
pub struct InsightDescriptor {
    pub kind: InsightKind,
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InsightResult {
    pub kind: InsightKind,
    pub title: &'static str,
    pub rows: Vec<serde_json::Value>,
}

impl InsightKind {
    pub const ALL: [InsightKind; 6] = [
        InsightKind::DrugVehicles,
        InsightKind::SearchedVehicles,
        InsightKind::ArrestRateByAge,
        InsightKind::GenderRace,
        InsightKind::StopsByHour,
        InsightKind::CountryViolation,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            InsightKind::DrugVehicles => "drug-vehicles",
            InsightKind::SearchedVehicles => "searched-vehicles",
            InsightKind::ArrestRateByAge => "arrest-rate-by-age",
            InsightKind::GenderRace => "gender-race",
            InsightKind::StopsByHour => "stops-by-hour",
            InsightKind::CountryViolation => "country-violation",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn title(self) -> &'static str {
        match self {
            InsightKind::DrugVehicles => "Top 10 Vehicles with Drug-Related Stops",
            InsightKind::SearchedVehicles => "Most Searched Vehicles",
            InsightKind::ArrestRateByAge => "Arrest Rate by Age Group",
            InsightKind::GenderRace => "Gender/Race Breakdowns",
            InsightKind::StopsByHour => "Time-Based Insights (Most Stops by Hour)",
            InsightKind::CountryViolation => "Country-wise/Violation Analytics",
        }
    }

    fn body_sql(self) -> &'static str {
        match self {
            InsightKind::DrugVehicles => r#"
                SELECT vehicle_number, COUNT(*) AS count FROM traffic_stops
                WHERE drugs_related_stop GROUP BY vehicle_number
                ORDER BY count DESC, vehicle_number LIMIT 10
            "#,
            InsightKind::SearchedVehicles => r#"
                SELECT vehicle_number, COUNT(*) AS count FROM traffic_stops
                WHERE search_conducted GROUP BY vehicle_number
                ORDER BY count DESC, vehicle_number LIMIT 10
            "#,
            InsightKind::ArrestRateByAge => r#"
                SELECT
                    CASE WHEN driver_age < 25 THEN 'Under 25'
                         WHEN driver_age BETWEEN 25 AND 35 THEN '25-35'
                         WHEN driver_age BETWEEN 36 AND 50 THEN '36-50'
                         ELSE 'Over 50' END AS age_group,
                    COUNT(*) AS total_stops,
                    COUNT(*) FILTER (WHERE is_arrested) AS arrests,
                    ROUND(COUNT(*) FILTER (WHERE is_arrested)::numeric / COUNT(*) * 100, 2) AS arrest_rate
                FROM traffic_stops WHERE driver_age IS NOT NULL
                GROUP BY age_group
                ORDER BY arrest_rate DESC
            "#,
            InsightKind::GenderRace => r#"
                SELECT driver_gender, driver_race, COUNT(*) AS total_stops,
                    COUNT(*) FILTER (WHERE is_arrested) AS arrests
                FROM traffic_stops
                GROUP BY driver_gender, driver_race
                ORDER BY total_stops DESC
            "#,
            InsightKind::StopsByHour => r#"
                SELECT EXTRACT(HOUR FROM stop_time)::int AS hour, COUNT(*) AS total_stops
                FROM traffic_stops
                WHERE stop_time IS NOT NULL
                GROUP BY hour
                ORDER BY total_stops DESC
                LIMIT 5
            "#,
            InsightKind::CountryViolation => r#"
                SELECT country_name, violation, COUNT(*) AS stop_count,
                    COUNT(*) FILTER (WHERE is_arrested) AS arrests
                FROM traffic_stops
                GROUP BY country_name, violation
                ORDER BY stop_count DESC
                LIMIT 10
            "#,
        }
    }

    /// Full query text; also the cache key for this report
    pub fn sql(self) -> String {
        format!(
            "SELECT COALESCE(json_agg(t), '[]'::json) FROM ({}) t",
            self.body_sql().trim()
        )
    }

    pub fn descriptor(self) -> InsightDescriptor {
        InsightDescriptor { kind: self, title: self.title() }
    }
}

impl InsightResult {
    pub async fn run(pool: &PgPool, kind: InsightKind) -> Result<Self, sqlx::Error> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(&kind.sql())
            .fetch_one(pool)
            .await?;

        let rows = match rows {
            serde_json::Value::Array(rows) => rows,
            other => vec![other],
        };

        Ok(Self { kind, title: kind.title(), rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_round_trip() {
        for kind in InsightKind::ALL {
            assert_eq!(InsightKind::from_slug(kind.slug()), Some(kind));
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.slug());
        }
        assert_eq!(InsightKind::from_slug("drop-table"), None);
    }

    #[test]
    fn test_sql_is_wrapped_and_single_statement() {
        for kind in InsightKind::ALL {
            let sql = kind.sql();
            assert!(sql.starts_with("SELECT COALESCE(json_agg(t)"));
            assert!(!sql.contains(';'), "{} must be a single statement", kind.slug());
        }
    }

    #[test]
    fn test_cache_keys_are_distinct() {
        let keys: std::collections::HashSet<String> =
            InsightKind::ALL.iter().map(|k| k.sql()).collect();
        assert_eq!(keys.len(), InsightKind::ALL.len());
    }
}
