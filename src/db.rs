//! Database module - PostgreSQL connection and schema bootstrap

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Simple query protocol: the schema is several statements
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Traffic stop log (append-only)
CREATE TABLE IF NOT EXISTS traffic_stops (
    stop_id BIGSERIAL PRIMARY KEY,
    stop_date DATE,
    stop_time TIME,
    country_name VARCHAR(100),
    driver_gender VARCHAR(10),
    driver_age INT CHECK (driver_age BETWEEN 16 AND 100),
    driver_race VARCHAR(50),
    violation VARCHAR(100),
    search_conducted BOOLEAN NOT NULL DEFAULT false,
    is_arrested BOOLEAN NOT NULL DEFAULT false,
    drugs_related_stop BOOLEAN NOT NULL DEFAULT false,
    stop_duration VARCHAR(50),
    stop_outcome VARCHAR(50),
    vehicle_number VARCHAR(50),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_traffic_stops_created ON traffic_stops(created_at);
CREATE INDEX IF NOT EXISTS idx_traffic_stops_vehicle ON traffic_stops(vehicle_number);
"#;
