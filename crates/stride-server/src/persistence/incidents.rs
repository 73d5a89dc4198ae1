//! sqlite-backed incident source.
//!
//! The `BETWEEN` predicates are the rectangular prefilter; exact radius
//! filtering happens in the analysis layer, not here.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use sqlx::SqlitePool;
use stride_core::{BoundingBox, Coordinate, Incident, IncidentAggregate};
use stride_providers::{IncidentSource, ProviderError};

use super::Database;

#[derive(Clone)]
pub struct SqliteIncidentStore {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct IncidentRow {
    id: i64,
    occurred_on: String,
    latitude: f64,
    longitude: f64,
    injuries: i64,
    fatalities: i64,
}

impl SqliteIncidentStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Total row count, used at startup to log how much history is loaded.
    pub async fn count(&self) -> Result<i64, ProviderError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM incidents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ProviderError::Source(e.to_string()))?;
        Ok(count)
    }
}

fn cutoff_date(days_back: i64) -> String {
    (Utc::now().date_naive() - ChronoDuration::days(days_back)).to_string()
}

fn row_to_incident(row: IncidentRow) -> Result<Incident, ProviderError> {
    let occurred_on = NaiveDate::parse_from_str(&row.occurred_on, "%Y-%m-%d")
        .map_err(|e| ProviderError::Source(format!("bad occurred_on '{}': {e}", row.occurred_on)))?;

    Ok(Incident {
        id: row.id,
        occurred_on,
        location: Coordinate::new(row.latitude, row.longitude),
        injuries: row.injuries.max(0) as u32,
        fatalities: row.fatalities.max(0) as u32,
    })
}

#[async_trait]
impl IncidentSource for SqliteIncidentStore {
    async fn query_bbox(
        &self,
        bbox: BoundingBox,
        days_back: i64,
    ) -> Result<Vec<Incident>, ProviderError> {
        let rows = sqlx::query_as::<_, IncidentRow>(
            r#"
            SELECT id, occurred_on, latitude, longitude, injuries, fatalities
            FROM incidents
            WHERE latitude BETWEEN ?1 AND ?2
              AND longitude BETWEEN ?3 AND ?4
              AND occurred_on >= ?5
            "#,
        )
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lng)
        .bind(bbox.max_lng)
        .bind(cutoff_date(days_back))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ProviderError::Source(e.to_string()))?;

        rows.into_iter().map(row_to_incident).collect()
    }

    async fn aggregate_bbox(
        &self,
        bbox: BoundingBox,
        days_back: i64,
    ) -> Result<IncidentAggregate, ProviderError> {
        let (incidents, injuries, fatalities): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(injuries), 0), COALESCE(SUM(fatalities), 0)
            FROM incidents
            WHERE latitude BETWEEN ?1 AND ?2
              AND longitude BETWEEN ?3 AND ?4
              AND occurred_on >= ?5
            "#,
        )
        .bind(bbox.min_lat)
        .bind(bbox.max_lat)
        .bind(bbox.min_lng)
        .bind(bbox.max_lng)
        .bind(cutoff_date(days_back))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ProviderError::Source(e.to_string()))?;

        Ok(IncidentAggregate {
            total_incidents: incidents.max(0) as u64,
            total_injuries: injuries.max(0) as u64,
            total_fatalities: fatalities.max(0) as u64,
        })
    }
}
