//! Load a CSV extract of historical incidents into the sqlite store.
//!
//! Usage: import_incidents <incidents.csv>
//!
//! Expected headers: occurred_on,latitude,longitude,injuries,fatalities
//! (occurred_on may carry a time suffix; only the date part is kept).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;

use stride_server::config::Config;
use stride_server::persistence;

#[derive(Debug, Deserialize)]
struct IncidentRecord {
    occurred_on: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    injuries: u32,
    #[serde(default)]
    fatalities: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: import_incidents <incidents.csv>");
    };

    let config = Config::from_env();
    let db =
        persistence::init_database(&config.database_path, config.database_max_connections).await?;

    let mut reader = csv::Reader::from_path(&path).with_context(|| format!("open {path}"))?;
    let mut imported = 0u64;
    let mut skipped = 0u64;

    for row in reader.deserialize::<IncidentRecord>() {
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("skipping malformed row: {e}");
                skipped += 1;
                continue;
            }
        };

        let date_part = record
            .occurred_on
            .get(..10)
            .unwrap_or(record.occurred_on.as_str());
        let occurred_on = match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            Ok(date) => date,
            Err(_) => {
                tracing::warn!("skipping row with bad date '{}'", record.occurred_on);
                skipped += 1;
                continue;
            }
        };

        sqlx::query(
            "INSERT INTO incidents (occurred_on, latitude, longitude, injuries, fatalities) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(occurred_on.to_string())
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(i64::from(record.injuries))
        .bind(i64::from(record.fatalities))
        .execute(db.pool())
        .await?;

        imported += 1;
        if imported % 10_000 == 0 {
            tracing::info!("{imported} rows imported...");
        }
    }

    tracing::info!("done: {imported} imported, {skipped} skipped");
    Ok(())
}
