//! Street closure / roadwork lookups.

use crate::error::ProviderError;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stride_core::{BoundingBox, Closure, Coordinate};

#[async_trait]
pub trait ClosureProvider: Send + Sync {
    /// Closures reported within `radius_km` of `point` whose work started
    /// inside the lookback window.
    async fn query(
        &self,
        point: Coordinate,
        radius_km: f64,
        days_back: i64,
    ) -> Result<Vec<Closure>, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureImpact {
    None,
    Low,
    Moderate,
    High,
}

/// Impact classification for a set of closures along one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosureAssessment {
    pub impact: ClosureImpact,
    pub message: String,
}

/// Classify how much a closure count should worry a runner.
pub fn assess_closure_impact(total_closures: usize) -> ClosureAssessment {
    let (impact, message) = match total_closures {
        0 => (ClosureImpact::None, "no reported closures near this route"),
        1..=2 => (
            ClosureImpact::Low,
            "a couple of closures nearby; minor detours possible",
        ),
        3..=5 => (
            ClosureImpact::Moderate,
            "several active closures along the route; expect detours",
        ),
        _ => (
            ClosureImpact::High,
            "heavy roadwork activity along the route; consider a different area",
        ),
    };

    ClosureAssessment {
        impact,
        message: message.to_string(),
    }
}

/// HTTP client for a Socrata-style open-data closures endpoint.
pub struct StreetClosureClient {
    client: Client,
    base_url: String,
    app_token: Option<String>,
}

/// Socrata returns every field as a string.
#[derive(Debug, Deserialize)]
struct ClosureRecord {
    street_name: Option<String>,
    work_start_date: Option<String>,
    latitude: Option<String>,
    longitude: Option<String>,
}

impl StreetClosureClient {
    pub fn new(
        base_url: impl Into<String>,
        app_token: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            app_token,
        }
    }
}

fn record_to_closure(record: ClosureRecord) -> Option<Closure> {
    let street_name = record.street_name?;
    let location = match (record.latitude, record.longitude) {
        (Some(lat), Some(lng)) => match (lat.parse(), lng.parse()) {
            (Ok(lat), Ok(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        },
        _ => None,
    };

    Some(Closure {
        street_name,
        work_start_date: record.work_start_date.unwrap_or_default(),
        location,
    })
}

#[async_trait]
impl ClosureProvider for StreetClosureClient {
    #[tracing::instrument(skip(self))]
    async fn query(
        &self,
        point: Coordinate,
        radius_km: f64,
        days_back: i64,
    ) -> Result<Vec<Closure>, ProviderError> {
        let bbox = BoundingBox::around(point, radius_km);
        let cutoff = (Utc::now() - ChronoDuration::days(days_back))
            .format("%Y-%m-%dT00:00:00")
            .to_string();

        let filter = format!(
            "latitude between '{}' and '{}' AND longitude between '{}' and '{}' AND work_start_date >= '{}'",
            bbox.min_lat, bbox.max_lat, bbox.min_lng, bbox.max_lng, cutoff
        );

        let mut request = self
            .client
            .get(&self.base_url)
            .query(&[("$where", filter), ("$limit", "200".to_string())]);
        if let Some(token) = &self.app_token {
            request = request.header("X-App-Token", token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(ProviderError::UpstreamStatus(status));
        }

        let records: Vec<ClosureRecord> = response.json().await?;
        Ok(records.into_iter().filter_map(record_to_closure).collect())
    }
}
