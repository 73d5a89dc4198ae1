//! Route geometry provider.
//!
//! Candidate routes are out-and-back: for each of the eight compass
//! headings we aim a turnaround point at half the target distance, ask a
//! Directions-compatible API for a walking route to it, and grade the
//! result by how close its round-trip distance lands to the request.

use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use stride_core::{offset_by_bearing, CompassDirection, Coordinate, Route};

#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Generate candidate routes from `origin`, sorted by accuracy
    /// descending. An empty result means no direction produced a usable
    /// route.
    async fn generate(
        &self,
        origin: Coordinate,
        target_distance_km: f64,
    ) -> Result<Vec<Route>, ProviderError>;
}

/// HTTP client for a Google-Directions-compatible routing API.
pub struct DirectionsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    status: String,
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: PolylinePayload,
    legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Deserialize)]
struct PolylinePayload {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsLeg {
    distance: DistanceValue,
}

#[derive(Debug, Deserialize)]
struct DistanceValue {
    /// Meters.
    value: f64,
}

impl DirectionsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Fetch one walking route and return (outbound polyline, outbound km).
    async fn outbound_leg(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<(String, f64), ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("origin", format!("{},{}", origin.lat, origin.lng)),
                ("destination", format!("{},{}", destination.lat, destination.lng)),
                ("mode", "walking".to_string()),
                ("key", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(ProviderError::UpstreamStatus(status));
        }

        let body: DirectionsResponse = response.json().await?;
        parse_directions(body)
    }
}

fn parse_directions(body: DirectionsResponse) -> Result<(String, f64), ProviderError> {
    if body.status != "OK" {
        return Err(ProviderError::Decode(format!(
            "directions status {}",
            body.status
        )));
    }

    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or(ProviderError::MissingData("routes"))?;

    if route.legs.is_empty() {
        return Err(ProviderError::MissingData("route legs"));
    }

    let meters: f64 = route.legs.iter().map(|leg| leg.distance.value).sum();
    Ok((route.overview_polyline.points, meters / 1000.0))
}

/// Accuracy: how close the round-trip distance came to the request, 0-100.
fn accuracy_for(total_km: f64, target_km: f64) -> f64 {
    (100.0 - ((total_km - target_km) / target_km * 100.0).abs()).clamp(0.0, 100.0)
}

#[async_trait]
impl RouteProvider for DirectionsClient {
    #[tracing::instrument(skip(self))]
    async fn generate(
        &self,
        origin: Coordinate,
        target_distance_km: f64,
    ) -> Result<Vec<Route>, ProviderError> {
        let half_km = target_distance_km / 2.0;

        let requests = CompassDirection::ALL.map(|direction| async move {
            let turnaround = offset_by_bearing(origin, half_km, direction.bearing_deg());
            let leg = self.outbound_leg(origin, turnaround).await;
            (direction, leg)
        });

        let mut routes = Vec::new();
        for (direction, leg) in futures::future::join_all(requests).await {
            match leg {
                Ok((geometry, outbound_km)) => {
                    let total_km = outbound_km * 2.0;
                    routes.push(Route {
                        direction,
                        geometry,
                        accuracy: accuracy_for(total_km, target_distance_km),
                        total_distance_km: total_km,
                    });
                }
                Err(e) => {
                    tracing::warn!("no {} route: {}", direction.label(), e);
                }
            }
        }

        routes.sort_by(|a, b| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(routes)
    }
}
