//! In-memory collaborator fakes shared by the server's tests.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use stride_core::{
    polyline, BoundingBox, Closure, CompassDirection, Coordinate, Incident, IncidentAggregate,
    Route,
};
use stride_providers::{
    ClosureProvider, IncidentSource, ProviderError, RecommendationGenerator, RouteProvider,
    WeatherConditions, WeatherProvider,
};

/// Incident source backed by a fixed list; bounding-box and lookback
/// filtering behave like the sqlite store.
pub struct FixedIncidents {
    incidents: Vec<Incident>,
}

impl FixedIncidents {
    pub fn new(incidents: Vec<Incident>) -> Self {
        Self { incidents }
    }

    fn matching(&self, bbox: BoundingBox, days_back: i64) -> Vec<Incident> {
        let cutoff = Utc::now().date_naive() - ChronoDuration::days(days_back);
        self.incidents
            .iter()
            .filter(|incident| incident.occurred_on >= cutoff && bbox.contains(incident.location))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl IncidentSource for FixedIncidents {
    async fn query_bbox(
        &self,
        bbox: BoundingBox,
        days_back: i64,
    ) -> Result<Vec<Incident>, ProviderError> {
        Ok(self.matching(bbox, days_back))
    }

    async fn aggregate_bbox(
        &self,
        bbox: BoundingBox,
        days_back: i64,
    ) -> Result<IncidentAggregate, ProviderError> {
        Ok(IncidentAggregate::from_incidents(&self.matching(bbox, days_back)))
    }
}

/// A uniform lattice of recent incidents covering the whole baseline grid
/// around `center`, one every 0.005 degrees. Uniformity keeps every
/// neighborhood cell statistically identical, so scores come out at 100.
pub fn dense_incident_grid(center: Coordinate, injuries: u32, fatalities: u32) -> Vec<Incident> {
    let occurred_on = Utc::now().date_naive() - ChronoDuration::days(5);
    let mut incidents = Vec::new();
    for i in -12i32..=12 {
        for j in -12i32..=12 {
            incidents.push(Incident {
                id: incidents.len() as i64 + 1,
                occurred_on,
                location: Coordinate::new(
                    center.lat + f64::from(i) * 0.005,
                    center.lng + f64::from(j) * 0.005,
                ),
                injuries,
                fatalities,
            });
        }
    }
    incidents
}

/// An encoded straight-line route heading north from `start`.
pub fn route_through(start: Coordinate, n: usize) -> Route {
    let points: Vec<Coordinate> = (0..n)
        .map(|i| Coordinate::new(start.lat + i as f64 * 0.0005, start.lng))
        .collect();
    Route {
        direction: CompassDirection::North,
        geometry: polyline::encode(&points),
        accuracy: 95.0,
        total_distance_km: 5.0,
    }
}

pub fn route_with_accuracy(
    start: Coordinate,
    direction: CompassDirection,
    accuracy: f64,
) -> Route {
    Route {
        direction,
        accuracy,
        ..route_through(start, 40)
    }
}

pub fn closure(street_name: &str, work_start_date: &str) -> Closure {
    Closure {
        street_name: street_name.to_string(),
        work_start_date: work_start_date.to_string(),
        location: None,
    }
}

pub fn mild_weather() -> WeatherConditions {
    WeatherConditions {
        description: "clear sky".to_string(),
        temperature_c: 15.0,
        wind_speed_mps: 3.0,
        visibility_m: 10_000.0,
        rain_mm_per_h: 0.0,
        humidity_pct: 40.0,
    }
}

pub fn marginal_weather() -> WeatherConditions {
    WeatherConditions {
        temperature_c: -2.0,
        ..mild_weather()
    }
}

pub fn severe_weather() -> WeatherConditions {
    WeatherConditions {
        description: "thunderstorm".to_string(),
        rain_mm_per_h: 12.0,
        ..mild_weather()
    }
}

pub struct FixedRoutes(pub Vec<Route>);

#[async_trait]
impl RouteProvider for FixedRoutes {
    async fn generate(
        &self,
        _origin: Coordinate,
        _target_distance_km: f64,
    ) -> Result<Vec<Route>, ProviderError> {
        Ok(self.0.clone())
    }
}

pub struct FailingRoutes;

#[async_trait]
impl RouteProvider for FailingRoutes {
    async fn generate(
        &self,
        _origin: Coordinate,
        _target_distance_km: f64,
    ) -> Result<Vec<Route>, ProviderError> {
        Err(ProviderError::UpstreamStatus(503))
    }
}

pub struct FixedWeather(pub WeatherConditions);

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn current(&self, _point: Coordinate) -> Result<WeatherConditions, ProviderError> {
        Ok(self.0.clone())
    }
}

pub struct FailingWeather;

#[async_trait]
impl WeatherProvider for FailingWeather {
    async fn current(&self, _point: Coordinate) -> Result<WeatherConditions, ProviderError> {
        Err(ProviderError::UpstreamStatus(502))
    }
}

/// Returns the same closure list for every sample point.
pub struct FixedClosures(Vec<Closure>);

impl FixedClosures {
    pub fn new(closures: Vec<Closure>) -> Self {
        Self(closures)
    }
}

#[async_trait]
impl ClosureProvider for FixedClosures {
    async fn query(
        &self,
        _point: Coordinate,
        _radius_km: f64,
        _days_back: i64,
    ) -> Result<Vec<Closure>, ProviderError> {
        Ok(self.0.clone())
    }
}

pub struct CannedRecommender(pub &'static str);

#[async_trait]
impl RecommendationGenerator for CannedRecommender {
    async fn generate(&self, _context: &Value) -> Result<String, ProviderError> {
        Ok(self.0.to_string())
    }
}

pub struct FailingRecommender;

#[async_trait]
impl RecommendationGenerator for FailingRecommender {
    async fn generate(&self, _context: &Value) -> Result<String, ProviderError> {
        Err(ProviderError::MissingData("completion content"))
    }
}
