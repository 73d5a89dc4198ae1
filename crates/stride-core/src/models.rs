//! Core data models for route generation and safety analysis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True if both components are inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Compass heading a candidate route is generated toward.
///
/// The route provider aims one out-and-back route at each of the eight
/// headings and labels the result with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::North,
        CompassDirection::Northeast,
        CompassDirection::East,
        CompassDirection::Southeast,
        CompassDirection::South,
        CompassDirection::Southwest,
        CompassDirection::West,
        CompassDirection::Northwest,
    ];

    /// Bearing in degrees, 0 = north, clockwise.
    pub fn bearing_deg(&self) -> f64 {
        match self {
            CompassDirection::North => 0.0,
            CompassDirection::Northeast => 45.0,
            CompassDirection::East => 90.0,
            CompassDirection::Southeast => 135.0,
            CompassDirection::South => 180.0,
            CompassDirection::Southwest => 225.0,
            CompassDirection::West => 270.0,
            CompassDirection::Northwest => 315.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CompassDirection::North => "North",
            CompassDirection::Northeast => "Northeast",
            CompassDirection::East => "East",
            CompassDirection::Southeast => "Southeast",
            CompassDirection::South => "South",
            CompassDirection::Southwest => "Southwest",
            CompassDirection::West => "West",
            CompassDirection::Northwest => "Northwest",
        }
    }
}

/// A candidate out-and-back route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub direction: CompassDirection,
    /// Encoded polyline of the outbound leg; the runner turns around at its
    /// last point.
    pub geometry: String,
    /// Closeness of the total distance to the requested distance, 0-100.
    pub accuracy: f64,
    pub total_distance_km: f64,
}

/// A point selected along a route for external queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub coordinate: Coordinate,
    /// Index into the decoded route geometry.
    pub route_index: usize,
    /// Percent progress along the route, one decimal.
    pub route_progress: f64,
}

/// A single historical incident returned by the incident source.
///
/// Raw rows carry their exact location so callers can filter the
/// bounding-box prefilter output down to a true radius.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: i64,
    pub occurred_on: NaiveDate,
    pub location: Coordinate,
    pub injuries: u32,
    pub fatalities: u32,
}

/// Incident counts accumulated over a search area and lookback window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentAggregate {
    pub total_incidents: u64,
    pub total_injuries: u64,
    pub total_fatalities: u64,
}

impl IncidentAggregate {
    pub fn from_incidents(incidents: &[Incident]) -> Self {
        Self {
            total_incidents: incidents.len() as u64,
            total_injuries: incidents.iter().map(|i| u64::from(i.injuries)).sum(),
            total_fatalities: incidents.iter().map(|i| u64::from(i.fatalities)).sum(),
        }
    }
}

/// Safety evaluation of one sample point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentAnalysis {
    pub point: SamplePoint,
    pub counts: IncidentAggregate,
    /// 0-100, higher is safer.
    pub safety_score: f64,
}

/// Rollup of the per-segment scores for one route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSafety {
    /// Arithmetic mean of the segment scores, one decimal.
    pub overall_safety_score: f64,
    /// Segments scoring below [`crate::scoring::DANGEROUS_SEGMENT_SCORE`].
    pub dangerous_segments: Vec<SegmentAnalysis>,
    pub sample_point_count: usize,
}

/// A route together with its safety rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedRoute {
    #[serde(flatten)]
    pub route: Route,
    pub safety: RouteSafety,
}

/// A roadwork/closure record near a route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Closure {
    pub street_name: String,
    pub work_start_date: String,
    #[serde(default)]
    pub location: Option<Coordinate>,
}

impl Closure {
    /// Identity used to deduplicate records reported at several sample
    /// points: the same street and start date is the same closure.
    pub fn identity(&self) -> (&str, &str) {
        (&self.street_name, &self.work_start_date)
    }
}
