//! Core domain logic for the Stride route recommendation system.
//!
//! Everything in this crate is pure: geometry decoding, geodesic math,
//! strategic sampling, incident scoring, and query classification. All
//! I/O (route/weather/closure providers, the incident store, the LLM)
//! lives in `stride-providers` and `stride-server`.

pub mod classify;
pub mod models;
pub mod polyline;
pub mod sampling;
pub mod scoring;
pub mod spatial;

pub use classify::{classify_query, QueryIntent};
pub use models::{
    AnalyzedRoute, Closure, CompassDirection, Coordinate, Incident, IncidentAggregate, Route,
    RouteSafety, SamplePoint, SegmentAnalysis,
};
pub use sampling::sample_route;
pub use scoring::{safety_score, MetricRatios, ScoreError, DANGEROUS_SEGMENT_SCORE};
pub use spatial::{haversine_km, offset_by_bearing, BoundingBox};
