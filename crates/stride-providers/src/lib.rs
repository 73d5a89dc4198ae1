//! External collaborator seams for the Stride system.
//!
//! Each data source the pipeline consumes (route geometry, incident
//! history, weather, street closures, the recommendation LLM) is a narrow
//! async trait plus a production HTTP client. The pipeline only ever sees
//! the traits, so tests swap in in-memory fakes.

pub mod closures;
pub mod error;
pub mod incidents;
pub mod recommendation;
pub mod routes;
pub mod weather;

pub use closures::{assess_closure_impact, ClosureAssessment, ClosureImpact, ClosureProvider, StreetClosureClient};
pub use error::ProviderError;
pub use incidents::IncidentSource;
pub use recommendation::{ChatCompletionsClient, RecommendationGenerator};
pub use routes::{DirectionsClient, RouteProvider};
pub use weather::{
    assess_weather_risk, OpenWeatherClient, RiskLevel, WeatherConditions, WeatherProvider,
    WeatherRisk,
};
