//! Per-request workflow state and the final report shape.

use serde::{Deserialize, Serialize};
use stride_core::{AnalyzedRoute, Coordinate, QueryIntent, Route};
use stride_providers::{RiskLevel, WeatherConditions, WeatherRisk};
use thiserror::Error;

use crate::analysis::ClosureReport;

/// Longest run anyone can ask for.
pub const MAX_TARGET_DISTANCE_KM: f64 = 50.0;

/// Inputs for one recommendation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub query: String,
    pub origin: Coordinate,
    pub target_distance_km: f64,
}

/// Weather payload surfaced in the report.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub conditions: WeatherConditions,
    pub risk_assessment: WeatherRisk,
}

/// Everything one request accumulates while moving through the pipeline.
///
/// Each stage owns its own fields: no stage writes a field owned by a stage
/// that has not run yet, with one documented exception: the weather stage
/// may flip `intent.needs_closures` on before the closures guard is read.
#[derive(Debug)]
pub struct WorkflowState {
    pub query: String,
    pub origin: Coordinate,
    pub target_distance_km: f64,

    pub intent: QueryIntent,
    pub weather_too_dangerous: bool,

    pub routes: Vec<Route>,
    pub safety_analysis: Vec<AnalyzedRoute>,
    pub weather: Option<WeatherReport>,
    pub closures: Option<ClosureReport>,

    pub recommendation: String,
    pub error_messages: Vec<String>,
}

impl WorkflowState {
    pub fn new(request: &RunRequest) -> Self {
        Self {
            query: request.query.clone(),
            origin: request.origin,
            target_distance_km: request.target_distance_km,
            intent: QueryIntent {
                needs_safety: false,
                needs_weather: false,
                needs_closures: false,
            },
            weather_too_dangerous: false,
            routes: Vec::new(),
            safety_analysis: Vec::new(),
            weather: None,
            closures: None,
            recommendation: String::new(),
            error_messages: Vec::new(),
        }
    }

    /// Errors accumulate; they are never overwritten.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_messages.push(message.into());
    }
}

/// Guard for the safety analysis stage.
pub fn safety_guard(state: &WorkflowState) -> bool {
    state.intent.needs_safety
}

/// Guard for the closures stage, read only after the weather stage has had
/// its chance to escalate.
pub fn closures_guard(state: &WorkflowState) -> bool {
    state.intent.needs_closures
}

/// The one cross-stage write in the pipeline: marginal weather turns the
/// closure check on even when the query never asked for it, and dangerous
/// weather gets flagged (informational only; it gates nothing downstream).
pub fn apply_weather_risk(state: &mut WorkflowState, risk_level: RiskLevel) {
    match risk_level {
        RiskLevel::High => {
            state.weather_too_dangerous = true;
        }
        RiskLevel::Moderate => {
            if !state.intent.needs_closures {
                tracing::info!("moderate weather risk: enabling closure check");
                state.intent.needs_closures = true;
            }
        }
        RiskLevel::Low => {}
    }
}

/// Final structured result returned to the caller.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub query: String,
    pub origin: Coordinate,
    pub target_distance_km: f64,
    pub intent: QueryIntent,
    pub routes: Vec<Route>,
    pub safety_analysis: Vec<AnalyzedRoute>,
    pub weather_data: Option<WeatherReport>,
    pub closures_data: Option<ClosureReport>,
    pub weather_too_dangerous: bool,
    pub recommendation: String,
    pub error_messages: Vec<String>,
}

impl From<WorkflowState> for RunReport {
    fn from(state: WorkflowState) -> Self {
        Self {
            query: state.query,
            origin: state.origin,
            target_distance_km: state.target_distance_km,
            intent: state.intent,
            routes: state.routes,
            safety_analysis: state.safety_analysis,
            weather_data: state.weather,
            closures_data: state.closures,
            weather_too_dangerous: state.weather_too_dangerous,
            recommendation: state.recommendation,
            error_messages: state.error_messages,
        }
    }
}

/// How a run can fail outright. Anything else degrades instead.
#[derive(Debug, Error)]
pub enum RunError {
    /// Rejected before any stage ran.
    #[error("{0}")]
    Validation(String),

    /// An error escaped a stage boundary; the caller still gets fallback
    /// recommendation text.
    #[error("system error: {message}")]
    System {
        message: String,
        recommendation: String,
    },
}

/// Checked once, before any stage runs; violations are fatal.
pub fn validate(request: &RunRequest) -> Result<(), RunError> {
    if request.query.trim().chars().count() < 3 {
        return Err(RunError::Validation(
            "query must be at least 3 characters".to_string(),
        ));
    }

    if !request.origin.is_valid() {
        return Err(RunError::Validation(
            "origin coordinates out of range".to_string(),
        ));
    }

    if request.target_distance_km <= 0.0 || request.target_distance_km > MAX_TARGET_DISTANCE_KM {
        return Err(RunError::Validation(format!(
            "target distance must be between 0 and {MAX_TARGET_DISTANCE_KM} km"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query: &str, lat: f64, lng: f64, distance: f64) -> RunRequest {
        RunRequest {
            query: query.to_string(),
            origin: Coordinate::new(lat, lng),
            target_distance_km: distance,
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(validate(&request("Give me a 5k route", 40.7580, -73.9855, 5.0)).is_ok());
    }

    #[test]
    fn short_query_is_rejected() {
        assert!(matches!(
            validate(&request("  a ", 40.0, -73.0, 5.0)),
            Err(RunError::Validation(_))
        ));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        assert!(validate(&request("5k please", 91.0, -73.0, 5.0)).is_err());
        assert!(validate(&request("5k please", 40.0, -181.0, 5.0)).is_err());
    }

    #[test]
    fn distance_bounds_are_enforced() {
        assert!(validate(&request("5k please", 40.0, -73.0, 0.0)).is_err());
        assert!(validate(&request("5k please", 40.0, -73.0, -2.0)).is_err());
        assert!(validate(&request("5k please", 40.0, -73.0, 50.1)).is_err());
        assert!(validate(&request("an even 50", 40.0, -73.0, 50.0)).is_ok());
    }

    #[test]
    fn moderate_risk_escalates_closures_once() {
        let mut state = WorkflowState::new(&request("Give me a 5k route", 40.0, -73.0, 5.0));
        assert!(!closures_guard(&state));

        apply_weather_risk(&mut state, RiskLevel::Moderate);
        assert!(closures_guard(&state));
        assert!(!state.weather_too_dangerous);
    }

    #[test]
    fn high_risk_only_sets_the_danger_flag() {
        let mut state = WorkflowState::new(&request("Give me a 5k route", 40.0, -73.0, 5.0));
        apply_weather_risk(&mut state, RiskLevel::High);

        assert!(state.weather_too_dangerous);
        // High does not force a closure check.
        assert!(!closures_guard(&state));
    }

    #[test]
    fn low_risk_changes_nothing() {
        let mut state = WorkflowState::new(&request("Give me a 5k route", 40.0, -73.0, 5.0));
        apply_weather_risk(&mut state, RiskLevel::Low);
        assert!(!closures_guard(&state));
        assert!(!state.weather_too_dangerous);
    }
}
