//! Synthesis context assembly.
//!
//! The recommendation generator sees a single JSON document summarizing
//! everything the pipeline produced; optional sections only appear when the
//! owning stage actually ran.

use serde_json::{json, Value};

use super::state::WorkflowState;

pub fn build_context(state: &WorkflowState) -> Value {
    let mut context = json!({
        "user_query": state.query,
        "location": { "lat": state.origin.lat, "lng": state.origin.lng },
        "target_distance_km": state.target_distance_km,
        "routes_generated": state.routes.len(),
        "route_details": state
            .routes
            .iter()
            .map(|route| {
                json!({
                    "direction": route.direction.label(),
                    "accuracy": format!("{:.1}%", route.accuracy),
                    "total_distance_km": route.total_distance_km,
                })
            })
            .collect::<Vec<_>>(),
    });

    if !state.safety_analysis.is_empty() {
        context["safety_data"] = state
            .safety_analysis
            .iter()
            .map(|analyzed| {
                json!({
                    "direction": analyzed.route.direction.label(),
                    "overall_safety_score": analyzed.safety.overall_safety_score,
                    "dangerous_segments": analyzed.safety.dangerous_segments.len(),
                })
            })
            .collect::<Vec<_>>()
            .into();
    }

    if let Some(weather) = &state.weather {
        context["weather"] = serde_json::to_value(weather).unwrap_or(Value::Null);
    }

    if state.weather_too_dangerous {
        context["weather_warning"] =
            json!("current conditions are dangerous for outdoor running");
    }

    if let Some(closures) = &state.closures {
        context["closures"] = json!({
            "total_closures": closures.total_closures,
            "impact": closures.impact_assessment.impact,
        });
    }

    if !state.error_messages.is_empty() {
        context["warnings"] = json!(state.error_messages);
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::{RunRequest, WorkflowState};
    use stride_core::Coordinate;

    fn base_state() -> WorkflowState {
        WorkflowState::new(&RunRequest {
            query: "Give me a 5k route".to_string(),
            origin: Coordinate::new(40.7580, -73.9855),
            target_distance_km: 5.0,
        })
    }

    #[test]
    fn optional_sections_are_absent_when_stages_skipped() {
        let context = build_context(&base_state());

        assert_eq!(context["user_query"], "Give me a 5k route");
        assert_eq!(context["routes_generated"], 0);
        assert!(context.get("safety_data").is_none());
        assert!(context.get("weather").is_none());
        assert!(context.get("closures").is_none());
        assert!(context.get("warnings").is_none());
    }

    #[test]
    fn warnings_appear_when_errors_accumulated() {
        let mut state = base_state();
        state.record_error("weather data unavailable");
        let context = build_context(&state);

        assert_eq!(context["warnings"][0], "weather data unavailable");
    }
}
