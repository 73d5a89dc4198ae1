//! The recommendation workflow.
//!
//! A run moves through a fixed stage order (classify, generate routes,
//! analyze safety, check weather, check closures, synthesize), but the
//! optional stages sit behind guards that are evaluated when the stage is
//! reached, not precomputed: the weather stage can enable the closures
//! stage after classification decided to skip it.
//!
//! Failure discipline: input validation is the only thing that aborts a run
//! up front. Every stage after that catches its own collaborator failures,
//! appends a warning, and leaves an empty or partial result; one bad route
//! never takes down its siblings. Anything that still escapes is caught
//! once at the top and returned as a system error with fallback text.

pub mod context;
pub mod state;


use std::sync::Arc;

use stride_core::{classify_query, AnalyzedRoute, Coordinate, Route};
use stride_providers::{
    assess_weather_risk, ClosureProvider, IncidentSource, RecommendationGenerator, RouteProvider,
    WeatherProvider,
};

use crate::analysis::{self, AnalysisParams};

pub use state::{RunError, RunReport, RunRequest, WeatherReport, WorkflowState};
use state::{apply_weather_risk, closures_guard, safety_guard, validate};

const NO_ROUTES_RECOMMENDATION: &str =
    "Unable to generate routes. Please try a different location or distance.";
const SYSTEM_FAILURE_RECOMMENDATION: &str =
    "Unable to process request. Please try again.";

/// Owns the collaborator handles and runs one workflow per request.
pub struct Workflow {
    routes: Arc<dyn RouteProvider>,
    incidents: Arc<dyn IncidentSource>,
    weather: Arc<dyn WeatherProvider>,
    closures: Arc<dyn ClosureProvider>,
    recommender: Arc<dyn RecommendationGenerator>,
    params: AnalysisParams,
}

/// Output of the route generation + safety block.
#[derive(Default)]
struct RoutesOutcome {
    routes: Vec<Route>,
    safety_analysis: Vec<AnalyzedRoute>,
    errors: Vec<String>,
}

/// Output of the weather block.
struct WeatherOutcome {
    report: Option<WeatherReport>,
    error: Option<String>,
}

impl Workflow {
    pub fn new(
        routes: Arc<dyn RouteProvider>,
        incidents: Arc<dyn IncidentSource>,
        weather: Arc<dyn WeatherProvider>,
        closures: Arc<dyn ClosureProvider>,
        recommender: Arc<dyn RecommendationGenerator>,
        params: AnalysisParams,
    ) -> Self {
        Self {
            routes,
            incidents,
            weather,
            closures,
            recommender,
            params,
        }
    }

    /// Run the full pipeline for one request.
    #[tracing::instrument(skip(self), fields(query = %request.query))]
    pub async fn run(&self, request: RunRequest) -> Result<RunReport, RunError> {
        validate(&request)?;

        let mut state = WorkflowState::new(&request);
        match self.execute(&mut state).await {
            Ok(()) => Ok(state.into()),
            Err(e) => {
                tracing::error!("workflow failed: {e:#}");
                Err(RunError::System {
                    message: e.to_string(),
                    recommendation: SYSTEM_FAILURE_RECOMMENDATION.to_string(),
                })
            }
        }
    }

    async fn execute(&self, state: &mut WorkflowState) -> anyhow::Result<()> {
        state.intent = classify_query(&state.query);
        tracing::info!(
            needs_safety = state.intent.needs_safety,
            needs_closures = state.intent.needs_closures,
            "classified query"
        );

        // Weather depends only on the origin, so it runs while routes are
        // generated and scored. Outcomes are merged sequentially afterward:
        // the weather merge can escalate needs_closures, and only then is
        // the closures guard read.
        let needs_safety = safety_guard(state);
        let (routes_outcome, weather_outcome) = tokio::join!(
            self.generate_and_score(state.origin, state.target_distance_km, needs_safety),
            self.fetch_weather(state.origin),
        );

        apply_routes(state, routes_outcome);
        apply_weather(state, weather_outcome);

        if closures_guard(state) {
            self.check_closures(state).await;
        } else {
            tracing::info!("closure check skipped");
        }

        self.synthesize(state).await;
        Ok(())
    }

    /// GenerateRoutes stage followed immediately by the AnalyzeSafety stage,
    /// which needs the routes and nothing else.
    async fn generate_and_score(
        &self,
        origin: Coordinate,
        target_distance_km: f64,
        needs_safety: bool,
    ) -> RoutesOutcome {
        let mut outcome = RoutesOutcome::default();

        match self.routes.generate(origin, target_distance_km).await {
            Ok(routes) if routes.is_empty() => {
                tracing::warn!("route generation returned no candidates");
                outcome.errors.push("Route generation failed".to_string());
            }
            Ok(routes) => {
                tracing::info!("generated {} candidate routes", routes.len());
                outcome.routes = routes;
            }
            Err(e) => {
                tracing::warn!("route generation failed: {e}");
                outcome.errors.push(format!("Route generation error: {e}"));
            }
        }

        if !needs_safety {
            tracing::info!("safety analysis skipped");
            return outcome;
        }
        if outcome.routes.is_empty() {
            return outcome;
        }

        // Top candidates by accuracy; stable sort keeps the provider's
        // ordering between ties.
        let mut ranked = outcome.routes.clone();
        ranked.sort_by(|a, b| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let top: Vec<Route> = ranked.into_iter().take(self.params.top_routes).collect();

        let evaluations = futures::future::join_all(
            top.iter()
                .map(|route| analysis::safety::analyze_route(self.incidents.as_ref(), route, &self.params)),
        )
        .await;

        // Merge by route identity, preserving the accuracy ranking; one
        // failed route is skipped, not fatal.
        for (route, result) in top.iter().zip(evaluations) {
            match result {
                Ok(analyzed) => outcome.safety_analysis.push(analyzed),
                Err(e) => {
                    tracing::warn!(
                        "safety analysis failed for {} route: {e:#}",
                        route.direction.label()
                    );
                }
            }
        }

        if outcome.safety_analysis.is_empty() {
            outcome.errors.push("Safety analysis failed".to_string());
        }

        outcome
    }

    /// CheckWeather stage: unguarded, origin only.
    async fn fetch_weather(&self, origin: Coordinate) -> WeatherOutcome {
        match self.weather.current(origin).await {
            Ok(conditions) => {
                let risk_assessment = assess_weather_risk(&conditions);
                tracing::info!(
                    risk = ?risk_assessment.risk_level,
                    "current conditions: {}",
                    conditions.description
                );
                WeatherOutcome {
                    report: Some(WeatherReport {
                        conditions,
                        risk_assessment,
                    }),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("weather check failed: {e}");
                WeatherOutcome {
                    report: None,
                    error: Some("Weather data unavailable".to_string()),
                }
            }
        }
    }

    /// CheckClosures stage: guarded by `needs_closures` as it stands after
    /// the weather merge. Surveys the single top route by accuracy.
    async fn check_closures(&self, state: &mut WorkflowState) {
        // Best candidate by accuracy; first one wins ties.
        let Some(top) = state
            .routes
            .iter()
            .reduce(|best, route| if route.accuracy > best.accuracy { route } else { best })
            .cloned()
        else {
            tracing::info!("no routes available for closure checking");
            return;
        };

        match analysis::closures::survey_route(self.closures.as_ref(), &top, &self.params).await {
            Ok(report) => {
                tracing::info!("found {} unique closures along route", report.total_closures);
                state.closures = Some(report);
            }
            Err(e) => {
                tracing::warn!("closure detection failed: {e:#}");
                state.record_error(format!("Closure detection error: {e}"));
            }
        }
    }

    /// Synthesize stage: build the context and ask the generator; degrade to
    /// canned text when there is nothing to say or the generator fails.
    async fn synthesize(&self, state: &mut WorkflowState) {
        if state.routes.is_empty() {
            state.recommendation = NO_ROUTES_RECOMMENDATION.to_string();
            return;
        }

        let context = context::build_context(state);
        match self.recommender.generate(&context).await {
            Ok(text) => state.recommendation = text,
            Err(e) => {
                tracing::warn!("recommendation generation failed: {e}");
                state.recommendation = format!(
                    "Unable to generate a recommendation: {e}\n\nPlease try again or adjust your query."
                );
            }
        }
    }
}

fn apply_routes(state: &mut WorkflowState, outcome: RoutesOutcome) {
    state.routes = outcome.routes;
    state.safety_analysis = outcome.safety_analysis;
    for error in outcome.errors {
        state.record_error(error);
    }
}

fn apply_weather(state: &mut WorkflowState, outcome: WeatherOutcome) {
    if let Some(error) = outcome.error {
        state.record_error(error);
    }
    if let Some(report) = outcome.report {
        apply_weather_risk(state, report.risk_assessment.risk_level);
        state.weather = Some(report);
    }
}
