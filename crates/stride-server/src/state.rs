//! Application state: configuration plus the wired collaborator set.

use std::sync::Arc;

use stride_providers::{
    ChatCompletionsClient, ClosureProvider, DirectionsClient, IncidentSource, OpenWeatherClient,
    RecommendationGenerator, RouteProvider, StreetClosureClient, WeatherProvider,
};

use crate::config::Config;
use crate::persistence::{Database, SqliteIncidentStore};
use crate::workflow::Workflow;

pub struct AppState {
    pub config: Config,
    pub incidents: Arc<dyn IncidentSource>,
    pub workflow: Workflow,
}

impl AppState {
    pub fn new(
        config: Config,
        incidents: Arc<dyn IncidentSource>,
        routes: Arc<dyn RouteProvider>,
        weather: Arc<dyn WeatherProvider>,
        closures: Arc<dyn ClosureProvider>,
        recommender: Arc<dyn RecommendationGenerator>,
    ) -> Self {
        let workflow = Workflow::new(
            routes,
            incidents.clone(),
            weather,
            closures,
            recommender,
            config.analysis_params(),
        );

        Self {
            config,
            incidents,
            workflow,
        }
    }

    /// Wire the production collaborators from configuration.
    pub fn from_config(config: Config, db: Database) -> Self {
        let timeout = config.provider_timeout();

        let incidents: Arc<dyn IncidentSource> = Arc::new(SqliteIncidentStore::new(&db));
        let routes: Arc<dyn RouteProvider> = Arc::new(DirectionsClient::new(
            config.directions_url.clone(),
            config.directions_api_key.clone(),
            timeout,
        ));
        let weather: Arc<dyn WeatherProvider> = Arc::new(OpenWeatherClient::new(
            config.weather_url.clone(),
            config.weather_api_key.clone(),
            timeout,
        ));
        let closures: Arc<dyn ClosureProvider> = Arc::new(StreetClosureClient::new(
            config.closures_url.clone(),
            config.closures_app_token.clone(),
            timeout,
        ));
        let recommender: Arc<dyn RecommendationGenerator> = Arc::new(ChatCompletionsClient::new(
            config.llm_url.clone(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            timeout,
        ));

        Self::new(config, incidents, routes, weather, closures, recommender)
    }
}
