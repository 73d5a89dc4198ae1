//! Server configuration from environment.
//!
//! Everything is read once at startup into this struct and injected from
//! there; nothing below the composition root touches the process
//! environment.

use crate::analysis::AnalysisParams;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,

    pub directions_url: String,
    pub directions_api_key: String,
    pub weather_url: String,
    pub weather_api_key: String,
    pub closures_url: String,
    pub closures_app_token: Option<String>,
    pub llm_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    /// Request timeout applied to every collaborator call.
    pub provider_timeout_secs: u64,

    pub safety_radius_km: f64,
    pub safety_days_back: i64,
    pub closure_radius_km: f64,
    pub closure_days_back: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: parse_env("STRIDE_PORT", 3000),
            database_path: env::var("STRIDE_DATABASE_PATH")
                .unwrap_or_else(|_| "data/stride.db".to_string()),
            database_max_connections: parse_env("STRIDE_DATABASE_MAX_CONNECTIONS", 5),

            directions_url: env::var("DIRECTIONS_API_URL").unwrap_or_else(|_| {
                "https://maps.googleapis.com/maps/api/directions/json".to_string()
            }),
            directions_api_key: env::var("DIRECTIONS_API_KEY").unwrap_or_default(),
            weather_url: env::var("WEATHER_API_URL").unwrap_or_else(|_| {
                "https://api.openweathermap.org/data/2.5/weather".to_string()
            }),
            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_default(),
            closures_url: env::var("CLOSURES_API_URL").unwrap_or_else(|_| {
                "https://data.cityofnewyork.us/resource/i6b5-j7bu.json".to_string()
            }),
            closures_app_token: env::var("CLOSURES_APP_TOKEN").ok(),
            llm_url: env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            llm_api_key: env::var("LLM_API_KEY").unwrap_or_default(),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            provider_timeout_secs: parse_env("STRIDE_PROVIDER_TIMEOUT_SECS", 10),

            safety_radius_km: parse_env("STRIDE_SAFETY_RADIUS_KM", 0.75),
            safety_days_back: parse_env("STRIDE_SAFETY_DAYS_BACK", 60),
            closure_radius_km: parse_env("STRIDE_CLOSURE_RADIUS_KM", 0.75),
            closure_days_back: parse_env("STRIDE_CLOSURE_DAYS_BACK", 14),
        }
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    pub fn analysis_params(&self) -> AnalysisParams {
        AnalysisParams {
            safety_radius_km: self.safety_radius_km,
            safety_days_back: self.safety_days_back,
            closure_radius_km: self.closure_radius_km,
            closure_days_back: self.closure_days_back,
            ..AnalysisParams::default()
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
