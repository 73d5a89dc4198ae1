//! Weather conditions and run-risk assessment.

use crate::error::ProviderError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use stride_core::Coordinate;

/// Current conditions at a point, metric units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConditions {
    pub description: String,
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    pub visibility_m: f64,
    pub rain_mm_per_h: f64,
    pub humidity_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

/// Risk classification with the conditions that drove it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRisk {
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, point: Coordinate) -> Result<WeatherConditions, ProviderError>;
}

/// Classify current conditions into a run-risk level.
///
/// High-risk conditions make outdoor running inadvisable; moderate ones are
/// runnable but justify checking for street closures, since detours in bad
/// weather cost more.
pub fn assess_weather_risk(conditions: &WeatherConditions) -> WeatherRisk {
    let mut factors = Vec::new();
    let mut high = false;
    let mut moderate = false;

    let description = conditions.description.to_lowercase();
    if description.contains("thunder") || description.contains("tornado") {
        high = true;
        factors.push(format!("severe weather: {}", conditions.description));
    }

    if conditions.visibility_m < 500.0 {
        high = true;
        factors.push(format!("very low visibility ({}m)", conditions.visibility_m));
    } else if conditions.visibility_m < 2000.0 {
        moderate = true;
        factors.push(format!("reduced visibility ({}m)", conditions.visibility_m));
    }

    if conditions.temperature_c <= -10.0 || conditions.temperature_c >= 38.0 {
        high = true;
        factors.push(format!("extreme temperature ({:.0}C)", conditions.temperature_c));
    } else if conditions.temperature_c <= 0.0 || conditions.temperature_c >= 32.0 {
        moderate = true;
        factors.push(format!("challenging temperature ({:.0}C)", conditions.temperature_c));
    }

    if conditions.wind_speed_mps >= 15.0 {
        high = true;
        factors.push(format!("dangerous wind ({:.0} m/s)", conditions.wind_speed_mps));
    } else if conditions.wind_speed_mps >= 10.0 {
        moderate = true;
        factors.push(format!("strong wind ({:.0} m/s)", conditions.wind_speed_mps));
    }

    if conditions.rain_mm_per_h >= 8.0 {
        high = true;
        factors.push(format!("heavy rain ({:.1} mm/h)", conditions.rain_mm_per_h));
    } else if conditions.rain_mm_per_h >= 2.0 {
        moderate = true;
        factors.push(format!("steady rain ({:.1} mm/h)", conditions.rain_mm_per_h));
    }

    let risk_level = if high {
        RiskLevel::High
    } else if moderate {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    WeatherRisk { risk_level, factors }
}

/// HTTP client for an OpenWeatherMap-compatible current-weather API.
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    weather: Vec<OpenWeatherSummary>,
    main: OpenWeatherMain,
    wind: Option<OpenWeatherWind>,
    visibility: Option<f64>,
    rain: Option<OpenWeatherRain>,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherSummary {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl OpenWeatherClient {
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
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[tracing::instrument(skip(self))]
    async fn current(&self, point: Coordinate) -> Result<WeatherConditions, ProviderError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lng.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(ProviderError::UpstreamStatus(status));
        }

        let body: OpenWeatherResponse = response.json().await?;
        Ok(WeatherConditions {
            description: body
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            temperature_c: body.main.temp,
            wind_speed_mps: body.wind.map(|w| w.speed).unwrap_or(0.0),
            visibility_m: body.visibility.unwrap_or(10_000.0),
            rain_mm_per_h: body.rain.and_then(|r| r.one_hour).unwrap_or(0.0),
            humidity_pct: body.main.humidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mild() -> WeatherConditions {
        WeatherConditions {
            description: "clear sky".to_string(),
            temperature_c: 15.0,
            wind_speed_mps: 3.0,
            visibility_m: 10_000.0,
            rain_mm_per_h: 0.0,
            humidity_pct: 40.0,
        }
    }

    #[test]
    fn mild_conditions_are_low_risk() {
        let risk = assess_weather_risk(&mild());
        assert_eq!(risk.risk_level, RiskLevel::Low);
        assert!(risk.factors.is_empty());
    }

    #[test]
    fn freezing_temperature_is_moderate() {
        let conditions = WeatherConditions {
            temperature_c: -2.0,
            ..mild()
        };
        let risk = assess_weather_risk(&conditions);
        assert_eq!(risk.risk_level, RiskLevel::Moderate);
        assert_eq!(risk.factors.len(), 1);
    }

    #[test]
    fn thunderstorm_is_high_regardless_of_other_factors() {
        let conditions = WeatherConditions {
            description: "thunderstorm with light rain".to_string(),
            ..mild()
        };
        assert_eq!(assess_weather_risk(&conditions).risk_level, RiskLevel::High);
    }

    #[test]
    fn high_wins_over_moderate() {
        let conditions = WeatherConditions {
            visibility_m: 300.0,
            rain_mm_per_h: 3.0,
            ..mild()
        };
        let risk = assess_weather_risk(&conditions);
        assert_eq!(risk.risk_level, RiskLevel::High);
        assert_eq!(risk.factors.len(), 2);
    }

    #[test]
    fn parses_current_weather_payload() {
        let body: OpenWeatherResponse = serde_json::from_str(
            r#"{
                "weather": [{"description": "light rain"}],
                "main": {"temp": 11.2, "humidity": 87},
                "wind": {"speed": 4.6},
                "visibility": 8000,
                "rain": {"1h": 0.4}
            }"#,
        )
        .unwrap();
        assert_eq!(body.weather[0].description, "light rain");
        assert_eq!(body.main.temp, 11.2);
        assert_eq!(body.rain.unwrap().one_hour, Some(0.4));
    }
}
