use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::Config;
use crate::persistence;
use crate::state::AppState;
use crate::testing::{
    mild_weather, route_with_accuracy, CannedRecommender, FixedClosures, FixedRoutes, FixedWeather,
};
use stride_core::{CompassDirection, Coordinate};

const ORIGIN: Coordinate = Coordinate {
    lat: 40.7580,
    lng: -73.9855,
};

async fn setup_app() -> axum::Router {
    let mut config = Config::from_env();
    config.database_path = std::env::temp_dir()
        .join(format!("stride-test-{}.db", uuid::Uuid::new_v4()))
        .to_string_lossy()
        .to_string();

    let db = persistence::init_database(&config.database_path, config.database_max_connections)
        .await
        .expect("init db");
    seed_incidents(&db).await;

    let incidents = Arc::new(persistence::SqliteIncidentStore::new(&db));
    let state = Arc::new(AppState::new(
        config,
        incidents,
        Arc::new(FixedRoutes(vec![
            route_with_accuracy(ORIGIN, CompassDirection::North, 96.0),
            route_with_accuracy(ORIGIN, CompassDirection::East, 91.0),
        ])),
        Arc::new(FixedWeather(mild_weather())),
        Arc::new(FixedClosures::new(Vec::new())),
        Arc::new(CannedRecommender("Take the north route.")),
    ));

    crate::api::routes().with_state(state)
}

/// Seed a uniform incident lattice so every neighborhood cell looks alike.
async fn seed_incidents(db: &persistence::Database) {
    let occurred_on = (chrono::Utc::now().date_naive() - chrono::Duration::days(5)).to_string();
    for i in -12i32..=12 {
        for j in -12i32..=12 {
            sqlx::query(
                "INSERT INTO incidents (occurred_on, latitude, longitude, injuries, fatalities) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&occurred_on)
            .bind(ORIGIN.lat + f64::from(i) * 0.005)
            .bind(ORIGIN.lng + f64::from(j) * 0.005)
            .bind(1i64)
            .bind(0i64)
            .execute(db.pool())
            .await
            .expect("seed incident");
        }
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn recommendation_happy_path() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/recommendations")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "query": "I need a safe 5k route",
                "origin": { "lat": ORIGIN.lat, "lng": ORIGIN.lng },
                "target_distance_km": 5.0
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["recommendation"], "Take the north route.");
    assert_eq!(body["routes"].as_array().unwrap().len(), 2);

    // "safe" in the query ran the scorer over both candidates.
    let analyzed = body["safety_analysis"].as_array().unwrap();
    assert_eq!(analyzed.len(), 2);
    for route in analyzed {
        let score = route["safety"]["overall_safety_score"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&score));
    }
}

#[tokio::test]
async fn recommendation_rejects_short_query() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/v1/recommendations")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "query": "ab",
                "origin": { "lat": ORIGIN.lat, "lng": ORIGIN.lng },
                "target_distance_km": 5.0
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("3 characters"));
}

#[tokio::test]
async fn point_score_over_seeded_history() {
    let app = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!(
                    "/v1/safety/score?lat={}&lng={}",
                    ORIGIN.lat, ORIGIN.lng
                ))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    let score = body["safety_score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert!(body["summary"]["total_incidents"].as_u64().unwrap() > 0);
    assert_eq!(body["search_radius_km"].as_f64().unwrap(), 0.75);
}

#[tokio::test]
async fn point_score_rejects_bad_coordinates() {
    let app = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/safety/score?lat=95.0&lng=-73.9")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
