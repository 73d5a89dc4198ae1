//! Request a route recommendation from a running Stride server.

use anyhow::{bail, Result};
use clap::Parser;
use serde_json::{json, Value};

#[derive(Parser)]
#[command(about = "Ask the Stride server for a running route recommendation")]
struct Args {
    /// Free-text preferences, e.g. "a safe 5k, avoid construction"
    #[arg(long)]
    query: String,

    /// Start latitude
    #[arg(long)]
    lat: f64,

    /// Start longitude
    #[arg(long)]
    lng: f64,

    /// Target distance in kilometers
    #[arg(long, default_value_t = 5.0)]
    distance_km: f64,

    /// Server base URL
    #[arg(long, default_value = "http://localhost:3000")]
    server: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let response = reqwest::Client::new()
        .post(format!("{}/v1/recommendations", args.server))
        .json(&json!({
            "query": args.query,
            "origin": { "lat": args.lat, "lng": args.lng },
            "target_distance_km": args.distance_km,
        }))
        .send()
        .await?;

    let status = response.status();
    let body: Value = response.json().await?;

    if !status.is_success() {
        bail!(
            "server returned {}: {}",
            status,
            body["error"].as_str().unwrap_or("unknown error")
        );
    }

    let route_count = body["routes"].as_array().map(|r| r.len()).unwrap_or(0);
    println!("routes generated: {route_count}");

    if let Some(analyzed) = body["safety_analysis"].as_array() {
        for route in analyzed {
            let dangerous = route["safety"]["dangerous_segments"]
                .as_array()
                .map(|d| d.len())
                .unwrap_or(0);
            println!(
                "  {}: safety {}/100, {} dangerous segment(s)",
                route["direction"].as_str().unwrap_or("?"),
                route["safety"]["overall_safety_score"],
                dangerous,
            );
        }
    }

    if let Some(weather) = body["weather_data"].as_object() {
        println!(
            "weather: {} (risk: {})",
            weather["conditions"]["description"].as_str().unwrap_or("?"),
            weather["risk_assessment"]["risk_level"]
                .as_str()
                .unwrap_or("?"),
        );
    }

    if let Some(closures) = body["closures_data"].as_object() {
        println!(
            "closures: {} ({})",
            closures["total_closures"],
            closures["impact_assessment"]["impact"]
                .as_str()
                .unwrap_or("?"),
        );
    }

    for warning in body["error_messages"].as_array().into_iter().flatten() {
        println!("warning: {}", warning.as_str().unwrap_or("?"));
    }

    println!("\n{}", body["recommendation"].as_str().unwrap_or(""));
    Ok(())
}
