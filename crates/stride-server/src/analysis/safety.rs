//! Per-point and per-route safety scoring.
//!
//! A point's score compares incident counts inside the search radius to the
//! median counts over a 5x5 grid of neighboring areas, so scores stay
//! comparable between dense and quiet neighborhoods.

use anyhow::{Context, Result};
use futures::future::join_all;
use stride_core::scoring::{
    self, median_baseline, safety_score, MetricRatios, BASELINE_GRID_OFFSETS,
    BASELINE_GRID_STEP_DEG, DANGEROUS_SEGMENT_SCORE,
};
use stride_core::{
    haversine_km, polyline, sample_route, AnalyzedRoute, BoundingBox, Coordinate, Incident,
    IncidentAggregate, Route, RouteSafety, SegmentAnalysis,
};
use stride_providers::IncidentSource;

use super::AnalysisParams;

/// Score a single geographic point.
///
/// Returns the exact-filtered incident counts and the 0-100 safety score.
pub async fn score_point(
    source: &dyn IncidentSource,
    point: Coordinate,
    radius_km: f64,
    days_back: i64,
) -> Result<(IncidentAggregate, f64)> {
    let bbox = BoundingBox::around(point, radius_km);
    let candidates = source
        .query_bbox(bbox, days_back)
        .await
        .context("incident query failed")?;

    // The box over-selects at its corners; keep only true-radius hits.
    let nearby: Vec<Incident> = candidates
        .into_iter()
        .filter(|incident| haversine_km(point, incident.location) <= radius_km)
        .collect();
    let observed = IncidentAggregate::from_incidents(&nearby);

    let baseline = area_baseline(source, point, radius_km, days_back).await?;
    let ratios = MetricRatios::new(observed, baseline)?;

    Ok((observed, safety_score(ratios)))
}

/// Median incident/injury/fatality counts over the neighborhood grid.
///
/// 25 aggregate queries (one per cell, same radius as the observation) run
/// concurrently; each metric takes its own median over the 25 cell counts.
async fn area_baseline(
    source: &dyn IncidentSource,
    point: Coordinate,
    radius_km: f64,
    days_back: i64,
) -> Result<IncidentAggregate> {
    let mut cells = Vec::with_capacity(25);
    for lat_offset in BASELINE_GRID_OFFSETS {
        for lng_offset in BASELINE_GRID_OFFSETS {
            cells.push(Coordinate::new(
                point.lat + f64::from(lat_offset) * BASELINE_GRID_STEP_DEG,
                point.lng + f64::from(lng_offset) * BASELINE_GRID_STEP_DEG,
            ));
        }
    }

    let queries = cells
        .into_iter()
        .map(|cell| source.aggregate_bbox(BoundingBox::around(cell, radius_km), days_back));
    let aggregates: Vec<IncidentAggregate> = join_all(queries)
        .await
        .into_iter()
        .collect::<Result<_, _>>()
        .context("baseline grid query failed")?;

    let mut incidents: Vec<u64> = aggregates.iter().map(|a| a.total_incidents).collect();
    let mut injuries: Vec<u64> = aggregates.iter().map(|a| a.total_injuries).collect();
    let mut fatalities: Vec<u64> = aggregates.iter().map(|a| a.total_fatalities).collect();

    Ok(IncidentAggregate {
        total_incidents: median_baseline(&mut incidents),
        total_injuries: median_baseline(&mut injuries),
        total_fatalities: median_baseline(&mut fatalities),
    })
}

/// Evaluate one route: decode its geometry, sample it, score every sample
/// point concurrently, and fold the results into a per-route rollup.
///
/// Sample points are merged back in route order regardless of completion
/// order; a failure at any point fails the whole route so the caller can
/// skip it.
pub async fn analyze_route(
    source: &dyn IncidentSource,
    route: &Route,
    params: &AnalysisParams,
) -> Result<AnalyzedRoute> {
    let points = polyline::decode(&route.geometry).context("route geometry did not decode")?;
    if points.is_empty() {
        anyhow::bail!("route geometry decoded to no points");
    }

    // All candidates share the same start point, so skip it when sampling.
    let samples = sample_route(&points, params.samples_per_route, true);

    let scored = join_all(samples.iter().map(|sample| {
        score_point(
            source,
            sample.coordinate,
            params.safety_radius_km,
            params.safety_days_back,
        )
    }))
    .await;

    let mut segments = Vec::with_capacity(samples.len());
    for (sample, result) in samples.iter().zip(scored) {
        let (counts, score) = result
            .with_context(|| format!("scoring failed at {}% progress", sample.route_progress))?;
        segments.push(SegmentAnalysis {
            point: *sample,
            counts,
            safety_score: score,
        });
    }

    let scores: Vec<f64> = segments.iter().map(|s| s.safety_score).collect();
    let overall_safety_score = scoring::overall_score(&scores);
    let dangerous_segments: Vec<SegmentAnalysis> = segments
        .iter()
        .filter(|s| s.safety_score < DANGEROUS_SEGMENT_SCORE)
        .cloned()
        .collect();

    Ok(AnalyzedRoute {
        route: route.clone(),
        safety: RouteSafety {
            overall_safety_score,
            dangerous_segments,
            sample_point_count: samples.len(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{dense_incident_grid, route_through, FixedIncidents};

    const ORIGIN: Coordinate = Coordinate {
        lat: 40.7580,
        lng: -73.9855,
    };

    #[tokio::test]
    async fn score_point_at_baseline_density_is_perfect() {
        // A uniform incident field: every grid cell sees the same counts as
        // the observation, so all ratios are 1 and the score is 100.
        let source = FixedIncidents::new(dense_incident_grid(ORIGIN, 1, 0));
        let (counts, score) = score_point(&source, ORIGIN, 0.75, 60).await.unwrap();
        assert!(counts.total_incidents > 0);
        assert_eq!(score, 100.0);
    }

    #[tokio::test]
    async fn score_point_errors_when_area_has_no_history() {
        let source = FixedIncidents::new(Vec::new());
        let result = score_point(&source, ORIGIN, 0.75, 60).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn analyze_route_samples_three_points() {
        let source = FixedIncidents::new(dense_incident_grid(ORIGIN, 1, 0));
        let route = route_through(ORIGIN, 40);

        let analyzed = analyze_route(&source, &route, &AnalysisParams::default())
            .await
            .unwrap();

        assert_eq!(analyzed.safety.sample_point_count, 3);
        assert!((0.0..=100.0).contains(&analyzed.safety.overall_safety_score));
        // Uniform field: nothing should read as dangerous.
        assert!(analyzed.safety.dangerous_segments.is_empty());
    }

    #[tokio::test]
    async fn analyze_route_rejects_empty_geometry() {
        let source = FixedIncidents::new(Vec::new());
        let route = Route {
            geometry: String::new(),
            ..route_through(ORIGIN, 10)
        };
        assert!(analyze_route(&source, &route, &AnalysisParams::default())
            .await
            .is_err());
    }
}
