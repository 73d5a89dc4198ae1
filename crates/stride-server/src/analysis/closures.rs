//! Closure survey along a single route.

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::Serialize;
use stride_core::{polyline, sample_route, Closure, Route};
use stride_providers::{assess_closure_impact, ClosureAssessment, ClosureProvider};

use super::AnalysisParams;

/// Deduplicated closures found near a route's sample points.
#[derive(Debug, Clone, Serialize)]
pub struct ClosureReport {
    pub total_closures: usize,
    pub closures: Vec<Closure>,
    pub impact_assessment: ClosureAssessment,
    pub sample_point_count: usize,
}

/// Query closures at each sample point of the route and merge the results.
///
/// A failed lookup at one point skips that point; the same closure reported
/// at several points collapses to one record (same street name and work
/// start date), keeping the first occurrence in sample order.
pub async fn survey_route(
    provider: &dyn ClosureProvider,
    route: &Route,
    params: &AnalysisParams,
) -> Result<ClosureReport> {
    let points = polyline::decode(&route.geometry).context("route geometry did not decode")?;
    if points.is_empty() {
        anyhow::bail!("route geometry decoded to no points");
    }

    let samples = sample_route(&points, params.samples_per_route, true);

    let lookups = join_all(samples.iter().map(|sample| {
        provider.query(
            sample.coordinate,
            params.closure_radius_km,
            params.closure_days_back,
        )
    }))
    .await;

    let mut merged: Vec<Closure> = Vec::new();
    for (sample, result) in samples.iter().zip(lookups) {
        match result {
            Ok(closures) => {
                for closure in closures {
                    let duplicate = merged
                        .iter()
                        .any(|existing| existing.identity() == closure.identity());
                    if !duplicate {
                        merged.push(closure);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    "closure lookup failed at {}% progress: {e}",
                    sample.route_progress
                );
            }
        }
    }

    Ok(ClosureReport {
        total_closures: merged.len(),
        impact_assessment: assess_closure_impact(merged.len()),
        sample_point_count: samples.len(),
        closures: merged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closure, route_through, FixedClosures};
    use stride_core::Coordinate;
    use stride_providers::ClosureImpact;

    const ORIGIN: Coordinate = Coordinate {
        lat: 40.7580,
        lng: -73.9855,
    };

    #[tokio::test]
    async fn identical_closures_from_different_points_collapse() {
        // Every sample point reports the same two records for one closure.
        let provider = FixedClosures::new(vec![
            closure("W 46 ST", "2026-07-20"),
            closure("W 46 ST", "2026-07-20"),
        ]);
        let report = survey_route(&provider, &route_through(ORIGIN, 40), &AnalysisParams::default())
            .await
            .unwrap();

        assert_eq!(report.total_closures, 1);
        assert_eq!(report.impact_assessment.impact, ClosureImpact::Low);
    }

    #[tokio::test]
    async fn closures_differing_in_either_field_stay_distinct() {
        let provider = FixedClosures::new(vec![
            closure("W 46 ST", "2026-07-20"),
            closure("W 46 ST", "2026-07-21"),
            closure("7 AV", "2026-07-20"),
        ]);
        let report = survey_route(&provider, &route_through(ORIGIN, 40), &AnalysisParams::default())
            .await
            .unwrap();

        assert_eq!(report.total_closures, 3);
        assert_eq!(report.impact_assessment.impact, ClosureImpact::Moderate);
    }

    #[tokio::test]
    async fn no_closures_reads_as_no_impact() {
        let provider = FixedClosures::new(Vec::new());
        let report = survey_route(&provider, &route_through(ORIGIN, 40), &AnalysisParams::default())
            .await
            .unwrap();

        assert_eq!(report.total_closures, 0);
        assert_eq!(report.impact_assessment.impact, ClosureImpact::None);
        assert_eq!(report.sample_point_count, 3);
    }
}
