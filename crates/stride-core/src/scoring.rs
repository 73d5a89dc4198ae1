//! Incident-density scoring against a neighborhood baseline.
//!
//! Raw incident counts mean nothing on their own: a busy avenue and a quiet
//! suburb have wildly different norms. Each metric is therefore expressed as
//! a ratio against the median count over a grid of nearby areas, and the
//! ratios feed logarithmic penalties so extreme outliers saturate instead of
//! dominating.

use crate::models::IncidentAggregate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sample points scoring below this are flagged as dangerous segments.
pub const DANGEROUS_SEGMENT_SCORE: f64 = 80.0;

/// Baseline grid geometry: 5x5 cells centered on the query point,
/// 0.01 degrees apart in both axes.
pub const BASELINE_GRID_STEP_DEG: f64 = 0.01;
pub const BASELINE_GRID_OFFSETS: [i32; 5] = [-2, -1, 0, 1, 2];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    /// The neighborhood median for this metric is zero, so a relative ratio
    /// is undefined. Fatalities are exempt (they get an absolute standard).
    #[error("baseline {metric} count is zero; ratio undefined")]
    ZeroBaseline { metric: &'static str },
}

/// Median of a set of area counts: sort ascending, take the element at
/// index `len/2`. For the 25-cell grid this is index 12.
pub fn median_baseline(counts: &mut [u64]) -> u64 {
    if counts.is_empty() {
        return 0;
    }
    counts.sort_unstable();
    counts[counts.len() / 2]
}

/// Observed-to-baseline ratios for the three incident metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRatios {
    pub incidents: f64,
    pub injuries: f64,
    pub fatalities: f64,
}

impl MetricRatios {
    /// Compute the ratios.
    ///
    /// An area whose baseline has zero fatalities is held to an absolute
    /// standard: the ratio is the observed fatality count itself, so a
    /// single fatality there already reads as above the norm.
    pub fn new(observed: IncidentAggregate, baseline: IncidentAggregate) -> Result<Self, ScoreError> {
        if baseline.total_incidents == 0 {
            return Err(ScoreError::ZeroBaseline { metric: "incident" });
        }
        if baseline.total_injuries == 0 {
            return Err(ScoreError::ZeroBaseline { metric: "injury" });
        }

        let fatalities = if baseline.total_fatalities == 0 {
            observed.total_fatalities as f64
        } else {
            observed.total_fatalities as f64 / baseline.total_fatalities as f64
        };

        Ok(Self {
            incidents: observed.total_incidents as f64 / baseline.total_incidents as f64,
            injuries: observed.total_injuries as f64 / baseline.total_injuries as f64,
            fatalities,
        })
    }
}

/// Composite 0-100 safety score; higher is safer.
///
/// Each penalty is a log of its ratio, floored at 0.1 so areas far below
/// baseline cannot turn the penalty into an unbounded bonus; ratios at or
/// below 1 contribute nothing. Zero observed fatalities never incur a
/// fatality penalty, whatever the baseline.
pub fn safety_score(ratios: MetricRatios) -> f64 {
    let crash_penalty = log_penalty(ratios.incidents, 15.0, 30.0);
    let injury_penalty = log_penalty(ratios.injuries, 20.0, 35.0);
    let fatality_penalty = if ratios.fatalities == 0.0 {
        0.0
    } else {
        log_penalty(ratios.fatalities, 25.0, 50.0)
    };

    (100.0 - crash_penalty - injury_penalty - fatality_penalty).clamp(0.0, 100.0)
}

fn log_penalty(ratio: f64, scale: f64, cap: f64) -> f64 {
    (scale * ratio.max(0.1).ln()).clamp(0.0, cap)
}

/// Mean of the per-segment scores, one decimal.
pub fn overall_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(incidents: u64, injuries: u64, fatalities: u64) -> IncidentAggregate {
        IncidentAggregate {
            total_incidents: incidents,
            total_injuries: injuries,
            total_fatalities: fatalities,
        }
    }

    #[test]
    fn median_picks_index_twelve_of_twenty_five() {
        // 25 shuffled counts; sorted ascending the element at index 12 is 12.
        let mut counts: Vec<u64> = (0..25).rev().collect();
        assert_eq!(median_baseline(&mut counts), 12);
    }

    #[test]
    fn median_of_empty_is_zero() {
        assert_eq!(median_baseline(&mut []), 0);
    }

    #[test]
    fn at_baseline_scores_one_hundred() {
        let ratios = MetricRatios::new(aggregate(10, 4, 1), aggregate(10, 4, 1)).unwrap();
        assert_eq!(ratios.incidents, 1.0);
        assert_eq!(safety_score(ratios), 100.0);
    }

    #[test]
    fn below_baseline_never_exceeds_one_hundred() {
        let ratios = MetricRatios::new(aggregate(1, 0, 0), aggregate(100, 50, 10)).unwrap();
        assert_eq!(safety_score(ratios), 100.0);
    }

    #[test]
    fn zero_fatalities_incur_no_penalty_even_with_zero_baseline() {
        let ratios = MetricRatios::new(aggregate(10, 4, 0), aggregate(10, 4, 0)).unwrap();
        assert_eq!(ratios.fatalities, 0.0);
        assert_eq!(safety_score(ratios), 100.0);
    }

    #[test]
    fn fatalities_with_zero_baseline_use_absolute_count() {
        let ratios = MetricRatios::new(aggregate(10, 4, 3), aggregate(10, 4, 0)).unwrap();
        assert_eq!(ratios.fatalities, 3.0);
        let score = safety_score(ratios);
        assert!(score < 100.0);
    }

    #[test]
    fn score_stays_in_range_for_extreme_inputs() {
        for (observed, baseline) in [
            (aggregate(0, 0, 0), aggregate(1, 1, 1)),
            (aggregate(10_000, 5_000, 200), aggregate(1, 1, 1)),
            (aggregate(3, 1, 0), aggregate(50, 20, 5)),
            (aggregate(7, 7, 7), aggregate(7, 7, 7)),
        ] {
            let ratios = MetricRatios::new(observed, baseline).unwrap();
            let score = safety_score(ratios);
            assert!((0.0..=100.0).contains(&score), "score {score} out of range");
        }
    }

    #[test]
    fn worst_case_saturates_at_zero() {
        // All three penalties capped: 30 + 35 + 50 > 100.
        let ratios = MetricRatios::new(
            aggregate(1_000_000, 1_000_000, 1_000_000),
            aggregate(1, 1, 1),
        )
        .unwrap();
        assert_eq!(safety_score(ratios), 0.0);
    }

    #[test]
    fn zero_baseline_incidents_is_an_error() {
        let err = MetricRatios::new(aggregate(5, 2, 0), aggregate(0, 3, 0)).unwrap_err();
        assert_eq!(err, ScoreError::ZeroBaseline { metric: "incident" });
    }

    #[test]
    fn overall_score_is_the_rounded_mean() {
        assert_eq!(overall_score(&[90.0, 80.0, 85.5]), 85.2);
        assert_eq!(overall_score(&[]), 0.0);
    }
}
