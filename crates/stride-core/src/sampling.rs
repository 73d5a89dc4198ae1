//! Strategic sampling of route geometry.
//!
//! Every sampled point costs an external, rate-limited query, so routes are
//! reduced to a fixed handful of representative points: beginning, middle,
//! and end, or 33/66/100% when all candidate routes share the same start
//! point and sampling it again would be redundant.

use crate::models::{Coordinate, SamplePoint};

/// Select representative points along a route.
///
/// Routes with at most `k` points are returned whole. Longer routes get a
/// fixed three-point selection: indices `33%·N`, `66%·N`, `N-1` when
/// `skip_start` is set, otherwise `0`, `N/2`, `N-1`. The last point is
/// always included and always reports 100% progress.
pub fn sample_route(points: &[Coordinate], k: usize, skip_start: bool) -> Vec<SamplePoint> {
    if points.is_empty() {
        return Vec::new();
    }

    let n = points.len();
    if n <= k {
        return points
            .iter()
            .enumerate()
            .map(|(i, &coordinate)| SamplePoint {
                coordinate,
                route_index: i,
                route_progress: round1(i as f64 / (n - 1).max(1) as f64 * 100.0),
            })
            .collect();
    }

    let indices = if skip_start {
        [(n as f64 * 0.33) as usize, (n as f64 * 0.66) as usize, n - 1]
    } else {
        [0, n / 2, n - 1]
    };

    indices
        .iter()
        .map(|&route_index| SamplePoint {
            coordinate: points[route_index],
            route_index,
            route_progress: round1(route_index as f64 / (n - 1) as f64 * 100.0),
        })
        .collect()
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate::new(40.0 + i as f64 * 0.001, -73.0))
            .collect()
    }

    #[test]
    fn long_route_skip_start_samples_thirds() {
        let points = line(100);
        let samples = sample_route(&points, 3, true);

        let indices: Vec<usize> = samples.iter().map(|s| s.route_index).collect();
        assert_eq!(indices, vec![33, 66, 99]);

        let progress: Vec<f64> = samples.iter().map(|s| s.route_progress).collect();
        assert_eq!(progress, vec![33.3, 66.7, 100.0]);
    }

    #[test]
    fn long_route_default_samples_ends_and_middle() {
        let points = line(101);
        let samples = sample_route(&points, 3, false);

        let indices: Vec<usize> = samples.iter().map(|s| s.route_index).collect();
        assert_eq!(indices, vec![0, 50, 100]);

        let progress: Vec<f64> = samples.iter().map(|s| s.route_progress).collect();
        assert_eq!(progress, vec![0.0, 50.0, 100.0]);
    }

    #[test]
    fn last_sample_is_always_the_endpoint() {
        for n in [4, 10, 57, 250] {
            let points = line(n);
            let samples = sample_route(&points, 3, true);
            let last = samples.last().unwrap();
            assert_eq!(last.route_index, n - 1);
            assert_eq!(last.route_progress, 100.0);
        }
    }

    #[test]
    fn short_route_returns_every_point() {
        let points = line(3);
        let samples = sample_route(&points, 3, true);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].route_progress, 0.0);
        assert_eq!(samples[1].route_progress, 50.0);
        assert_eq!(samples[2].route_progress, 100.0);
    }

    #[test]
    fn single_point_route() {
        let points = line(1);
        let samples = sample_route(&points, 3, true);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].route_index, 0);
        assert_eq!(samples[0].route_progress, 0.0);
    }

    #[test]
    fn empty_route_yields_no_samples() {
        assert!(sample_route(&[], 3, true).is_empty());
    }
}
