//! Route analysis: per-point safety scoring and closure surveys.

pub mod closures;
pub mod safety;

pub use closures::{survey_route, ClosureReport};
pub use safety::{analyze_route, score_point};

/// Tunables shared by the safety scorer and the closure survey.
#[derive(Debug, Clone)]
pub struct AnalysisParams {
    pub safety_radius_km: f64,
    pub safety_days_back: i64,
    pub closure_radius_km: f64,
    pub closure_days_back: i64,
    /// How many accuracy-ranked candidates get the full safety treatment.
    pub top_routes: usize,
    pub samples_per_route: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            safety_radius_km: 0.75,
            safety_days_back: 60,
            closure_radius_km: 0.75,
            closure_days_back: 14,
            top_routes: 3,
            samples_per_route: 3,
        }
    }
}
