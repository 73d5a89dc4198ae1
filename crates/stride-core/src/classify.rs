//! Query intent classification.
//!
//! The free-text query decides which optional analyses run. Matching is a
//! lowercase substring check against two small lexicons; weather is always
//! checked because it affects every run.

use serde::{Deserialize, Serialize};

const SAFETY_KEYWORDS: [&str; 10] = [
    "safe",
    "danger",
    "crash",
    "accident",
    "traffic",
    "risk",
    "hazard",
    "pedestrian",
    "vehicle",
    "collision",
];

const CLOSURE_KEYWORDS: [&str; 9] = [
    "closure",
    "construction",
    "closed",
    "detour",
    "blocked",
    "permit",
    "work",
    "maintenance",
    "roadwork",
];

/// Which optional analyses a query asks for.
///
/// `needs_closures` can also be enabled later by the weather stage when
/// conditions are marginal, even if the query never mentioned closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub needs_safety: bool,
    pub needs_weather: bool,
    pub needs_closures: bool,
}

pub fn classify_query(query: &str) -> QueryIntent {
    let query = query.to_lowercase();

    QueryIntent {
        needs_safety: SAFETY_KEYWORDS.iter().any(|word| query.contains(word)),
        needs_weather: true,
        needs_closures: CLOSURE_KEYWORDS.iter().any(|word| query.contains(word)),
    }
}
