//! Incident history source.
//!
//! The scorer asks for raw rows inside a bounding box (then exact-filters
//! them to a true radius itself) and for cheap count aggregates used by the
//! baseline grid. The production implementation is the sqlite store in
//! `stride-server`; tests use in-memory fixtures.

use crate::error::ProviderError;
use async_trait::async_trait;
use stride_core::{BoundingBox, Incident, IncidentAggregate};

#[async_trait]
pub trait IncidentSource: Send + Sync {
    /// Raw incidents inside the bounding box and lookback window.
    async fn query_bbox(
        &self,
        bbox: BoundingBox,
        days_back: i64,
    ) -> Result<Vec<Incident>, ProviderError>;

    /// Count/sum aggregate over the bounding box and lookback window.
    async fn aggregate_bbox(
        &self,
        bbox: BoundingBox,
        days_back: i64,
    ) -> Result<IncidentAggregate, ProviderError>;
}
