//! Chart rendering port trait.

use crate::domain::error::RiskviewError;
use crate::domain::frame::TimeSeriesFrame;
use crate::domain::report::ChartArtifact;

/// Turns a time-series frame into a transportable image artifact.
///
/// Implementations must not keep drawing state across calls: each render
/// starts from a fresh surface so concurrent requests cannot bleed into one
/// another. A frame with no non-null, non-zero signal has no marker anchor
/// and must fail with `NoTradingPosition`.
pub trait ChartPort {
    fn render(&self, frame: &TimeSeriesFrame) -> Result<ChartArtifact, RiskviewError>;
}
