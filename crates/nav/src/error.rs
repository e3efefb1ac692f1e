use thiserror::Error;

/// Errors that cross the planning API boundary.
///
/// Everything else in the planning pipeline (blocked start/goal after snap
/// exhaustion, expansion budget exhaustion, oversized grids) recovers locally
/// with a degraded plan and a log line, so those kinds never surface here.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("unknown algorithm '{0}'")]
    UnknownAlgorithm(String),
}
