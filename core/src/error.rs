use probr_common::error::SubnetError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("concurrency {requested} exceeds the ceiling of {ceiling}")]
    ConcurrencyAboveCeiling { requested: usize, ceiling: usize },
}

/// Conditions that stop a scan before any probe is dispatched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid scan request: {0}")]
    InvalidRequest(&'static str),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Subnet(#[from] SubnetError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("invalid discovery request: {0}")]
    InvalidRequest(&'static str),
}
