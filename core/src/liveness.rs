//! Host liveness checks.
//!
//! Discovery only needs a yes/no answer per address. How that answer is
//! obtained is hidden behind [`LivenessProber`]: the default shells out to the
//! system `ping`, [`TcpLivenessProber`] stays in-process.

use std::time::Duration;

use async_trait::async_trait;

use probr_common::network::probe::{ProbeFailure, ProbeJob, ProbeResult};
use probr_common::network::target::Target;

use crate::engine::Probe;

mod ping;
mod tcp;

pub use ping::PingProber;
pub use tcp::TcpLivenessProber;

/// Decides whether a host responds at all.
#[async_trait]
pub trait LivenessProber: Send + Sync {
    async fn is_reachable(&self, target: &Target, timeout: Duration) -> bool;
}

/// Runs a [`LivenessProber`] inside the probe engine.
pub struct LivenessProbe<L> {
    prober: L,
}

impl<L: LivenessProber> LivenessProbe<L> {
    pub fn new(prober: L) -> Self {
        Self { prober }
    }
}

#[async_trait]
impl<L: LivenessProber> Probe for LivenessProbe<L> {
    async fn probe(&self, job: &ProbeJob, timeout: Duration) -> ProbeResult {
        if self.prober.is_reachable(&job.target, timeout).await {
            ProbeResult::reachable(job)
        } else {
            ProbeResult::unreachable(job, ProbeFailure::Unreachable)
        }
    }
}
