//! # Network Discovery Service
//!
//! Finds responsive hosts on a local IPv4 network.
//!
//! The subnet is enumerated first (see [`probr_common::network::subnet`]), then
//! every address goes through the [`ProbeEngine`] as a liveness job. How a host
//! is judged alive is up to the [`LivenessProber`] the service was built with.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use probr_common::config::ScanLimits;
use probr_common::network::interface;
use probr_common::network::probe::ProbeJob;
use probr_common::network::report::HostStatus;
use probr_common::network::subnet::{self, Subnet};
use probr_common::network::target::Target;
use probr_common::signal::AbortSignal;
use probr_common::success;

use crate::engine::{Probe, ProbeEngine, ProgressCallback};
use crate::error::DiscoveryError;
use crate::liveness::{LivenessProbe, LivenessProber, PingProber};

/// Outcome of one discovery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    /// The network that was swept, including whether it was capped.
    pub subnet: Subnet,
    /// One entry per enumerated address, in address order.
    pub hosts: Vec<HostStatus>,
    pub elapsed: Duration,
    /// Addresses left unprobed after an abort are reported as unreachable.
    pub aborted: bool,
}

impl Discovery {
    pub fn alive(&self) -> impl Iterator<Item = &HostStatus> {
        self.hosts.iter().filter(|host| host.reachable)
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }
}

pub struct DiscoveryService {
    probe: Arc<dyn Probe>,
    limits: ScanLimits,
    on_result: Option<ProgressCallback>,
}

impl DiscoveryService {
    pub fn new<L: LivenessProber + 'static>(prober: L, limits: ScanLimits) -> Self {
        Self {
            probe: Arc::new(LivenessProbe::new(prober)),
            limits,
            on_result: None,
        }
    }

    pub fn with_progress(mut self, on_result: ProgressCallback) -> Self {
        self.on_result = Some(on_result);
        self
    }

    pub fn limits(&self) -> &ScanLimits {
        &self.limits
    }

    /// Sweeps the network `local_addr` belongs to under `netmask`.
    pub async fn discover_hosts(
        &self,
        local_addr: Ipv4Addr,
        netmask: Ipv4Addr,
        abort: &AbortSignal,
    ) -> Result<Discovery, DiscoveryError> {
        let subnet: Subnet =
            subnet::enumerate_hosts(local_addr, netmask, self.limits.max_subnet_hosts)?;
        self.probe_subnet(subnet, abort).await
    }

    /// Detects the network of the outbound interface and sweeps it.
    pub async fn discover_local(&self, abort: &AbortSignal) -> Result<Discovery, DiscoveryError> {
        let subnet: Subnet = interface::detect_local_subnet(self.limits.max_subnet_hosts)?;
        self.probe_subnet(subnet, abort).await
    }

    pub async fn probe_subnet(
        &self,
        subnet: Subnet,
        abort: &AbortSignal,
    ) -> Result<Discovery, DiscoveryError> {
        if self.limits.timeout.is_zero() {
            return Err(DiscoveryError::InvalidRequest("timeout must be greater than zero"));
        }

        let engine = ProbeEngine::with_ceiling(
            self.probe.clone(),
            self.limits.timeout,
            self.limits.max_concurrency,
            self.limits.concurrency_ceiling,
        )?
        .with_progress(self.on_result.clone());

        info!("Probing {} hosts in {subnet}", subnet.hosts.len());

        let start: Instant = Instant::now();
        let jobs: Vec<ProbeJob> = subnet
            .hosts
            .iter()
            .map(|host| ProbeJob::host(Target::from(*host)))
            .collect();

        let results = engine.probe_all(jobs, abort).await;

        let alive: HashSet<IpAddr> = results
            .iter()
            .filter(|result| result.reachable)
            .filter_map(|result| result.addr())
            .collect();

        let hosts: Vec<HostStatus> = subnet
            .hosts
            .iter()
            .map(|host| {
                let address = IpAddr::V4(*host);
                HostStatus {
                    address,
                    reachable: alive.contains(&address),
                }
            })
            .collect();

        let discovery = Discovery {
            aborted: results.len() < hosts.len(),
            subnet,
            hosts,
            elapsed: start.elapsed(),
        };

        success!(
            "{} of {} hosts in {} responded",
            discovery.alive_count(),
            discovery.hosts.len(),
            discovery.subnet
        );
        Ok(discovery)
    }
}

/// Pings every usable host of the network `local_addr` belongs to.
pub async fn discover_hosts(
    local_addr: Ipv4Addr,
    netmask: Ipv4Addr,
    timeout: Duration,
) -> Result<Vec<HostStatus>, DiscoveryError> {
    let limits = ScanLimits::default().with_timeout(timeout);
    let discovery = DiscoveryService::new(PingProber::new(), limits)
        .discover_hosts(local_addr, netmask, &AbortSignal::new())
        .await?;
    Ok(discovery.hosts)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
