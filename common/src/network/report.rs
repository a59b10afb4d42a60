use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::Duration;

use crate::network::probe::ProbeResult;
use crate::network::target::Target;

/// Aggregated port scan outcome for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub target: Target,
    pub open_ports: BTreeSet<u16>,
    pub probe_count: usize,
    pub elapsed: Duration,
    /// Set when the target could not be scanned (fully or partially).
    pub error: Option<String>,
}

impl ScanReport {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            open_ports: BTreeSet::new(),
            probe_count: 0,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    /// A report for a target that produced no probe results at all.
    pub fn failed(target: Target, error: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            elapsed,
            error: Some(error.into()),
            ..Self::new(target)
        }
    }

    /// Folds one probe result into the report.
    ///
    /// Results belonging to another target are ignored and `false` is returned.
    pub fn record(&mut self, result: &ProbeResult) -> bool {
        if !self.target.same_as(&result.target) {
            return false;
        }

        self.probe_count += 1;
        if let (true, Some(port)) = (result.reachable, result.port) {
            self.open_ports.insert(port);
        }
        true
    }

    pub fn finish(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Liveness outcome for a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostStatus {
    pub address: IpAddr,
    pub reachable: bool,
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
