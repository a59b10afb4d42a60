//! # Scan Orchestrator
//!
//! Runs TCP connect scans over several targets.
//!
//! Targets are handled one after the other and every target gets the full
//! concurrency budget, so peak resource use is bounded by a single worker pool.
//! A failing target never stops the run: it ends up as a report with an error
//! note and the next target is scanned.
//!
//! ```text
//! Idle -> Validating -> ConfirmationRequired
//!                    \-> Scanning -> Completed
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use probr_common::config::{CONCURRENCY_CEILING, DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, ScanLimits};
use probr_common::network::ports::{self, PortSet};
use probr_common::network::probe::{ProbeFailure, ProbeJob, ProbeResult};
use probr_common::network::report::ScanReport;
use probr_common::network::target::Target;
use probr_common::signal::AbortSignal;
use probr_common::success;

use crate::engine::{Probe, ProbeEngine, ProgressCallback};
use crate::error::ScanError;
use crate::network::tcp::TcpConnectProbe;

mod resolver;

pub use resolver::{ResolveError, Resolver, SystemResolver};

/// Lower bound for name resolution, independent of short probe timeouts.
const RESOLVE_TIMEOUT_FLOOR: Duration = Duration::from_secs(2);
const ABORTED_NOTE: &str = "scan aborted";

/// Everything a caller decides about one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub targets: Vec<Target>,
    pub port_spec: String,
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub large_scan_confirmed: bool,
}

impl ScanRequest {
    pub fn new(targets: Vec<Target>, port_spec: impl Into<String>) -> Self {
        Self {
            targets,
            port_spec: port_spec.into(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_CONCURRENCY,
            large_scan_confirmed: false,
        }
    }

    pub fn with_limits(mut self, limits: &ScanLimits) -> Self {
        self.timeout = limits.timeout;
        self.max_concurrency = limits.max_concurrency;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn confirmed(mut self, large_scan_confirmed: bool) -> Self {
        self.large_scan_confirmed = large_scan_confirmed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    /// One report per requested target, in request order.
    pub reports: Vec<ScanReport>,
    pub ports: PortSet,
    pub elapsed: Duration,
    pub aborted: bool,
}

impl ScanSummary {
    pub fn open_port_count(&self) -> usize {
        self.reports.iter().map(|r| r.open_ports.len()).sum()
    }

    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failed()).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    Completed(ScanSummary),
    /// The port set is above the large-scan threshold and the caller did not
    /// confirm. Nothing was probed.
    ConfirmationRequired { port_count: usize, threshold: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Validating,
    ConfirmationRequired,
    Scanning,
    Completed,
}

pub struct Scanner {
    probe: Arc<dyn Probe>,
    resolver: Arc<dyn Resolver>,
    large_scan_threshold: usize,
    concurrency_ceiling: usize,
    on_result: Option<ProgressCallback>,
    state: ScanState,
}

impl Scanner {
    /// A TCP connect scanner using the system resolver.
    pub fn new(limits: &ScanLimits) -> Self {
        Self::with_components(
            Arc::new(TcpConnectProbe),
            Arc::new(SystemResolver),
            limits.large_scan_threshold,
        )
        .with_concurrency_ceiling(limits.concurrency_ceiling)
    }

    pub fn with_components(
        probe: Arc<dyn Probe>,
        resolver: Arc<dyn Resolver>,
        large_scan_threshold: usize,
    ) -> Self {
        Self {
            probe,
            resolver,
            large_scan_threshold,
            concurrency_ceiling: CONCURRENCY_CEILING,
            on_result: None,
            state: ScanState::Idle,
        }
    }

    pub fn with_progress(mut self, on_result: ProgressCallback) -> Self {
        self.on_result = Some(on_result);
        self
    }

    pub fn with_concurrency_ceiling(mut self, ceiling: usize) -> Self {
        self.concurrency_ceiling = ceiling;
        self
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Validates `request` and scans every target in order.
    ///
    /// Returns [`ScanError::InvalidRequest`] without probing anything when the
    /// request cannot produce a meaningful scan.
    pub async fn run_scan(
        &mut self,
        request: ScanRequest,
        abort: &AbortSignal,
    ) -> Result<ScanOutcome, ScanError> {
        self.transition(ScanState::Validating);

        let ports: PortSet = match validate(&request, self.concurrency_ceiling) {
            Ok(ports) => ports,
            Err(e) => {
                self.transition(ScanState::Idle);
                return Err(e);
            }
        };

        if ports.len() > self.large_scan_threshold && !request.large_scan_confirmed {
            warn!(
                "{} ports per host exceed the large-scan threshold of {}, confirmation required",
                ports.len(),
                self.large_scan_threshold
            );
            self.transition(ScanState::ConfirmationRequired);
            return Ok(ScanOutcome::ConfirmationRequired {
                port_count: ports.len(),
                threshold: self.large_scan_threshold,
            });
        }

        self.transition(ScanState::Scanning);

        let engine = ProbeEngine::with_ceiling(
            self.probe.clone(),
            request.timeout,
            request.max_concurrency,
            self.concurrency_ceiling,
        )?
        .with_progress(self.on_result.clone());

        let start: Instant = Instant::now();
        let mut reports: Vec<ScanReport> = Vec::with_capacity(request.targets.len());

        for target in request.targets {
            if abort.is_triggered() {
                reports.push(ScanReport::failed(target, ABORTED_NOTE, Duration::ZERO));
                continue;
            }
            let report = self
                .scan_target(&engine, target, &ports, request.timeout, abort)
                .await;
            reports.push(report);
        }

        let summary = ScanSummary {
            reports,
            ports,
            elapsed: start.elapsed(),
            aborted: abort.is_triggered(),
        };

        success!(
            "Scanned {} target(s) in {:.2}s",
            summary.reports.len(),
            summary.elapsed.as_secs_f64()
        );
        self.transition(ScanState::Completed);
        Ok(ScanOutcome::Completed(summary))
    }

    async fn scan_target(
        &self,
        engine: &ProbeEngine,
        target: Target,
        ports: &PortSet,
        timeout: Duration,
        abort: &AbortSignal,
    ) -> ScanReport {
        let start: Instant = Instant::now();

        let resolve_timeout: Duration = timeout.max(RESOLVE_TIMEOUT_FLOOR);
        let resolved: Target =
            match tokio::time::timeout(resolve_timeout, self.resolver.resolve(&target)).await {
                Ok(Ok(addr)) => target.with_addr(addr),
                Ok(Err(e)) => {
                    warn!("Skipping {target}: {e}");
                    return ScanReport::failed(target, e.to_string(), start.elapsed());
                }
                Err(_elapsed) => {
                    let note = format!("resolving {target} timed out");
                    warn!("Skipping {target}: {note}");
                    return ScanReport::failed(target, note, start.elapsed());
                }
            };

        match resolved.addr() {
            Some(addr) if !resolved.is_literal() => {
                info!("Scanning {} ports on {resolved} ({addr})", ports.len())
            }
            _ => info!("Scanning {} ports on {resolved}", ports.len()),
        }

        let jobs: Vec<ProbeJob> = ports
            .iter()
            .map(|port| ProbeJob::port(resolved.clone(), port))
            .collect();

        let results = engine.probe_all(jobs, abort).await;

        let mut report = ScanReport::new(resolved.clone());
        for result in &results {
            report.record(result);
        }
        let report = report.finish(start.elapsed());

        let mut notes: Vec<String> = Vec::new();
        if let Some(note) = local_failure_note(&results) {
            warn!("{resolved}: {note}");
            notes.push(note);
        }
        if results.len() < ports.len() {
            notes.push(format!(
                "{ABORTED_NOTE} after {} of {} ports",
                results.len(),
                ports.len()
            ));
        }

        if notes.is_empty() {
            report
        } else {
            report.with_error(notes.join("; "))
        }
    }

    fn transition(&mut self, next: ScanState) {
        debug!("Scan state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Runs a TCP connect scan with the default components.
pub async fn run_scan(
    request: ScanRequest,
    limits: &ScanLimits,
    abort: &AbortSignal,
) -> Result<ScanOutcome, ScanError> {
    Scanner::new(limits).run_scan(request, abort).await
}

/// Ports whose probe failed on this machine have an unknown state, so the
/// report must not read as if they were closed.
fn local_failure_note(results: &[ProbeResult]) -> Option<String> {
    let local: Vec<&ProbeFailure> = results
        .iter()
        .filter_map(|result| result.error.as_ref())
        .filter(|failure| failure.is_local())
        .collect();

    let first: &ProbeFailure = *local.first()?;
    Some(format!(
        "{} of {} ports not checked ({first}), lower the concurrency",
        local.len(),
        results.len()
    ))
}

fn validate(request: &ScanRequest, concurrency_ceiling: usize) -> Result<PortSet, ScanError> {
    if request.max_concurrency == 0 {
        return Err(ScanError::InvalidRequest("concurrency must be at least 1"));
    }
    if request.max_concurrency > concurrency_ceiling {
        return Err(ScanError::InvalidRequest("concurrency exceeds the configured ceiling"));
    }
    if request.timeout.is_zero() {
        return Err(ScanError::InvalidRequest("timeout must be greater than zero"));
    }
    if request.targets.is_empty() {
        return Err(ScanError::InvalidRequest("no targets given"));
    }

    let ports: PortSet = ports::parse_ports(&request.port_spec);
    if ports.is_empty() {
        return Err(ScanError::InvalidRequest("no valid ports given"));
    }
    Ok(ports)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
