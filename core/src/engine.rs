//! # Probe Engine
//!
//! Executes independent probes against a list of jobs through a fixed-size
//! worker pool.
//!
//! * At most `max_concurrency` probes are in flight, and never more workers
//!   than jobs.
//! * Every probe is bounded by the configured timeout.
//! * Failed probes are results (`reachable = false`), not errors.
//! * Results arrive in completion order. Consumers aggregate by target.
//! * Cancellation is cooperative: once the [`AbortSignal`] fires, workers
//!   finish their current probe and stop taking new jobs.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

use probr_common::config::CONCURRENCY_CEILING;
use probr_common::network::probe::{ProbeFailure, ProbeJob, ProbeResult};
use probr_common::signal::AbortSignal;

use crate::error::EngineError;

/// A single kind of probe (TCP connect, liveness check, ...).
#[async_trait]
pub trait Probe: Send + Sync {
    /// Runs one attempt against `job`, giving up after `timeout`.
    async fn probe(&self, job: &ProbeJob, timeout: Duration) -> ProbeResult;
}

/// Invoked once for every completed probe.
pub type ProgressCallback = Arc<dyn Fn(&ProbeResult) + Send + Sync>;

type JobQueue = Arc<Mutex<VecDeque<ProbeJob>>>;

pub struct ProbeEngine {
    probe: Arc<dyn Probe>,
    timeout: Duration,
    max_concurrency: usize,
    on_result: Option<ProgressCallback>,
}

impl ProbeEngine {
    /// An engine bounded by the default [`CONCURRENCY_CEILING`].
    pub fn new(
        probe: Arc<dyn Probe>,
        timeout: Duration,
        max_concurrency: usize,
    ) -> Result<Self, EngineError> {
        Self::with_ceiling(probe, timeout, max_concurrency, CONCURRENCY_CEILING)
    }

    pub fn with_ceiling(
        probe: Arc<dyn Probe>,
        timeout: Duration,
        max_concurrency: usize,
        ceiling: usize,
    ) -> Result<Self, EngineError> {
        if max_concurrency == 0 {
            return Err(EngineError::ZeroConcurrency);
        }
        if max_concurrency > ceiling {
            return Err(EngineError::ConcurrencyAboveCeiling {
                requested: max_concurrency,
                ceiling,
            });
        }
        Ok(Self {
            probe,
            timeout,
            max_concurrency,
            on_result: None,
        })
    }

    pub fn with_progress(mut self, on_result: Option<ProgressCallback>) -> Self {
        self.on_result = on_result;
        self
    }

    /// Number of workers spawned for `job_count` jobs.
    pub fn pool_size(&self, job_count: usize) -> usize {
        self.max_concurrency.min(job_count)
    }

    /// Probes every job and returns the results in completion order.
    ///
    /// Returns fewer results than jobs only when `abort` fired.
    pub async fn probe_all(&self, jobs: Vec<ProbeJob>, abort: &AbortSignal) -> Vec<ProbeResult> {
        let total: usize = jobs.len();
        let workers: usize = self.pool_size(total);
        if workers == 0 {
            return Vec::new();
        }

        debug!("Dispatching {total} probes over {workers} workers");

        let queue: JobQueue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let (tx, mut rx) = mpsc::unbounded_channel::<ProbeResult>();
        let mut pool: JoinSet<()> = JoinSet::new();

        for _ in 0..workers {
            let queue = queue.clone();
            let tx = tx.clone();
            let probe = self.probe.clone();
            let abort = abort.clone();
            let on_result = self.on_result.clone();
            let timeout = self.timeout;

            pool.spawn(async move {
                while !abort.is_triggered() {
                    let Some(job) = next_job(&queue) else {
                        break;
                    };
                    let result: ProbeResult = run_probe(probe.as_ref(), &job, timeout).await;
                    if let Some(callback) = &on_result {
                        callback(&result);
                    }
                    if tx.send(result).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut results: Vec<ProbeResult> = Vec::with_capacity(total);
        while let Some(result) = rx.recv().await {
            results.push(result);
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!("Probe worker terminated abnormally: {e}");
            }
        }

        if results.len() < total {
            debug!("Aborted after {} of {total} probes", results.len());
        }
        results
    }
}

/// Convenience wrapper around [`ProbeEngine::probe_all`].
pub async fn probe_all(
    jobs: Vec<ProbeJob>,
    probe: Arc<dyn Probe>,
    timeout: Duration,
    max_concurrency: usize,
    abort: &AbortSignal,
) -> Result<Vec<ProbeResult>, EngineError> {
    let engine = ProbeEngine::new(probe, timeout, max_concurrency)?;
    Ok(engine.probe_all(jobs, abort).await)
}

fn next_job(queue: &JobQueue) -> Option<ProbeJob> {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
}

async fn run_probe(probe: &dyn Probe, job: &ProbeJob, timeout: Duration) -> ProbeResult {
    match tokio::time::timeout(timeout, probe.probe(job, timeout)).await {
        Ok(result) => result,
        Err(_elapsed) => ProbeResult::unreachable(job, ProbeFailure::TimedOut),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use probr_common::network::target::Target;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// Sleeps for a fixed delay and tracks how many probes overlap.
    struct SlowProbe {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl SlowProbe {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Probe for SlowProbe {
        async fn probe(&self, job: &ProbeJob, _timeout: Duration) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeResult::reachable(job)
        }
    }

    /// Triggers the abort signal from inside the first probe.
    struct AbortingProbe {
        abort: AbortSignal,
    }

    #[async_trait]
    impl Probe for AbortingProbe {
        async fn probe(&self, job: &ProbeJob, _timeout: Duration) -> ProbeResult {
            self.abort.trigger();
            ProbeResult::reachable(job)
        }
    }

    fn jobs(count: u16) -> Vec<ProbeJob> {
        (1..=count)
            .map(|port| ProbeJob::port(Target::new("127.0.0.1"), port))
            .collect()
    }

    #[tokio::test]
    async fn never_exceeds_max_concurrency() {
        let probe = Arc::new(SlowProbe::new(Duration::from_millis(20)));
        let results = probe_all(jobs(40), probe.clone(), Duration::from_secs(1), 4, &AbortSignal::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 40);
        assert_eq!(probe.calls.load(Ordering::SeqCst), 40);
        assert!(probe.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn slow_probes_are_cut_at_the_timeout() {
        let probe = Arc::new(SlowProbe::new(Duration::from_secs(30)));
        let start = Instant::now();
        let results = probe_all(
            jobs(10),
            probe,
            Duration::from_millis(100),
            10,
            &AbortSignal::new(),
        )
        .await
        .unwrap();

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| !r.reachable));
        assert!(results.iter().all(|r| r.error == Some(ProbeFailure::TimedOut)));
    }

    #[tokio::test]
    async fn duration_scales_with_batches_not_job_count() {
        let probe = Arc::new(SlowProbe::new(Duration::from_secs(30)));
        let start = Instant::now();
        let _ = probe_all(
            jobs(20),
            probe,
            Duration::from_millis(100),
            10,
            &AbortSignal::new(),
        )
        .await
        .unwrap();

        // two batches of 100ms, far below 20 sequential timeouts
        assert!(start.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test]
    async fn empty_job_list_spawns_nothing() {
        let probe = Arc::new(SlowProbe::new(Duration::ZERO));
        let results = probe_all(Vec::new(), probe.clone(), Duration::from_secs(1), 8, &AbortSignal::new())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_concurrency_is_rejected() {
        let probe = Arc::new(SlowProbe::new(Duration::ZERO));
        let result = probe_all(jobs(3), probe, Duration::from_secs(1), 0, &AbortSignal::new()).await;
        assert_eq!(result.unwrap_err(), EngineError::ZeroConcurrency);
    }

    #[tokio::test]
    async fn pre_triggered_abort_dispatches_nothing() {
        let abort = AbortSignal::new();
        abort.trigger();
        let probe = Arc::new(SlowProbe::new(Duration::ZERO));

        let results = probe_all(jobs(5), probe.clone(), Duration::from_secs(1), 2, &abort)
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn abort_stops_new_dispatch_but_keeps_finished_results() {
        let abort = AbortSignal::new();
        let probe = Arc::new(AbortingProbe {
            abort: abort.clone(),
        });

        let results = probe_all(jobs(50), probe, Duration::from_secs(1), 1, &abort)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].reachable);
    }

    #[tokio::test]
    async fn progress_callback_sees_every_result() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let engine = ProbeEngine::new(
            Arc::new(SlowProbe::new(Duration::ZERO)),
            Duration::from_secs(1),
            3,
        )
        .unwrap()
        .with_progress(Some(Arc::new(move |_: &ProbeResult| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let results = engine.probe_all(jobs(7), &AbortSignal::new()).await;
        assert_eq!(results.len(), 7);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn concurrency_above_the_ceiling_is_rejected() {
        let probe = Arc::new(SlowProbe::new(Duration::ZERO));
        let result = probe_all(jobs(3), probe.clone(), Duration::from_secs(1), 501, &AbortSignal::new()).await;
        assert_eq!(
            result.unwrap_err(),
            EngineError::ConcurrencyAboveCeiling {
                requested: 501,
                ceiling: 500
            }
        );
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);

        let raised = ProbeEngine::with_ceiling(probe, Duration::from_secs(1), 2_000, 4_096);
        assert!(raised.is_ok());
    }

    #[test]
    fn pool_never_exceeds_job_count() {
        let engine = ProbeEngine::new(
            Arc::new(SlowProbe::new(Duration::ZERO)),
            Duration::from_secs(1),
            100,
        )
        .unwrap();

        assert_eq!(engine.pool_size(3), 3);
        assert_eq!(engine.pool_size(1_000), 100);
        assert_eq!(engine.pool_size(0), 0);
    }
}
