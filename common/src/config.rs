use std::time::Duration;

/// Default per-probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of concurrent probes.
pub const DEFAULT_CONCURRENCY: usize = 100;
/// Default upper bound for `max_concurrency`. Every in-flight connect holds a
/// socket, so this keeps a run below common descriptor limits.
pub const CONCURRENCY_CEILING: usize = 500;
/// Port count above which a scan needs explicit confirmation.
pub const LARGE_SCAN_THRESHOLD: usize = 1_000;
/// Usable-host count above which subnet enumeration falls back to one /24 block.
pub const MAX_SUBNET_HOSTS: usize = 256;

/// Presentation settings for the terminal front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Hides the start-up banner.
    pub no_banner: bool,
    /// Verbosity reduction, `0` prints everything.
    pub quiet: u8,
    /// Disables the keyboard listener that lets the user abort a run.
    pub disable_input: bool,
}

/// Operational limits of the probing engine.
///
/// The defaults are product-level safety heuristics, every field can be
/// overridden by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLimits {
    pub timeout: Duration,
    pub max_concurrency: usize,
    /// Largest accepted `max_concurrency`.
    pub concurrency_ceiling: usize,
    pub large_scan_threshold: usize,
    pub max_subnet_hosts: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_CONCURRENCY,
            concurrency_ceiling: CONCURRENCY_CEILING,
            large_scan_threshold: LARGE_SCAN_THRESHOLD,
            max_subnet_hosts: MAX_SUBNET_HOSTS,
        }
    }
}

impl ScanLimits {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// Converts a user supplied number of seconds into a timeout.
///
/// Rejects negative, zero, NaN and infinite values.
pub fn timeout_from_secs(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
