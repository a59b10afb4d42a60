use std::io;
use std::net::IpAddr;

use thiserror::Error;

use crate::network::target::Target;

/// Why a probe did not reach its target.
///
/// These are expected outcomes of probing, never engine failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("connection refused")]
    Refused,
    #[error("timed out")]
    TimedOut,
    #[error("unreachable")]
    Unreachable,
    #[error("resolution failed: {0}")]
    Resolution(String),
    /// The local host ran out of sockets or descriptors. Says nothing about
    /// the target.
    #[error("local resources exhausted: {0}")]
    LocalResource(String),
    #[error("{0}")]
    Other(String),
}

impl ProbeFailure {
    /// `true` when the failure happened on this machine, before any packet
    /// could reach the target.
    pub fn is_local(&self) -> bool {
        matches!(self, ProbeFailure::LocalResource(_))
    }
}

// ENFILE, EMFILE
#[cfg(unix)]
const RESOURCE_EXHAUSTION_CODES: &[i32] = &[23, 24];
// WSAEMFILE, WSAENOBUFS
#[cfg(windows)]
const RESOURCE_EXHAUSTION_CODES: &[i32] = &[10024, 10055];
#[cfg(not(any(unix, windows)))]
const RESOURCE_EXHAUSTION_CODES: &[i32] = &[];

fn is_resource_exhaustion(err: &io::Error) -> bool {
    err.raw_os_error()
        .is_some_and(|code| RESOURCE_EXHAUSTION_CODES.contains(&code))
}

impl From<&io::Error> for ProbeFailure {
    fn from(err: &io::Error) -> Self {
        if is_resource_exhaustion(err) {
            return ProbeFailure::LocalResource(err.to_string());
        }
        match err.kind() {
            io::ErrorKind::ConnectionRefused => ProbeFailure::Refused,
            io::ErrorKind::TimedOut => ProbeFailure::TimedOut,
            io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::AddrNotAvailable => ProbeFailure::Unreachable,
            _ => ProbeFailure::Other(err.to_string()),
        }
    }
}

/// One unit of work for the probe engine.
///
/// Port scans carry a port, liveness checks do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeJob {
    pub target: Target,
    pub port: Option<u16>,
}

impl ProbeJob {
    pub fn port(target: Target, port: u16) -> Self {
        Self {
            target,
            port: Some(port),
        }
    }

    pub fn host(target: Target) -> Self {
        Self { target, port: None }
    }
}

/// Outcome of exactly one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub target: Target,
    pub port: Option<u16>,
    pub reachable: bool,
    pub error: Option<ProbeFailure>,
}

impl ProbeResult {
    pub fn reachable(job: &ProbeJob) -> Self {
        Self {
            target: job.target.clone(),
            port: job.port,
            reachable: true,
            error: None,
        }
    }

    pub fn unreachable(job: &ProbeJob, failure: ProbeFailure) -> Self {
        Self {
            target: job.target.clone(),
            port: job.port,
            reachable: false,
            error: Some(failure),
        }
    }

    pub fn addr(&self) -> Option<IpAddr> {
        self.target.addr()
    }
}
