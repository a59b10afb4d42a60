use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;

use probr_common::network::probe::{ProbeFailure, ProbeJob, ProbeResult};
use probr_common::network::target::Target;

use crate::engine::Probe;

/// TCP connect scan: a port is open when the three-way handshake completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProbe;

#[async_trait]
impl Probe for TcpConnectProbe {
    async fn probe(&self, job: &ProbeJob, probe_timeout: Duration) -> ProbeResult {
        let Some(port) = job.port else {
            return ProbeResult::unreachable(job, ProbeFailure::Other("no port to connect to".into()));
        };

        match connect(&job.target, port, probe_timeout).await {
            Ok(()) => ProbeResult::reachable(job),
            Err(failure) => ProbeResult::unreachable(job, failure),
        }
    }
}

/// Attempts one TCP connection, dropping the socket as soon as it is established.
///
/// Unresolved targets are looked up first, within the same timeout.
pub async fn connect(target: &Target, port: u16, probe_timeout: Duration) -> Result<(), ProbeFailure> {
    let attempt = async {
        let socket_addr: SocketAddr = match target.addr() {
            Some(ip) => SocketAddr::new(ip, port),
            None => resolve_socket_addr(target.name(), port).await?,
        };
        TcpStream::connect(socket_addr)
            .await
            .map(drop)
            .map_err(|e| ProbeFailure::from(&e))
    };

    match timeout(probe_timeout, attempt).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(ProbeFailure::TimedOut),
    }
}

/// Handshake-based liveness: a completed or actively refused connection both
/// prove that something answered at `addr`.
pub async fn handshake_probe(addr: IpAddr, port: u16, probe_timeout: Duration) -> bool {
    let socket_addr: SocketAddr = SocketAddr::new(addr, port);

    match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(e)) => ProbeFailure::from(&e) == ProbeFailure::Refused,
        Err(_elapsed) => false,
    }
}

async fn resolve_socket_addr(host: &str, port: u16) -> Result<SocketAddr, ProbeFailure> {
    lookup_host((host, port))
        .await
        .map_err(|e| ProbeFailure::Resolution(e.to_string()))?
        .next()
        .ok_or_else(|| ProbeFailure::Resolution(format!("{host} has no addresses")))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
