use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::lookup_host;

use probr_common::network::target::Target;

use super::LivenessProber;
use crate::network::tcp;

/// Ports tried by [`TcpLivenessProber`] unless configured otherwise.
pub const DEFAULT_LIVENESS_PORTS: [u16; 4] = [80, 443, 22, 445];

/// In-process liveness check that needs no privileges and no `ping` binary.
///
/// A host is alive when any configured port completes a handshake or actively
/// refuses it. The ports are tried concurrently and share one timeout.
#[derive(Debug, Clone)]
pub struct TcpLivenessProber {
    ports: Vec<u16>,
}

impl Default for TcpLivenessProber {
    fn default() -> Self {
        Self {
            ports: DEFAULT_LIVENESS_PORTS.to_vec(),
        }
    }
}

impl TcpLivenessProber {
    pub fn with_ports(ports: Vec<u16>) -> Self {
        Self { ports }
    }
}

#[async_trait]
impl LivenessProber for TcpLivenessProber {
    async fn is_reachable(&self, target: &Target, timeout: Duration) -> bool {
        let addr: IpAddr = match target.addr() {
            Some(addr) => addr,
            None => match lookup_host((target.name(), 0)).await {
                Ok(mut addrs) => match addrs.next() {
                    Some(socket_addr) => socket_addr.ip(),
                    None => return false,
                },
                Err(_) => return false,
            },
        };

        let mut attempts = tokio::task::JoinSet::new();
        for &port in &self.ports {
            attempts.spawn(tcp::handshake_probe(addr, port, timeout));
        }

        while let Some(joined) = attempts.join_next().await {
            if let Ok(true) = joined {
                attempts.abort_all();
                return true;
            }
        }
        false
    }
}
