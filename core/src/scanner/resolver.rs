use std::io;
use std::net::IpAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::lookup_host;

use probr_common::network::target::Target;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("failed to resolve {host}: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} did not resolve to any address")]
    NoAddress(String),
}

/// Turns a target into the single address that will be probed.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, target: &Target) -> Result<IpAddr, ResolveError>;
}

/// Resolves through the operating system. IPv4 answers are preferred.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

#[async_trait]
impl Resolver for SystemResolver {
    async fn resolve(&self, target: &Target) -> Result<IpAddr, ResolveError> {
        if let Some(addr) = target.addr() {
            return Ok(addr);
        }

        let addrs: Vec<IpAddr> = lookup_host((target.name(), 0))
            .await
            .map_err(|source| ResolveError::Lookup {
                host: target.name().to_string(),
                source,
            })?
            .map(|socket_addr| socket_addr.ip())
            .collect();

        addrs
            .iter()
            .find(|addr| addr.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| ResolveError::NoAddress(target.name().to_string()))
    }
}
