//! # Subnet Enumeration
//!
//! Derives the candidate hosts of a local IPv4 network from an interface
//! address and its netmask.
//!
//! Large networks are not enumerated in full. When the usable host count goes
//! over the configured cap, the host list shrinks to the `/24` block the local
//! address lives in, never reaching past the network itself, and
//! [`Subnet::capped`] reports whether the scope was actually reduced.

use std::fmt;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;
use tracing::warn;

use crate::error::SubnetError;
use crate::network::range::{self, Ipv4Range};

/// Hosts in the fallback block: `x.y.z.1` to `x.y.z.254`.
pub const FALLBACK_BLOCK_HOSTS: u8 = 254;

/// A local network and the addresses selected for probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    /// The network in CIDR form, normalised to its network address.
    pub network: Ipv4Network,
    /// Hosts to probe, ascending.
    pub hosts: Vec<Ipv4Addr>,
    /// `true` when the host list was reduced to the fallback `/24` block.
    pub capped: bool,
}

impl Subnet {
    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn network_addr(&self) -> Ipv4Addr {
        self.network.network()
    }

    /// Usable hosts of the full network, regardless of the cap.
    pub fn usable_count(&self) -> u64 {
        range::usable_range(&self.network).len()
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.network(), self.network.prefix())
    }
}

/// Computes the subnet of `local_addr` and lists its usable hosts.
///
/// `max_hosts` is the largest usable-host count enumerated in full.
pub fn enumerate_hosts(
    local_addr: Ipv4Addr,
    netmask: Ipv4Addr,
    max_hosts: usize,
) -> Result<Subnet, SubnetError> {
    let network: Ipv4Network = Ipv4Network::with_netmask(local_addr, netmask)
        .and_then(|net| Ipv4Network::new(net.network(), net.prefix()))
        .map_err(|_| SubnetError::InvalidNetmask(netmask))?;

    let usable: Ipv4Range = range::usable_range(&network);

    if usable.len() > max_hosts as u64 {
        let block: Ipv4Range = fallback_block(local_addr, &usable);
        if block.len() < usable.len() {
            warn!(
                "Subnet {}/{} has {} usable addresses, limiting the scan to {} - {}",
                network.network(),
                network.prefix(),
                usable.len(),
                block.start_addr,
                block.end_addr
            );
            return Ok(Subnet {
                network,
                hosts: block.iter().collect(),
                capped: true,
            });
        }
    }

    Ok(Subnet {
        network,
        hosts: usable.iter().collect(),
        capped: false,
    })
}

/// The `/24`-equivalent block sharing the first three octets of `addr`,
/// clipped to the usable range of its network.
fn fallback_block(addr: Ipv4Addr, usable: &Ipv4Range) -> Ipv4Range {
    let [a, b, c, _] = addr.octets();
    Ipv4Range::new(
        Ipv4Addr::new(a, b, c, 1).max(usable.start_addr),
        Ipv4Addr::new(a, b, c, FALLBACK_BLOCK_HOSTS).min(usable.end_addr),
    )
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
