use std::net::Ipv4Addr;

use thiserror::Error;

/// Failures while deriving the set of hosts of a local subnet.
#[derive(Debug, Error)]
pub enum SubnetError {
    #[error("no local interface carries the address {0}")]
    NoMatchingInterface(Ipv4Addr),
    #[error("{0} is not a valid netmask")]
    InvalidNetmask(Ipv4Addr),
    #[error("failed to determine the local address: {0}")]
    LocalAddress(#[source] std::io::Error),
    #[error("the local address {0} is not an IPv4 address")]
    NotIpv4(std::net::IpAddr),
}
