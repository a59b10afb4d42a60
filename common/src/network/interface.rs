use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};
use tracing::debug;

use crate::error::SubnetError;
use crate::network::subnet::{self, Subnet};

/// Public address used to pick the outbound interface. Nothing is sent to it.
const ROUTE_PROBE_ADDR: (Ipv4Addr, u16) = (Ipv4Addr::new(8, 8, 8, 8), 80);

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn find_ipv4_net(&self, addr: Ipv4Addr) -> Option<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn find_ipv4_net(&self, addr: Ipv4Addr) -> Option<Ipv4Network> {
        self.get_ipv4_nets().into_iter().find(|net| net.ip() == addr)
    }
}

/// Finds the IPv4 address of the interface that routes to the internet.
///
/// Connecting a UDP socket only selects a route, no packet leaves the host.
pub fn get_local_ipv4() -> Result<Ipv4Addr, SubnetError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(SubnetError::LocalAddress)?;
    socket
        .connect(ROUTE_PROBE_ADDR)
        .map_err(SubnetError::LocalAddress)?;

    match socket.local_addr().map_err(SubnetError::LocalAddress)?.ip() {
        IpAddr::V4(ipv4) => Ok(ipv4),
        other => Err(SubnetError::NotIpv4(other)),
    }
}

/// Looks up the netmask configured for `local_addr` among `interfaces`.
pub fn find_netmask(
    local_addr: Ipv4Addr,
    interfaces: &[NetworkInterface],
) -> Result<Ipv4Addr, SubnetError> {
    interfaces
        .iter()
        .find_map(|intf| {
            intf.find_ipv4_net(local_addr).map(|net| {
                debug!("{local_addr} belongs to interface {}", intf.name);
                net.mask()
            })
        })
        .ok_or(SubnetError::NoMatchingInterface(local_addr))
}

/// Detects the local network and enumerates its hosts.
pub fn detect_local_subnet(max_hosts: usize) -> Result<Subnet, SubnetError> {
    let local_addr: Ipv4Addr = get_local_ipv4()?;
    let netmask: Ipv4Addr = find_netmask(local_addr, &datalink::interfaces())?;
    subnet::enumerate_hosts(local_addr, netmask, max_hosts)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
