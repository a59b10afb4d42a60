use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

/// A continuous, inclusive range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses in the range, `0` when start is after end.
    pub fn len(&self) -> u64 {
        let start: u64 = u64::from(u32::from(self.start_addr));
        let end: u64 = u64::from(u32::from(self.end_addr));
        if start > end { 0 } else { end - start + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The host addresses of a network.
///
/// Network and broadcast addresses are excluded, except for point-to-point
/// `/31` networks (both addresses usable) and single-host `/32` networks.
pub fn usable_range(network: &Ipv4Network) -> Ipv4Range {
    let start: u32 = u32::from(network.network());
    let end: u32 = u32::from(network.broadcast());

    match network.prefix() {
        31 | 32 => Ipv4Range::new(Ipv4Addr::from(start), Ipv4Addr::from(end)),
        _ => Ipv4Range::new(
            Ipv4Addr::from(start.saturating_add(1)),
            Ipv4Addr::from(end.saturating_sub(1)),
        ),
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
