use std::net::{IpAddr, Ipv6Addr};
use std::time::Duration;

use colored::*;

use probr_common::network::ports::PortSet;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn ipv6_to_type_str(ipv6_addr: &Ipv6Addr) -> &'static str {
    if is_global_unicast(ipv6_addr) {
        return "GUA";
    }
    if ipv6_addr.is_unique_local() {
        return "ULA";
    }
    if ipv6_addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

// 2000::/3
fn is_global_unicast(ipv6_addr: &Ipv6Addr) -> bool {
    let first_byte = ipv6_addr.octets()[0];
    (0x20..=0x3F).contains(&first_byte)
}

pub fn ip_to_detail(ip: IpAddr) -> Detail {
    match ip {
        IpAddr::V4(ipv4_addr) => ("IPv4".to_string(), ipv4_addr.to_string().color(colors::IPV4_ADDR)),
        IpAddr::V6(ipv6_addr) => (
            ipv6_to_type_str(&ipv6_addr).to_string(),
            ipv6_addr.to_string().color(colors::IPV6_ADDR),
        ),
    }
}

pub fn ports_to_detail<'a>(open_ports: impl IntoIterator<Item = &'a u16>) -> Detail {
    let ports: PortSet = open_ports.into_iter().copied().collect();
    let value: ColoredString = if ports.is_empty() {
        "none".color(colors::SEPARATOR)
    } else {
        ports.to_string().color(colors::PORT_OPEN).bold()
    };
    ("Open".to_string(), value)
}

pub fn duration_to_detail(elapsed: Duration) -> Detail {
    ("Time".to_string(), secs(elapsed).color(colors::TEXT_DEFAULT))
}

pub fn error_to_detail(error: &str) -> Detail {
    ("Error".to_string(), error.color(colors::FAILURE))
}

pub fn secs(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
