use std::net::Ipv4Addr;

use pnet::datalink::{MacAddr, NetworkInterface};
use probr_common::config::MAX_SUBNET_HOSTS;
use probr_common::error::SubnetError;
use probr_common::network::interface::{self, NetworkInterfaceExtension};
use probr_common::network::subnet::{self, Subnet};

use crate::utils::{ni, v4, v6};

/*************************************************************
                 Netmask lookup and enumeration
**************************************************************/

#[test]
fn wlan_address_yields_its_24() {
    let local = Ipv4Addr::new(192, 168, 178, 23);
    let mask = interface::find_netmask(local, &iface_all()).unwrap();
    let subnet: Subnet = subnet::enumerate_hosts(local, mask, MAX_SUBNET_HOSTS).unwrap();

    assert_eq!(subnet.to_string(), "192.168.178.0/24");
    assert_eq!(subnet.hosts.len(), 254);
    assert!(!subnet.capped);
}

#[test]
fn docker_bridge_16_is_capped_to_the_local_block() {
    let local = Ipv4Addr::new(172, 17, 0, 1);
    let mask = interface::find_netmask(local, &iface_all()).unwrap();
    let subnet: Subnet = subnet::enumerate_hosts(local, mask, MAX_SUBNET_HOSTS).unwrap();

    assert_eq!(subnet.prefix(), 16);
    assert!(subnet.capped);
    assert_eq!(subnet.hosts.first(), Some(&Ipv4Addr::new(172, 17, 0, 1)));
    assert_eq!(subnet.hosts.last(), Some(&Ipv4Addr::new(172, 17, 0, 254)));
}

#[test]
fn tunnel_point_to_point_keeps_both_ends() {
    let local = Ipv4Addr::new(10, 8, 0, 2);
    let mask = interface::find_netmask(local, &iface_all()).unwrap();
    let subnet: Subnet = subnet::enumerate_hosts(local, mask, MAX_SUBNET_HOSTS).unwrap();

    assert_eq!(
        subnet.hosts,
        vec![Ipv4Addr::new(10, 8, 0, 2), Ipv4Addr::new(10, 8, 0, 3)]
    );
}

#[test]
fn unknown_address_has_no_interface() {
    let result = interface::find_netmask(Ipv4Addr::new(10, 99, 0, 1), &iface_all());
    assert!(matches!(result, Err(SubnetError::NoMatchingInterface(_))));
}

#[test]
fn ipv6_only_interface_has_no_ipv4_nets() {
    assert!(ipv6only0().get_ipv4_nets().is_empty());
}

/*************************************************************
                  Mock interfaces for testing
**************************************************************/

fn iface_all() -> Vec<NetworkInterface> {
    vec![lo(), wlan0(), docker0(), tun0(), ipv6only0()]
}

fn lo() -> NetworkInterface {
    ni(
        "lo",
        1,
        Some(MacAddr::new(0, 0, 0, 0, 0, 0)),
        &[v4(127, 0, 0, 1, 8), v6("::1", 128)],
        65609,
    )
}

fn wlan0() -> NetworkInterface {
    ni(
        "wlan0",
        3,
        Some(MacAddr::new(0x3c, 0x22, 0xfb, 0x10, 0x20, 0x30)),
        &[v4(192, 168, 178, 23, 24), v6("fe80::3e22:fbff:fe10:2030", 64)],
        69699,
    )
}

fn docker0() -> NetworkInterface {
    ni(
        "docker0",
        4,
        Some(MacAddr::new(0x02, 0x42, 0xac, 0x11, 0x00, 0x01)),
        &[v4(172, 17, 0, 1, 16)],
        4099,
    )
}

fn tun0() -> NetworkInterface {
    ni("tun0", 5, None, &[v4(10, 8, 0, 2, 31)], 69841)
}

fn ipv6only0() -> NetworkInterface {
    ni("ipv6only0", 6, None, &[v6("fd00::1", 64)], 65745)
}
