use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use probr_common::config::ScanLimits;
use probr_common::signal::AbortSignal;
use probr_core::discovery::DiscoveryService;
use probr_core::liveness::TcpLivenessProber;

use crate::utils::listener;

/// 127.0.0.0/30 holds two usable hosts, 127.0.0.1 is always bound to loopback.
#[tokio::test]
async fn tcp_discovery_finds_loopback() {
    let (_open, port) = listener().await;

    let limits = ScanLimits::default().with_timeout(Duration::from_millis(500));
    let service = DiscoveryService::new(TcpLivenessProber::with_ports(vec![port]), limits);

    let discovery = service
        .discover_hosts(
            Ipv4Addr::LOCALHOST,
            Ipv4Addr::new(255, 255, 255, 252),
            &AbortSignal::new(),
        )
        .await
        .unwrap();

    assert_eq!(discovery.subnet.to_string(), "127.0.0.0/30");
    assert_eq!(discovery.hosts.len(), 2);
    assert_eq!(discovery.hosts[0].address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert!(discovery.hosts[0].reachable);
    assert_eq!(
        discovery.hosts[1].address,
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2))
    );
    assert!(!discovery.aborted);
}

#[tokio::test]
async fn single_host_network_is_swept() {
    let (_open, port) = listener().await;

    let limits = ScanLimits::default().with_timeout(Duration::from_millis(500));
    let service = DiscoveryService::new(TcpLivenessProber::with_ports(vec![port]), limits);

    let discovery = service
        .discover_hosts(
            Ipv4Addr::LOCALHOST,
            Ipv4Addr::new(255, 255, 255, 255),
            &AbortSignal::new(),
        )
        .await
        .unwrap();

    assert_eq!(discovery.alive_count(), 1);
    assert_eq!(discovery.hosts.len(), 1);
}

/// Relies on the system `ping`, which may be missing or blocked in sandboxes.
#[tokio::test]
#[ignore]
async fn ping_discovery_finds_loopback() {
    let hosts = probr_core::discovery::discover_hosts(
        Ipv4Addr::LOCALHOST,
        Ipv4Addr::new(255, 255, 255, 255),
        Duration::from_secs(1),
    )
    .await
    .unwrap();

    assert_eq!(hosts.len(), 1);
    assert!(hosts[0].reachable);
}
