use std::time::Duration;

use colored::*;
use tracing::warn;

use probr_common::config::{Config, ScanLimits};
use probr_common::network::report::HostStatus;
use probr_common::network::subnet::{self, Subnet};
use probr_common::network::interface;
use probr_common::signal::AbortSignal;
use probr_common::success;
use probr_core::discovery::{Discovery, DiscoveryService};
use probr_core::liveness::{PingProber, TcpLivenessProber};

use crate::commands::DiscoverArgs;
use crate::mprint;
use crate::terminal::format;
use crate::terminal::input::InputHandle;
use crate::terminal::{colors, print, spinner};

pub async fn discover(
    args: &DiscoverArgs,
    cfg: &Config,
    limits: &ScanLimits,
    abort: &AbortSignal,
) -> anyhow::Result<()> {
    let service: DiscoveryService = if args.native {
        DiscoveryService::new(TcpLivenessProber::default(), limits.clone())
    } else {
        DiscoveryService::new(PingProber::new(), limits.clone())
    };

    print::header("getting ready for discovery", cfg.quiet);

    let subnet: Subnet = match (args.address, args.netmask) {
        (Some(address), Some(netmask)) => {
            subnet::enumerate_hosts(address, netmask, limits.max_subnet_hosts)?
        }
        _ => interface::detect_local_subnet(limits.max_subnet_hosts)?,
    };

    if cfg.quiet == 0 {
        print::aligned_line("Network", subnet.to_string());
        print::aligned_line("Hosts", subnet.hosts.len().to_string());
        print::aligned_line("Method", if args.native { "tcp handshake" } else { "icmp echo" });
        print::aligned_line("Timeout", format::secs(limits.timeout));
    }

    let progress = spinner::Progress::start(subnet.hosts.len(), "alive");
    let service = service.with_progress(progress.callback());

    let discovery: Discovery = {
        let _input = InputHandle::start(abort.clone(), cfg.disable_input);
        let _entered = progress.enter();
        service.probe_subnet(subnet, abort).await?
    };

    discovery_ends(&discovery, cfg);
    Ok(())
}

fn discovery_ends(discovery: &Discovery, cfg: &Config) {
    if discovery.aborted {
        warn!("Discovery was aborted, unprobed hosts are reported as down");
    }

    let alive: Vec<&HostStatus> = discovery.alive().collect();
    if alive.is_empty() {
        print::header("zero hosts detected", cfg.quiet);
        print::no_results("hosts");
        return;
    }

    if cfg.quiet > 0 {
        mprint!();
    }

    print::header("network discovery", cfg.quiet);
    print_hosts(&alive, cfg);
    print_summary(alive.len(), discovery.hosts.len(), discovery.elapsed, cfg);
}

fn print_hosts(hosts: &[&HostStatus], cfg: &Config) {
    for (idx, host) in hosts.iter().enumerate() {
        match cfg.quiet {
            0 | 1 => {
                let (kind, addr) = format::ip_to_detail(host.address);
                print::tree_head(idx, &format!("{addr} {}", kind.color(colors::SEPARATOR)));
            }
            _ => print::print(&host.address.to_string().color(colors::IPV4_ADDR).to_string()),
        }
    }
}

fn print_summary(alive: usize, swept: usize, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{alive} active hosts").bold().green();
    let swept: ColoredString = format!("{swept} addresses").bold();
    let total_time: ColoredString = format::secs(total_time).bold().yellow();
    let output: String =
        format!("Discovery Complete: {active_hosts} out of {swept} in {total_time}")
            .color(colors::TEXT_DEFAULT)
            .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => success!("{}", output),
    }
}
