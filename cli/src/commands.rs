pub mod discover;
pub mod scan;

use std::net::Ipv4Addr;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use probr_common::config::{
    self, CONCURRENCY_CEILING, Config, DEFAULT_CONCURRENCY, LARGE_SCAN_THRESHOLD,
    MAX_SUBNET_HOSTS, ScanLimits,
};

#[derive(Parser)]
#[command(name = "probr", version)]
#[command(about = "Bounded-concurrency TCP port scanner and host discovery.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output, repeat for less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,

    /// Do not listen for 'q' on the keyboard
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Ports per host above which a scan needs --yes
    #[arg(long, global = true, default_value_t = LARGE_SCAN_THRESHOLD)]
    pub large_scan_threshold: usize,

    /// Usable hosts above which discovery only sweeps the local /24
    #[arg(long, global = true, default_value_t = MAX_SUBNET_HOSTS)]
    pub max_subnet_hosts: usize,

    /// Highest accepted --concurrency, mind the open file limit when raising it
    #[arg(long, global = true, default_value_t = CONCURRENCY_CEILING, value_parser = parse_concurrency)]
    pub concurrency_ceiling: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan TCP ports on one or more hosts
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Find responsive hosts on the local network
    #[command(alias = "d")]
    Discover(DiscoverArgs),
}

#[derive(Args)]
pub struct ScanArgs {
    /// Hostnames or IP addresses, comma or space separated
    #[arg(required = true)]
    pub targets: Vec<String>,

    /// Ports to probe, e.g. 22,80,8000-8100
    #[arg(short, long, default_value = "1-1024")]
    pub ports: String,

    /// Confirm scans above the large-scan threshold
    #[arg(short, long)]
    pub yes: bool,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// Address inside the network to sweep (defaults to this host)
    #[arg(long, requires = "netmask")]
    pub address: Option<Ipv4Addr>,

    /// Netmask of that network
    #[arg(long, requires = "address")]
    pub netmask: Option<Ipv4Addr>,

    /// Use TCP handshakes instead of the system ping
    #[arg(long)]
    pub native: bool,

    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Seconds to wait for each probe
    #[arg(short, long, default_value = "1.0", value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Probes in flight at once
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            no_banner: self.no_banner,
            quiet: self.quiet,
            disable_input: self.no_input,
        }
    }

    pub fn limits(&self, probe: &ProbeArgs) -> anyhow::Result<ScanLimits> {
        if probe.concurrency > self.concurrency_ceiling {
            anyhow::bail!(
                "--concurrency {} is above the ceiling of {}, raise --concurrency-ceiling to allow it",
                probe.concurrency,
                self.concurrency_ceiling
            );
        }

        Ok(ScanLimits {
            timeout: probe.timeout,
            max_concurrency: probe.concurrency,
            concurrency_ceiling: self.concurrency_ceiling,
            large_scan_threshold: self.large_scan_threshold,
            max_subnet_hosts: self.max_subnet_hosts,
        })
    }
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a number of seconds"))?;
    config::timeout_from_secs(secs).ok_or_else(|| format!("timeout must be a positive number, got {s}"))
}

fn parse_concurrency(s: &str) -> Result<usize, String> {
    match s.trim().parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{s}' is not a whole number")),
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_line_is_consistent() {
        CommandLine::command().debug_assert();
    }

    #[test]
    fn scan_defaults() {
        let cli = CommandLine::try_parse_from(["probr", "scan", "10.0.0.1"]).unwrap();
        let Commands::Scan(args) = &cli.command else {
            panic!("expected scan");
        };

        assert_eq!(args.ports, "1-1024");
        assert!(!args.yes);

        let limits = cli.limits(&args.probe).unwrap();
        assert_eq!(limits, ScanLimits::default());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = CommandLine::try_parse_from([
            "probr",
            "scan",
            "a.lan,b.lan",
            "c.lan",
            "-p",
            "22,80",
            "-t",
            "0.25",
            "-c",
            "8",
            "-qq",
            "--large-scan-threshold",
            "50",
        ])
        .unwrap();
        let Commands::Scan(args) = &cli.command else {
            panic!("expected scan");
        };

        assert_eq!(args.targets, vec!["a.lan,b.lan", "c.lan"]);
        assert_eq!(cli.quiet, 2);

        let limits = cli.limits(&args.probe).unwrap();
        assert_eq!(limits.timeout, Duration::from_millis(250));
        assert_eq!(limits.max_concurrency, 8);
        assert_eq!(limits.large_scan_threshold, 50);
    }

    #[test]
    fn rejects_non_positive_timeouts() {
        for bad in ["0", "-1", "nan", "soon"] {
            let result = CommandLine::try_parse_from(["probr", "scan", "10.0.0.1", "-t", bad]);
            assert!(result.is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn concurrency_is_bounded() {
        for bad in ["0", "-4", "many"] {
            let result = CommandLine::try_parse_from(["probr", "scan", "10.0.0.1", "-c", bad]);
            assert!(result.is_err(), "{bad} should be rejected");
        }

        let cli = CommandLine::try_parse_from(["probr", "scan", "10.0.0.1", "-c", "600"]).unwrap();
        let Commands::Scan(args) = &cli.command else {
            panic!("expected scan");
        };
        let err = cli.limits(&args.probe).unwrap_err();
        assert!(err.to_string().contains("ceiling of 500"), "{err}");

        let cli = CommandLine::try_parse_from([
            "probr",
            "scan",
            "10.0.0.1",
            "-c",
            "600",
            "--concurrency-ceiling",
            "1000",
        ])
        .unwrap();
        let Commands::Scan(args) = &cli.command else {
            panic!("expected scan");
        };
        let limits = cli.limits(&args.probe).unwrap();
        assert_eq!(limits.max_concurrency, 600);
        assert_eq!(limits.concurrency_ceiling, 1000);
    }

    #[test]
    fn discover_needs_address_and_netmask_together() {
        assert!(CommandLine::try_parse_from(["probr", "discover", "--address", "10.0.0.5"]).is_err());

        let cli = CommandLine::try_parse_from([
            "probr",
            "d",
            "--address",
            "10.0.0.5",
            "--netmask",
            "255.255.255.0",
            "--native",
        ])
        .unwrap();
        let Commands::Discover(args) = &cli.command else {
            panic!("expected discover");
        };
        assert!(args.native);
        assert_eq!(args.netmask, Some(Ipv4Addr::new(255, 255, 255, 0)));
    }
}
