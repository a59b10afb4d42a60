//! # Scan Target Model
//!
//! A target is whatever the user typed to identify a host: an IPv4/IPv6
//! literal or a hostname. The engine treats it as opaque. Whether a hostname
//! resolves is only discovered when the target is probed.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

/// A single host to be probed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    name: String,
    addr: Option<IpAddr>,
}

impl Target {
    /// Creates a target from user input.
    ///
    /// Literal addresses (including bracketed IPv6 such as `[::1]`) are
    /// recognised immediately and never need resolving.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into().trim().to_string();
        let addr: Option<IpAddr> = parse_literal(&name);
        Self { name, addr }
    }

    /// The text the target was created from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The literal or resolved address, if known.
    pub fn addr(&self) -> Option<IpAddr> {
        self.addr
    }

    /// Attaches a resolved address while keeping the original name.
    pub fn with_addr(mut self, addr: IpAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// `true` when the name itself is an address literal.
    pub fn is_literal(&self) -> bool {
        parse_literal(&self.name).is_some()
    }

    /// `true` when two targets refer to the same user input.
    pub fn same_as(&self, other: &Target) -> bool {
        self.name == other.name
    }
}

impl From<IpAddr> for Target {
    fn from(addr: IpAddr) -> Self {
        Self {
            name: addr.to_string(),
            addr: Some(addr),
        }
    }
}

impl From<Ipv4Addr> for Target {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from(IpAddr::V4(addr))
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let target = Target::new(s);
        if target.name.is_empty() || target.name.chars().any(char::is_whitespace) {
            return Err(format!("invalid target: '{s}'"));
        }
        Ok(target)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn parse_literal(s: &str) -> Option<IpAddr> {
    let unbracketed: &str = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(s);
    unbracketed.parse::<IpAddr>().ok()
}

/// Parses a free-form list of targets (e.g. "192.168.1.5, example.com\n10.0.0.1").
///
/// Entries may be separated by newlines, commas or whitespace. Blank entries
/// are dropped and duplicates removed, keeping the first occurrence.
pub fn parse_targets(s: &str) -> Vec<Target> {
    let mut targets: Vec<Target> = Vec::new();

    for part in s.split(|c: char| c == ',' || c.is_whitespace()) {
        if part.is_empty() {
            continue;
        }
        let target = Target::new(part);
        if !targets.iter().any(|known| known.same_as(&target)) {
            targets.push(target);
        }
    }

    targets
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
