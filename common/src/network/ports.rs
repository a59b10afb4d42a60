//! # Port Specification Parser
//!
//! Turns free-form port text such as `22,80,8000-8100` into a [`PortSet`].
//!
//! Parsing is forgiving: every comma-separated token is handled on its own, a
//! malformed token is skipped and the valid remainder is kept. An empty result
//! is a legitimate outcome, the caller decides whether to proceed with it.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

pub const MIN_PORT: u16 = 1;
pub const MAX_PORT: u16 = u16::MAX;

/// A strictly ascending, duplicate-free list of TCP ports in `1..=65535`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PortSet {
    ports: Vec<u16>,
}

impl PortSet {
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports.binary_search(&port).is_ok()
    }
}

impl FromIterator<u16> for PortSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let ports: BTreeSet<u16> = iter.into_iter().filter(|port| *port >= MIN_PORT).collect();
        Self {
            ports: ports.into_iter().collect(),
        }
    }
}

impl FromStr for PortSet {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_ports(s))
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a u16;
    type IntoIter = std::slice::Iter<'a, u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}

/// Renders consecutive runs compactly, e.g. `22,80,8000-8100`.
impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.ports.iter().copied().peekable();
        let mut first = true;

        while let Some(start) = iter.next() {
            let mut end = start;
            while iter.peek() == Some(&end.wrapping_add(1)) && end != MAX_PORT {
                end = iter.next().unwrap_or(end);
            }

            if !first {
                f.write_str(",")?;
            }
            first = false;

            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

enum PortToken {
    Single(u16),
    Range(u16, u16),
}

/// Parses a comma-separated port specification.
///
/// * Single numbers outside `1..=65535` are dropped.
/// * In a `start-end` range the start is floored to 1 and the end ceiled to
///   65535. Reversed bounds are swapped, never discarded.
/// * Anything else is skipped.
pub fn parse_ports(spec: &str) -> PortSet {
    let mut ports: BTreeSet<u16> = BTreeSet::new();

    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Some(PortToken::Single(port)) => {
                ports.insert(port);
            }
            Some(PortToken::Range(start, end)) => ports.extend(start..=end),
            None => debug!("Skipping invalid port token '{token}'"),
        }
    }

    PortSet {
        ports: ports.into_iter().collect(),
    }
}

fn parse_token(token: &str) -> Option<PortToken> {
    if let Some((start_str, end_str)) = token.split_once('-') {
        let start: i64 = parse_signed(start_str)?;
        let end: i64 = parse_signed(end_str)?;
        let (start, end) = clamp_range(start, end);
        return Some(PortToken::Range(start, end));
    }

    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let port: i64 = parse_signed(token)?;
    if (i64::from(MIN_PORT)..=i64::from(MAX_PORT)).contains(&port) {
        Some(PortToken::Single(port as u16))
    } else {
        None
    }
}

fn clamp_range(start: i64, end: i64) -> (u16, u16) {
    let start: i64 = start.max(i64::from(MIN_PORT));
    let end: i64 = end.min(i64::from(MAX_PORT));
    let (low, high) = if start > end { (end, start) } else { (start, end) };

    let bound = |n: i64| n.clamp(i64::from(MIN_PORT), i64::from(MAX_PORT)) as u16;
    (bound(low), bound(high))
}

/// Integer parsing with an optional sign.
///
/// Values too large for an `i64` saturate instead of failing, so an absurd
/// bound still counts as out of range rather than malformed.
fn parse_signed(s: &str) -> Option<i64> {
    let s: &str = s.trim();
    let (negative, digits) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let magnitude: i64 = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
