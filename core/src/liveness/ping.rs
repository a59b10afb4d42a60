use std::io;
use std::process::Stdio;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};

use probr_common::network::target::Target;

use super::LivenessProber;

static MISSING_PING: Once = Once::new();

/// Liveness through a single ICMP echo sent by the system `ping` binary.
///
/// The exit code is the only signal consumed, output is discarded.
#[derive(Debug, Clone)]
pub struct PingProber {
    program: String,
}

impl Default for PingProber {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
        }
    }
}

impl PingProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses another executable with `ping`-compatible arguments.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, host: &str, timeout: Duration) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(ping_args(host, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl LivenessProber for PingProber {
    async fn is_reachable(&self, target: &Target, timeout: Duration) -> bool {
        let host: String = match target.addr() {
            Some(addr) => addr.to_string(),
            None => target.name().to_string(),
        };

        match tokio::time::timeout(timeout, self.command(&host, timeout).status()).await {
            Ok(Ok(status)) => status.success(),
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                MISSING_PING.call_once(|| {
                    error!("'{}' is not available on this system, every host will look down", self.program)
                });
                false
            }
            Ok(Err(e)) => {
                debug!("Failed to run {} for {host}: {e}", self.program);
                false
            }
            Err(_elapsed) => false,
        }
    }
}

/// One echo request with a reply deadline.
///
/// Unix `ping -W` takes whole seconds, so sub-second timeouts round up and the
/// caller's own deadline cuts the process short.
fn ping_args(host: &str, timeout: Duration) -> Vec<String> {
    if cfg!(windows) {
        let millis: u128 = timeout.as_millis().max(1);
        vec!["-n".into(), "1".into(), "-w".into(), millis.to_string(), host.into()]
    } else {
        let secs: u64 = (timeout.as_secs_f64().ceil() as u64).max(1);
        vec!["-c".into(), "1".into(), "-W".into(), secs.to_string(), host.into()]
    }
}
