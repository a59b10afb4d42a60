//! # probr common
//!
//! Shared building blocks for the probing engine: the data model passed between
//! the engine and its callers, the pure parsers (ports, targets, subnets),
//! configuration defaults and the cooperative abort signal.

pub mod config;
pub mod error;
pub mod network;
pub mod signal;

/// Logs a successful milestone.
///
/// Rendered with a dedicated marker by the CLI formatter, otherwise a plain
/// `info` event.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "probr::success", $($arg)*)
    };
}
