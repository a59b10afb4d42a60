//! # probr core
//!
//! The probing engine and the services built on top of it.
//!
//! * [`engine`]: bounded worker pool that runs independent probes.
//! * [`scanner`]: multi-target TCP connect scans.
//! * [`discovery`]: liveness discovery over the local subnet.
//! * [`liveness`]: pluggable host liveness checks.

pub mod discovery;
pub mod engine;
pub mod error;
pub mod liveness;
pub mod network;
pub mod scanner;
