pub mod interface;
pub mod ports;
pub mod probe;
pub mod range;
pub mod report;
pub mod subnet;
pub mod target;
