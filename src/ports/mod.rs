//! Port traits separating the domain from concrete adapters.

pub mod config_port;
pub mod data_port;
pub mod report_port;
