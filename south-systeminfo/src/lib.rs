//! South plugin reporting host system information.
//!
//! Every poll reads `/proc` and runs `ps`, `mpstat`, `df`, `vmstat` and
//! `iostat`, producing one reading per metric group. Asset names are the
//! configured prefix followed by the group name:
//!
//! ```text
//! system/hostName
//! system/uptime
//! system/cpuUsage_all
//! system/diskUsage_dev/sda1
//! system/networkTraffic_eth0
//! system/diskTraffic_sda
//! ```
//!
//! `mpstat` and `iostat` come from the sysstat package.

pub mod collector;
pub mod config;
pub mod parser;
pub mod plugin;
pub mod source;

pub use plugin::SystemInfoPlugin;
pub use source::{HostSource, SystemSource};
