//! South plugin for the B100 transformer monitor.
//!
//! Polls two temperature datapoints over Modbus and emits them as a single
//! reading per poll.
//!
//! # Datapoints
//!
//! | Name            | Input register | Encoding                         |
//! |-----------------|----------------|----------------------------------|
//! | `ltc_tank_temp` | 216            | i32, low word first, / 1000      |
//! | `top_oil_temp`  | 268            | i32, low word first, / 1000      |
//!
//! A datapoint whose read fails is reported as the text `"error"`.

pub mod config;
pub mod plugin;
pub mod poller;

pub use plugin::B100Plugin;
