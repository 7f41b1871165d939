//! B100 device polling over a single persistent Modbus connection.

use crate::config::{ConnectionSettings, Framer};
use south_common::{ReadingMap, ReadingValue};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_modbus::client::{Context, Reader};
use tokio_modbus::prelude::*;
use tracing::{debug, info, warn};

/// Modbus unit (slave) the B100 answers on.
pub const UNIT_ID: u8 = 1;

/// Raw register values are thousandths of a degree.
pub const SCALE: f64 = 1000.0;

/// Each temperature occupies two consecutive input registers.
pub const REGISTERS_PER_POINT: u16 = 2;

/// Value reported for a datapoint whose read failed.
pub const READ_ERROR: &str = "error";

/// A named 32-bit input register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPoint {
    pub name: &'static str,
    pub address: u16,
}

/// Datapoints read on every poll.
pub const B100_POINTS: [RegisterPoint; 2] = [
    RegisterPoint {
        name: "ltc_tank_temp",
        address: 216,
    },
    RegisterPoint {
        name: "top_oil_temp",
        address: 268,
    },
];

/// Error type for polling operations.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Read failed: {0}")]
    Read(String),
    #[error("Device exception: {0}")]
    Exception(String),
    #[error("Expected {expected} registers, got {actual}")]
    RegisterCount { expected: usize, actual: usize },
}

impl PollerError {
    /// Whether the connection is unusable after this error.
    pub fn is_transport(&self) -> bool {
        matches!(self, PollerError::Connection(_) | PollerError::Read(_))
    }
}

/// Decode a signed 32-bit value from two registers and divide by `scale`.
///
/// Bytes within a register are big-endian; the first register holds the
/// low word.
pub fn decode_scaled_i32(registers: &[u16], scale: f64) -> Result<f64, PollerError> {
    let [low, high] = registers else {
        return Err(PollerError::RegisterCount {
            expected: REGISTERS_PER_POINT as usize,
            actual: registers.len(),
        });
    };
    let raw = (((*high as u32) << 16) | (*low as u32)) as i32;
    Ok(raw as f64 / scale)
}

/// Poller owning the connection to one B100.
pub struct B100Poller {
    settings: ConnectionSettings,
    ctx: Option<Context>,
}

impl B100Poller {
    /// Create a poller; the connection is opened on first read.
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            ctx: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.settings.timeout_ms)
    }

    /// Connect to the device.
    async fn connect(&self) -> Result<Context, PollerError> {
        let target = format!("{}:{}", self.settings.address, self.settings.port);
        let stream = tokio::time::timeout(
            self.timeout(),
            TcpStream::connect((self.settings.address.as_str(), self.settings.port)),
        )
        .await
        .map_err(|_| PollerError::Connection(format!("{}: connection timeout", target)))?
        .map_err(|e| PollerError::Connection(format!("{}: {}", target, e)))?;

        let slave = Slave(UNIT_ID);
        let ctx = match self.settings.framer {
            Framer::Tcp => tcp::attach_slave(stream, slave),
            Framer::Rtu => rtu::attach_slave(stream, slave),
        };

        info!(
            "Connected to B100 at {} ({} framing)",
            target, self.settings.framer
        );
        Ok(ctx)
    }

    /// Read every datapoint.
    ///
    /// Fails only when no connection can be made. Individual read failures
    /// yield [`READ_ERROR`] for that datapoint; a transport failure also drops
    /// the connection so the next call reconnects.
    pub async fn read_all(&mut self) -> Result<ReadingMap, PollerError> {
        if self.ctx.is_none() {
            self.ctx = Some(self.connect().await?);
        }

        let timeout = self.timeout();
        let mut values = ReadingMap::new();

        for point in &B100_POINTS {
            let result = match self.ctx.as_mut() {
                Some(ctx) => read_point(ctx, point.address, timeout).await,
                None => Err(PollerError::Connection("connection dropped".to_string())),
            };

            let value = match result {
                Ok(temp) => {
                    debug!("{} = {}", point.name, temp);
                    ReadingValue::Float(temp)
                }
                Err(e) => {
                    warn!(
                        "Failed to read {} @ {}: {}",
                        point.name, point.address, e
                    );
                    if e.is_transport() && self.ctx.take().is_some() {
                        warn!("Dropping B100 connection; reconnecting on next poll");
                    }
                    ReadingValue::from(READ_ERROR)
                }
            };
            values.insert(point.name.to_string(), value);
        }

        Ok(values)
    }

    /// Close the connection. Returns whether one was open.
    pub fn close(&mut self) -> bool {
        self.ctx.take().is_some()
    }
}

/// Read one register pair and decode it.
async fn read_point(
    ctx: &mut Context,
    address: u16,
    timeout: Duration,
) -> Result<f64, PollerError> {
    let request = ctx.read_input_registers(address, REGISTERS_PER_POINT);
    let registers = tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| PollerError::Read("read timeout".to_string()))?
        .map_err(|e| PollerError::Read(e.to_string()))?
        .map_err(|e| PollerError::Exception(format!("{:?}", e)))?;

    decode_scaled_i32(&registers, SCALE)
}
